//! The panic hook ends the process, so each case runs in a child copy of this
//! test binary. The child side is a test that does nothing unless
//! `FAULTLINE_PANIC_HOOK_CHILD` names the case to run.

use std::process::{Command, Output};

use faultline::{ErrorRecord, Reporter, hooks, templates::Channel};

const CHILD_ENV: &str = "FAULTLINE_PANIC_HOOK_CHILD";
const PREVIOUS_HOOK_MARKER: &str = "previous panic hook ran";

fn exit_three(_record: &ErrorRecord) -> ! {
    std::process::exit(3)
}

fn text_reporter() -> Reporter {
    let mut reporter = Reporter::builder()
        .output(std::io::stderr())
        .on_fatal(exit_three)
        .build();
    reporter.set_channel(Channel::Text);
    reporter
}

fn run_child(case: &str) -> Output {
    let exe = std::env::current_exe().expect("the test binary should know its path");
    Command::new(exe)
        .args([
            "panic_hook_child",
            "--exact",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_ENV, case)
        .output()
        .expect("failed to run the test binary")
}

#[test]
fn panic_hook_child() {
    let Ok(case) = std::env::var(CHILD_ENV) else {
        return;
    };

    std::panic::set_hook(Box::new(|_| eprintln!("{PREVIOUS_HOOK_MARKER}")));
    match case.as_str() {
        "reported" => {
            hooks::install(text_reporter()).expect("nothing installed yet");
            hooks::install_panic_hook();
            eprintln!("panicking on line {}", line!() + 1);
            panic!("boom");
        }
        "unreported" => {
            hooks::install_panic_hook();
            panic!("boom");
        }
        "busy" => {
            let shared = hooks::install(text_reporter()).expect("nothing installed yet");
            hooks::install_panic_hook();
            let _guard = hooks::lock(&shared);
            panic!("boom");
        }
        other => panic!("unknown case {other:?}"),
    }
}

#[test]
fn test_panic_becomes_fatal_report() {
    let output = run_child("reported");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(3), "{stderr}");

    let line = stderr
        .lines()
        .find_map(|line| line.strip_prefix("panicking on line "))
        .expect("the child should announce the panic line");
    let report = stderr
        .lines()
        .find(|line| line.starts_with("Fatal Error: 256 :: boom on line "))
        .expect("the panic should be reported");
    assert!(report.starts_with(&format!("Fatal Error: 256 :: boom on line {line} of ")));
    assert!(report.ends_with("panic_hook.rs"), "{report}");
    assert!(!stderr.contains(PREVIOUS_HOOK_MARKER));
}

#[test]
fn test_previous_hook_without_reporter() {
    let output = run_child("unreported");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(101), "{stderr}");
    assert!(stderr.contains(PREVIOUS_HOOK_MARKER), "{stderr}");
    assert!(!stderr.contains("Fatal Error"));
}

#[test]
fn test_previous_hook_while_reporter_is_busy() {
    let output = run_child("busy");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(101), "{stderr}");
    assert!(stderr.contains(PREVIOUS_HOOK_MARKER), "{stderr}");
    assert!(!stderr.contains("Fatal Error"));
}
