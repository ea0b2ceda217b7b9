use faultline::{
    ErrorEvent, Reporter,
    output::SharedBuffer,
    severity::ErrorCode,
    stack::{StackFrame, StackSource, TraceFormat, TraceOptions},
    templates::Channel,
};
use faultline_backtrace::{NativeStack, StackFilter};

struct Worker;

impl Worker {
    #[inline(never)]
    fn capture(&self, stack: &NativeStack) -> Vec<StackFrame> {
        stack.capture()
    }
}

#[inline(never)]
fn capture_here(stack: &NativeStack) -> Vec<StackFrame> {
    stack.capture()
}

#[test]
fn test_capture_names_functions() {
    let frames = capture_here(&NativeStack::new());
    assert!(!frames.is_empty());
    assert!(frames.len() <= StackFilter::DEFAULT.max_entry_count);
    let frame = frames
        .iter()
        .find(|frame| frame.function.as_deref() == Some("capture_here"))
        .expect("the capturing function should be on the stack");
    assert_eq!(frame.class, None);
    assert!(frame.file.as_deref().is_some_and(|file| file.ends_with("native.rs")));
    assert!(frame.line.is_some());
}

#[test]
fn test_capture_splits_methods() {
    let frames = Worker.capture(&NativeStack::new());
    assert!(frames.iter().any(|frame| {
        frame.class.as_deref() == Some("Worker") && frame.function.as_deref() == Some("capture")
    }));
}

#[test]
fn test_max_entry_count() {
    let stack = NativeStack {
        filter: StackFilter {
            max_entry_count: 2,
            ..StackFilter::DEFAULT
        },
    };
    assert!(stack.capture().len() <= 2);
    assert!(stack.capture_native().total_omitted_frames > 0);
}

#[test]
fn test_reporter_trace_from_native_stack() {
    let output = SharedBuffer::new();
    let mut reporter = Reporter::builder()
        .output(output.clone())
        .stack_source(NativeStack::new())
        .build();
    reporter.set_channel(Channel::Text);

    let text = reporter.trace_text(&TraceOptions::with_format(TraceFormat::Text));
    let first = text.lines().next().expect("the trace should not be empty");
    assert!(
        first.starts_with("test_reporter_trace_from_native_stack() - "),
        "{text}"
    );
    assert!(!text.contains("Reporter::"));
    assert!(!text.contains("NativeStack::"));

    reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "native"));
    assert!(output.contents().contains("Trace:\n"));
}
