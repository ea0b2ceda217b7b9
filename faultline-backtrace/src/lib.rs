#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Native stack capture for the faultline error reporter.
//!
//! This crate provides [`NativeStack`], a
//! [`StackSource`](faultline::stack::StackSource) that walks the real process
//! stack with the `backtrace` crate. Demangled symbols are split into a type
//! and a function name, so a report shows `Users::create()` for a frame in
//! `myapp::Users::create`.
//!
//! # Quick Start
//!
//! ```rust
//! use faultline::Reporter;
//! use faultline_backtrace::NativeStack;
//!
//! let reporter = Reporter::builder()
//!     .stack_source(NativeStack::new_from_env())
//!     .build();
//! # drop(reporter);
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_BACKTRACE=full` - Disables filtering and shows full paths
//! - `FAULTLINE_BACKTRACE` - Comma-separated options:
//!   - `full_paths` - Keep full file paths for frames from the standard
//!     library and the cargo registry
//!
//! # Path privacy
//!
//! Frames from your own crates always carry their full path, since source
//! excerpts are read from it. If that exposes private file system structure,
//! build with `--remap-path-prefix`:
//!
//! ```sh
//! export RUSTFLAGS="--remap-path-prefix=$HOME=/home/user --remap-path-prefix=$PWD=/build"
//! ```
//!
//! # Debugging symbols in release builds
//!
//! Symbol names and source locations are only available when debug
//! information is kept:
//!
//! ```toml
//! [profile.release]
//! strip = false
//! # You can also set this to "line-tables-only" for smaller binaries
//! debug = true
//! ```
//!
//! # Filtering
//!
//! ```rust
//! use faultline_backtrace::{NativeStack, StackFilter};
//!
//! let stack = NativeStack {
//!     filter: StackFilter {
//!         skipped_initial_crates: &["faultline", "faultline-backtrace"],
//!         skipped_middle_crates: &["tokio"],
//!         skipped_final_crates: &["std"],
//!         max_entry_count: 15,
//!         show_full_path: false,
//!     },
//! };
//! ```

use std::{borrow::Cow, ops::Range, panic::Location, sync::OnceLock};

use backtrace::BytesOrWideString;
use faultline::stack::{StackFrame, StackSource};

/// A stack captured by [`NativeStack::capture_native`], most recent frame
/// first.
#[derive(Debug)]
pub struct NativeBacktrace {
    /// The kept frames, ordered from most recent to oldest.
    pub frames: Vec<NativeFrame>,
    /// Total number of frames that were omitted due to filtering.
    pub total_omitted_frames: usize,
}

/// A single resolved frame.
#[derive(Debug)]
pub struct NativeFrame {
    /// The demangled symbol name, without its hash.
    pub sym_demangled: String,
    /// File path information, if available.
    pub frame_path: Option<FramePath>,
    /// Line number in the source file, if available.
    pub lineno: Option<u32>,
}

/// File path information for a stack frame.
#[derive(Debug)]
pub struct FramePath {
    /// The raw file path from the debug information.
    pub raw_path: String,
    /// The crate name if detected from the path.
    pub crate_name: Option<Cow<'static, str>>,
    /// Common path prefix information for shortening display.
    pub split_path: Option<FramePrefix>,
}

/// A file path split at a well-known prefix.
#[derive(Debug)]
pub struct FramePrefix {
    /// The kind of prefix: `"RUST_SRC"` for the standard library, `"CARGO"`
    /// for the cargo registry, `"FAULTLINE"` for this library.
    pub prefix_kind: &'static str,
    /// The full prefix path that was removed from the original path.
    ///
    /// Example: `"/home/user/.cargo/registry/src/index.crates.io-1949cf8c6b5b557f"`
    pub prefix: String,
    /// The remaining path after the prefix was removed.
    ///
    /// Example: `"indexmap-2.12.1/src/map/core/entry.rs"`
    pub suffix: String,
}

/// Configuration for filtering frames from certain crates.
///
/// # Examples
///
/// ```rust
/// use faultline_backtrace::StackFilter;
///
/// let filter = StackFilter {
///     max_entry_count: 10,
///     ..StackFilter::DEFAULT
/// };
/// assert!(filter.skipped_initial_crates.contains(&"faultline"));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct StackFilter {
    /// Crates whose frames are hidden when they appear at the top of the
    /// stack.
    pub skipped_initial_crates: &'static [&'static str],
    /// Crates whose frames are hidden when they appear in the middle of the
    /// stack. A lone frame from such a crate is kept.
    pub skipped_middle_crates: &'static [&'static str],
    /// Crates whose frames are hidden when they appear at the bottom of the
    /// stack.
    pub skipped_final_crates: &'static [&'static str],
    /// Maximum number of frames to keep.
    pub max_entry_count: usize,
    /// Keep full paths for frames from the standard library and the cargo
    /// registry instead of `[..]/crate-version/src/...`.
    pub show_full_path: bool,
}

impl StackFilter {
    /// Default filter settings.
    pub const DEFAULT: Self = Self {
        skipped_initial_crates: &[
            "backtrace",
            "faultline",
            "faultline-backtrace",
            "core",
            "std",
            "alloc",
        ],
        skipped_middle_crates: &["std", "core", "alloc", "tokio"],
        skipped_final_crates: &["std", "core", "alloc", "tokio"],
        max_entry_count: 20,
        show_full_path: false,
    };

    /// Keeps every frame.
    pub const UNFILTERED: Self = Self {
        skipped_initial_crates: &[],
        skipped_middle_crates: &[],
        skipped_final_crates: &[],
        max_entry_count: usize::MAX,
        show_full_path: true,
    };
}

impl Default for StackFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A [`StackSource`] backed by the native process stack.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativeStack {
    /// Which frames to keep.
    pub filter: StackFilter,
}

#[derive(Debug)]
struct FaultlineEnvOptions {
    rust_backtrace_full: bool,
    show_full_path: bool,
}

impl FaultlineEnvOptions {
    fn get() -> &'static Self {
        static FAULTLINE_FLAGS: OnceLock<FaultlineEnvOptions> = OnceLock::new();

        FAULTLINE_FLAGS.get_or_init(|| {
            let rust_backtrace_full =
                std::env::var_os("RUST_BACKTRACE").is_some_and(|var| var == "full");
            let mut show_full_path = rust_backtrace_full;
            if let Some(var) = std::env::var_os("FAULTLINE_BACKTRACE") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("full_paths") {
                        show_full_path = true;
                    }
                }
            }
            FaultlineEnvOptions {
                rust_backtrace_full,
                show_full_path,
            }
        })
    }
}

impl NativeStack {
    /// A source with the default filter.
    pub const fn new() -> Self {
        Self {
            filter: StackFilter::DEFAULT,
        }
    }

    /// A source configured by environment variables.
    ///
    /// `RUST_BACKTRACE=full` disables filtering, `FAULTLINE_BACKTRACE=full_paths`
    /// keeps full paths. The environment is read once per process.
    pub fn new_from_env() -> Self {
        let env_options = FaultlineEnvOptions::get();
        Self {
            filter: if env_options.rust_backtrace_full {
                StackFilter {
                    show_full_path: env_options.show_full_path,
                    ..StackFilter::UNFILTERED
                }
            } else {
                StackFilter {
                    show_full_path: env_options.show_full_path,
                    ..StackFilter::DEFAULT
                }
            },
        }
    }

    /// Captures the current stack, applying the filter.
    pub fn capture_native(&self) -> NativeBacktrace {
        let filter = &self.filter;
        let mut initial_filtering = !filter.skipped_initial_crates.is_empty();
        let mut frames: Vec<NativeFrame> = Vec::new();
        let mut total_omitted_frames = 0;

        let mut delayed_omitted_frame: Option<NativeFrame> = None;
        let mut currently_omitted_crate_name: Option<&'static str> = None;

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                // Don't consider frames without symbol names or filenames.
                let (Some(sym), Some(filename_raw)) = (symbol.name(), symbol.filename_raw()) else {
                    return;
                };

                if frames.len() >= filter.max_entry_count {
                    total_omitted_frames += 1;
                    return;
                }

                let frame_path = FramePath::new(filename_raw);
                let sym_demangled = format!("{sym:#}");

                if initial_filtering {
                    let skipped_by_path = frame_path.crate_name.as_ref().is_some_and(|crate_name| {
                        filter.skipped_initial_crates.contains(&&**crate_name)
                    });
                    if skipped_by_path || is_faultline_symbol(&sym_demangled) {
                        total_omitted_frames += 1;
                        return;
                    }
                    initial_filtering = false;
                }

                if let Some(cur_crate_name) = &frame_path.crate_name
                    && let Some(currently_omitted_crate_name) = &currently_omitted_crate_name
                    && cur_crate_name == currently_omitted_crate_name
                {
                    delayed_omitted_frame = None;
                    total_omitted_frames += 1;
                    return;
                }

                if currently_omitted_crate_name.take().is_some()
                    && let Some(delayed_frame) = delayed_omitted_frame.take()
                {
                    total_omitted_frames -= 1;
                    frames.push(delayed_frame);
                }

                let frame = NativeFrame {
                    sym_demangled,
                    frame_path: Some(frame_path),
                    lineno: symbol.lineno(),
                };

                if let Some(cur_crate_name) = frame
                    .frame_path
                    .as_ref()
                    .and_then(|p| p.crate_name.as_deref())
                    && let Some(skipped_crate) = filter
                        .skipped_middle_crates
                        .iter()
                        .find(|&&crate_name| crate_name == cur_crate_name)
                {
                    currently_omitted_crate_name = Some(*skipped_crate);
                    total_omitted_frames += 1;
                    delayed_omitted_frame = Some(frame);
                    return;
                }

                frames.push(frame);
            });

            true
        });

        if currently_omitted_crate_name.is_some()
            && let Some(delayed_frame) = delayed_omitted_frame.take()
        {
            total_omitted_frames -= 1;
            frames.push(delayed_frame);
        }

        while let Some(last) = frames.last() {
            let skip = if let Some(frame_path) = &last.frame_path
                && let Some(crate_name) = &frame_path.crate_name
                && filter.skipped_final_crates.contains(&&**crate_name)
            {
                true
            } else if last.sym_demangled == "__libc_start_call_main"
                || last.sym_demangled == "__libc_start_main_impl"
            {
                true
            } else {
                last.sym_demangled == "_start"
                    && last
                        .frame_path
                        .as_ref()
                        .is_some_and(|frame_path| frame_path.raw_path.contains("zig/libc/glibc"))
            };

            if skip {
                total_omitted_frames += 1;
                frames.pop();
            } else {
                break;
            }
        }

        NativeBacktrace {
            frames,
            total_omitted_frames,
        }
    }
}

impl StackSource for NativeStack {
    fn capture(&self) -> Vec<StackFrame> {
        self.capture_native()
            .frames
            .into_iter()
            .map(|frame| {
                let (class, function) = split_symbol(&frame.sym_demangled);
                let file = frame.frame_path.map(|path| match path.split_path {
                    Some(split) if !self.filter.show_full_path => format!("[..]/{}", split.suffix),
                    _ => path.raw_path,
                });
                StackFrame {
                    class: class.map(str::to_string),
                    function: Some(function.to_string()),
                    file,
                    line: frame.lineno,
                    args: None,
                }
            })
            .collect()
    }
}

/// Symbol prefixes of the reporter's own functions, including trait impls
/// written as `<faultline::Type as Trait>::f`.
const FAULTLINE_SYMBOL_PREFIXES: &[&str] = &[
    "faultline::",
    "faultline_backtrace::",
    "<faultline::",
    "<faultline_backtrace::",
];

// Workspace builds record relative source paths, so the path matchers alone
// miss the reporter's frames.
fn is_faultline_symbol(sym: &str) -> bool {
    FAULTLINE_SYMBOL_PREFIXES
        .iter()
        .any(|prefix| sym.starts_with(prefix))
}

fn function_name_range(s: &str) -> Range<usize> {
    let mut word_start = 0usize;
    let mut word_end = 0usize;
    let mut angle_nesting_level = 0u64;
    let mut curly_nesting_level = 0u64;
    let mut potential_function_arrow = false;
    let mut inside_word = false;

    for (i, c) in s.char_indices() {
        if curly_nesting_level == 0 && angle_nesting_level == 0 {
            if !inside_word && unicode_ident::is_xid_start(c) {
                word_start = i;
                inside_word = true;
            } else if inside_word && !unicode_ident::is_xid_continue(c) {
                word_end = i;
                inside_word = false;
            }
        }

        let was_potential_function_arrow = potential_function_arrow;
        potential_function_arrow = c == '-';

        if c == '<' {
            angle_nesting_level = angle_nesting_level.saturating_add(1);
        } else if c == '>' && !was_potential_function_arrow {
            angle_nesting_level = angle_nesting_level.saturating_sub(1);
        } else if c == '{' {
            curly_nesting_level = curly_nesting_level.saturating_add(1);
            if !inside_word && curly_nesting_level == 1 && angle_nesting_level == 0 {
                word_start = i;
                inside_word = true;
            }
        } else if c == '}' {
            curly_nesting_level = curly_nesting_level.saturating_sub(1);
            if inside_word && curly_nesting_level == 0 {
                word_end = i + 1;
                inside_word = false;
            }
        }
    }

    if word_start < word_end {
        word_start..word_end
    } else {
        // We started at word start but never found an end; take the rest
        word_start..s.len()
    }
}

/// The type name that owns a path such as `myapp::Users` or
/// `<myapp::Users as core::fmt::Display>`. Only names that start with an
/// uppercase letter count as types.
fn owner_type(owner: &str) -> Option<&str> {
    let path = match owner
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
    {
        Some(inner) => inner.split(" as ").next().unwrap_or(inner),
        None => owner,
    };
    let path = path.split('<').next().unwrap_or(path);
    let name = path.rsplit("::").next().unwrap_or(path);
    name.chars()
        .next()
        .is_some_and(char::is_uppercase)
        .then_some(name)
}

/// Splits a demangled symbol into its owning type, if any, and its function
/// name.
pub fn split_symbol(sym: &str) -> (Option<&str>, &str) {
    let range = function_name_range(sym);
    let owner = sym[..range.start].strip_suffix("::");
    (owner.and_then(owner_type), &sym[range])
}

const fn get_faultline_backtrace_matcher(
    location: &'static Location<'static>,
) -> Option<(&'static str, usize)> {
    let file = location.file();

    let Some(prefix_len) = file.len().checked_sub("/src/lib.rs".len()) else {
        return None;
    };

    let (prefix, suffix) = file.split_at(prefix_len);
    // Assert the suffix is /src/lib.rs (or \src\lib.rs on Windows)
    // This is a compile-time check that the caller location is valid
    if std::path::MAIN_SEPARATOR == '/' {
        assert!(suffix.eq_ignore_ascii_case("/src/lib.rs"));
    } else {
        assert!(suffix.eq_ignore_ascii_case(r#"/src\lib.rs"#));
    }

    let (matcher_prefix, _) = file.split_at(prefix_len + 4);

    let mut splitter_prefix = prefix;
    while !splitter_prefix.is_empty() {
        let (new_prefix, last_char) = splitter_prefix.split_at(splitter_prefix.len() - 1);
        splitter_prefix = new_prefix;
        if last_char.eq_ignore_ascii_case(std::path::MAIN_SEPARATOR_STR) {
            break;
        }
    }

    Some((matcher_prefix, splitter_prefix.len()))
}

const FAULTLINE_BACKTRACE_MATCHER: Option<(&str, usize)> =
    get_faultline_backtrace_matcher(Location::caller());
const FAULTLINE_MATCHER: Option<(&str, usize)> =
    get_faultline_backtrace_matcher(faultline::__private::FAULTLINE_LOCATION);

impl FramePath {
    fn new(path: BytesOrWideString<'_>) -> Self {
        static REGEXES: OnceLock<[regex::Regex; 2]> = OnceLock::new();
        let [std_regex, registry_regex] = REGEXES.get_or_init(|| {
            [
                // Matches Rust standard library paths:
                // - /lib/rustlib/src/rust/library/{std|core|alloc}/src/...
                // - /rustc/{40-char-hash}/library/{std|core|alloc}/src/...
                regex::Regex::new(
                    r"(?:/lib/rustlib/src/rust|^/rustc/[0-9a-f]{40})/library/(std|core|alloc)/src/.*$",
                )
                .expect("built-in regex pattern for std library paths should be valid"),
                // Matches Cargo registry paths:
                // - /.cargo/registry/src/{index}-{16-char-hash}/{crate}-{version}/src/...
                regex::Regex::new(
                    r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/([^./]+)-[0-9]+\.[^/]*/src/.*$",
                )
                .expect("built-in regex pattern for cargo registry paths should be valid"),
            ]
        });

        let path_str = path.to_string();
        let raw_path = path.to_str_lossy().into_owned();

        for (regex, prefix_kind) in [(std_regex, "RUST_SRC"), (registry_regex, "CARGO")] {
            if let Some(captures) = regex.captures(&path_str) {
                let crate_capture = captures
                    .get(1)
                    .expect("regex capture group 1 should exist for known path prefixes");
                let split = crate_capture.start();
                let (prefix, suffix) = (&path_str[..split - 1], &path_str[split..]);
                return Self {
                    raw_path,
                    crate_name: Some(crate_capture.as_str().to_string().into()),
                    split_path: Some(FramePrefix {
                        prefix_kind,
                        prefix: prefix.to_string(),
                        suffix: suffix.to_string(),
                    }),
                };
            }
        }

        for (matcher, crate_name) in [
            (FAULTLINE_MATCHER, "faultline"),
            (FAULTLINE_BACKTRACE_MATCHER, "faultline-backtrace"),
        ] {
            if let Some((matcher_prefix, splitter_prefix_len)) = matcher
                && path_str.starts_with(matcher_prefix)
            {
                let (prefix, suffix) = (
                    &path_str[..splitter_prefix_len],
                    &path_str[splitter_prefix_len + 1..],
                );
                return Self {
                    raw_path,
                    split_path: Some(FramePrefix {
                        prefix_kind: "FAULTLINE",
                        prefix: prefix.to_string(),
                        suffix: suffix.to_string(),
                    }),
                    crate_name: Some(Cow::Borrowed(crate_name)),
                };
            }
        }

        Self {
            raw_path,
            crate_name: None,
            split_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_symbol() {
        let cases = [
            ("main", (None, "main")),
            ("myapp::main", (None, "main")),
            ("myapp::Users::create", (Some("Users"), "create")),
            ("myapp::Stack<T>::push", (Some("Stack"), "push")),
            (
                "<myapp::Users as core::fmt::Display>::fmt",
                (Some("Users"), "fmt"),
            ),
            (
                "<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
                (Some("Box"), "call"),
            ),
            ("myapp::main::{{closure}}", (None, "{{closure}}")),
        ];
        for (sym, expected) in cases {
            assert_eq!(split_symbol(sym), expected, "{sym}");
        }
    }

    #[test]
    fn test_faultline_symbols() {
        assert!(is_faultline_symbol("faultline::reporter::Reporter::capture"));
        assert!(is_faultline_symbol(
            "<faultline_backtrace::NativeStack as faultline::stack::StackSource>::capture"
        ));
        assert!(is_faultline_symbol("faultline_backtrace::NativeStack::capture_native"));
        assert!(!is_faultline_symbol("faultline_app::main"));
        assert!(!is_faultline_symbol("native::capture_here"));
    }

    #[test]
    fn test_env_filter_keeps_limits() {
        let stack = NativeStack::new_from_env();
        assert!(stack.filter.max_entry_count >= StackFilter::DEFAULT.max_entry_count);
    }
}
