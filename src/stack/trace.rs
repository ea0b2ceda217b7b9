use super::StackFrame;
use crate::{
    export::{Exported, export},
    path::PathAliases,
    record::{INTERNAL_FILE, line_text, normalize_file, normalize_line},
    templates::{Channel, Vars, insert},
};

/// Reference shown for frames outside any function.
pub const MAIN_REFERENCE: &str = "[main]";

/// How [`Reporter::trace`](crate::Reporter::trace) presents its result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// Structured frames.
    Frames,
    /// `(file, line)` pairs for frames with a known file.
    Points,
    /// Text rendered with the active channel's `trace_line` template.
    #[default]
    Text,
    /// Like [`TraceFormat::Text`], but for the given channel.
    TextFor(Channel),
}

/// Options for a trace query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceOptions {
    /// Frames at or beyond this index are not visited.
    pub depth: usize,
    /// Index of the first visited frame.
    pub start: usize,
    /// Whether references include exported call arguments.
    pub args: bool,
    /// Result format.
    pub format: TraceFormat,
    /// Function names to elide, bare or class-qualified, in addition to the
    /// reporter's wrapper names.
    pub exclude: Vec<String>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            depth: 999,
            start: 0,
            args: false,
            format: TraceFormat::default(),
            exclude: Vec::new(),
        }
    }
}

impl TraceOptions {
    /// Default options with the given format.
    pub fn with_format(format: TraceFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// A resolved frame of a trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceFrame {
    /// `Class::function(args)`, `function(args)` or `[main]`.
    pub reference: String,
    /// The class name, if any.
    pub class: Option<String>,
    /// The function name, if any.
    pub function: Option<String>,
    /// Source file, or `[internal]`.
    pub file: String,
    /// `file` after path-alias trimming.
    pub path: String,
    /// Source line, if known.
    pub line: Option<u32>,
    /// Exported call arguments, when requested and available.
    pub args: Option<Vec<Exported>>,
}

/// A source position in a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    /// Source file.
    pub file: String,
    /// Source line, if known.
    pub line: Option<u32>,
}

/// The result of a trace query, shaped by [`TraceOptions::format`].
#[derive(Clone, Debug, PartialEq)]
pub enum Trace {
    /// See [`TraceFormat::Frames`].
    Frames(Vec<TraceFrame>),
    /// See [`TraceFormat::Points`].
    Points(Vec<Point>),
    /// See [`TraceFormat::Text`].
    Text(String),
}

fn is_excluded(frame: &StackFrame, excluded: &[String]) -> bool {
    let Some(function) = frame.function.as_deref() else {
        return false;
    };
    excluded.iter().any(|name| {
        if name == function {
            return true;
        }
        match (frame.class.as_deref(), name.split_once("::")) {
            (Some(class), Some((name_class, name_function))) => {
                class == name_class && function == name_function
            }
            _ => false,
        }
    })
}

fn reference(frame: &StackFrame, args: Option<&[Exported]>) -> String {
    let Some(function) = frame.function.as_deref() else {
        return MAIN_REFERENCE.to_string();
    };
    let mut reference = String::new();
    if let Some(class) = frame.class.as_deref() {
        reference.push_str(class);
        reference.push_str("::");
    }
    reference.push_str(function);
    reference.push('(');
    for (index, arg) in args.unwrap_or_default().iter().enumerate() {
        if index != 0 {
            reference.push_str(", ");
        }
        reference.push_str(arg.as_str());
    }
    reference.push(')');
    reference
}

/// Visits `frames[start..depth]`, dropping excluded frames.
pub(crate) fn walk(
    frames: &[StackFrame],
    options: &TraceOptions,
    wrappers: &[String],
    aliases: &PathAliases,
) -> Vec<TraceFrame> {
    frames
        .iter()
        .take(options.depth)
        .skip(options.start)
        .filter(|frame| !is_excluded(frame, wrappers) && !is_excluded(frame, &options.exclude))
        .map(|frame| {
            let args = if options.args {
                frame
                    .args
                    .as_ref()
                    .map(|args| args.iter().map(export).collect::<Vec<_>>())
            } else {
                None
            };
            let file = normalize_file(frame.file.as_deref()).into_owned();
            TraceFrame {
                reference: reference(frame, args.as_deref()),
                class: frame.class.clone(),
                function: frame.function.clone(),
                path: aliases.trim(&file).into_owned(),
                file,
                line: normalize_line(frame.line),
                args,
            }
        })
        .collect()
}

pub(crate) fn points(frames: Vec<TraceFrame>) -> Vec<Point> {
    frames
        .into_iter()
        .filter(|frame| frame.file != INTERNAL_FILE)
        .map(|frame| Point {
            file: frame.file,
            line: frame.line,
        })
        .collect()
}

pub(crate) fn render_lines(frames: &[TraceFrame], template: &str) -> String {
    let mut out = String::new();
    for (index, frame) in frames.iter().enumerate() {
        if index != 0 {
            out.push('\n');
        }
        let mut vars = Vars::new();
        vars.set("reference", frame.reference.as_str())
            .set("file", frame.file.as_str())
            .set("path", frame.path.as_str())
            .set("line", line_text(frame.line))
            .set("class", frame.class.as_deref().unwrap_or_default())
            .set("function", frame.function.as_deref().unwrap_or_default());
        out.push_str(&insert(template, &vars));
    }
    out
}
