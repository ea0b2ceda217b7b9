use core::{fmt, panic::Location};
use std::io::Write;

use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{
    config::ReporterConfig,
    excerpt::excerpt,
    export::{Describe, export},
    output::Output,
    path::PathAliases,
    record::{
        Deduplicator, ErrorEvent, ErrorRecord, INTERNAL_FILE, normalize_file, normalize_line,
    },
    render::{Report, context_lines, render, render_log},
    severity::{Priority, Severity, classify},
    sink::{LogSink, TracingSink},
    stack::{
        CallStack, Point, StackSource, Trace, TraceFormat, TraceFrame, TraceOptions, points,
        render_lines, walk,
    },
    templates::{Channel, TemplateSet, Templates},
    util::split_help_code,
};

/// Called after a fatal record was emitted. It must not return.
pub type FatalHandler = fn(&ErrorRecord) -> !;

/// The default [`FatalHandler`]: exits the process with status 1.
pub fn exit_on_fatal(_record: &ErrorRecord) -> ! {
    std::process::exit(1)
}

/// What [`Reporter::handle_error`] did with an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Reporting is disabled or the code is not classified.
    Ignored,
    /// An identical event was already reported.
    Duplicate,
    /// The event was reported. Fatal events never get here because the fatal
    /// handler diverges.
    Reported(Severity),
}

impl Disposition {
    /// Whether the reporter took care of the event, either by reporting it
    /// or by recognising it as a duplicate.
    pub const fn is_handled(self) -> bool {
        !matches!(self, Disposition::Ignored)
    }
}

/// A record kept while the channel is [`Channel::Buffered`].
#[derive(Clone, Debug, PartialEq)]
pub struct BufferedRecord {
    /// The record.
    pub record: ErrorRecord,
    /// Rendered context lines, `$name = value`.
    pub context: Vec<String>,
    /// The trace rendered with the base trace-line template.
    pub trace: String,
}

/// Intercepts errors, renders reports and sends them to the inline output
/// and the log sink.
///
/// # Examples
///
/// ```
/// use faultline::{
///     ErrorEvent, Reporter, context,
///     output::SharedBuffer,
///     severity::ErrorCode,
///     templates::Channel,
/// };
///
/// let output = SharedBuffer::new();
/// let mut reporter = Reporter::builder().output(output.clone()).build();
/// reporter.set_channel(Channel::Text);
///
/// let event = ErrorEvent::new(ErrorCode::WARNING, "Undefined index: foo")
///     .at("/app/a.rs", 10)
///     .with_context(context! { "x" => 5 });
/// assert!(reporter.handle_error(event.clone()).is_handled());
/// assert!(output.contents().starts_with("Warning: 2 :: Undefined index: foo on line 10"));
///
/// // The same event is only reported once.
/// output.take();
/// reporter.handle_error(event);
/// assert!(output.is_empty());
/// ```
pub struct Reporter {
    config: ReporterConfig,
    channel: Channel,
    templates: Templates,
    seen: Deduplicator,
    buffered: Vec<BufferedRecord>,
    sink: Arc<dyn LogSink>,
    output: Output,
    stack: Box<dyn StackSource>,
    aliases: PathAliases,
    on_fatal: FatalHandler,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .field("channel", &self.channel)
            .field("seen", &self.seen.len())
            .field("buffered", &self.buffered.len())
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// A reporter with the default configuration, writing to standard output
    /// and logging through `tracing`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Like [`new`](Self::new), but configured from the environment. See
    /// [`ReporterConfig::from_env`].
    pub fn new_from_env() -> Self {
        Self::builder().config(ReporterConfig::from_env()).build()
    }

    /// Starts building a reporter.
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::new()
    }

    /// The configuration.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Mutable access to the configuration. Changing
    /// [`ReporterConfig::channel`] here has no effect; use
    /// [`set_channel`](Self::set_channel).
    pub fn config_mut(&mut self) -> &mut ReporterConfig {
        &mut self.config
    }

    /// The path aliases used to shorten file names.
    pub fn path_aliases(&self) -> &PathAliases {
        &self.aliases
    }

    /// Every distinct error seen so far.
    pub fn seen(&self) -> &Deduplicator {
        &self.seen
    }

    /// Classifies, deduplicates, renders and emits an error.
    ///
    /// Fatal errors call the fatal handler after emission and never return.
    pub fn handle_error(&mut self, event: ErrorEvent) -> Disposition {
        if !self.config.reporting {
            tracing::trace!(code = %event.code, "reporting disabled, ignoring error");
            return Disposition::Ignored;
        }
        let Some((severity, priority)) = classify(event.code) else {
            tracing::debug!(code = %event.code, "ignoring unclassified error code");
            return Disposition::Ignored;
        };
        if !self.seen.insert(event.fingerprint()) {
            tracing::debug!(
                code = %event.code,
                description = %event.description,
                "suppressing duplicate error"
            );
            return Disposition::Duplicate;
        }

        let record = self.record(event, severity, priority);
        self.emit(&record);

        if self.config.log {
            let message = render_log(self.log_template(), &record);
            self.sink.write(priority, &message);
        }

        if severity.is_fatal() {
            (self.on_fatal)(&record);
        }
        Disposition::Reported(severity)
    }

    fn record(&self, event: ErrorEvent, severity: Severity, priority: Priority) -> ErrorRecord {
        let ErrorEvent {
            code,
            description,
            file,
            line,
            context,
        } = event;

        let help = self
            .config
            .help_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .and_then(|_| split_help_code(&description))
            .map(|(stripped, id)| (stripped.to_string(), id.to_string()));
        let (description, help_id) = match help {
            Some((stripped, id)) => (stripped, Some(id)),
            None => (description, None),
        };

        let file = normalize_file(file.as_deref()).into_owned();
        ErrorRecord {
            code,
            severity,
            priority,
            description,
            help_id,
            path: self.aliases.trim(&file).into_owned(),
            file,
            line: normalize_line(line),
            context,
        }
    }

    fn log_template(&self) -> &str {
        self.templates
            .get(Channel::Log)
            .and_then(|set| set.error.as_deref())
            .unwrap_or_default()
    }

    fn emit(&mut self, record: &ErrorRecord) {
        let context = context_lines(&record.context, self.config.context_budget);
        let options = TraceOptions {
            depth: self.config.trace_depth,
            start: self.config.trace_start,
            ..TraceOptions::default()
        };
        let frames = self.capture(&options);
        let trace = render_lines(&frames, self.templates.trace_line(self.channel));

        match self.channel {
            Channel::Buffered => {
                self.buffered.push(BufferedRecord {
                    record: record.clone(),
                    context,
                    trace,
                });
                return;
            }
            Channel::Log => {
                let mut message = render_log(self.log_template(), record);
                if !trace.is_empty() {
                    message.push('\n');
                    message.push_str(&trace);
                }
                self.sink.write(record.priority, &message);
                return;
            }
            Channel::Js | Channel::Html | Channel::Text => {}
        }

        let code = self.excerpt_for(record, &frames);
        let id = format!("faultline-err-{}", self.seen.len());
        let rendered = render(
            &self.templates.resolve(self.channel),
            &Report {
                record,
                id: &id,
                help_path: self.config.help_path.as_deref(),
                code: &code,
                context: &context,
                trace: &trace,
            },
        );
        self.write_output(&rendered);
    }

    fn excerpt_for(&self, record: &ErrorRecord, frames: &[TraceFrame]) -> Vec<String> {
        let position = match record.line {
            Some(line) if record.file != INTERNAL_FILE => Some((record.file.as_str(), line)),
            _ => frames
                .iter()
                .find(|frame| frame.file != INTERNAL_FILE)
                .and_then(|frame| Some((frame.file.as_str(), frame.line?))),
        };
        match position {
            Some((file, line)) => excerpt(file, line as usize, self.config.excerpt_context),
            None => Vec::new(),
        }
    }

    fn write_output(&mut self, text: &str) {
        if let Err(error) = self
            .output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush())
        {
            tracing::warn!(%error, "failed to write to the inline output");
        }
    }

    fn capture(&self, options: &TraceOptions) -> Vec<TraceFrame> {
        walk(
            &self.stack.capture(),
            options,
            &self.config.wrappers,
            &self.aliases,
        )
    }

    /// Captures the current call stack in the format chosen by `options`.
    pub fn trace(&self, options: &TraceOptions) -> Trace {
        match options.format {
            TraceFormat::Frames => Trace::Frames(self.trace_frames(options)),
            TraceFormat::Points => Trace::Points(self.trace_points(options)),
            TraceFormat::Text | TraceFormat::TextFor(_) => Trace::Text(self.trace_text(options)),
        }
    }

    /// Captures the current call stack as structured frames. The format in
    /// `options` is ignored.
    pub fn trace_frames(&self, options: &TraceOptions) -> Vec<TraceFrame> {
        self.capture(options)
    }

    /// Captures the source positions of the current call stack, skipping
    /// frames without a file. The format in `options` is ignored.
    pub fn trace_points(&self, options: &TraceOptions) -> Vec<Point> {
        points(self.capture(options))
    }

    /// Captures the current call stack as text, one line per frame. Uses the
    /// channel of [`TraceFormat::TextFor`] if given, the active channel
    /// otherwise.
    pub fn trace_text(&self, options: &TraceOptions) -> String {
        let channel = match options.format {
            TraceFormat::TextFor(channel) => channel,
            TraceFormat::Frames | TraceFormat::Points | TraceFormat::Text => self.channel,
        };
        render_lines(&self.capture(options), self.templates.trace_line(channel))
    }

    /// The active channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Switches the active channel and returns the previous one. Buffered
    /// records are kept.
    pub fn set_channel(&mut self, channel: Channel) -> Channel {
        core::mem::replace(&mut self.channel, channel)
    }

    /// Records buffered so far, oldest first.
    pub fn buffered(&self) -> &[BufferedRecord] {
        &self.buffered
    }

    /// Removes and returns the buffered records, oldest first.
    pub fn drain_buffered(&mut self) -> Vec<BufferedRecord> {
        core::mem::take(&mut self.buffered)
    }

    /// The templates of `channel`; `None` for [`Channel::Buffered`].
    pub fn templates(&self, channel: Channel) -> Option<&TemplateSet> {
        self.templates.get(channel)
    }

    /// Merges `patch` into the templates of `channel` and returns the merged
    /// set. See [`TemplateSet::merge`].
    pub fn set_templates(&mut self, channel: Channel, patch: TemplateSet) -> TemplateSet {
        self.templates.merge(channel, patch)
    }

    /// The shared base set every channel falls back to.
    pub fn base_templates(&self) -> &TemplateSet {
        self.templates.base()
    }

    /// Merges `patch` into the shared base set and returns the merged set.
    pub fn set_base_templates(&mut self, patch: TemplateSet) -> TemplateSet {
        let base = self.templates.base_mut();
        base.merge(patch);
        base.clone()
    }

    /// Writes the export of `value`, followed by a newline, to the inline
    /// output.
    pub fn dump<T: Describe + ?Sized>(&mut self, value: &T) {
        let mut text = export(value).into_string();
        text.push('\n');
        self.write_output(&text);
    }

    /// Writes the export of `value` to the log sink, prefixed with the
    /// caller's location.
    #[track_caller]
    pub fn log_value<T: Describe + ?Sized>(&self, value: &T, priority: Priority) {
        let location = Location::caller();
        let message = format!(
            "[{}, {}]\n{}",
            self.aliases.trim(location.file()),
            location.line(),
            export(value)
        );
        self.sink.write(priority, &message);
    }
}

/// Builds a [`Reporter`].
///
/// ```
/// use faultline::{
///     Reporter, ReporterConfig,
///     path::PathAliases,
///     sink::MemorySink,
///     stack::CallStack,
/// };
///
/// let stack = CallStack::new();
/// let reporter = Reporter::builder()
///     .config(ReporterConfig {
///         log: true,
///         ..ReporterConfig::default()
///     })
///     .log_sink(MemorySink::new())
///     .stack_source(stack.clone())
///     .path_aliases(PathAliases::new().with("/srv/app/", "APP/"))
///     .build();
/// assert!(reporter.config().log);
/// ```
pub struct ReporterBuilder {
    config: ReporterConfig,
    templates: Templates,
    sink: Option<Arc<dyn LogSink>>,
    output: Option<Output>,
    stack: Option<Box<dyn StackSource>>,
    aliases: PathAliases,
    on_fatal: FatalHandler,
}

impl fmt::Debug for ReporterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterBuilder")
            .field("config", &self.config)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl Default for ReporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReporterBuilder {
    /// A builder with every setting at its default.
    pub fn new() -> Self {
        Self {
            config: ReporterConfig::default(),
            templates: Templates::default(),
            sink: None,
            output: None,
            stack: None,
            aliases: PathAliases::new(),
            on_fatal: exit_on_fatal,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the templates.
    #[must_use]
    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    /// Sets the log sink. Defaults to [`TracingSink`].
    #[must_use]
    pub fn log_sink<S: LogSink>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink).unsize(unsize::Coercion!(to dyn LogSink)));
        self
    }

    /// Sets the inline output stream. Defaults to standard output.
    #[must_use]
    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Sets where traces come from. Defaults to an empty [`CallStack`].
    #[must_use]
    pub fn stack_source<S: StackSource>(mut self, source: S) -> Self {
        self.stack = Some(Box::new(source));
        self
    }

    /// Sets the path aliases.
    #[must_use]
    pub fn path_aliases(mut self, aliases: PathAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the handler called after a fatal record was emitted.
    #[must_use]
    pub fn on_fatal(mut self, handler: FatalHandler) -> Self {
        self.on_fatal = handler;
        self
    }

    /// Builds the reporter.
    pub fn build(self) -> Reporter {
        Reporter {
            channel: self.config.channel,
            config: self.config,
            templates: self.templates,
            seen: Deduplicator::new(),
            buffered: Vec::new(),
            sink: self
                .sink
                .unwrap_or_else(|| Arc::new(TracingSink).unsize(unsize::Coercion!(to dyn LogSink))),
            output: self.output.unwrap_or_else(|| Box::new(std::io::stdout())),
            stack: self.stack.unwrap_or_else(|| Box::new(CallStack::new())),
            aliases: self.aliases,
            on_fatal: self.on_fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::{
        context,
        output::SharedBuffer,
        severity::ErrorCode,
        sink::MemorySink,
        stack::StackFrame,
    };

    static_assertions::assert_impl_all!(Reporter: Send);
    static_assertions::assert_impl_all!(Disposition: Copy, Send, Sync);

    fn text_reporter() -> (Reporter, SharedBuffer, MemorySink) {
        let output = SharedBuffer::new();
        let sink = MemorySink::new();
        let reporter = Reporter::builder()
            .config(ReporterConfig {
                channel: Channel::Text,
                ..ReporterConfig::default()
            })
            .output(output.clone())
            .log_sink(sink.clone())
            .build();
        (reporter, output, sink)
    }

    #[test]
    fn test_unclassified_codes_are_ignored() {
        let (mut reporter, output, sink) = text_reporter();
        reporter.config_mut().log = true;
        for code in [ErrorCode::STRICT, ErrorCode::DEPRECATED, ErrorCode(3)] {
            let disposition = reporter.handle_error(ErrorEvent::new(code, "ignored"));
            assert_eq!(disposition, Disposition::Ignored);
            assert!(!disposition.is_handled());
        }
        assert!(output.is_empty());
        assert!(sink.entries().is_empty());
        assert!(reporter.seen().is_empty());
    }

    #[test]
    fn test_reporting_disabled() {
        let (mut reporter, output, _) = text_reporter();
        reporter.config_mut().reporting = false;
        assert_eq!(
            reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "x")),
            Disposition::Ignored
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_duplicates_are_silent() {
        let (mut reporter, output, sink) = text_reporter();
        reporter.config_mut().log = true;
        let event = ErrorEvent::new(ErrorCode::NOTICE, "Undefined variable: x").at("/a.rs", 3);

        assert_eq!(
            reporter.handle_error(event.clone()),
            Disposition::Reported(Severity::Notice)
        );
        let first = output.take();
        assert!(first.starts_with("Notice: 8 :: Undefined variable: x on line 3 of /a.rs\n"));
        assert_eq!(sink.take().len(), 1);

        assert_eq!(reporter.handle_error(event), Disposition::Duplicate);
        assert!(Disposition::Duplicate.is_handled());
        assert!(output.is_empty());
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_logging_mirrors_reports() {
        let (mut reporter, _, sink) = text_reporter();
        reporter.config_mut().log = true;
        reporter.handle_error(ErrorEvent::new(ErrorCode::USER_WARNING, "slow query"));
        assert_eq!(
            sink.entries(),
            [crate::sink::LogEntry {
                priority: Priority::Warning,
                message: "Warning (512): slow query in [[internal], line ??]".to_string(),
            }]
        );
    }

    #[test]
    fn test_log_channel_writes_to_sink_only() {
        let (mut reporter, output, sink) = text_reporter();
        reporter.set_channel(Channel::Log);
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "w").at("/a.rs", 1));
        assert!(output.is_empty());
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Warning (2): w in [/a.rs, line 1]");
    }

    #[test]
    fn test_buffered_channel() {
        let (mut reporter, output, _) = text_reporter();
        assert_eq!(reporter.set_channel(Channel::Buffered), Channel::Text);
        reporter.handle_error(
            ErrorEvent::new(ErrorCode::WARNING, "a").with_context(context! { "x" => 5 }),
        );
        reporter.handle_error(ErrorEvent::new(ErrorCode::NOTICE, "b"));
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "a").with_var("x", 6));
        assert!(output.is_empty());

        assert_eq!(reporter.set_channel(Channel::Text), Channel::Buffered);
        assert_eq!(reporter.buffered().len(), 2);
        let drained = reporter.drain_buffered();
        assert_eq!(drained[0].record.description, "a");
        assert_eq!(drained[0].context, ["$x = 5"]);
        assert_eq!(drained[1].record.severity, Severity::Notice);
        assert!(reporter.drain_buffered().is_empty());
        assert!(output.is_empty());
    }

    #[test]
    fn test_help_codes() {
        let (mut reporter, output, _) = text_reporter();
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "no help path [42]"));
        assert!(output.take().contains(":: no help path [42] on line"));

        reporter.config_mut().help_path = Some("https://help.example/".to_string());
        reporter.set_channel(Channel::Js);
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "Missing table [42]"));
        let rendered = output.take();
        assert!(rendered.contains("</a>: Missing table [<b>[internal]</b>"));
        assert!(
            rendered.contains("<a href=\"https://help.example/42\" target=\"_blank\">Help</a>")
        );
    }

    #[test]
    fn test_help_codes_of_any_width() {
        let (mut reporter, output, _) = text_reporter();
        reporter.config_mut().help_path = Some("https://help.example/".to_string());
        reporter.set_channel(Channel::Js);
        reporter.handle_error(ErrorEvent::new(
            ErrorCode::WARNING,
            "Missing table [123456789012345678901234]",
        ));
        let rendered = output.take();
        assert!(rendered.contains("</a>: Missing table [<b>[internal]</b>"));
        assert!(rendered.contains("https://help.example/123456789012345678901234"));
    }

    #[test]
    fn test_empty_help_path_keeps_codes() {
        let (mut reporter, output, _) = text_reporter();
        reporter.config_mut().help_path = Some(String::new());
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "Other [42]"));
        assert!(output.take().contains(":: Other [42] on line"));
    }

    #[test]
    fn test_js_ids_count_reports() {
        let (mut reporter, output, _) = text_reporter();
        reporter.set_channel(Channel::Js);
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "one"));
        assert!(output.take().contains("id=\"faultline-err-1-trace\""));
        reporter.handle_error(ErrorEvent::new(ErrorCode::WARNING, "two"));
        assert!(output.take().contains("id=\"faultline-err-2-trace\""));
    }

    #[test]
    fn test_trace_from_call_stack() {
        let stack = CallStack::new();
        let mut reporter = Reporter::builder()
            .stack_source(stack.clone())
            .output(SharedBuffer::new())
            .path_aliases(PathAliases::new().with("/app/", "APP/"))
            .build();
        let _main = stack.enter(StackFrame::default().at("/app/main.rs", 1));
        let _run = stack.enter(StackFrame::method("Jobs", "run").at("/app/jobs.rs", 9));
        let _raise = stack.enter(StackFrame::function("raise").at("/app/errors.rs", 2));

        assert_eq!(
            reporter.trace_text(&TraceOptions::default()),
            "Jobs::run() - APP/jobs.rs, line 9\n[main] - APP/main.rs, line 1"
        );
        assert_eq!(
            reporter.trace(&TraceOptions::with_format(TraceFormat::Points)),
            Trace::Points(vec![
                Point {
                    file: "/app/jobs.rs".to_string(),
                    line: Some(9)
                },
                Point {
                    file: "/app/main.rs".to_string(),
                    line: Some(1)
                },
            ])
        );

        reporter.set_templates(Channel::Js, TemplateSet::new().trace_line("{:reference}"));
        let options = TraceOptions::with_format(TraceFormat::TextFor(Channel::Text));
        assert_eq!(
            reporter.trace_text(&options),
            "Jobs::run() - APP/jobs.rs, line 9\n[main] - APP/main.rs, line 1"
        );
        assert_eq!(
            reporter.trace_text(&TraceOptions::default()),
            "Jobs::run()\n[main]"
        );
    }

    #[test]
    fn test_base_templates_apply_to_every_channel() {
        let stack = CallStack::new();
        let output = SharedBuffer::new();
        let mut reporter = Reporter::builder()
            .config(ReporterConfig {
                channel: Channel::Text,
                ..ReporterConfig::default()
            })
            .stack_source(stack.clone())
            .output(output.clone())
            .build();
        let _run = stack.enter(StackFrame::method("Jobs", "run").at("/app/jobs.rs", 9));

        let merged = reporter.set_base_templates(
            TemplateSet::new()
                .trace_line("at {:reference}")
                .context("Vars:\n{:context}\n"),
        );
        assert_eq!(merged.trace_line.as_deref(), Some("at {:reference}"));
        assert_eq!(reporter.base_templates(), &merged);

        // Text has its own context template, so only the trace line changes.
        reporter.handle_error(
            ErrorEvent::new(ErrorCode::WARNING, "a").with_context(context! { "x" => 5 }),
        );
        assert_eq!(
            output.take(),
            "Warning: 2 :: a on line ?? of [internal]\n\
             Context:\n$x = 5\n\
             Trace:\nat Jobs::run()\n"
        );

        // The Log channel keeps its own trace line.
        let options = TraceOptions::with_format(TraceFormat::TextFor(Channel::Log));
        assert_eq!(reporter.trace_text(&options), "Jobs::run() - /app/jobs.rs, line 9");
    }

    #[test]
    fn test_dump_and_log_value() {
        let output = SharedBuffer::new();
        let sink = MemorySink::new();
        let mut reporter = Reporter::builder()
            .output(output.clone())
            .log_sink(sink.clone())
            .build();
        reporter.dump("<b>");
        assert_eq!(output.contents(), "\"&lt;b&gt;\"\n");

        reporter.log_value(&true, Priority::Debug);
        let entries = sink.entries();
        assert_eq!(entries[0].priority, Priority::Debug);
        assert!(entries[0].message.starts_with(&format!("[{}, ", file!())));
        assert!(entries[0].message.ends_with("]\ntrue"));
    }

    #[test]
    fn test_fatal_handler_runs_after_emission() {
        fn panic_on_fatal(record: &ErrorRecord) -> ! {
            panic!("fatal: {}", record.description)
        }

        let output = SharedBuffer::new();
        let mut reporter = Reporter::builder()
            .config(ReporterConfig {
                channel: Channel::Text,
                ..ReporterConfig::default()
            })
            .output(output.clone())
            .on_fatal(panic_on_fatal)
            .build();

        let result = catch_unwind(AssertUnwindSafe(|| {
            reporter.handle_error(ErrorEvent::new(ErrorCode::USER_ERROR, "boom"))
        }));
        assert!(result.is_err());
        assert!(output.contents().starts_with("Fatal Error: 256 :: boom on line ??"));
    }
}
