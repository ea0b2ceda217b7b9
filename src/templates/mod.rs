//! Output channels and the templates used to render reports.
//!
//! Every renderable [`Channel`] has a [`TemplateSet`]: a handful of optional
//! templates with `{:key}` placeholders. When a report is rendered the
//! channel's set is layered over the shared `base` set, so a channel only
//! needs to define what differs.
//!
//! The placeholders available to the `error` template are `id`, `error`,
//! `code`, `description`, `file`, `path`, `line`, `helpPath`, `helpID`,
//! `context`, `links` and `info`. Section templates (`code`, `context`,
//! `trace`) additionally see their own section text under the same key, and
//! `trace_line` sees `reference`, `class`, `function`, `file`, `path` and
//! `line`.
//!
//! ```
//! use faultline::templates::{Channel, TemplateSet, Templates};
//!
//! let mut templates = Templates::default();
//! templates.merge(
//!     Channel::Text,
//!     TemplateSet::new().error("{:error} at {:path}:{:line}\n"),
//! );
//! let text = templates.get(Channel::Text).unwrap();
//! assert_eq!(text.error.as_deref(), Some("{:error} at {:path}:{:line}\n"));
//! assert_eq!(text.trace.as_deref(), Some("Trace:\n{:trace}\n"));
//! ```

mod insert;

use core::{fmt, str::FromStr};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

pub use self::insert::{Vars, insert};

/// Named link templates, rendered in insertion order and joined by ` | `.
pub type Links = IndexMap<String, String, FxBuildHasher>;

/// Template used for trace lines when no channel overrides it.
pub const DEFAULT_TRACE_LINE: &str = "{:reference} - {:path}, line {:line}";

/// Where reports go and how they look.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    /// HTML with collapsible sections driven by inline JavaScript.
    #[default]
    Js,
    /// Static HTML.
    Html,
    /// Plain text.
    Text,
    /// No inline output; the report is written to the log sink.
    Log,
    /// No output; reports are kept until
    /// [`Reporter::drain_buffered`](crate::Reporter::drain_buffered).
    Buffered,
}

impl Channel {
    /// All channels.
    pub const ALL: [Channel; 5] = [
        Channel::Js,
        Channel::Html,
        Channel::Text,
        Channel::Log,
        Channel::Buffered,
    ];

    /// The channel's short name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Js => "js",
            Channel::Html => "html",
            Channel::Text => "txt",
            Channel::Log => "log",
            Channel::Buffered => "buffered",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Clone, PartialEq, Eq)]
pub struct UnknownChannelError(pub String);

impl fmt::Debug for UnknownChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnknownChannelError").field(&self.0).finish()
    }
}

impl fmt::Display for UnknownChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown output channel {:?}", self.0)
    }
}

impl core::error::Error for UnknownChannelError {}

impl FromStr for Channel {
    type Err = UnknownChannelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("text").then_some(Channel::Text))
            .ok_or_else(|| UnknownChannelError(name.to_string()))
    }
}

/// The templates of one channel. Unset templates fall back to the base set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateSet {
    /// The report itself.
    pub error: Option<String>,
    /// Wraps the concatenated sections, available to `error` as `{:info}`.
    pub info: Option<String>,
    /// The trace section.
    pub trace: Option<String>,
    /// The context section.
    pub context: Option<String>,
    /// The source excerpt section.
    pub code: Option<String>,
    /// One line of a trace.
    pub trace_line: Option<String>,
    /// Named links.
    pub links: Links,
}

macro_rules! template_setters {
    ($($field:ident => $doc:literal),* $(,)?) => {
        $(
            #[doc = $doc]
            #[must_use]
            pub fn $field(mut self, template: impl Into<String>) -> Self {
                self.$field = Some(template.into());
                self
            }
        )*
    };
}

impl TemplateSet {
    /// Creates a set with no templates.
    pub fn new() -> Self {
        Self::default()
    }

    template_setters! {
        error => "Sets the `error` template.",
        info => "Sets the `info` template.",
        trace => "Sets the `trace` template.",
        context => "Sets the `context` template.",
        code => "Sets the `code` template.",
        trace_line => "Sets the `trace_line` template.",
    }

    /// Adds or replaces a named link.
    #[must_use]
    pub fn link(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.links.insert(name.into(), template.into());
        self
    }

    /// Overwrites every template set in `patch`; links are merged by name.
    pub fn merge(&mut self, patch: TemplateSet) {
        let TemplateSet {
            error,
            info,
            trace,
            context,
            code,
            trace_line,
            links,
        } = patch;
        for (slot, value) in [
            (&mut self.error, error),
            (&mut self.info, info),
            (&mut self.trace, trace),
            (&mut self.context, context),
            (&mut self.code, code),
            (&mut self.trace_line, trace_line),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        self.links.extend(links);
    }

    /// `self` layered over `base`.
    #[must_use]
    pub fn over(&self, base: &TemplateSet) -> TemplateSet {
        let mut merged = base.clone();
        merged.merge(self.clone());
        merged
    }
}

/// The template sets of every renderable channel plus the shared base set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Templates {
    base: TemplateSet,
    js: TemplateSet,
    html: TemplateSet,
    text: TemplateSet,
    log: TemplateSet,
}

impl Templates {
    /// Templates with nothing set at all.
    pub fn empty() -> Self {
        Self {
            base: TemplateSet::new(),
            js: TemplateSet::new(),
            html: TemplateSet::new(),
            text: TemplateSet::new(),
            log: TemplateSet::new(),
        }
    }

    /// The shared base set.
    pub fn base(&self) -> &TemplateSet {
        &self.base
    }

    /// Mutable access to the shared base set.
    pub fn base_mut(&mut self) -> &mut TemplateSet {
        &mut self.base
    }

    /// The set of `channel`; `None` for [`Channel::Buffered`].
    pub fn get(&self, channel: Channel) -> Option<&TemplateSet> {
        match channel {
            Channel::Js => Some(&self.js),
            Channel::Html => Some(&self.html),
            Channel::Text => Some(&self.text),
            Channel::Log => Some(&self.log),
            Channel::Buffered => None,
        }
    }

    /// Mutable access to the set of `channel`.
    pub fn get_mut(&mut self, channel: Channel) -> Option<&mut TemplateSet> {
        match channel {
            Channel::Js => Some(&mut self.js),
            Channel::Html => Some(&mut self.html),
            Channel::Text => Some(&mut self.text),
            Channel::Log => Some(&mut self.log),
            Channel::Buffered => None,
        }
    }

    /// Merges `patch` into the set of `channel` and returns the result.
    /// Merging into [`Channel::Buffered`] does nothing and returns an empty
    /// set.
    pub fn merge(&mut self, channel: Channel, patch: TemplateSet) -> TemplateSet {
        match self.get_mut(channel) {
            Some(set) => {
                set.merge(patch);
                set.clone()
            }
            None => TemplateSet::new(),
        }
    }

    /// The set of `channel` layered over the base set.
    pub fn resolve(&self, channel: Channel) -> TemplateSet {
        match self.get(channel) {
            Some(set) => set.over(&self.base),
            None => self.base.clone(),
        }
    }

    /// The trace-line template of `channel`, falling back to the base set.
    pub fn trace_line(&self, channel: Channel) -> &str {
        self.get(channel)
            .and_then(|set| set.trace_line.as_deref())
            .or(self.base.trace_line.as_deref())
            .unwrap_or(DEFAULT_TRACE_LINE)
    }
}

fn toggle(target: &str) -> String {
    format!(
        "document.getElementById('{{:id}}-{target}').style.display = \
         (document.getElementById('{{:id}}-{target}').style.display == 'none' ? '' : 'none');"
    )
}

impl Default for Templates {
    fn default() -> Self {
        let js = TemplateSet::new()
            .error(format!(
                "<a href=\"javascript:void(0);\" onclick=\"{}\"><b>{{:error}}</b> ({{:code}})</a>: \
                 {{:description}} [<b>{{:path}}</b>, line <b>{{:line}}</b>]\
                 <div id=\"{{:id}}-trace\" class=\"faultline-stack-trace\" style=\"display: none;\">\
                 {{:links}}{{:info}}</div>",
                toggle("trace")
            ))
            .trace("<pre class=\"stack-trace\">{:trace}</pre>")
            .code(
                "<div id=\"{:id}-code\" class=\"faultline-code-dump\" style=\"display: none;\">\
                 <pre>{:code}</pre></div>",
            )
            .context(
                "<pre id=\"{:id}-context\" class=\"faultline-context\" style=\"display: none;\">\
                 {:context}</pre>",
            )
            .link(
                "code",
                format!(
                    "<a href=\"javascript:void(0);\" onclick=\"{}\">Code</a>",
                    toggle("code")
                ),
            )
            .link(
                "context",
                format!(
                    "<a href=\"javascript:void(0);\" onclick=\"{}\">Context</a>",
                    toggle("context")
                ),
            )
            .link(
                "help",
                "<a href=\"{:helpPath}{:helpID}\" target=\"_blank\">Help</a>",
            );

        let html = TemplateSet::new()
            .error(
                "<pre class=\"faultline-debug\"><b>{:error}</b> ({:code}) : {:description} \
                 [<b>{:path}</b>, line <b>{:line}]</b></pre>",
            )
            .trace("<pre class=\"faultline-debug trace\"><b>Trace</b> <p>{:trace}</p></pre>")
            .context(
                "<pre class=\"faultline-debug context\"><b>Context</b> <p>{:context}</p></pre>",
            );

        let text = TemplateSet::new()
            .error("{:error}: {:code} :: {:description} on line {:line} of {:path}\n{:info}")
            .context("Context:\n{:context}\n")
            .trace("Trace:\n{:trace}\n");

        let log = TemplateSet::new()
            .error("{:error} ({:code}): {:description} in [{:file}, line {:line}]")
            .trace_line(DEFAULT_TRACE_LINE);

        Self {
            base: TemplateSet::new().trace_line(DEFAULT_TRACE_LINE),
            js,
            html,
            text,
            log,
        }
    }
}
