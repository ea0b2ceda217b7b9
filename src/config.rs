//! Reporter configuration.

use std::sync::OnceLock;

use crate::templates::Channel;

/// Behavior switches of a [`Reporter`](crate::Reporter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReporterConfig {
    /// When `false`, every event is ignored.
    pub reporting: bool,
    /// Mirror every report to the log sink.
    pub log: bool,
    /// The initial output channel.
    pub channel: Channel,
    /// Base URL of help links. Help codes are only parsed when this is set.
    pub help_path: Option<String>,
    /// Maximum number of frames in the trace of a report.
    pub trace_depth: usize,
    /// Number of innermost frames skipped in the trace of a report.
    pub trace_start: usize,
    /// Function names elided from every trace.
    pub wrappers: Vec<String>,
    /// Lines shown on each side of the error line in source excerpts.
    pub excerpt_context: usize,
    /// Recursion budget used to export context variables.
    pub context_budget: isize,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            reporting: true,
            log: false,
            channel: Channel::Js,
            help_path: None,
            trace_depth: 20,
            trace_start: 0,
            wrappers: vec!["trigger_error".to_string(), "raise".to_string()],
            excerpt_context: 1,
            context_budget: 1,
        }
    }
}

#[derive(Debug)]
struct FaultlineEnvOptions {
    channel: Option<Channel>,
    log: Option<bool>,
    help_path: Option<String>,
}

impl FaultlineEnvOptions {
    fn get() -> &'static Self {
        static FAULTLINE_ENV: OnceLock<FaultlineEnvOptions> = OnceLock::new();

        FAULTLINE_ENV.get_or_init(|| {
            let channel = std::env::var("FAULTLINE_CHANNEL").ok().and_then(|var| {
                var.parse::<Channel>()
                    .inspect_err(|error| tracing::warn!(%error, "ignoring FAULTLINE_CHANNEL"))
                    .ok()
            });
            let log = std::env::var_os("FAULTLINE_LOG").map(|var| {
                let var = var.to_string_lossy();
                !(var.is_empty()
                    || var == "0"
                    || var.eq_ignore_ascii_case("false")
                    || var.eq_ignore_ascii_case("off"))
            });
            let help_path = std::env::var("FAULTLINE_HELP_PATH")
                .ok()
                .filter(|var| !var.is_empty());
            FaultlineEnvOptions {
                channel,
                log,
                help_path,
            }
        })
    }
}

impl ReporterConfig {
    /// The default configuration, adjusted by environment variables.
    ///
    /// The environment is read once per process.
    ///
    /// # Environment Variables
    ///
    /// - `FAULTLINE_CHANNEL` - initial channel: `js`, `html`, `txt`, `log` or
    ///   `buffered`
    /// - `FAULTLINE_LOG` - mirror reports to the log sink unless empty, `0`,
    ///   `false` or `off`
    /// - `FAULTLINE_HELP_PATH` - base URL of help links
    pub fn from_env() -> Self {
        let env = FaultlineEnvOptions::get();
        let defaults = Self::default();
        Self {
            channel: env.channel.unwrap_or(defaults.channel),
            log: env.log.unwrap_or(defaults.log),
            help_path: env.help_path.clone().or(defaults.help_path),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReporterConfig::default();
        assert!(config.reporting);
        assert!(!config.log);
        assert_eq!(config.channel, Channel::Js);
        assert_eq!(config.trace_depth, 20);
        assert_eq!(config.wrappers, ["trigger_error", "raise"]);
    }

    #[test]
    fn test_from_env_keeps_unrelated_defaults() {
        let config = ReporterConfig::from_env();
        let defaults = ReporterConfig::default();
        assert_eq!(config.trace_depth, defaults.trace_depth);
        assert_eq!(config.wrappers, defaults.wrappers);
        assert!(config.reporting);
    }
}
