//! Commonly used items for convenient importing.
//!
//! ```rust
//! use faultline::prelude::*;
//!
//! let mut reporter = Reporter::builder()
//!     .output(std::io::sink())
//!     .build();
//! reporter.set_channel(Channel::Text);
//! let event = ErrorEvent::new(ErrorCode::NOTICE, "Undefined variable: id")
//!     .with_context(context! { "id" => Value::Null });
//! assert_eq!(reporter.handle_error(event), Disposition::Reported(Severity::Notice));
//! ```

pub use crate::{
    Disposition, ErrorEvent, Reporter, context,
    export::{Describe, Exporter, Value},
    fatal, notice,
    severity::{ErrorCode, Severity},
    templates::Channel,
    warning,
};
