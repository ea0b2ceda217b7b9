/// Builds a [`Context`](crate::export::Context) from `name => value` pairs.
///
/// Values are converted with [`Value::from`](crate::export::Value).
///
/// # Examples
///
/// ```
/// use faultline::{context, export::Value};
///
/// let context = context! {
///     "user_id" => 7,
///     "name" => "ada",
/// };
/// assert_eq!(context["user_id"], Value::Int(7));
/// assert_eq!(context.keys().collect::<Vec<_>>(), ["user_id", "name"]);
/// assert!(context!().is_empty());
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::export::Context::default()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut context = $crate::export::Context::default();
        $(
            context.insert(
                $crate::__private::ToString::to_string(&$name),
                $crate::export::Value::from($value),
            );
        )+
        context
    }};
}

/// Raises a [`USER_NOTICE`](crate::severity::ErrorCode::USER_NOTICE) through
/// the installed reporter.
///
/// Takes the same arguments as [`format!`]. Returns the
/// [`Disposition`](crate::Disposition).
///
/// # Examples
///
/// ```
/// use faultline::notice;
///
/// let disposition = notice!("cache warmed in {}ms", 12);
/// println!("{disposition:?}");
/// ```
#[macro_export]
macro_rules! notice {
    ($($args:tt)+) => {
        $crate::__private::raise_fmt(
            $crate::severity::ErrorCode::USER_NOTICE,
            $crate::__private::format_args!($($args)+),
        )
    };
}

/// Raises a [`USER_WARNING`](crate::severity::ErrorCode::USER_WARNING)
/// through the installed reporter.
///
/// Takes the same arguments as [`format!`].
#[macro_export]
macro_rules! warning {
    ($($args:tt)+) => {
        $crate::__private::raise_fmt(
            $crate::severity::ErrorCode::USER_WARNING,
            $crate::__private::format_args!($($args)+),
        )
    };
}

/// Raises a [`USER_ERROR`](crate::severity::ErrorCode::USER_ERROR) through
/// the installed reporter.
///
/// If a reporter is installed its fatal handler runs, which by default exits
/// the process.
#[macro_export]
macro_rules! fatal {
    ($($args:tt)+) => {
        $crate::__private::raise_fmt(
            $crate::severity::ErrorCode::USER_ERROR,
            $crate::__private::format_args!($($args)+),
        )
    };
}
