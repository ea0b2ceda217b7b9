//! Shortening of file paths for display.
//!
//! Absolute paths make reports long and leak deployment details. A
//! [`PathAliases`] table replaces well-known prefixes, such as the
//! application root, with a short alias.
//!
//! ```
//! use faultline::path::PathAliases;
//!
//! let aliases = PathAliases::new()
//!     .with("/srv/app/", "APP/")
//!     .with("/srv/vendor/framework/", "CORE/");
//! assert_eq!(aliases.trim("/srv/app/src/users.rs"), "APP/src/users.rs");
//! assert_eq!(aliases.trim("/tmp/other.rs"), "/tmp/other.rs");
//! ```

use std::borrow::Cow;

/// An ordered list of `(prefix, alias)` pairs. The first matching prefix
/// wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathAliases {
    aliases: Vec<(String, String)>,
}

impl PathAliases {
    /// Creates an empty table; paths are returned unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an alias, returning the table.
    #[must_use]
    pub fn with(mut self, prefix: impl Into<String>, alias: impl Into<String>) -> Self {
        self.push(prefix, alias);
        self
    }

    /// Adds an alias after the existing ones.
    pub fn push(&mut self, prefix: impl Into<String>, alias: impl Into<String>) {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.aliases.push((prefix, alias.into()));
        }
    }

    /// Whether no aliases are configured.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Replaces the first matching prefix of `path` with its alias.
    pub fn trim<'a>(&self, path: &'a str) -> Cow<'a, str> {
        for (prefix, alias) in &self.aliases {
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                return Cow::Owned(format!("{alias}{rest}"));
            }
        }
        Cow::Borrowed(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let aliases = PathAliases::new()
            .with("/srv/app/vendor/", "VENDOR/")
            .with("/srv/app/", "APP/")
            .with("/srv/", "ROOT/");
        assert_eq!(aliases.trim("/srv/app/vendor/x.rs"), "VENDOR/x.rs");
        assert_eq!(aliases.trim("/srv/app/y.rs"), "APP/y.rs");
        assert_eq!(aliases.trim("/srv/z.rs"), "ROOT/z.rs");
    }

    #[test]
    fn test_unmatched_and_empty() {
        let mut aliases = PathAliases::new();
        assert!(matches!(aliases.trim("/a/b"), Cow::Borrowed("/a/b")));
        aliases.push("", "IGNORED/");
        assert!(aliases.is_empty());
        assert_eq!(aliases.trim("[internal]"), "[internal]");
    }
}
