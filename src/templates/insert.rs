use std::borrow::Cow;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Values substituted for `{:key}` placeholders by [`insert`].
#[derive(Clone, Debug, Default)]
pub struct Vars<'a> {
    values: IndexMap<&'a str, Cow<'a, str>, FxBuildHasher>,
}

impl<'a> Vars<'a> {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `key`, replacing any previous value.
    pub fn set(&mut self, key: &'a str, value: impl Into<Cow<'a, str>>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    /// The value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|value| &**value)
    }
}

/// Replaces every `{:key}` in `template` with the value of `key`.
///
/// Placeholders without a value are left untouched.
///
/// ```
/// use faultline::templates::{Vars, insert};
///
/// let mut vars = Vars::new();
/// vars.set("name", "world");
/// assert_eq!(insert("hello {:name} {:missing}", &vars), "hello world {:missing}");
/// ```
pub fn insert(template: &str, vars: &Vars<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{:") {
        let (before, tail) = rest.split_at(open);
        out.push_str(before);
        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };
        let key = &tail[2..close];
        match vars.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let mut vars = Vars::new();
        vars.set("error", "Warning").set("code", "2").set("line", "10");
        assert_eq!(
            insert("{:error}: {:code} on line {:line}", &vars),
            "Warning: 2 on line 10"
        );
        assert_eq!(insert("{:code}{:code}", &vars), "22");
        assert_eq!(insert("", &vars), "");
        assert_eq!(insert("no placeholders", &vars), "no placeholders");
    }

    #[test]
    fn test_unknown_and_malformed_placeholders_are_kept() {
        let mut vars = Vars::new();
        vars.set("a", "1");
        assert_eq!(insert("{:b} {:a}", &vars), "{:b} 1");
        assert_eq!(insert("{:a} {:unterminated", &vars), "1 {:unterminated");
        assert_eq!(insert("{a} {:a}", &vars), "{a} 1");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut vars = Vars::new();
        vars.set("a", "{:b}").set("b", "x");
        assert_eq!(insert("{:a}", &vars), "{:b}");
    }

    #[test]
    fn test_later_set_overrides() {
        let mut vars = Vars::new();
        vars.set("a", "1").set("a", String::from("2"));
        assert_eq!(vars.get("a"), Some("2"));
    }
}
