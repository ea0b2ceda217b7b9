//! Rendering of arbitrary values into debug strings.
//!
//! # Overview
//!
//! The exporter turns a value into the text shown in context blocks, trace
//! arguments and [`Reporter::dump`](crate::Reporter::dump) output. Values
//! opt in through the [`Describe`] trait, which tells an [`Exporter`] what
//! kind of value it is looking at: a scalar, a sequence, a mapping, a record
//! or an opaque handle.
//!
//! Composite values are visited lazily and every level of nesting spends one
//! unit of a recursion budget. Once the budget drops below zero the entries of
//! a composite are skipped, so even self-referential structures render in
//! bounded time.
//!
//! ```
//! use faultline::export::{export, export_with};
//!
//! assert_eq!(export(&true).as_str(), "true");
//! assert_eq!(export("<b>").as_str(), "\"&lt;b&gt;\"");
//! assert_eq!(export(&vec![1, 2]).as_str(), "array(\n\t1,\n\t2\n)");
//! assert_eq!(export_with(&vec![vec![1]], 0).as_str(), "array(\n\tarray()\n)");
//! ```
//!
//! # Records
//!
//! Records render as their class name followed by one `Class::$field = value`
//! line per field. Nested composites inside a record are abbreviated to
//! `array` and nested records to `Other object`.

mod describe;
mod value;

use core::fmt;

pub use self::value::{Context, Map, Record, Value};

use crate::util::escape_html;

/// A value that knows how to present itself to an [`Exporter`].
///
/// Implementations call exactly one of the exporter's methods.
///
/// # Examples
///
/// ```
/// use faultline::export::{Describe, Exporter, export};
///
/// struct User {
///     name: String,
///     admin: bool,
/// }
///
/// impl Describe for User {
///     fn describe(&self, exporter: &mut Exporter<'_>) {
///         exporter.record(
///             "User",
///             [
///                 ("name", &self.name as &dyn Describe),
///                 ("admin", &self.admin as &dyn Describe),
///             ],
///         );
///     }
/// }
///
/// let user = User { name: "ada".to_string(), admin: true };
/// assert_eq!(
///     export(&user).as_str(),
///     "User\nUser::$name = \"ada\"\nUser::$admin = true"
/// );
/// ```
pub trait Describe {
    /// Presents `self` to the exporter.
    fn describe(&self, exporter: &mut Exporter<'_>);
}

/// The result of exporting a value.
///
/// Exporting an `Exported` writes its text back unchanged, which makes export
/// idempotent: `export(&export(x)) == export(x)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Exported(String);

impl Exported {
    /// Wraps text that has already been rendered.
    pub fn from_rendered(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The rendered text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes `self`, returning the rendered text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Exported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Exported {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Exported> for String {
    fn from(value: Exported) -> Self {
        value.0
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mode {
    Full,
    // Inside a record field: composites collapse to their type name.
    Shallow,
}

/// Writes the debug representation of a single value.
///
/// An exporter is handed to [`Describe::describe`]; it is never constructed
/// directly by callers. Use [`export`] or [`export_with`] instead.
pub struct Exporter<'a> {
    out: &'a mut String,
    budget: isize,
    mode: Mode,
}

impl<'a> Exporter<'a> {
    fn new(out: &'a mut String, budget: isize, mode: Mode) -> Self {
        Self { out, budget, mode }
    }

    fn child(&mut self, mode: Mode) -> Exporter<'_> {
        Exporter {
            out: &mut *self.out,
            budget: self.budget - 1,
            mode,
        }
    }

    /// The remaining recursion budget. Entries of composites are only
    /// rendered while this is non-negative.
    pub fn budget(&self) -> isize {
        self.budget
    }

    /// Writes `null`.
    pub fn null(&mut self) {
        self.out.push_str("null");
    }

    /// Writes `true` or `false`.
    pub fn bool(&mut self, value: bool) {
        self.out.push_str(if value { "true" } else { "false" });
    }

    /// Writes a signed integer verbatim.
    pub fn int(&mut self, value: i64) {
        self.display(value);
    }

    /// Writes an unsigned integer verbatim.
    pub fn uint(&mut self, value: u64) {
        self.display(value);
    }

    /// Writes a float verbatim.
    pub fn float(&mut self, value: f64) {
        self.display(value);
    }

    /// Writes a quoted, HTML-escaped string. Blank strings become `""`.
    pub fn str(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.out.push_str("\"\"");
            return;
        }
        self.out.push('"');
        self.out.push_str(&escape_html(value));
        self.out.push('"');
    }

    /// Writes the type name of a value that cannot be inspected.
    pub fn opaque(&mut self, type_name: &str) {
        self.out.push_str(type_name);
    }

    /// Writes already-rendered text unchanged.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Writes an ordered sequence as an `array(...)` block.
    pub fn sequence<'v, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'v dyn Describe>,
    {
        if self.mode == Mode::Shallow {
            self.out.push_str("array");
            return;
        }
        self.composite(items.into_iter().map(|item| (None, item)));
    }

    /// Writes a key-value mapping as an `array(...)` block of `key => value`
    /// entries, in iteration order.
    pub fn mapping<'v, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'v dyn Describe, &'v dyn Describe)>,
    {
        if self.mode == Mode::Shallow {
            self.out.push_str("array");
            return;
        }
        self.composite(entries.into_iter().map(|(key, value)| (Some(key), value)));
    }

    fn composite<'v>(
        &mut self,
        entries: impl Iterator<Item = (Option<&'v dyn Describe>, &'v dyn Describe)>,
    ) {
        self.out.push_str("array(");
        let mut wrote_entry = false;
        if self.budget >= 0 {
            for (key, value) in entries {
                if wrote_entry {
                    self.out.push(',');
                }
                self.out.push_str("\n\t");
                if let Some(key) = key {
                    key.describe(&mut self.child(Mode::Full));
                    self.out.push_str(" => ");
                }
                value.describe(&mut self.child(Mode::Full));
                wrote_entry = true;
            }
        }
        if wrote_entry {
            self.out.push('\n');
        }
        self.out.push(')');
    }

    /// Writes a record as its class name followed by one line per field.
    ///
    /// Field values are rendered one level deep only: composites collapse to
    /// `array` and records to `Class object`.
    pub fn record<'v, I>(&mut self, class: &str, fields: I)
    where
        I: IntoIterator<Item = (&'v str, &'v dyn Describe)>,
    {
        if self.mode == Mode::Shallow {
            self.out.push_str(class);
            self.out.push_str(" object");
            return;
        }
        self.out.push_str(class);
        self.out.push('\n');
        for (index, (name, value)) in fields.into_iter().enumerate() {
            if index != 0 {
                self.out.push('\n');
            }
            self.out.push_str(class);
            self.out.push_str("::$");
            self.out.push_str(name);
            self.out.push_str(" = ");
            let mut field = Exporter::new(&mut *self.out, 0, Mode::Shallow);
            value.describe(&mut field);
        }
    }

    fn display(&mut self, value: impl fmt::Display) {
        use fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.out, "{value}");
    }
}

/// Exports a value with a recursion budget of zero: the entries of a
/// top-level composite are shown, nested composites render as `array()`.
pub fn export<T: Describe + ?Sized>(value: &T) -> Exported {
    export_with(value, 0)
}

/// Exports a value with an explicit recursion budget.
pub fn export_with<T: Describe + ?Sized>(value: &T, budget: isize) -> Exported {
    let mut out = String::new();
    value.describe(&mut Exporter::new(&mut out, budget, Mode::Full));
    Exported(out)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(export(&true).as_str(), "true");
        assert_eq!(export(&false).as_str(), "false");
        assert_eq!(export(&42u8).as_str(), "42");
        assert_eq!(export(&-7i64).as_str(), "-7");
        assert_eq!(export(&1.5f64).as_str(), "1.5");
        assert_eq!(export(&()).as_str(), "null");
        assert_eq!(export(&None::<i32>).as_str(), "null");
        assert_eq!(export(&Some(3)).as_str(), "3");
    }

    #[test]
    fn test_strings() {
        assert_eq!(export("").as_str(), "\"\"");
        assert_eq!(export("   \t").as_str(), "\"\"");
        assert_eq!(export("foo").as_str(), "\"foo\"");
        assert_eq!(
            export("a \"quoted\" <tag>").as_str(),
            "\"a &quot;quoted&quot; &lt;tag&gt;\""
        );
    }

    #[test]
    fn test_export_is_idempotent_on_scalars() {
        let samples = [export("foo"), export(&12), export(&2.25), export(&false)];
        for exported in samples {
            assert_eq!(export(&exported), exported);
        }
    }

    #[test]
    fn test_sequences_respect_budget() {
        assert_eq!(export(&Vec::<i32>::new()).as_str(), "array()");
        assert_eq!(export(&vec![1, 2]).as_str(), "array(\n\t1,\n\t2\n)");
        assert_eq!(
            export_with(&vec![vec![1, 2]], 1).as_str(),
            "array(\n\tarray(\n\t1,\n\t2\n)\n)"
        );
        assert_eq!(export_with(&vec![1], -1).as_str(), "array()");
    }

    #[test]
    fn test_mappings() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        assert_eq!(
            export(&map).as_str(),
            "array(\n\t\"a\" => 1,\n\t\"b\" => 2\n)"
        );
    }

    struct Inner;

    impl Describe for Inner {
        fn describe(&self, exporter: &mut Exporter<'_>) {
            exporter.record("Inner", core::iter::empty());
        }
    }

    struct Outer {
        id: u32,
        tags: Vec<&'static str>,
        inner: Inner,
        missing: Option<u8>,
    }

    impl Describe for Outer {
        fn describe(&self, exporter: &mut Exporter<'_>) {
            exporter.record(
                "Outer",
                [
                    ("id", &self.id as &dyn Describe),
                    ("tags", &self.tags as &dyn Describe),
                    ("inner", &self.inner as &dyn Describe),
                    ("missing", &self.missing as &dyn Describe),
                ],
            );
        }
    }

    #[test]
    fn test_records_are_one_level_deep() {
        let outer = Outer {
            id: 9,
            tags: vec!["x"],
            inner: Inner,
            missing: None,
        };
        assert_eq!(
            export(&outer).as_str(),
            "Outer\nOuter::$id = 9\nOuter::$tags = array\nOuter::$inner = Inner object\nOuter::$missing = null"
        );
        assert_eq!(export(&Inner).as_str(), "Inner\n");
    }

    struct Node {
        children: RefCell<Vec<Rc<Node>>>,
    }

    impl Describe for Node {
        fn describe(&self, exporter: &mut Exporter<'_>) {
            let children = self.children.borrow();
            exporter.sequence(children.iter().map(|child| &**child as &dyn Describe));
        }
    }

    #[test]
    fn test_self_referential_structure_terminates() {
        let node = Rc::new(Node {
            children: RefCell::new(Vec::new()),
        });
        node.children.borrow_mut().push(node.clone());

        let rendered = export_with(&*node, 2);
        assert_eq!(
            rendered.as_str(),
            "array(\n\tarray(\n\tarray(\n\tarray()\n)\n)\n)"
        );

        // Break the cycle so the test does not leak.
        node.children.borrow_mut().clear();
    }
}
