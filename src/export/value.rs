use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::{Describe, Exported, Exporter};

/// Ordered string-keyed mapping used by [`Value::Map`] and record fields.
pub type Map = IndexMap<String, Value, FxBuildHasher>;

/// The variables in scope when an error was raised, in declaration order.
///
/// Build one with the [`context!`](crate::context) macro.
pub type Context = IndexMap<String, Value, FxBuildHasher>;

/// An owned dynamic value.
///
/// Hosts that hand values to the reporter (context variables, call
/// arguments) convert them into `Value`s. Anything implementing
/// [`Describe`] can also be captured up front with
/// [`Value::Exported`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list.
    List(Vec<Value>),
    /// An ordered string-keyed mapping.
    Map(Map),
    /// An object with a class name and named fields.
    Record(Record),
    /// A handle that cannot be inspected, shown by its type name.
    Opaque(String),
    /// Text that was already exported.
    Exported(Exported),
}

impl Value {
    /// Builds a [`Value::Map`] from key-value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a [`Value::Opaque`] naming the type of `T`.
    pub fn opaque_of<T: ?Sized>() -> Self {
        Value::Opaque(core::any::type_name::<T>().to_string())
    }

    /// Captures any describable value by exporting it with `budget`.
    pub fn capture<T: Describe + ?Sized>(value: &T, budget: isize) -> Self {
        Value::Exported(super::export_with(value, budget))
    }
}

/// An object value: a class name plus ordered fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The class or type name.
    pub class: String,
    /// The fields, in declaration order.
    pub fields: Map,
}

impl Record {
    /// Creates a record without fields.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Map::default(),
        }
    }

    /// Adds a field, returning the record.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Describe for Value {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        match self {
            Value::Null => exporter.null(),
            Value::Bool(value) => exporter.bool(*value),
            Value::Int(value) => exporter.int(*value),
            Value::Float(value) => exporter.float(*value),
            Value::Str(value) => exporter.str(value),
            Value::List(items) => items.describe(exporter),
            Value::Map(entries) => exporter.mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key as &dyn Describe, value as &dyn Describe)),
            ),
            Value::Record(record) => record.describe(exporter),
            Value::Opaque(type_name) => exporter.opaque(type_name),
            Value::Exported(exported) => exported.describe(exporter),
        }
    }
}

impl Describe for Record {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.record(
            &self.class,
            self.fields
                .iter()
                .map(|(name, value)| (name.as_str(), value as &dyn Describe)),
        );
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Exported> for Value {
    fn from(value: Exported) -> Self {
        Value::Exported(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export, export_with};

    #[test]
    fn test_value_kinds() {
        assert_eq!(export(&Value::Null).as_str(), "null");
        assert_eq!(export(&Value::from(5)).as_str(), "5");
        assert_eq!(export(&Value::from("")).as_str(), "\"\"");
        assert_eq!(export(&Value::from(None::<i32>)).as_str(), "null");
        assert_eq!(
            export(&Value::Opaque("stream".to_string())).as_str(),
            "stream"
        );
        assert_eq!(
            export(&Value::opaque_of::<std::fs::File>()).as_str(),
            "std::fs::File"
        );
    }

    #[test]
    fn test_map_value() {
        let value = Value::map([("id", Value::from(1)), ("tags", Value::from(vec!["a"]))]);
        assert_eq!(
            export(&value).as_str(),
            "array(\n\t\"id\" => 1,\n\t\"tags\" => array()\n)"
        );
        assert_eq!(
            export_with(&value, 1).as_str(),
            "array(\n\t\"id\" => 1,\n\t\"tags\" => array(\n\t\"a\"\n)\n)"
        );
    }

    #[test]
    fn test_record_value() {
        let value = Value::from(
            Record::new("Post")
                .field("title", "Hello")
                .field("author", Record::new("User"))
                .field("tags", vec![1, 2]),
        );
        assert_eq!(
            export(&value).as_str(),
            "Post\nPost::$title = \"Hello\"\nPost::$author = User object\nPost::$tags = array"
        );
    }

    #[test]
    fn test_captured_value() {
        let captured = Value::capture(&vec![true], 0);
        assert_eq!(export(&captured).as_str(), "array(\n\ttrue\n)");
    }
}
