use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
    sync::Arc,
};

use indexmap::IndexMap;

use super::{Describe, Exported, Exporter};

impl<T: Describe + ?Sized> Describe for &T {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        (**self).describe(exporter);
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        (**self).describe(exporter);
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        (**self).describe(exporter);
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        (**self).describe(exporter);
    }
}

impl Describe for Exported {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.raw(self.as_str());
    }
}

impl Describe for () {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.null();
    }
}

impl Describe for bool {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.bool(*self);
    }
}

macro_rules! describe_signed {
    ($($ty:ty),*) => {
        $(
            impl Describe for $ty {
                fn describe(&self, exporter: &mut Exporter<'_>) {
                    exporter.int(i64::from(*self));
                }
            }
        )*
    };
}

macro_rules! describe_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Describe for $ty {
                fn describe(&self, exporter: &mut Exporter<'_>) {
                    exporter.uint(u64::from(*self));
                }
            }
        )*
    };
}

describe_signed!(i8, i16, i32, i64);
describe_unsigned!(u8, u16, u32, u64);

impl Describe for isize {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.int(*self as i64);
    }
}

impl Describe for usize {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.uint(*self as u64);
    }
}

impl Describe for f32 {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.float(f64::from(*self));
    }
}

impl Describe for f64 {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.float(*self);
    }
}

impl Describe for str {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.str(self);
    }
}

impl Describe for String {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.str(self);
    }
}

impl Describe for char {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        let mut buf = [0u8; 4];
        exporter.str(self.encode_utf8(&mut buf));
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        match self {
            Some(value) => value.describe(exporter),
            None => exporter.null(),
        }
    }
}

impl<T: Describe> Describe for [T] {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.sequence(self.iter().map(|item| item as &dyn Describe));
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        self.as_slice().describe(exporter);
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        self.as_slice().describe(exporter);
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.mapping(
            self.iter()
                .map(|(key, value)| (key as &dyn Describe, value as &dyn Describe)),
        );
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        exporter.mapping(
            self.iter()
                .map(|(key, value)| (key as &dyn Describe, value as &dyn Describe)),
        );
    }
}

// Hash maps have no stable iteration order, so entries are sorted by key.
impl<K: Describe + Ord, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe(&self, exporter: &mut Exporter<'_>) {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        exporter.mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key as &dyn Describe, value as &dyn Describe)),
        );
    }
}
