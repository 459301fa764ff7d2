use alloc::string::String;
use alloc::vec::Vec;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{MapData, Scalar, ScalarType, SetData, Value};

/// The payload of a node. Which variant a node holds is fixed by its shape's [`crate::Def`].
#[derive(Debug)]
pub enum Data {
    /// UTF-8 text
    Text(String),
    /// A boxed bool, int, float or char
    Boxed(Scalar),
    /// Arbitrary precision decimal
    Decimal(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time
    DateTime(NaiveDateTime),
    /// Index into the enum's variant names
    Variant(usize),
    /// One slot per instance field, in [`crate::Layout`] order
    Struct(Vec<Value>),
    /// Reference array slots, each `Null` or `Ref`
    Array(Vec<Value>),
    /// Scalar array elements, stored inline
    Primitives(Primitives),
    /// List items
    List(Vec<Value>),
    /// Set elements
    Set(SetData),
    /// Map entries
    Map(MapData),
}

impl Data {
    /// Clones payloads that hold no references: text, boxed scalars, decimals,
    /// dates, enum variants and primitive arrays. Returns `None` for the others.
    pub fn clone_payload(&self) -> Option<Data> {
        Some(match self {
            Data::Text(s) => Data::Text(s.clone()),
            Data::Boxed(s) => Data::Boxed(*s),
            Data::Decimal(d) => Data::Decimal(*d),
            Data::Date(d) => Data::Date(*d),
            Data::DateTime(dt) => Data::DateTime(*dt),
            Data::Variant(v) => Data::Variant(*v),
            Data::Primitives(p) => Data::Primitives(p.clone()),
            _ => return None,
        })
    }

    /// Short human-readable name of the payload kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Data::Text(_) => "text",
            Data::Boxed(_) => "boxed scalar",
            Data::Decimal(_) => "decimal",
            Data::Date(_) => "date",
            Data::DateTime(_) => "date-time",
            Data::Variant(_) => "enum variant",
            Data::Struct(_) => "struct",
            Data::Array(_) => "reference array",
            Data::Primitives(_) => "primitive array",
            Data::List(_) => "list",
            Data::Set(_) => "set",
            Data::Map(_) => "map",
        }
    }
}

/// Elements of a primitive array.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitives {
    /// `bool` elements
    Bool(Vec<bool>),
    /// `int` elements
    Int(Vec<i64>),
    /// `float` elements
    Float(Vec<f64>),
    /// `char` elements
    Char(Vec<char>),
}

impl Primitives {
    /// An array of `len` zero values.
    pub fn zeroed(ty: ScalarType, len: usize) -> Self {
        match ty {
            ScalarType::Bool => Primitives::Bool(alloc::vec![false; len]),
            ScalarType::Int => Primitives::Int(alloc::vec![0; len]),
            ScalarType::Float => Primitives::Float(alloc::vec![0.0; len]),
            ScalarType::Char => Primitives::Char(alloc::vec!['\0'; len]),
        }
    }

    /// Element type.
    pub const fn component(&self) -> ScalarType {
        match self {
            Primitives::Bool(_) => ScalarType::Bool,
            Primitives::Int(_) => ScalarType::Int,
            Primitives::Float(_) => ScalarType::Float,
            Primitives::Char(_) => ScalarType::Char,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Primitives::Bool(v) => v.len(),
            Primitives::Int(v) => v.len(),
            Primitives::Float(v) => v.len(),
            Primitives::Char(v) => v.len(),
        }
    }

    /// Returns true if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Primitives::Bool(v) => v.get(index).copied().map(Scalar::Bool),
            Primitives::Int(v) => v.get(index).copied().map(Scalar::Int),
            Primitives::Float(v) => v.get(index).copied().map(Scalar::Float),
            Primitives::Char(v) => v.get(index).copied().map(Scalar::Char),
        }
    }

    /// Replaces the element at `index`. Returns false if the index is out of
    /// bounds or the scalar has the wrong type.
    pub fn set(&mut self, index: usize, value: Scalar) -> bool {
        let slot = match (self, value) {
            (Primitives::Bool(v), Scalar::Bool(x)) => v.get_mut(index).map(|s| *s = x),
            (Primitives::Int(v), Scalar::Int(x)) => v.get_mut(index).map(|s| *s = x),
            (Primitives::Float(v), Scalar::Float(x)) => v.get_mut(index).map(|s| *s = x),
            (Primitives::Char(v), Scalar::Char(x)) => v.get_mut(index).map(|s| *s = x),
            _ => None,
        };
        slot.is_some()
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

impl From<Vec<f64>> for Primitives {
    fn from(value: Vec<f64>) -> Self {
        Primitives::Float(value)
    }
}

impl From<Vec<i64>> for Primitives {
    fn from(value: Vec<i64>) -> Self {
        Primitives::Int(value)
    }
}

impl From<Vec<bool>> for Primitives {
    fn from(value: Vec<bool>) -> Self {
        Primitives::Bool(value)
    }
}

impl From<Vec<char>> for Primitives {
    fn from(value: Vec<char>) -> Self {
        Primitives::Char(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_checks_type_and_bounds() {
        let mut ints = Primitives::zeroed(ScalarType::Int, 2);
        assert!(ints.set(1, Scalar::Int(7)));
        assert!(!ints.set(2, Scalar::Int(7)));
        assert!(!ints.set(0, Scalar::Float(1.0)));
        assert_eq!(ints, Primitives::Int(alloc::vec![0, 7]));
    }

    #[test]
    fn only_reference_free_payloads_clone() {
        assert!(Data::Text("x".into()).clone_payload().is_some());
        assert!(Data::Primitives(Primitives::from(alloc::vec![1.5])).clone_payload().is_some());
        assert!(Data::List(Vec::new()).clone_payload().is_none());
        assert!(Data::Struct(Vec::new()).clone_payload().is_none());
    }
}
