use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use crate::ScalarType;

/// A value stored inline in a slot: copied by value, never shared.
///
/// Floats compare and hash by bit pattern, so every scalar equals itself.
#[derive(Clone, Copy, Debug)]
pub enum Scalar {
    /// `true` or `false`
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Unicode scalar value
    Char(char),
}

impl Scalar {
    /// The zero value of a scalar type: `false`, `0`, `0.0` or `'\0'`.
    pub const fn zero(ty: ScalarType) -> Self {
        match ty {
            ScalarType::Bool => Scalar::Bool(false),
            ScalarType::Int => Scalar::Int(0),
            ScalarType::Float => Scalar::Float(0.0),
            ScalarType::Char => Scalar::Char('\0'),
        }
    }

    /// Type of this scalar.
    pub const fn ty(&self) -> ScalarType {
        match self {
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::Int(_) => ScalarType::Int,
            Scalar::Float(_) => ScalarType::Float,
            Scalar::Char(_) => ScalarType::Char,
        }
    }

    /// Returns the boolean, if this is one.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, if this is one.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the char, if this is one.
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Scalar::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Orders two scalars of the same type. Floats use their total order.
    pub fn partial_order(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Float(a), Scalar::Float(b)) => Some(a.total_cmp(b)),
            (Scalar::Char(a), Scalar::Char(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            Scalar::Float(x) => x.to_bits().hash(state),
            Scalar::Char(c) => c.hash(state),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<char> for Scalar {
    fn from(value: char) -> Self {
        Scalar::Char(value)
    }
}
