use alloc::string::String;

use crate::{FieldType, Shape};

/// Errors that can occur when reading or writing a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The shape has no field with that name.
    NoSuchField {
        /// Shape of the node
        shape: &'static Shape,
        /// The requested field name
        field: String,
    },

    /// The field is shared across all instances and has no instance slot.
    SharedField {
        /// Shape of the node
        shape: &'static Shape,
        /// Name of the shared field
        field: &'static str,
    },

    /// The value does not fit the field's declared type.
    TypeMismatch {
        /// Shape of the node
        shape: &'static Shape,
        /// Name of the field
        field: &'static str,
        /// Declared type of the field
        expected: FieldType,
    },

    /// The node's payload is not what the operation needs, e.g. pushing onto a set.
    WasNotA {
        /// Shape of the node
        shape: &'static Shape,
        /// What the operation expected
        expected: &'static str,
    },

    /// A struct node does not have one slot per field of its shape.
    LayoutMismatch {
        /// Shape of the node
        shape: &'static Shape,
        /// Number of slots the shape declares
        expected: usize,
        /// Number of slots the node has
        actual: usize,
    },

    /// The node is currently mutably borrowed elsewhere.
    Borrowed {
        /// Shape of the node
        shape: &'static Shape,
    },

    /// Index past the end of an array or list.
    IndexOutOfBounds {
        /// Shape of the node
        shape: &'static Shape,
        /// The requested index
        index: usize,
        /// Length of the array or list
        len: usize,
    },

    /// The node's type does not support the operation.
    Unsupported {
        /// Shape of the node
        shape: &'static Shape,
        /// The attempted operation
        operation: &'static str,
    },

    /// Two values cannot be ordered: no comparator, and no natural order.
    NoOrdering {
        /// Type name of the left-hand value
        left: &'static str,
        /// Type name of the right-hand value
        right: &'static str,
    },
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessError::NoSuchField { shape, field } => {
                write!(f, "{shape} has no field named `{field}`")
            }
            AccessError::SharedField { shape, field } => {
                write!(f, "{shape}::{field} is shared and has no instance slot")
            }
            AccessError::TypeMismatch {
                shape,
                field,
                expected,
            } => write!(f, "{shape}::{field} only accepts a {expected} value"),
            AccessError::WasNotA { shape, expected } => {
                write!(f, "{shape} was not a {expected}")
            }
            AccessError::LayoutMismatch {
                shape,
                expected,
                actual,
            } => write!(
                f,
                "{shape} declares {expected} slots, but the node has {actual}"
            ),
            AccessError::Borrowed { shape } => {
                write!(f, "{shape} node is already mutably borrowed")
            }
            AccessError::IndexOutOfBounds { shape, index, len } => {
                write!(f, "index {index} out of bounds for {shape} of length {len}")
            }
            AccessError::Unsupported { shape, operation } => {
                write!(f, "{shape} does not support {operation}")
            }
            AccessError::NoOrdering { left, right } => {
                write!(f, "no ordering between {left} and {right}")
            }
        }
    }
}

impl core::error::Error for AccessError {}
