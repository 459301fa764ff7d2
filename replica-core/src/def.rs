use core::fmt;

use crate::Shape;

/// The semantic definition of a shape: is it a scalar, a struct, a container?
///
/// The set is closed on purpose: the copy engine resolves every node to one of
/// these variants through its shape, never by inspecting the payload alone.
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// Values that are not composed of other nodes (text, boxed numbers, dates...).
    Scalar(ScalarKind),

    /// A closed set of named variants. Instances carry the variant index.
    Enum(EnumDef),

    /// A record with named fields, possibly extending a parent shape.
    Struct(StructDef),

    /// Fixed-length array, either of scalars or of references.
    Array(ArrayDef),

    /// Ordered list of values, variable size unless [`ListDef::fixed_size`] is set.
    List(ListDef),

    /// Unique set of values, placement depends on element equality/hash/order.
    Set(SetDef),

    /// Key to value associations, placement depends on key equality/hash/order.
    Map(MapDef),
}

/// The types a scalar slot (struct field or primitive array element) can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `true` or `false`
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Unicode scalar value
    Char,
}

impl ScalarType {
    /// Lowercase name of the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Char => "char",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload kinds for [`Def::Scalar`] shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// A scalar living behind a reference (a "boxed" number, bool or char)
    Boxed(ScalarType),
    /// UTF-8 text
    Text,
    /// Arbitrary precision decimal number
    Decimal,
    /// Calendar date without a timezone
    Date,
    /// Date and time without a timezone
    DateTime,
}

/// Describes an enumerated type.
#[derive(Clone, Copy, Debug)]
pub struct EnumDef {
    /// Variant names, in declaration order
    pub variants: &'static [&'static str],
}

/// Describes a record type.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// The shape this one extends. Its fields are inherited.
    pub parent: Option<&'static Shape>,

    /// Fields declared by this shape (not including inherited ones)
    pub fields: &'static [Field],
}

impl StructDef {
    /// A struct without parent and without fields.
    pub const EMPTY: StructDef = StructDef {
        parent: None,
        fields: &[],
    };
}

/// Describes a field in a struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Name of the field, unique within its declaring shape
    pub name: &'static str,

    /// What the field holds
    pub ty: FieldType,

    /// Shared fields belong to the type, not to instances: they have no
    /// instance slot and are never walked.
    pub shared: bool,
}

impl Field {
    /// A field holding a scalar of the given type.
    pub const fn scalar(name: &'static str, ty: ScalarType) -> Self {
        Self {
            name,
            ty: FieldType::Scalar(ty),
            shared: false,
        }
    }

    /// A field holding a reference (or nothing).
    pub const fn reference(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Reference,
            shared: false,
        }
    }

    /// Marks this field as shared across all instances of the type.
    pub const fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    /// Returns true if the field holds a scalar.
    pub const fn is_scalar(&self) -> bool {
        matches!(self.ty, FieldType::Scalar(_))
    }
}

/// The type of a struct field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Stored inline, copied by value
    Scalar(ScalarType),
    /// Points to another node, or is empty
    Reference,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(ty) => write!(f, "{ty}"),
            FieldType::Reference => f.write_str("reference"),
        }
    }
}

/// Describes a fixed-length array.
#[derive(Clone, Copy, Debug)]
pub struct ArrayDef {
    /// Type of the array elements
    pub component: Component,
}

impl ArrayDef {
    /// An array of references.
    pub const REFERENCE: ArrayDef = ArrayDef {
        component: Component::Reference,
    };

    /// An array of scalars of the given type.
    pub const fn of(ty: ScalarType) -> Self {
        Self {
            component: Component::Scalar(ty),
        }
    }
}

/// Element type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    /// Elements are stored inline
    Scalar(ScalarType),
    /// Elements are references
    Reference,
}

/// Describes a list.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Fixed-size lists can have their slots replaced, but never grow.
    pub fixed_size: bool,
}

/// Describes a set.
#[derive(Clone, Copy, Debug)]
pub struct SetDef {
    /// Sorted sets keep elements ordered, hashed ones keep insertion order.
    pub sorted: bool,
}

/// Describes a map.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// Sorted maps keep entries ordered by key, hashed ones keep insertion order.
    pub sorted: bool,
}

/// Iterator over the instance slots of a struct shape.
///
/// Own fields come first, in declaration order, followed by the fields of
/// the parent shape, and so on up the chain. Shared fields are skipped: they
/// have no slot. The n-th item describes slot n.
#[derive(Clone, Debug)]
pub struct Layout {
    parent: Option<&'static Shape>,
    fields: &'static [Field],
}

impl Layout {
    pub(crate) const fn of(shape: &'static Shape) -> Self {
        match shape.def {
            Def::Struct(sd) => Self {
                parent: sd.parent,
                fields: sd.fields,
            },
            _ => Self {
                parent: None,
                fields: &[],
            },
        }
    }
}

impl Iterator for Layout {
    type Item = &'static Field;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((field, rest)) = self.fields.split_first() {
                self.fields = rest;
                if field.shared {
                    continue;
                }
                return Some(field);
            }
            let parent = self.parent?;
            *self = Layout::of(parent);
        }
    }
}
