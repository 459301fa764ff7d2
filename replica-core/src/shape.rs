use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::{Def, Field, Layout, ObjRef, Object, ScalarKind, ScalarType, StructDef};

/// Boxed error type used for causes coming from user code.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Produces a blank instance of a type: its no-argument constructor.
///
/// Constructors may validate and fail; the cause is kept and reported.
pub type ConstructFn = fn() -> Result<Object, BoxError>;

/// Value equality between two nodes of the same shape.
pub type EqFn = fn(&ObjRef, &ObjRef) -> bool;

/// Hash code of a node, consistent with its [`EqFn`].
pub type HashFn = fn(&ObjRef) -> u64;

/// Natural ordering between two nodes of the same shape.
pub type CmpFn = fn(&ObjRef, &ObjRef) -> Ordering;

/// Per-type operations. Every slot is optional.
#[derive(Clone, Copy, Default)]
pub struct ValueVTable {
    /// cf. [`ConstructFn`]
    pub construct: Option<ConstructFn>,

    /// cf. [`EqFn`]. Nodes without one compare by identity.
    pub eq: Option<EqFn>,

    /// cf. [`HashFn`]. Nodes without one hash by identity.
    pub hash: Option<HashFn>,

    /// cf. [`CmpFn`]
    pub cmp: Option<CmpFn>,
}

impl ValueVTable {
    /// A vtable with no operations.
    pub const fn empty() -> Self {
        Self {
            construct: None,
            eq: None,
            hash: None,
            cmp: None,
        }
    }
}

impl fmt::Debug for ValueVTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueVTable")
            .field("construct", &self.construct.is_some())
            .field("eq", &self.eq.is_some())
            .field("hash", &self.hash.is_some())
            .field("cmp", &self.cmp.is_some())
            .finish()
    }
}

/// Describes a type: its identity, its structure and its operations.
///
/// Shapes are declared as `static` items and referenced as `&'static Shape`.
/// Two shapes describe the same type iff their `type_identifier`s are equal.
pub struct Shape {
    /// Exact type identity, e.g. `people::Man`
    pub type_identifier: &'static str,

    /// The family the type belongs to, e.g. `chrono`
    pub module_path: &'static str,

    /// Structure of the type
    pub def: Def,

    /// Operations of the type
    pub vtable: ValueVTable,
}

const EMPTY_VESSEL: Shape = Shape {
    type_identifier: "‹undefined›",
    module_path: "",
    def: Def::Struct(StructDef::EMPTY),
    vtable: ValueVTable::empty(),
};

impl Shape {
    /// Returns a builder for a shape with the given identifier.
    pub const fn builder(type_identifier: &'static str) -> ShapeBuilder {
        ShapeBuilder::new(type_identifier)
    }

    /// Instance slots of this shape, own fields first. Empty for non-struct shapes.
    pub const fn layout(&'static self) -> Layout {
        Layout::of(self)
    }

    /// Number of instance slots.
    pub fn slot_count(&'static self) -> usize {
        self.layout().count()
    }

    /// Finds the slot of an instance field by name. Own fields shadow inherited ones.
    pub fn slot_of(&'static self, name: &str) -> Option<(usize, &'static Field)> {
        self.layout()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// Finds a field by name, shared ones included, walking up the parent chain.
    pub fn field(&'static self, name: &str) -> Option<&'static Field> {
        let mut current = Some(self);
        while let Some(shape) = current {
            let Def::Struct(sd) = shape.def else {
                return None;
            };
            if let Some(field) = sd.fields.iter().find(|f| f.name == name) {
                return Some(field);
            }
            current = sd.parent;
        }
        None
    }

    /// Returns true if `self` is `other` or extends it.
    pub fn extends(&'static self, other: &Shape) -> bool {
        let mut current = Some(self);
        while let Some(shape) = current {
            if shape == other {
                return true;
            }
            current = match shape.def {
                Def::Struct(sd) => sd.parent,
                _ => None,
            };
        }
        false
    }

    /// Enumerated types.
    pub const fn is_enum(&self) -> bool {
        matches!(self.def, Def::Enum(_))
    }

    /// Date and date-time values.
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self.def,
            Def::Scalar(ScalarKind::Date) | Def::Scalar(ScalarKind::DateTime)
        )
    }

    /// Boxed numbers and decimals.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self.def,
            Def::Scalar(ScalarKind::Boxed(ScalarType::Int))
                | Def::Scalar(ScalarKind::Boxed(ScalarType::Float))
                | Def::Scalar(ScalarKind::Decimal)
        )
    }

    /// Record types.
    pub const fn is_struct(&self) -> bool {
        matches!(self.def, Def::Struct(_))
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.type_identifier == other.type_identifier
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_identifier.hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_identifier)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({})", self.type_identifier)
    }
}

/// Builder for [`Shape`] instances, usable in `static` initializers.
///
/// ```
/// use replica_core::{Field, ScalarType, Shape};
///
/// static POINT: Shape = Shape::builder("geo::Point")
///     .module_path("geo")
///     .fields(POINT_FIELDS)
///     .build();
///
/// const POINT_FIELDS: &[Field] = &[
///     Field::scalar("x", ScalarType::Float),
///     Field::scalar("y", ScalarType::Float),
/// ];
///
/// assert_eq!(POINT.slot_count(), 2);
/// ```
pub struct ShapeBuilder {
    shape: Shape,
}

impl ShapeBuilder {
    /// Starts a struct shape without fields.
    pub const fn new(type_identifier: &'static str) -> Self {
        Self {
            shape: Shape {
                type_identifier,
                ..EMPTY_VESSEL
            },
        }
    }

    /// Sets the type family.
    pub const fn module_path(mut self, module_path: &'static str) -> Self {
        self.shape.module_path = module_path;
        self
    }

    /// Sets the definition.
    pub const fn def(mut self, def: Def) -> Self {
        self.shape.def = def;
        self
    }

    /// Sets the fields declared by this struct shape.
    pub const fn fields(mut self, fields: &'static [Field]) -> Self {
        let parent = match self.shape.def {
            Def::Struct(sd) => sd.parent,
            _ => None,
        };
        self.shape.def = Def::Struct(StructDef { parent, fields });
        self
    }

    /// Makes this struct shape extend `parent`.
    pub const fn parent(mut self, parent: &'static Shape) -> Self {
        let fields = match self.shape.def {
            Def::Struct(sd) => sd.fields,
            _ => &[],
        };
        self.shape.def = Def::Struct(StructDef {
            parent: Some(parent),
            fields,
        });
        self
    }

    /// Sets the no-argument constructor.
    pub const fn construct(mut self, construct: ConstructFn) -> Self {
        self.shape.vtable.construct = Some(construct);
        self
    }

    /// Sets value equality.
    pub const fn eq(mut self, eq: EqFn) -> Self {
        self.shape.vtable.eq = Some(eq);
        self
    }

    /// Sets the hash code function.
    pub const fn hash(mut self, hash: HashFn) -> Self {
        self.shape.vtable.hash = Some(hash);
        self
    }

    /// Sets the natural ordering.
    pub const fn cmp(mut self, cmp: CmpFn) -> Self {
        self.shape.vtable.cmp = Some(cmp);
        self
    }

    /// Finishes the shape.
    pub const fn build(self) -> Shape {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldType, builtins};

    static BASE: Shape = Shape::builder("test::Base").fields(BASE_FIELDS).build();

    const BASE_FIELDS: &[Field] = &[
        Field::reference("name"),
        Field::scalar("instances", ScalarType::Int).shared(),
        Field::scalar("age", ScalarType::Int),
    ];

    static DERIVED: Shape = Shape::builder("test::Derived")
        .parent(&BASE)
        .fields(DERIVED_FIELDS)
        .build();

    const DERIVED_FIELDS: &[Field] = &[Field::reference("name"), Field::reference("tags")];

    #[test]
    fn layout_lists_own_fields_before_inherited_ones() {
        let names: Vec<_> = DERIVED.layout().map(|f| f.name).collect();
        assert_eq!(names, ["name", "tags", "name", "age"]);
    }

    #[test]
    fn shared_fields_have_no_slot() {
        assert_eq!(BASE.slot_count(), 2);
        assert!(BASE.slot_of("instances").is_none());
        assert!(BASE.field("instances").is_some_and(|f| f.shared));
        assert!(DERIVED.field("instances").is_some());
    }

    #[test]
    fn own_fields_shadow_inherited_ones() {
        let (slot, field) = DERIVED.slot_of("name").unwrap();
        assert_eq!(slot, 0);
        assert_eq!(field.ty, FieldType::Reference);
        assert_eq!(DERIVED.slot_of("age").map(|(slot, _)| slot), Some(3));
    }

    #[test]
    fn classification_helpers() {
        assert!(builtins::DATE.is_temporal());
        assert!(builtins::DECIMAL.is_numeric());
        assert!(builtins::BOXED_INT.is_numeric());
        assert!(!builtins::BOXED_BOOL.is_numeric());
        assert!(!builtins::TEXT.is_struct());
        assert!(DERIVED.is_struct());
        assert!(DERIVED.extends(&BASE));
        assert!(!BASE.extends(&DERIVED));
    }
}
