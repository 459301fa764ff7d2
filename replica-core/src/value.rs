use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    AccessError, Comparator, Component, Data, Def, Field, FieldType, MapData, Primitives, Scalar,
    ScalarKind, ScalarType, SetData, Shape, builtins, hash_code, value_eq,
};

/// What a slot, element or entry holds.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The empty reference
    #[default]
    Null,
    /// An inline scalar
    Scalar(Scalar),
    /// A reference to a node
    Ref(ObjRef),
}

impl Value {
    /// Returns true for the empty reference.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The referenced node, if any.
    pub const fn as_obj(&self) -> Option<&ObjRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// The inline scalar, if any.
    pub const fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// `null`, the scalar type, or the node's type identifier.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(s) => s.ty().as_str(),
            Value::Ref(r) => r.shape().type_identifier,
        }
    }

    /// Returns true if both values reference the very same node.
    pub fn same_node(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<ObjRef> for Value {
    fn from(value: ObjRef) -> Self {
        Value::Ref(value)
    }
}

impl From<&ObjRef> for Value {
    fn from(value: &ObjRef) -> Self {
        Value::Ref(value.clone())
    }
}

impl From<Option<ObjRef>> for Value {
    fn from(value: Option<ObjRef>) -> Self {
        value.map_or(Value::Null, Value::Ref)
    }
}

macro_rules! scalar_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_into_value!(Scalar, bool, i32, i64, f64, char);

/// Identity of a node: the address of its allocation.
///
/// Only meaningful while the node is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A node that is not shared yet: what constructors and instance suppliers
/// produce. Turn it into a node with [`ObjRef::new`].
#[derive(Debug)]
pub struct Object {
    shape: &'static Shape,
    data: Data,
}

impl Object {
    /// Pairs a shape with its payload. The payload must match the shape's [`Def`].
    pub fn new(shape: &'static Shape, data: Data) -> Self {
        Self { shape, data }
    }

    /// A blank instance: zero scalars, empty references, empty containers,
    /// the first enum variant, empty text, zero numbers, and the epoch for dates.
    pub fn blank(shape: &'static Shape) -> Self {
        let data = match shape.def {
            Def::Scalar(kind) => match kind {
                ScalarKind::Boxed(ty) => Data::Boxed(Scalar::zero(ty)),
                ScalarKind::Text => Data::Text(String::new()),
                ScalarKind::Decimal => Data::Decimal(Decimal::ZERO),
                ScalarKind::Date => Data::Date(NaiveDate::default()),
                ScalarKind::DateTime => Data::DateTime(NaiveDateTime::default()),
            },
            Def::Enum(_) => Data::Variant(0),
            Def::Struct(_) => Data::Struct(
                shape
                    .layout()
                    .map(|field| match field.ty {
                        FieldType::Scalar(ty) => Value::Scalar(Scalar::zero(ty)),
                        FieldType::Reference => Value::Null,
                    })
                    .collect(),
            ),
            Def::Array(ad) => match ad.component {
                Component::Scalar(ty) => Data::Primitives(Primitives::zeroed(ty, 0)),
                Component::Reference => Data::Array(Vec::new()),
            },
            Def::List(_) => Data::List(Vec::new()),
            Def::Set(sd) if sd.sorted => Data::Set(SetData::sorted(None)),
            Def::Set(_) => Data::Set(SetData::hashed()),
            Def::Map(md) if md.sorted => Data::Map(MapData::sorted(None)),
            Def::Map(_) => Data::Map(MapData::hashed()),
        };
        Self { shape, data }
    }

    /// Shape of the object.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Payload of the object.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Mutable payload of the object.
    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    /// Reads an instance field.
    pub fn get_field(&self, name: &str) -> Result<Value, AccessError> {
        let (index, _) = resolve(self.shape, name)?;
        read_slot(self.shape, &self.data, index)
    }

    /// Writes an instance field.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let (index, _) = resolve(self.shape, name)?;
        write_slot(self.shape, &mut self.data, index, value.into())
    }

    /// Builder-style [`Self::set_field`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, AccessError> {
        self.set_field(name, value)?;
        Ok(self)
    }

    /// Empties every reference slot. Scalar slots keep their values.
    pub fn clear_references(&mut self) {
        if let Data::Struct(slots) = &mut self.data {
            for (field, slot) in self.shape.layout().zip(slots.iter_mut()) {
                if !field.is_scalar() {
                    *slot = Value::Null;
                }
            }
        }
    }
}

fn resolve(shape: &'static Shape, name: &str) -> Result<(usize, &'static Field), AccessError> {
    if let Some(found) = shape.slot_of(name) {
        return Ok(found);
    }
    match shape.field(name) {
        Some(field) => Err(AccessError::SharedField {
            shape,
            field: field.name,
        }),
        None => Err(AccessError::NoSuchField {
            shape,
            field: name.into(),
        }),
    }
}

fn slots_of<'d>(shape: &'static Shape, data: &'d Data) -> Result<&'d [Value], AccessError> {
    match data {
        Data::Struct(slots) => Ok(slots),
        _ => Err(AccessError::WasNotA {
            shape,
            expected: "struct",
        }),
    }
}

fn read_slot(shape: &'static Shape, data: &Data, index: usize) -> Result<Value, AccessError> {
    let slots = slots_of(shape, data)?;
    slots
        .get(index)
        .cloned()
        .ok_or_else(|| AccessError::LayoutMismatch {
            shape,
            expected: shape.slot_count(),
            actual: slots.len(),
        })
}

fn write_slot(
    shape: &'static Shape,
    data: &mut Data,
    index: usize,
    value: Value,
) -> Result<(), AccessError> {
    let Some(field) = shape.layout().nth(index) else {
        return Err(AccessError::IndexOutOfBounds {
            shape,
            index,
            len: shape.slot_count(),
        });
    };
    let fits = match (field.ty, &value) {
        (FieldType::Scalar(ty), Value::Scalar(s)) => s.ty() == ty,
        (FieldType::Reference, Value::Null | Value::Ref(_)) => true,
        _ => false,
    };
    if !fits {
        return Err(AccessError::TypeMismatch {
            shape,
            field: field.name,
            expected: field.ty,
        });
    }
    let Data::Struct(slots) = data else {
        return Err(AccessError::WasNotA {
            shape,
            expected: "struct",
        });
    };
    let actual = slots.len();
    match slots.get_mut(index) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(AccessError::LayoutMismatch {
            shape,
            expected: shape.slot_count(),
            actual,
        }),
    }
}

struct Node {
    shape: &'static Shape,
    data: RefCell<Data>,
}

/// A shared handle to a node of the object graph.
///
/// Cloning the handle shares the node. Two handles are the same node iff
/// [`ObjRef::ptr_eq`] holds. Payload access goes through a [`RefCell`]; every
/// accessor reports a conflicting borrow as [`AccessError::Borrowed`].
#[derive(Clone)]
pub struct ObjRef(Rc<Node>);

impl ObjRef {
    /// Moves an object into a new node.
    pub fn new(object: Object) -> Self {
        Self(Rc::new(Node {
            shape: object.shape,
            data: RefCell::new(object.data),
        }))
    }

    /// A fresh node holding `data`.
    pub fn from_data(shape: &'static Shape, data: Data) -> Self {
        Self::new(Object::new(shape, data))
    }

    /// Shape of the node.
    pub fn shape(&self) -> &'static Shape {
        self.0.shape
    }

    /// Identity of the node.
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0).addr())
    }

    /// Returns true if both handles point to the same node.
    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Borrows the payload.
    pub fn data(&self) -> Result<Ref<'_, Data>, AccessError> {
        self.0
            .data
            .try_borrow()
            .map_err(|_| AccessError::Borrowed { shape: self.shape() })
    }

    /// Borrows the payload mutably.
    pub fn data_mut(&self) -> Result<RefMut<'_, Data>, AccessError> {
        self.0
            .data
            .try_borrow_mut()
            .map_err(|_| AccessError::Borrowed { shape: self.shape() })
    }

    fn read<R>(
        &self,
        expected: &'static str,
        f: impl FnOnce(&Data) -> Option<R>,
    ) -> Result<R, AccessError> {
        let data = self.data()?;
        f(&*data).ok_or(AccessError::WasNotA {
            shape: self.shape(),
            expected,
        })
    }

    fn not_a(&self, expected: &'static str) -> AccessError {
        AccessError::WasNotA {
            shape: self.shape(),
            expected,
        }
    }

    // fields

    /// Reads an instance field.
    pub fn get(&self, name: &str) -> Result<Value, AccessError> {
        let (index, _) = resolve(self.shape(), name)?;
        self.slot(index)
    }

    /// Writes an instance field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let (index, _) = resolve(self.shape(), name)?;
        self.set_slot(index, value.into())
    }

    /// Reads slot `index` of a struct node.
    pub fn slot(&self, index: usize) -> Result<Value, AccessError> {
        let data = self.data()?;
        read_slot(self.shape(), &data, index)
    }

    /// Writes slot `index` of a struct node, checking the field's type.
    pub fn set_slot(&self, index: usize, value: Value) -> Result<(), AccessError> {
        let mut data = self.data_mut()?;
        write_slot(self.shape(), &mut data, index, value)
    }

    /// Compares one field of two nodes with [`value_eq`]. Unreadable fields compare unequal.
    pub fn field_eq(&self, other: &ObjRef, name: &str) -> bool {
        match (self.get(name), other.get(name)) {
            (Ok(a), Ok(b)) => value_eq(&a, &b),
            _ => false,
        }
    }

    /// Hash code of one field. Unreadable fields hash to zero.
    pub fn field_hash(&self, name: &str) -> u64 {
        self.get(name)
            .and_then(|v| hash_code(&v))
            .unwrap_or_default()
    }

    // scalar payloads

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_data(&builtins::TEXT, Data::Text(text.into()))
    }

    /// A boxed scalar node.
    pub fn boxed(value: impl Into<Scalar>) -> Self {
        let value = value.into();
        let shape = match value.ty() {
            ScalarType::Bool => &builtins::BOXED_BOOL,
            ScalarType::Int => &builtins::BOXED_INT,
            ScalarType::Float => &builtins::BOXED_FLOAT,
            ScalarType::Char => &builtins::BOXED_CHAR,
        };
        Self::from_data(shape, Data::Boxed(value))
    }

    /// A decimal node.
    pub fn decimal(value: Decimal) -> Self {
        Self::from_data(&builtins::DECIMAL, Data::Decimal(value))
    }

    /// A date node.
    pub fn date(value: NaiveDate) -> Self {
        Self::from_data(&builtins::DATE, Data::Date(value))
    }

    /// A date-time node.
    pub fn date_time(value: NaiveDateTime) -> Self {
        Self::from_data(&builtins::DATE_TIME, Data::DateTime(value))
    }

    /// A variant of an enum shape.
    pub fn variant(shape: &'static Shape, index: usize) -> Result<Self, AccessError> {
        let Def::Enum(ed) = shape.def else {
            return Err(AccessError::WasNotA {
                shape,
                expected: "enum",
            });
        };
        if index >= ed.variants.len() {
            return Err(AccessError::IndexOutOfBounds {
                shape,
                index,
                len: ed.variants.len(),
            });
        }
        Ok(Self::from_data(shape, Data::Variant(index)))
    }

    /// Contents of a text node.
    pub fn text_content(&self) -> Result<String, AccessError> {
        self.read("text", |data| match data {
            Data::Text(s) => Some(s.clone()),
            _ => None,
        })
    }

    // arrays

    /// A reference array holding `items`.
    pub fn array(
        shape: &'static Shape,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<Self, AccessError> {
        match shape.def {
            Def::Array(ad) if ad.component == Component::Reference => Ok(Self::from_data(
                shape,
                Data::Array(items.into_iter().collect()),
            )),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "reference array",
            }),
        }
    }

    /// A primitive array of the built-in shape matching its element type.
    pub fn primitives(elements: impl Into<Primitives>) -> Self {
        let elements = elements.into();
        let shape = match elements.component() {
            ScalarType::Bool => &builtins::BOOL_ARRAY,
            ScalarType::Int => &builtins::INT_ARRAY,
            ScalarType::Float => &builtins::FLOAT_ARRAY,
            ScalarType::Char => &builtins::CHAR_ARRAY,
        };
        Self::from_data(shape, Data::Primitives(elements))
    }

    /// Slots of a reference array.
    pub fn array_slots(&self) -> Result<Vec<Value>, AccessError> {
        self.read("reference array", |data| match data {
            Data::Array(slots) => Some(slots.clone()),
            _ => None,
        })
    }

    /// Replaces slot `index` of a reference array.
    pub fn array_set(&self, index: usize, value: Value) -> Result<(), AccessError> {
        let shape = self.shape();
        let mut data = self.data_mut()?;
        let Data::Array(slots) = &mut *data else {
            return Err(self.not_a("reference array"));
        };
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(AccessError::IndexOutOfBounds { shape, index, len })?;
        *slot = value;
        Ok(())
    }

    /// Elements of a primitive array.
    pub fn primitive_elements(&self) -> Result<Primitives, AccessError> {
        self.read("primitive array", |data| match data {
            Data::Primitives(p) => Some(p.clone()),
            _ => None,
        })
    }

    // lists

    /// A list node of the given list shape.
    pub fn list(
        shape: &'static Shape,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<Self, AccessError> {
        match shape.def {
            Def::List(_) => Ok(Self::from_data(
                shape,
                Data::List(items.into_iter().collect()),
            )),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "list",
            }),
        }
    }

    /// Items of a list.
    pub fn list_items(&self) -> Result<Vec<Value>, AccessError> {
        self.read("list", |data| match data {
            Data::List(items) => Some(items.clone()),
            _ => None,
        })
    }

    /// Appends to a list. Fixed-size lists refuse.
    pub fn push(&self, value: Value) -> Result<(), AccessError> {
        let shape = self.shape();
        if let Def::List(ld) = shape.def
            && ld.fixed_size
        {
            return Err(AccessError::Unsupported {
                shape,
                operation: "append",
            });
        }
        let mut data = self.data_mut()?;
        let Data::List(items) = &mut *data else {
            return Err(self.not_a("list"));
        };
        items.push(value);
        Ok(())
    }

    /// Replaces item `index` of a list and returns the previous one.
    pub fn list_set(&self, index: usize, value: Value) -> Result<Value, AccessError> {
        let shape = self.shape();
        let mut data = self.data_mut()?;
        let Data::List(items) = &mut *data else {
            return Err(self.not_a("list"));
        };
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(AccessError::IndexOutOfBounds { shape, index, len })?;
        Ok(core::mem::replace(slot, value))
    }

    // sets

    /// An empty set of the given set shape.
    pub fn empty_set(shape: &'static Shape) -> Result<Self, AccessError> {
        match shape.def {
            Def::Set(_) => Ok(Self::new(Object::blank(shape))),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "set",
            }),
        }
    }

    /// An empty sorted set ordered by `comparator`.
    pub fn sorted_set(shape: &'static Shape, comparator: Comparator) -> Result<Self, AccessError> {
        match shape.def {
            Def::Set(sd) if sd.sorted => Ok(Self::from_data(
                shape,
                Data::Set(SetData::sorted(Some(comparator))),
            )),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "sorted set",
            }),
        }
    }

    /// Elements of a set, in container order.
    pub fn set_items(&self) -> Result<Vec<Value>, AccessError> {
        self.read("set", |data| match data {
            Data::Set(set) => Some(set.iter().cloned().collect()),
            _ => None,
        })
    }

    /// Inserts into a set. Returns false if an equal element was already present.
    ///
    /// The element's placement is computed before the set is borrowed mutably,
    /// so an element whose hash or order reads this very set still works.
    pub fn set_insert(&self, value: Value) -> Result<bool, AccessError> {
        let slot = {
            let data = self.data()?;
            let Data::Set(set) = &*data else {
                return Err(self.not_a("set"));
            };
            set.locate(&value)?
        };
        let mut data = self.data_mut()?;
        let Data::Set(set) = &mut *data else {
            return Err(self.not_a("set"));
        };
        Ok(set.place(slot, value))
    }

    /// Looks an element up with the set's own hashing or ordering.
    pub fn set_contains(&self, value: &Value) -> Result<bool, AccessError> {
        let data = self.data()?;
        let Data::Set(set) = &*data else {
            return Err(self.not_a("set"));
        };
        set.contains(value)
    }

    // maps

    /// An empty map of the given map shape.
    pub fn empty_map(shape: &'static Shape) -> Result<Self, AccessError> {
        match shape.def {
            Def::Map(_) => Ok(Self::new(Object::blank(shape))),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "map",
            }),
        }
    }

    /// An empty sorted map ordered by `comparator` on keys.
    pub fn sorted_map(shape: &'static Shape, comparator: Comparator) -> Result<Self, AccessError> {
        match shape.def {
            Def::Map(md) if md.sorted => Ok(Self::from_data(
                shape,
                Data::Map(MapData::sorted(Some(comparator))),
            )),
            _ => Err(AccessError::WasNotA {
                shape,
                expected: "sorted map",
            }),
        }
    }

    /// Entries of a map, in container order.
    pub fn map_entries(&self) -> Result<Vec<(Value, Value)>, AccessError> {
        self.read("map", |data| match data {
            Data::Map(map) => Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            _ => None,
        })
    }

    /// Associates `value` with `key`. Returns the previous value, if any.
    pub fn map_insert(&self, key: Value, value: Value) -> Result<Option<Value>, AccessError> {
        let slot = {
            let data = self.data()?;
            let Data::Map(map) = &*data else {
                return Err(self.not_a("map"));
            };
            map.locate(&key)?
        };
        let mut data = self.data_mut()?;
        let Data::Map(map) = &mut *data else {
            return Err(self.not_a("map"));
        };
        Ok(map.place(slot, key, value))
    }

    /// Looks a key up with the map's own hashing or ordering.
    pub fn map_get(&self, key: &Value) -> Result<Option<Value>, AccessError> {
        let data = self.data()?;
        let Data::Map(map) = &*data else {
            return Err(self.not_a("map"));
        };
        Ok(map.get(key)?.cloned())
    }

    /// Number of elements of a list, array, set or map.
    pub fn len(&self) -> Result<usize, AccessError> {
        self.read("container", |data| match data {
            Data::Array(v) | Data::List(v) => Some(v.len()),
            Data::Primitives(p) => Some(p.len()),
            Data::Set(set) => Some(set.len()),
            Data::Map(map) => Some(map.len()),
            _ => None,
        })
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.shape(), self.id())
    }
}
