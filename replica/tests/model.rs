//! Object graphs the tests copy.

#![allow(dead_code)]

use replica::{
    AccessError, BoxError, Comparator, Def, EnumDef, Field, ObjRef, Object, ScalarKind,
    ScalarType, Shape, Value, builtins, natural_cmp,
};

pub static PERSON: Shape = Shape::builder("people::Person")
    .module_path("people")
    .fields(PERSON_FIELDS)
    .construct(new_person)
    .eq(person_eq)
    .hash(person_hash)
    .build();

const PERSON_FIELDS: &[Field] = &[
    Field::reference("name"),
    Field::scalar("age", ScalarType::Int),
    Field::reference("favorite_books"),
    Field::reference("friends"),
    Field::reference("census").shared(),
];

fn new_person() -> Result<Object, BoxError> {
    Ok(Object::blank(&PERSON))
}

const IDENTITY_FIELDS: [&str; 3] = ["name", "age", "favorite_books"];

fn person_eq(a: &ObjRef, b: &ObjRef) -> bool {
    IDENTITY_FIELDS.iter().all(|f| a.field_eq(b, f))
}

fn person_hash(p: &ObjRef) -> u64 {
    IDENTITY_FIELDS
        .iter()
        .fold(17u64, |h, f| h.wrapping_mul(31).wrapping_add(p.field_hash(f)))
}

/// A person whose constructor always fails.
pub static VALIDATED: Shape = Shape::builder("people::Validated")
    .module_path("people")
    .parent(&PERSON)
    .fields(VALIDATED_FIELDS)
    .construct(new_validated)
    .eq(person_eq)
    .hash(person_hash)
    .build();

const VALIDATED_FIELDS: &[Field] = &[Field::reference("birthday")];

fn new_validated() -> Result<Object, BoxError> {
    Err("invalid age".into())
}

/// A type without constructor.
pub static ORPHAN: Shape = Shape::builder("people::Orphan")
    .module_path("people")
    .fields(ORPHAN_FIELDS)
    .build();

const ORPHAN_FIELDS: &[Field] = &[Field::reference("name")];

/// A graph node without value semantics: equal only to itself.
pub static NODE: Shape = Shape::builder("graph::Node")
    .module_path("graph")
    .fields(NODE_FIELDS)
    .construct(new_node)
    .build();

const NODE_FIELDS: &[Field] = &[Field::reference("label"), Field::reference("references")];

fn new_node() -> Result<Object, BoxError> {
    Ok(Object::blank(&NODE))
}

pub static MOOD: Shape = Shape::builder("people::Mood")
    .module_path("people")
    .def(Def::Enum(EnumDef {
        variants: &["Happy", "Grumpy"],
    }))
    .build();

/// Text that is not registered as a wrapper.
pub static NICKNAME: Shape = Shape::builder("people::Nickname")
    .module_path("people")
    .def(Def::Scalar(ScalarKind::Text))
    .build();

pub fn person(name: &str, age: i64, books: &[&str]) -> ObjRef {
    let books = ObjRef::list(
        &builtins::ARRAY_LIST,
        books.iter().map(|b| Value::from(ObjRef::text(*b))),
    )
    .unwrap();
    let person = ObjRef::new(Object::blank(&PERSON));
    person.set("name", ObjRef::text(name)).unwrap();
    person.set("age", age).unwrap();
    person.set("favorite_books", books).unwrap();
    person
}

pub fn graph_node(label: &str) -> ObjRef {
    let node = ObjRef::new(Object::blank(&NODE));
    node.set("label", ObjRef::text(label)).unwrap();
    node
}

/// Orders people by age.
pub fn by_age() -> Comparator {
    Comparator::new(|a, b| natural_cmp(&age_of(a)?, &age_of(b)?))
}

fn age_of(value: &Value) -> Result<Value, AccessError> {
    match value.as_obj() {
        Some(person) => person.get("age"),
        None => Ok(Value::Null),
    }
}

/// The node a field references. Panics on empty references.
pub fn field(node: &ObjRef, name: &str) -> ObjRef {
    node.get(name)
        .unwrap()
        .as_obj()
        .cloned()
        .unwrap_or_else(|| panic!("{name} is empty"))
}

pub fn name_of(value: &Value) -> String {
    field(value.as_obj().unwrap(), "name").text_content().unwrap()
}

pub fn text(value: &Value) -> String {
    value.as_obj().unwrap().text_content().unwrap()
}
