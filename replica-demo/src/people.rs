use replica::{
    AccessError, BoxError, Comparator, Def, Field, ListDef, ObjRef, Object, ScalarType, Shape,
    Value, natural_cmp,
};

/// A person with a name, an age and favorite books.
pub static MAN: Shape = Shape::builder("people::Man")
    .module_path("people")
    .fields(MAN_FIELDS)
    .construct(new_man)
    .eq(man_eq)
    .hash(man_hash)
    .build();

const MAN_FIELDS: &[Field] = &[
    Field::reference("name"),
    Field::scalar("age", ScalarType::Int),
    Field::reference("favorite_books"),
];

fn new_man() -> Result<Object, BoxError> {
    Ok(Object::blank(&MAN))
}

fn man_eq(a: &ObjRef, b: &ObjRef) -> bool {
    ["age", "name", "favorite_books"]
        .iter()
        .all(|f| a.field_eq(b, f))
}

fn man_hash(man: &ObjRef) -> u64 {
    ["name", "age", "favorite_books"]
        .iter()
        .fold(0u64, |h, f| h.wrapping_mul(31).wrapping_add(man.field_hash(f)))
}

/// A [`MAN`] with relatives, referrals and shopping history.
///
/// Its constructor rejects the blank instance it would produce (age zero),
/// so copying it needs an instance supplier.
pub static MAN_EXTENDED: Shape = Shape::builder("people::ManExtended")
    .module_path("people")
    .parent(&MAN)
    .fields(MAN_EXTENDED_FIELDS)
    .construct(new_man_extended)
    .eq(man_extended_eq)
    .hash(man_extended_hash)
    .build();

const MAN_EXTENDED_FIELDS: &[Field] = &[
    Field::reference("date_of_birth"),
    Field::reference("favorite_authors"),
    Field::reference("relatives"),
    Field::reference("relatives_by_age"),
    Field::reference("relatives_member_names"),
    Field::reference("referrals"),
    Field::reference("book_ratings"),
    Field::reference("average_order_value"),
];

fn new_man_extended() -> Result<Object, BoxError> {
    let man = Object::blank(&MAN_EXTENDED);
    match man.get_field("age")?.as_scalar().and_then(|s| s.as_int()) {
        Some(age) if age >= 1 => Ok(man),
        age => Err(format!("invalid age {}", age.unwrap_or_default()).into()),
    }
}

fn man_extended_eq(a: &ObjRef, b: &ObjRef) -> bool {
    man_eq(a, b) && a.field_eq(b, "date_of_birth")
}

fn man_extended_hash(man: &ObjRef) -> u64 {
    man_hash(man)
        .wrapping_mul(31)
        .wrapping_add(man.field_hash("date_of_birth"))
}

/// The empty list every author without favorite books shares. Never copied.
pub static EMPTY_LIST: Shape = Shape::builder("people::EmptyList")
    .module_path("people")
    .def(Def::List(ListDef { fixed_size: true }))
    .build();

/// A person of shape `shape`, [`MAN`] or [`MAN_EXTENDED`].
pub fn man(
    shape: &'static Shape,
    name: &str,
    age: i64,
    favorite_books: ObjRef,
) -> Result<ObjRef, AccessError> {
    let man = ObjRef::new(Object::blank(shape));
    man.set("name", ObjRef::text(name))?;
    man.set("age", age)?;
    man.set("favorite_books", favorite_books)?;
    Ok(man)
}

/// Orders people by age.
pub fn by_age() -> Comparator {
    Comparator::new(|a, b| natural_cmp(&age_of(a)?, &age_of(b)?))
}

fn age_of(value: &Value) -> Result<Value, AccessError> {
    match value.as_obj() {
        Some(man) => man.get("age"),
        None => Ok(Value::Null),
    }
}
