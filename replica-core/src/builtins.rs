//! Shapes of the types every object graph can use: text, boxed scalars,
//! decimals, dates, arrays, and the standard lists, sets and maps.

use crate::{
    ArrayDef, BoxError, Def, ListDef, MapDef, Object, ScalarKind, ScalarType, SetDef, Shape,
};

macro_rules! scalar_shape {
    ($name:ident, $id:literal, $family:literal, $kind:expr) => {
        #[doc = concat!("Shape of `", $id, "`.")]
        pub static $name: Shape = Shape::builder($id)
            .module_path($family)
            .def(Def::Scalar($kind))
            .build();
    };
}

scalar_shape!(TEXT, "String", "alloc", ScalarKind::Text);
scalar_shape!(
    BOXED_BOOL,
    "Box<bool>",
    "alloc",
    ScalarKind::Boxed(ScalarType::Bool)
);
scalar_shape!(
    BOXED_INT,
    "Box<i64>",
    "alloc",
    ScalarKind::Boxed(ScalarType::Int)
);
scalar_shape!(
    BOXED_FLOAT,
    "Box<f64>",
    "alloc",
    ScalarKind::Boxed(ScalarType::Float)
);
scalar_shape!(
    BOXED_CHAR,
    "Box<char>",
    "alloc",
    ScalarKind::Boxed(ScalarType::Char)
);
scalar_shape!(DECIMAL, "Decimal", "rust_decimal", ScalarKind::Decimal);
scalar_shape!(DATE, "NaiveDate", "chrono", ScalarKind::Date);
scalar_shape!(DATE_TIME, "NaiveDateTime", "chrono", ScalarKind::DateTime);

macro_rules! array_shape {
    ($name:ident, $id:literal, $def:expr) => {
        #[doc = concat!("Shape of `", $id, "` arrays.")]
        pub static $name: Shape = Shape::builder($id)
            .module_path("core")
            .def(Def::Array($def))
            .build();
    };
}

array_shape!(BOOL_ARRAY, "[bool]", ArrayDef::of(ScalarType::Bool));
array_shape!(INT_ARRAY, "[i64]", ArrayDef::of(ScalarType::Int));
array_shape!(FLOAT_ARRAY, "[f64]", ArrayDef::of(ScalarType::Float));
array_shape!(CHAR_ARRAY, "[char]", ArrayDef::of(ScalarType::Char));
array_shape!(OBJECT_ARRAY, "[Value]", ArrayDef::REFERENCE);

macro_rules! container_shape {
    ($name:ident, $id:literal, $def:expr, $construct:ident) => {
        #[doc = concat!("Shape of `", $id, "`.")]
        pub static $name: Shape = Shape::builder($id)
            .module_path("alloc")
            .def($def)
            .construct($construct)
            .build();

        fn $construct() -> Result<Object, BoxError> {
            Ok(Object::blank(&$name))
        }
    };
}

container_shape!(
    ARRAY_LIST,
    "Vec",
    Def::List(ListDef { fixed_size: false }),
    new_array_list
);
container_shape!(
    LINKED_LIST,
    "LinkedList",
    Def::List(ListDef { fixed_size: false }),
    new_linked_list
);
container_shape!(
    HASH_SET,
    "HashSet",
    Def::Set(SetDef { sorted: false }),
    new_hash_set
);
container_shape!(
    TREE_SET,
    "BTreeSet",
    Def::Set(SetDef { sorted: true }),
    new_tree_set
);
container_shape!(
    HASH_MAP,
    "HashMap",
    Def::Map(MapDef { sorted: false }),
    new_hash_map
);
container_shape!(
    TREE_MAP,
    "BTreeMap",
    Def::Map(MapDef { sorted: true }),
    new_tree_map
);

/// Shape of fixed-size lists: slots can be replaced, but the list never grows.
///
/// It has no constructor: a fixed-size list only exists at its final length.
pub static FIXED_LIST: Shape = Shape::builder("FixedList")
    .module_path("alloc")
    .def(Def::List(ListDef { fixed_size: true }))
    .build();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_constructors_produce_their_own_shape() {
        for shape in [
            &ARRAY_LIST,
            &LINKED_LIST,
            &HASH_SET,
            &TREE_SET,
            &HASH_MAP,
            &TREE_MAP,
        ] {
            let construct = shape.vtable.construct.unwrap();
            assert_eq!(construct().unwrap().shape(), shape);
        }
        assert!(FIXED_LIST.vtable.construct.is_none());
    }
}
