use replica::{
    ConstructionFailure, CopyError, Data, DeepCopy, ObjRef, Object, Primitives, Scalar, Value,
    builtins, value_eq,
};
use replica_testhelpers::{IPanic, setup};

use crate::model::{NODE, VALIDATED, by_age, field, graph_node, name_of, person, text};

#[test]
fn text_list_field_is_copied_in_order() -> Result<(), IPanic> {
    setup();

    let titles = [
        "The Lord of the Rings",
        "Alice's Adventures in Wonderland",
        "The Hobbit",
    ];
    let source = person("Dave", 22, &titles);
    let copy = DeepCopy::new().deep_copy_ref(&source)?;

    assert!(!copy.ptr_eq(&source));
    assert_eq!(copy.get("age")?.as_scalar(), Some(Scalar::Int(22)));

    let source_books = field(&source, "favorite_books");
    let copy_books = field(&copy, "favorite_books");
    assert!(!copy_books.ptr_eq(&source_books));
    assert_eq!(copy_books.shape(), source_books.shape());

    let copied: Vec<_> = copy_books.list_items()?.iter().map(text).collect();
    assert_eq!(copied, titles);
    Ok(())
}

#[test]
fn two_cycle_through_hash_sets() -> Result<(), IPanic> {
    setup();

    let a = graph_node("a");
    let b = graph_node("b");
    let a_refs = ObjRef::empty_set(&builtins::HASH_SET)?;
    let b_refs = ObjRef::empty_set(&builtins::HASH_SET)?;
    a_refs.set_insert(b.clone().into())?;
    a_refs.set_insert(a.clone().into())?;
    b_refs.set_insert(a.clone().into())?;
    b_refs.set_insert(b.clone().into())?;
    a.set("references", a_refs)?;
    b.set("references", b_refs)?;

    let copy_a = DeepCopy::new().deep_copy_ref(&a)?;
    let copy_a_refs = field(&copy_a, "references");
    let copy_b = copy_a_refs
        .set_items()?
        .into_iter()
        .filter_map(|v| v.as_obj().cloned())
        .find(|n| !n.ptr_eq(&copy_a))
        .expect("copy of b");
    let copy_b_refs = field(&copy_b, "references");

    assert!(!copy_a.ptr_eq(&a) && !copy_b.ptr_eq(&b));
    assert_eq!(field(&copy_b, "label").text_content()?, "b");

    for refs in [&copy_a_refs, &copy_b_refs] {
        assert_eq!(refs.len()?, 2);
        assert!(refs.set_contains(&copy_a.clone().into())?);
        assert!(refs.set_contains(&copy_b.clone().into())?);
        assert!(!refs.set_contains(&a.clone().into())?);
    }
    Ok(())
}

#[test]
fn sorted_set_with_comparator() -> Result<(), IPanic> {
    setup();

    let comparator = by_age();
    let relatives = ObjRef::sorted_set(&builtins::TREE_SET, comparator.clone())?;
    for (name, age) in [("Kate", 25), ("Bob", 20), ("Dave", 22)] {
        relatives.set_insert(person(name, age, &[]).into())?;
    }

    let copy = DeepCopy::new().deep_copy_ref(&relatives)?;
    assert!(!copy.ptr_eq(&relatives));

    let source_items = relatives.set_items()?;
    let copy_items = copy.set_items()?;
    assert_eq!(copy_items.len(), 3);
    let names: Vec<_> = copy_items.iter().map(name_of).collect();
    assert_eq!(names, ["Bob", "Dave", "Kate"]);
    for (s, c) in source_items.iter().zip(&copy_items) {
        assert!(value_eq(s, c));
        assert!(!s.same_node(c));
    }

    let data = copy.data()?;
    let Data::Set(set) = &*data else {
        panic!("copy is not a set");
    };
    assert!(set.comparator().is_some_and(|c| c.ptr_eq(&comparator)));
    Ok(())
}

#[test]
fn failing_constructor_needs_a_supplier() -> Result<(), IPanic> {
    setup();

    let source = ObjRef::new(Object::blank(&VALIDATED));
    source.set("name", ObjRef::text("Dave"))?;
    source.set("age", 22)?;

    let err = DeepCopy::new().deep_copy_ref(&source).unwrap_err();
    assert!(matches!(
        err,
        CopyError::Construction {
            failure: ConstructionFailure::Raised(_),
            ..
        }
    ));

    let engine = DeepCopy::builder()
        .instance_supplier(&VALIDATED, || Object::blank(&VALIDATED))
        .build();
    let copy = engine.deep_copy_ref(&source)?;
    assert!(!copy.ptr_eq(&source));
    assert_eq!(copy.shape(), &VALIDATED);
    assert!(value_eq(&copy.into(), &source.into()));
    Ok(())
}

#[test]
fn two_dimensional_array() -> Result<(), IPanic> {
    setup();

    let rows = [vec![4.8, 3.9, 1.0], vec![2.6, 4.5], vec![4.4]];
    let ratings = ObjRef::array(
        &builtins::OBJECT_ARRAY,
        rows.iter()
            .map(|row| Value::from(ObjRef::primitives(row.clone()))),
    )?;

    let copy = DeepCopy::new().deep_copy_ref(&ratings)?;
    assert!(!copy.ptr_eq(&ratings));

    let source_rows = ratings.array_slots()?;
    let copy_rows = copy.array_slots()?;
    assert_eq!(copy_rows.len(), source_rows.len());
    for ((s, c), expected) in source_rows.iter().zip(&copy_rows).zip(&rows) {
        assert!(!s.same_node(c));
        let c = c.as_obj().expect("row copy");
        assert_eq!(c.shape(), &builtins::FLOAT_ARRAY);
        assert_eq!(c.primitive_elements()?, Primitives::Float(expected.clone()));
    }
    Ok(())
}

#[test]
fn custom_copy_replaces_the_traversal() -> Result<(), IPanic> {
    setup();

    let node = graph_node("original");
    let refs = ObjRef::empty_set(&builtins::HASH_SET)?;
    refs.set_insert(node.clone().into())?;
    node.set("references", refs)?;

    let engine = DeepCopy::builder()
        .custom_copy(&NODE, |source| {
            let copy = graph_node("custom");
            copy.set("references", source.get("label")?)?;
            Ok(copy)
        })
        .build();
    let copy = engine.deep_copy_ref(&node)?;

    assert_eq!(field(&copy, "label").text_content()?, "custom");
    let label = field(&node, "label");
    assert!(field(&copy, "references").ptr_eq(&label));
    Ok(())
}
