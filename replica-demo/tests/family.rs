use insta::assert_snapshot;
use replica::{DeepCopy, ObjRef, Object, Value, value_eq};
use replica_demo::{
    DemoError, EMPTY_LIST, FixedListPlugin, MAN_EXTENDED, build_family, check_copy, engine,
};
use replica_testhelpers::{IPanic, setup};

#[test]
fn configured_copy_passes_every_check() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let copy = engine().deep_copy_ref(&family.client)?;
    check_copy(&family, &copy)?;
    Ok(())
}

#[test]
fn the_source_is_not_its_own_copy() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let err = check_copy(&family, &family.client).unwrap_err();
    assert!(matches!(err, DemoError::Mismatch("person object reference")));
    assert_snapshot!(err.to_string(), @"check failed: person object reference");
    Ok(())
}

#[test]
fn default_engine_trips_on_the_validating_constructor() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let err = DeepCopy::new().deep_copy_ref(&family.client).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"cannot instantiate people::ManExtended: the constructor failed: invalid age 0"
    );
    Ok(())
}

#[test]
fn fixed_lists_need_their_plugin() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let without_plugin = DeepCopy::builder()
        .instance_supplier(&MAN_EXTENDED, || Object::blank(&MAN_EXTENDED))
        .wrapper_predicate(|shape| shape == &EMPTY_LIST)
        .build();
    let err = without_plugin.deep_copy_ref(&family.client).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"list plugin failed on FixedList: FixedList does not support construction"
    );

    let with_plugin = DeepCopy::builder()
        .instance_supplier(&MAN_EXTENDED, || Object::blank(&MAN_EXTENDED))
        .wrapper_predicate(|shape| shape == &EMPTY_LIST)
        .plugin(FixedListPlugin, 1)
        .build();
    let copy = with_plugin.deep_copy_ref(&family.client)?;
    check_copy(&family, &copy)?;
    Ok(())
}

#[test]
fn empty_book_lists_stay_shared() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let copy = engine().deep_copy_ref(&family.client)?;

    let books_of_first_author = |man: &ObjRef| -> Result<Value, IPanic> {
        let authors = man.get("favorite_authors")?;
        let first = authors.as_obj().unwrap().list_items()?.remove(0);
        Ok(first.as_obj().unwrap().get("favorite_books")?)
    };
    let source_books = books_of_first_author(&family.client)?;
    let copied_books = books_of_first_author(&copy)?;
    assert!(copied_books.same_node(&source_books));
    assert_eq!(copied_books.as_obj().unwrap().shape(), &EMPTY_LIST);
    Ok(())
}

#[test]
fn friends_reached_only_as_referrals_are_copied() -> Result<(), IPanic> {
    setup();

    let family = build_family()?;
    let copy = engine().deep_copy_ref(&family.client)?;

    let referrals = copy.get("referrals")?.as_obj().unwrap().array_slots()?;
    let friend = referrals[1].as_obj().unwrap();
    assert!(!friend.ptr_eq(&family.friend));
    assert_eq!(friend.shape(), &MAN_EXTENDED);
    assert!(value_eq(&friend.into(), &(&family.friend).into()));
    assert!(friend.get("relatives")?.is_null());
    Ok(())
}
