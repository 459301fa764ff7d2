use chrono::NaiveDate;
use replica::{AccessError, ObjRef, Shape, Value, builtins};
use rust_decimal::Decimal;
use tracing::debug;

use crate::people::{EMPTY_LIST, MAN, MAN_EXTENDED, by_age, man};

/// Dave, the client, and the people around him.
pub struct Family {
    /// Dave: every field of the extended model is set
    pub client: ObjRef,
    /// Bob, one of Dave's relatives and referrals
    pub brother: ObjRef,
    /// Kate, one of Dave's relatives
    pub sister: ObjRef,
    /// Steve, only reachable as a referral
    pub friend: ObjRef,
}

fn texts(shape: &'static Shape, items: &[&str]) -> Result<ObjRef, AccessError> {
    ObjRef::list(shape, items.iter().map(|s| Value::from(ObjRef::text(*s))))
}

/// Builds the client graph: relatives that know each other, the same people
/// ordered by age and keyed by role, referrals, a rating matrix and a few
/// scalar wrappers.
pub fn build_family() -> Result<Family, AccessError> {
    let client = man(
        &MAN_EXTENDED,
        "Dave",
        22,
        texts(
            &builtins::ARRAY_LIST,
            &[
                "The Lord of the Rings",
                "Alice's Adventures in Wonderland",
                "The Hobbit",
            ],
        )?,
    )?;
    client.set(
        "date_of_birth",
        NaiveDate::from_ymd_opt(2002, 5, 6).map(ObjRef::date),
    )?;

    let no_books = ObjRef::list(&EMPTY_LIST, Vec::new())?;
    let authors = [
        man(&MAN, "J. R. R. Tolkien", 81, no_books.clone())?,
        man(&MAN, "Lewis Carroll", 65, no_books)?,
    ];
    client.set(
        "favorite_authors",
        ObjRef::list(&builtins::FIXED_LIST, authors.iter().map(Value::from))?,
    )?;

    let brother = man(
        &MAN_EXTENDED,
        "Bob",
        20,
        texts(&builtins::FIXED_LIST, &["Harry Potter"])?,
    )?;
    let sister = man(
        &MAN_EXTENDED,
        "Kate",
        25,
        texts(&builtins::LINKED_LIST, &["Teach Yourself C++ in 21 Days"])?,
    )?;
    let household = [&brother, &sister, &client];

    for member in household {
        let relatives = ObjRef::empty_set(&builtins::HASH_SET)?;
        for relative in household {
            relatives.set_insert(relative.into())?;
        }
        member.set("relatives", relatives)?;
    }

    let by_age_set = ObjRef::sorted_set(&builtins::TREE_SET, by_age())?;
    for member in household {
        by_age_set.set_insert(member.into())?;
    }
    client.set("relatives_by_age", by_age_set)?;

    let member_names = ObjRef::empty_map(&builtins::HASH_MAP)?;
    member_names.map_insert((&brother).into(), ObjRef::text("Brother").into())?;
    member_names.map_insert((&sister).into(), ObjRef::text("Sister").into())?;
    client.set("relatives_member_names", member_names)?;

    let friend = man(
        &MAN_EXTENDED,
        "Steve",
        23,
        texts(&builtins::FIXED_LIST, &["Programming for Dummies"])?,
    )?;
    client.set(
        "referrals",
        ObjRef::array(
            &builtins::OBJECT_ARRAY,
            [Value::from(&brother), Value::from(&friend)],
        )?,
    )?;

    let ratings = [vec![4.8, 3.9, 1.0], vec![2.6, 4.5], vec![4.4]];
    client.set(
        "book_ratings",
        ObjRef::array(
            &builtins::OBJECT_ARRAY,
            ratings
                .into_iter()
                .map(|row| Value::from(ObjRef::primitives(row))),
        )?,
    )?;
    client.set("average_order_value", ObjRef::decimal(Decimal::new(1056, 2)))?;

    debug!("built family around {:?}", client);
    Ok(Family {
        client,
        brother,
        sister,
        friend,
    })
}
