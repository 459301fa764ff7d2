//! Field-by-field comparison of a person and its copy.

use replica::{ObjRef, Value, value_eq};
use tracing::{debug, trace};

use crate::error::ensure;
use crate::{DemoError, Family};

/// Checks every field of the client against `copy`, and the people they
/// reach one level down. Then checks that the copy's containers share the
/// copies of the client's relatives instead of holding duplicates.
pub fn check_copy(family: &Family, copy: &ObjRef) -> Result<(), DemoError> {
    check_man(&family.client, copy, 2)?;
    check_shared_relatives(family, copy)?;
    debug!("copy of {:?} checked", family.client);
    Ok(())
}

fn node(value: &Value) -> Option<&ObjRef> {
    value.as_obj()
}

fn both_set(man: &ObjRef, copy: &ObjRef, field: &str) -> Result<Option<(ObjRef, ObjRef)>, DemoError> {
    let (a, b) = (man.get(field)?, copy.get(field)?);
    match (node(&a), node(&b)) {
        (None, None) => Ok(None),
        (Some(a), Some(b)) => Ok(Some((a.clone(), b.clone()))),
        _ => Err(DemoError::Mismatch("field set on only one side")),
    }
}

fn check_container(source: &ObjRef, copy: &ObjRef, issue: &'static str) -> Result<(), DemoError> {
    ensure(!source.ptr_eq(copy), issue)?;
    ensure(source.shape() == copy.shape(), issue)
}

fn check_man(man: &ObjRef, copy: &ObjRef, depth: u32) -> Result<(), DemoError> {
    if depth < 1 {
        return Ok(());
    }
    trace!("checking {:?} against {:?}", man, copy);

    ensure(!man.ptr_eq(copy), "person object reference")?;
    ensure(man.get("name")?.same_node(&copy.get("name")?), "name")?;
    ensure(
        man.get("age")?.as_scalar() == copy.get("age")?.as_scalar(),
        "age",
    )?;

    if let Some((books, copied)) = both_set(man, copy, "favorite_books")? {
        check_container(&books, &copied, "favorite_books list")?;
        for (a, b) in books.list_items()?.iter().zip(&copied.list_items()?) {
            ensure(value_eq(a, b), "favorite_books elements value")?;
        }
    }

    if let Some((date, copied)) = both_set(man, copy, "date_of_birth")? {
        ensure(date.ptr_eq(&copied), "date_of_birth")?;
    }

    if let Some((authors, copied)) = both_set(man, copy, "favorite_authors")? {
        check_container(&authors, &copied, "favorite_authors list")?;
        for (a, b) in authors.list_items()?.iter().zip(&copied.list_items()?) {
            ensure(
                !a.same_node(b) && value_eq(a, b),
                "favorite_authors elements reference or value",
            )?;
        }
    }

    for (field, issue) in [
        ("relatives", "relatives set"),
        ("relatives_by_age", "relatives_by_age set"),
    ] {
        if let Some((set, copied)) = both_set(man, copy, field)? {
            check_container(&set, &copied, issue)?;
            for (a, b) in set.set_items()?.iter().zip(&copied.set_items()?) {
                check_nested(a, b, depth)?;
            }
        }
    }

    if let Some((names, copied)) = both_set(man, copy, "relatives_member_names")? {
        check_container(&names, &copied, "relatives_member_names map")?;
        for ((ka, va), (kb, vb)) in names.map_entries()?.iter().zip(&copied.map_entries()?) {
            check_nested(ka, kb, depth)?;
            ensure(value_eq(va, vb), "relatives_member_names entry value")?;
        }
    }

    if let Some((referrals, copied)) = both_set(man, copy, "referrals")? {
        let (a, b) = (referrals.array_slots()?, copied.array_slots()?);
        ensure(a.len() == b.len(), "referrals array length")?;
        for (a, b) in a.iter().zip(&b) {
            check_nested(a, b, depth)?;
        }
    }

    if let Some((ratings, copied)) = both_set(man, copy, "book_ratings")? {
        let (rows, copied_rows) = (ratings.array_slots()?, copied.array_slots()?);
        ensure(rows.len() == copied_rows.len(), "book_ratings array length")?;
        ensure(!ratings.ptr_eq(&copied), "book_ratings array reference")?;
        for (row, copied_row) in rows.iter().zip(&copied_rows) {
            let (Some(row), Some(copied_row)) = (node(row), node(copied_row)) else {
                return Err(DemoError::Mismatch("book_ratings nested array not null"));
            };
            ensure(!row.ptr_eq(copied_row), "book_ratings nested array reference")?;
            ensure(
                row.primitive_elements()? == copied_row.primitive_elements()?,
                "book_ratings nested array value",
            )?;
        }
    }

    if let Some((value, copied)) = both_set(man, copy, "average_order_value")? {
        ensure(
            value_eq(&value.into(), &copied.into()),
            "average_order_value",
        )?;
    }
    Ok(())
}

fn check_nested(man: &Value, copy: &Value, depth: u32) -> Result<(), DemoError> {
    match (node(man), node(copy)) {
        (Some(man), Some(copy)) => check_man(man, copy, depth - 1),
        _ => Err(DemoError::Mismatch("nested person is empty")),
    }
}

fn find_by_name(set: &ObjRef, name: &str) -> Result<ObjRef, DemoError> {
    for item in set.set_items()? {
        if let Some(man) = node(&item)
            && let Some(man_name) = node(&man.get("name")?)
            && man_name.text_content()? == name
        {
            return Ok(man.clone());
        }
    }
    Err(DemoError::Mismatch("relative missing from the copy"))
}

fn holds(items: &[Value], man: &ObjRef) -> bool {
    items.iter().any(|item| node(item).is_some_and(|n| n.ptr_eq(man)))
}

fn check_shared_relatives(family: &Family, copy: &ObjRef) -> Result<(), DemoError> {
    let field_node = |man: &ObjRef, field: &str| -> Result<ObjRef, DemoError> {
        node(&man.get(field)?)
            .cloned()
            .ok_or(DemoError::Mismatch("container is empty"))
    };

    let relatives = field_node(copy, "relatives")?;
    let brother = find_by_name(&relatives, &name_of(&family.brother)?)?;
    let sister = find_by_name(&relatives, &name_of(&family.sister)?)?;
    let household = [copy, &brother, &sister];

    for member in household {
        let items = field_node(member, "relatives")?.set_items()?;
        for relative in household {
            ensure(holds(&items, relative), "relatives element object reference")?;
        }
    }

    let by_age = field_node(copy, "relatives_by_age")?.set_items()?;
    for relative in household {
        ensure(holds(&by_age, relative), "relatives_by_age element object reference")?;
    }

    let keys: Vec<_> = field_node(copy, "relatives_member_names")?
        .map_entries()?
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    ensure(holds(&keys, &brother), "relatives_member_names key object reference")?;
    ensure(holds(&keys, &sister), "relatives_member_names key object reference")?;

    let referrals = field_node(copy, "referrals")?.array_slots()?;
    ensure(holds(&referrals, &brother), "referrals element object reference")?;
    Ok(())
}

fn name_of(man: &ObjRef) -> Result<String, DemoError> {
    Ok(node(&man.get("name")?)
        .ok_or(DemoError::Mismatch("person without a name"))?
        .text_content()?)
}
