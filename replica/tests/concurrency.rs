use replica::{DeepCopy, ObjRef, Value, builtins, value_eq};
use replica_testhelpers::{IPanic, setup};

use crate::model::{NODE, by_age, field, person};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn engine_is_shareable() {
    assert_send_sync::<DeepCopy>();
}

/// Graphs are per thread; only the engine crosses threads.
fn copy_family(engine: &DeepCopy, generation: i64) -> Result<(), IPanic> {
    let relatives = ObjRef::sorted_set(&builtins::TREE_SET, by_age())?;
    for age in 0..16 {
        relatives.set_insert(person("Kin", generation * 100 + age, &["Dune"]).into())?;
    }
    let root = person("Root", generation, &[]);
    root.set(
        "friends",
        ObjRef::list(&builtins::ARRAY_LIST, [Value::from(&relatives)])?,
    )?;

    let copy = engine.deep_copy_ref(&root)?;
    assert!(!copy.ptr_eq(&root));
    assert!(value_eq(&copy.clone().into(), &root.into()));
    let copied = field(&copy, "friends").list_items()?;
    assert!(value_eq(&copied[0], &relatives.into()));
    Ok(())
}

#[test]
fn one_engine_many_threads() {
    setup();

    let engine = DeepCopy::builder().wrapper(&NODE).build();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|generation| {
                let engine = &engine;
                s.spawn(move || copy_family(engine, generation))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
    });
}
