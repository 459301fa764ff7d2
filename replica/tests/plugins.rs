use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use replica::{
    CopyContext, CopyError, CopyPlugin, DeepCopy, ListPlugin, Nested, ObjRef, Object, Value,
    builtins,
};
use replica_testhelpers::{IPanic, setup};

use crate::model::{NODE, PERSON, field, graph_node, person};

/// Counts the lists it copies and delegates the work to [`ListPlugin`].
struct CountingLists(Arc<AtomicUsize>);

impl CopyPlugin for CountingLists {
    fn name(&self) -> &'static str {
        "counting lists"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        ListPlugin.supports(source)
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        self.0.fetch_add(1, Ordering::Relaxed);
        ListPlugin.instantiate(source, context, nested)
    }

    fn fill_references(&self, source: &ObjRef, context: &CopyContext) -> Result<bool, CopyError> {
        ListPlugin.fill_references(source, context)
    }
}

#[test]
fn lower_priority_plugins_are_tried_first() -> Result<(), IPanic> {
    setup();

    let count = Arc::new(AtomicUsize::new(0));
    let engine = DeepCopy::builder()
        .plugin(CountingLists(count.clone()), 0)
        .build();

    let dave = person("Dave", 22, &["The Hobbit"]);
    let friends = ObjRef::list(&builtins::LINKED_LIST, [Value::from(person("Bob", 20, &[]))])?;
    dave.set("friends", friends)?;

    let copy = engine.deep_copy_ref(&dave)?;
    assert_eq!(count.load(Ordering::Relaxed), 3);
    assert_eq!(field(&copy, "favorite_books").len()?, 1);
    assert_eq!(field(&copy, "friends").len()?, 1);
    Ok(())
}

/// Supports every node, handles none.
struct Bystander(Arc<AtomicUsize>);

impl CopyPlugin for Bystander {
    fn name(&self) -> &'static str {
        "bystander"
    }

    fn supports(&self, _source: &ObjRef) -> bool {
        true
    }

    fn instantiate(
        &self,
        _source: &ObjRef,
        _context: &mut CopyContext,
        _nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        self.0.fetch_add(1, Ordering::Relaxed);
        Ok(false)
    }
}

#[test]
fn declining_plugins_fall_through() -> Result<(), IPanic> {
    setup();

    let asked = Arc::new(AtomicUsize::new(0));
    let engine = DeepCopy::builder()
        .plugin(Bystander(asked.clone()), -10)
        .build();

    let dave = person("Dave", 22, &["The Hobbit", "Dune"]);
    let copy = engine.deep_copy_ref(&dave)?;

    // the person and its book list; titles are wrappers and never reach plugins
    assert_eq!(asked.load(Ordering::Relaxed), 2);
    assert!(!copy.ptr_eq(&dave));
    assert_eq!(field(&copy, "favorite_books").len()?, 2);
    Ok(())
}

/// Builds graph nodes itself, and leaves linking their fields to the engine.
struct NodeMaker;

impl CopyPlugin for NodeMaker {
    fn name(&self) -> &'static str {
        "node maker"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        source.shape() == &NODE
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        context.put_copy_instance_for(source, ObjRef::new(Object::blank(&NODE)));
        for name in ["label", "references"] {
            nested(&source.get(name)?, context)?;
        }
        Ok(true)
    }

    fn fill_references(&self, _source: &ObjRef, _context: &CopyContext) -> Result<bool, CopyError> {
        Ok(false)
    }
}

#[test]
fn generic_fill_runs_when_a_plugin_declines_it() -> Result<(), IPanic> {
    setup();

    let node = graph_node("root");
    let friend = ObjRef::new(Object::blank(&PERSON));
    node.set("references", friend.clone())?;

    let engine = DeepCopy::builder().plugin(NodeMaker, 0).build();
    let copy = engine.deep_copy_ref(&node)?;

    assert!(field(&copy, "label").ptr_eq(&field(&node, "label")));
    let copied_friend = field(&copy, "references");
    assert!(!copied_friend.ptr_eq(&friend));
    assert_eq!(copied_friend.shape(), &PERSON);
    Ok(())
}
