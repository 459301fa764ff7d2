use replica::{CopyContext, CopyError, CopyPlugin, Nested, ObjRef, Value, builtins};

/// Copies [`builtins::FIXED_LIST`] nodes, which the built-in list plugin
/// cannot: the copy is allocated at its final length with empty slots, and
/// the slots are replaced one by one once every element has a copy.
pub struct FixedListPlugin;

impl CopyPlugin for FixedListPlugin {
    fn name(&self) -> &'static str {
        "fixed list plugin"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        source.shape() == &builtins::FIXED_LIST
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        let items = source.list_items()?;
        let copy = ObjRef::list(source.shape(), vec![Value::Null; items.len()])?;
        context.put_copy_instance_for(source, copy);
        for item in &items {
            nested(item, context)?;
        }
        Ok(true)
    }

    fn fill_references(&self, source: &ObjRef, context: &CopyContext) -> Result<bool, CopyError> {
        let copy = context.resolve_node(source)?;
        for (index, item) in source.list_items()?.iter().enumerate() {
            copy.list_set(index, context.resolve(item)?)?;
        }
        Ok(true)
    }
}
