use replica_core::{AccessError, Data, Def, ObjRef, Object};

use super::{CopyPlugin, Nested};
use crate::{CopyContext, CopyError, trace};

/// Copies sets, hashed or sorted. The copy keeps the source's comparator.
///
/// Sets are value-dependent: element copies are only inserted once they are
/// complete, so hashing and ordering see their final state.
pub struct SetPlugin;

impl SetPlugin {
    fn fail(&self, source: &ObjRef, err: AccessError) -> CopyError {
        CopyError::plugin(self.name(), source.shape(), err)
    }
}

impl CopyPlugin for SetPlugin {
    fn name(&self) -> &'static str {
        "set plugin"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        matches!(source.shape().def, Def::Set(_))
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        let (empty, items) = {
            let data = source.data().map_err(|e| self.fail(source, e))?;
            let Data::Set(set) = &*data else {
                return Err(self.fail(
                    source,
                    AccessError::WasNotA {
                        shape: source.shape(),
                        expected: "set",
                    },
                ));
            };
            (set.empty_like(), set.iter().cloned().collect::<Vec<_>>())
        };
        let copy = ObjRef::new(Object::new(source.shape(), Data::Set(empty)));
        context.put_copy_instance_for(source, copy);
        context.register_value_dependent(source);
        for item in &items {
            nested(item, context)?;
        }
        Ok(true)
    }

    fn fill_value_dependents(
        &self,
        source: &ObjRef,
        context: &CopyContext,
    ) -> Result<bool, CopyError> {
        let copy = context.resolve_node(source)?;
        let items = source.set_items().map_err(|e| self.fail(source, e))?;
        trace!("inserting {} elements into {:?}", items.len(), copy);
        for item in &items {
            copy.set_insert(context.resolve(item)?)
                .map_err(|e| self.fail(source, e))?;
        }
        Ok(true)
    }
}
