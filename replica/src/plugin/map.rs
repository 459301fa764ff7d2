use replica_core::{AccessError, Data, Def, ObjRef, Object};

use super::{CopyPlugin, Nested};
use crate::{CopyContext, CopyError, trace};

/// Copies maps, hashed or sorted. The copy keeps the source's key comparator.
///
/// Maps are value-dependent, like sets: entries go in once keys and values
/// are complete.
pub struct MapPlugin;

impl MapPlugin {
    fn fail(&self, source: &ObjRef, err: AccessError) -> CopyError {
        CopyError::plugin(self.name(), source.shape(), err)
    }
}

impl CopyPlugin for MapPlugin {
    fn name(&self) -> &'static str {
        "map plugin"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        matches!(source.shape().def, Def::Map(_))
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        let (empty, entries) = {
            let data = source.data().map_err(|e| self.fail(source, e))?;
            let Data::Map(map) = &*data else {
                return Err(self.fail(
                    source,
                    AccessError::WasNotA {
                        shape: source.shape(),
                        expected: "map",
                    },
                ));
            };
            let entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            (map.empty_like(), entries)
        };
        let copy = ObjRef::new(Object::new(source.shape(), Data::Map(empty)));
        context.put_copy_instance_for(source, copy);
        context.register_value_dependent(source);
        for (key, value) in &entries {
            nested(key, context)?;
            nested(value, context)?;
        }
        Ok(true)
    }

    fn fill_value_dependents(
        &self,
        source: &ObjRef,
        context: &CopyContext,
    ) -> Result<bool, CopyError> {
        let copy = context.resolve_node(source)?;
        let entries = source.map_entries().map_err(|e| self.fail(source, e))?;
        trace!("inserting {} entries into {:?}", entries.len(), copy);
        for (key, value) in &entries {
            copy.map_insert(context.resolve(key)?, context.resolve(value)?)
                .map_err(|e| self.fail(source, e))?;
        }
        Ok(true)
    }
}
