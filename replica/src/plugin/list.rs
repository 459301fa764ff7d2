use replica_core::{AccessError, Def, ObjRef};

use super::{CopyPlugin, Nested, construct_like};
use crate::{CopyContext, CopyError, trace};

/// Copies lists: a fresh list of the same type, items appended in order.
///
/// Lists are not value-dependent: item copies are appended while they are
/// still being linked. Fixed-size lists have no constructor and cannot be
/// appended to; they need a plugin of their own.
pub struct ListPlugin;

impl ListPlugin {
    fn fail(&self, source: &ObjRef, err: AccessError) -> CopyError {
        CopyError::plugin(self.name(), source.shape(), err)
    }
}

impl CopyPlugin for ListPlugin {
    fn name(&self) -> &'static str {
        "list plugin"
    }

    fn supports(&self, source: &ObjRef) -> bool {
        matches!(source.shape().def, Def::List(_))
    }

    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError> {
        let items = source.list_items().map_err(|e| self.fail(source, e))?;
        let copy = ObjRef::new(construct_like(self.name(), source)?);
        context.put_copy_instance_for(source, copy);
        for item in &items {
            nested(item, context)?;
        }
        Ok(true)
    }

    fn fill_references(&self, source: &ObjRef, context: &CopyContext) -> Result<bool, CopyError> {
        let copy = context.resolve_node(source)?;
        let items = source.list_items().map_err(|e| self.fail(source, e))?;
        trace!("appending {} items to {:?}", items.len(), copy);
        for item in &items {
            copy.push(context.resolve(item)?)
                .map_err(|e| self.fail(source, e))?;
        }
        Ok(true)
    }
}
