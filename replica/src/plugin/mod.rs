//! Strategies for copying type families the generic field-by-field path
//! cannot handle, such as containers that are only reachable through their
//! own API.

use replica_core::{AccessError, ObjRef, Object, Value};

use crate::{CopyContext, CopyError};

mod list;
pub use list::ListPlugin;

mod set;
pub use set::SetPlugin;

mod map;
pub use map::MapPlugin;

/// Instantiates a nested value: registers a copy for it and everything it
/// reaches. Handed to [`CopyPlugin::instantiate`] for each element a plugin
/// exposes.
pub type Nested<'a> = &'a dyn Fn(&Value, &mut CopyContext) -> Result<(), CopyError>;

/// A pluggable copy strategy.
///
/// Plugins are tried in ascending priority order; the first one that
/// [supports](Self::supports) a node and reports it handled from
/// [`instantiate`](Self::instantiate) owns that node for the rest of the copy.
///
/// Errors returned by the [`Nested`] callback must be passed through
/// unchanged. A plugin's own failures are reported as [`CopyError::Plugin`].
pub trait CopyPlugin: Send + Sync {
    /// Name used in errors and traces.
    fn name(&self) -> &'static str;

    /// Returns true if this plugin knows how to copy `source`.
    fn supports(&self, source: &ObjRef) -> bool;

    /// Allocates the copy of `source`, registers it with
    /// [`CopyContext::put_copy_instance_for`], optionally marks `source` with
    /// [`CopyContext::register_value_dependent`], and calls `nested` on every
    /// value `source` holds.
    ///
    /// Returns false to let the next plugin, or the generic path, handle the node.
    /// A plugin that declines must leave the node unregistered and unmarked.
    fn instantiate(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
        nested: Nested<'_>,
    ) -> Result<bool, CopyError>;

    /// Links the copy to the copies of what `source` references. Every
    /// reachable node has a registered copy at this point, but those copies
    /// may not be complete yet.
    ///
    /// Returns false to have the generic field fill run instead.
    fn fill_references(&self, source: &ObjRef, context: &CopyContext) -> Result<bool, CopyError> {
        let _ = (source, context);
        Ok(true)
    }

    /// Inserts the now complete copies of the elements of a value-dependent
    /// container. Called in the order instantiation of the containers
    /// completed, so nested containers are filled before the containers
    /// holding them.
    fn fill_value_dependents(
        &self,
        source: &ObjRef,
        context: &CopyContext,
    ) -> Result<bool, CopyError> {
        let _ = (source, context);
        Ok(true)
    }
}

/// A blank instance of `source`'s own type, from its constructor.
pub(crate) fn construct_like(plugin: &'static str, source: &ObjRef) -> Result<Object, CopyError> {
    let shape = source.shape();
    let construct = shape.vtable.construct.ok_or_else(|| {
        CopyError::plugin(
            plugin,
            shape,
            AccessError::Unsupported {
                shape,
                operation: "construction",
            },
        )
    })?;
    let object = construct().map_err(|cause| CopyError::plugin(plugin, shape, cause))?;
    if object.shape() != shape {
        return Err(CopyError::plugin(
            plugin,
            shape,
            format!("constructor produced {}", object.shape()),
        ));
    }
    Ok(object)
}
