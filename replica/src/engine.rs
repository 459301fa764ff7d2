use std::collections::{HashMap, HashSet};

use replica_core::{BoxError, Component, Data, Def, ObjRef, Object, Shape, Value};

use crate::{
    ConstructionFailure, CopyContext, CopyError, CopyPlugin, DeepCopyBuilder, FieldsWithValue,
    debug, trace,
};

pub(crate) type WrapperPredicate = dyn Fn(&'static Shape) -> bool + Send + Sync;
pub(crate) type CustomCopyFn = dyn Fn(&ObjRef) -> Result<ObjRef, BoxError> + Send + Sync;
pub(crate) type SupplierFn = dyn Fn() -> Object + Send + Sync;

/// How a node is copied, decided by its shape alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// A registered function produces the copy
    Custom,
    /// Array of scalars, copied in one go
    Primitives,
    /// Array of references, slots linked in phase 2
    References,
    /// Shared with the source, never traversed
    Wrapper,
    /// A plugin if one takes it, the generic field-by-field path otherwise
    Traversed,
}

/// A configured deep copy engine.
///
/// Configuration is fixed at [`DeepCopyBuilder::build`]; every call to
/// [`DeepCopy::deep_copy`] works on a private [`CopyContext`], so one engine
/// can serve many threads.
///
/// A copy runs in three phases:
///
/// 1. every reachable node gets a registered copy, depth first, before its
///    contents are visited, so cycles and shared nodes resolve to one copy;
/// 2. copies are linked to the copies of what their sources reference, in
///    discovery order;
/// 3. value-dependent containers (sets, maps) receive their now complete
///    elements, in the order their instantiation completed, so a container
///    is filled after every container it holds.
pub struct DeepCopy {
    pub(crate) wrappers: HashSet<&'static str>,
    pub(crate) wrapper_predicates: Vec<Box<WrapperPredicate>>,
    pub(crate) custom_copies: HashMap<&'static str, Box<CustomCopyFn>>,
    pub(crate) suppliers: HashMap<&'static str, Box<SupplierFn>>,
    pub(crate) plugins: Vec<Box<dyn CopyPlugin>>,
}

impl Default for DeepCopy {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepCopy {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A builder preloaded with the default wrappers and the built-in plugins.
    pub fn builder() -> DeepCopyBuilder {
        DeepCopyBuilder::new()
    }

    /// Returns true if values of `shape` are shared with the copy instead of copied.
    pub fn is_wrapper(&self, shape: &'static Shape) -> bool {
        self.wrappers.contains(shape.type_identifier)
            || self.wrapper_predicates.iter().any(|p| p(shape))
    }

    /// Names of the registered plugins, in the order they are tried.
    pub fn plugin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.name())
    }

    /// Deep copies `root`. Empty references and scalars are returned as is.
    pub fn deep_copy(&self, root: &Value) -> Result<Value, CopyError> {
        match root {
            Value::Ref(node) => Ok(Value::Ref(self.deep_copy_ref(node)?)),
            other => Ok(other.clone()),
        }
    }

    /// Deep copies the graph reachable from `root` and returns the copy of `root`.
    pub fn deep_copy_ref(&self, root: &ObjRef) -> Result<ObjRef, CopyError> {
        let mut context = CopyContext::new();
        debug!("deep copy of {:?}", root);

        self.instantiate(&Value::Ref(root.clone()), &mut context)?;
        context.complete_remaining();
        debug!(
            "instantiated {} nodes, {} value-dependent",
            context.discovered().len(),
            context.value_dependent().len()
        );

        self.fill_references(&context)?;
        self.fill_value_dependents(&context)?;

        let copy = context.resolve_node(root)?;
        debug!("deep copy of {:?} done: {:?}", root, copy);
        Ok(copy)
    }

    fn strategy(&self, shape: &'static Shape) -> Strategy {
        if self.custom_copies.contains_key(shape.type_identifier) {
            return Strategy::Custom;
        }
        if let Def::Array(ad) = shape.def {
            return match ad.component {
                Component::Scalar(_) => Strategy::Primitives,
                Component::Reference => Strategy::References,
            };
        }
        if self.is_wrapper(shape) {
            return Strategy::Wrapper;
        }
        Strategy::Traversed
    }

    /// Phase 1: registers a copy for `value` and everything it reaches.
    fn instantiate(&self, value: &Value, context: &mut CopyContext) -> Result<(), CopyError> {
        let Value::Ref(source) = value else {
            return Ok(());
        };
        if context.exists(source) {
            return Ok(());
        }
        let shape = source.shape();
        let strategy = self.strategy(shape);
        trace!("instantiating {:?} as {:?}", source, strategy);

        match strategy {
            Strategy::Custom => {
                let copy = match self.custom_copies.get(shape.type_identifier) {
                    Some(copy_fn) => {
                        copy_fn(source).map_err(|cause| CopyError::plugin("custom copy", shape, cause))?
                    }
                    None => return Err(CopyError::Unregistered { shape }),
                };
                context.put_copy_instance_for(source, copy);
            }
            Strategy::Primitives => {
                let elements = source.primitive_elements()?;
                context.put_copy_instance_for(
                    source,
                    ObjRef::from_data(shape, Data::Primitives(elements)),
                );
            }
            Strategy::References => {
                let slots = source.array_slots()?;
                context.put_copy_instance_for(
                    source,
                    ObjRef::from_data(shape, Data::Array(vec![Value::Null; slots.len()])),
                );
                for slot in &slots {
                    self.instantiate(slot, context)?;
                }
            }
            Strategy::Wrapper => context.put_copy_instance_for(source, source.clone()),
            Strategy::Traversed => {
                if !self.instantiate_with_plugin(source, context)? {
                    self.instantiate_fields(source, context)?;
                }
            }
        }
        Ok(())
    }

    fn instantiate_with_plugin(
        &self,
        source: &ObjRef,
        context: &mut CopyContext,
    ) -> Result<bool, CopyError> {
        let nested = |value: &Value, context: &mut CopyContext| self.instantiate(value, context);
        for (index, plugin) in self.plugins.iter().enumerate() {
            if !plugin.supports(source) {
                continue;
            }
            if !plugin.instantiate(source, context, &nested)? {
                if context.exists(source) || context.is_marked(source) {
                    return Err(CopyError::plugin(
                        plugin.name(),
                        source.shape(),
                        "declined the node after registering it",
                    ));
                }
                trace!("{} passed on {:?}", plugin.name(), source);
                continue;
            }
            if !context.exists(source) {
                return Err(CopyError::plugin(
                    plugin.name(),
                    source.shape(),
                    "handled the node without registering a copy",
                ));
            }
            trace!("{} handled {:?}", plugin.name(), source);
            context.handlers.insert(source.id(), index);
            context.complete(source);
            return Ok(true);
        }
        Ok(false)
    }

    /// The generic path: a blank instance, registered before the fields are
    /// visited. Scalars are copied right away, references instantiated.
    fn instantiate_fields(&self, source: &ObjRef, context: &mut CopyContext) -> Result<(), CopyError> {
        let mut blank = self.blank_instance(source)?;
        blank.clear_references();
        let copy = ObjRef::new(blank);
        context.put_copy_instance_for(source, copy.clone());

        for slot in FieldsWithValue::new(source)? {
            let slot = slot?;
            if slot.field.is_scalar() {
                copy.set_slot(slot.index, slot.value)?;
            } else {
                self.instantiate(&slot.value, context)?;
            }
        }
        Ok(())
    }

    /// A blank instance of `source`'s type: from its instance supplier, as a
    /// clone of a reference-free payload, or from its constructor.
    fn blank_instance(&self, source: &ObjRef) -> Result<Object, CopyError> {
        let shape = source.shape();
        let payload = source.data()?.clone_payload();

        let object = if let Some(supplier) = self.suppliers.get(shape.type_identifier) {
            supplier()
        } else if let Some(data) = payload {
            Object::new(shape, data)
        } else if let Some(construct) = shape.vtable.construct {
            construct().map_err(|cause| CopyError::Construction {
                shape,
                failure: ConstructionFailure::Raised(cause),
            })?
        } else {
            return Err(CopyError::Construction {
                shape,
                failure: ConstructionFailure::Unconstructible,
            });
        };

        if object.shape() != shape {
            return Err(CopyError::Construction {
                shape,
                failure: ConstructionFailure::WrongShape {
                    produced: object.shape(),
                },
            });
        }
        Ok(object)
    }

    /// Phase 2: links every copy to the copies of what its source references.
    fn fill_references(&self, context: &CopyContext) -> Result<(), CopyError> {
        for source in context.discovered() {
            match self.strategy(source.shape()) {
                Strategy::Custom | Strategy::Primitives | Strategy::Wrapper => {}
                Strategy::References => {
                    let copy = context.resolve_node(source)?;
                    for (index, slot) in source.array_slots()?.iter().enumerate() {
                        copy.array_set(index, context.resolve(slot)?)?;
                    }
                }
                Strategy::Traversed => {
                    if let Some(plugin) = self.handler(source, context) {
                        if plugin.fill_references(source, context)? {
                            continue;
                        }
                        trace!("{} left the fields of {:?} to the generic fill", plugin.name(), source);
                    }
                    self.fill_fields(source, context)?;
                }
            }
        }
        Ok(())
    }

    fn fill_fields(&self, source: &ObjRef, context: &CopyContext) -> Result<(), CopyError> {
        let copy = context.resolve_node(source)?;
        for slot in FieldsWithValue::new(source)? {
            let slot = slot?;
            if !slot.field.is_scalar() {
                copy.set_slot(slot.index, context.resolve(&slot.value)?)?;
            }
        }
        Ok(())
    }

    /// Phase 3: fills value-dependent containers, innermost first.
    fn fill_value_dependents(&self, context: &CopyContext) -> Result<(), CopyError> {
        for source in context.value_dependent() {
            if self.strategy(source.shape()) == Strategy::Custom {
                continue;
            }
            let Some(plugin) = self.handler(source, context) else {
                continue;
            };
            if !plugin.fill_value_dependents(source, context)? {
                trace!("{} did not fill {:?}", plugin.name(), source);
            }
        }
        Ok(())
    }

    fn handler(&self, source: &ObjRef, context: &CopyContext) -> Option<&dyn CopyPlugin> {
        let index = *context.handlers.get(&source.id())?;
        self.plugins.get(index).map(|p| p.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_core::builtins;

    #[test]
    fn default_wrappers() {
        replica_testhelpers::setup();

        let engine = DeepCopy::new();
        assert!(engine.is_wrapper(&builtins::TEXT));
        assert!(engine.is_wrapper(&builtins::BOXED_CHAR));
        assert!(engine.is_wrapper(&builtins::DECIMAL));
        assert!(engine.is_wrapper(&builtins::DATE_TIME));
        assert!(!engine.is_wrapper(&builtins::ARRAY_LIST));
        assert!(!engine.is_wrapper(&builtins::INT_ARRAY));
    }

    #[test]
    fn arrays_win_over_wrapper_rules() {
        replica_testhelpers::setup();

        let engine = DeepCopy::builder()
            .wrapper(&builtins::OBJECT_ARRAY)
            .build();
        assert_eq!(engine.strategy(&builtins::OBJECT_ARRAY), Strategy::References);
        assert_eq!(engine.strategy(&builtins::TEXT), Strategy::Wrapper);
        assert_eq!(engine.strategy(&builtins::HASH_MAP), Strategy::Traversed);
    }

    #[test]
    fn scalars_and_null_copy_to_themselves() {
        replica_testhelpers::setup();

        let engine = DeepCopy::new();
        assert!(engine.deep_copy(&Value::Null).unwrap().is_null());
        let copy = engine.deep_copy(&Value::from(7)).unwrap();
        assert_eq!(copy.as_scalar().and_then(|s| s.as_int()), Some(7));
    }
}
