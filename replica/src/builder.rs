use std::collections::{HashMap, HashSet};

use replica_core::{BoxError, ObjRef, Object, Shape, builtins};

use crate::engine::{CustomCopyFn, SupplierFn, WrapperPredicate};
use crate::{CopyPlugin, DeepCopy, ListPlugin, MapPlugin, SetPlugin};

/// Priority of the built-in list, set and map plugins: tried last.
pub const BUILTIN_PRIORITY: i32 = i32::MAX;

/// Configures a [`DeepCopy`] engine.
///
/// Starts with the default configuration: text and boxed scalars are
/// wrappers, and so are enums, dates and numbers; lists, sets and maps are
/// handled by the built-in plugins at [`BUILTIN_PRIORITY`].
///
/// Types are matched exactly, by [`Shape::type_identifier`]: registering a
/// parent shape does not cover the shapes that extend it.
pub struct DeepCopyBuilder {
    wrappers: HashSet<&'static str>,
    wrapper_predicates: Vec<Box<WrapperPredicate>>,
    custom_copies: HashMap<&'static str, Box<CustomCopyFn>>,
    suppliers: HashMap<&'static str, Box<SupplierFn>>,
    plugins: Vec<(i32, Box<dyn CopyPlugin>)>,
}

impl DeepCopyBuilder {
    pub(crate) fn new() -> Self {
        let builder = Self {
            wrappers: HashSet::new(),
            wrapper_predicates: Vec::new(),
            custom_copies: HashMap::new(),
            suppliers: HashMap::new(),
            plugins: Vec::new(),
        };
        [
            &builtins::TEXT,
            &builtins::BOXED_BOOL,
            &builtins::BOXED_INT,
            &builtins::BOXED_FLOAT,
            &builtins::BOXED_CHAR,
        ]
        .into_iter()
        .fold(builder, Self::wrapper)
        .wrapper_predicate(Shape::is_enum)
        .wrapper_predicate(Shape::is_temporal)
        .wrapper_predicate(Shape::is_numeric)
        .plugin(ListPlugin, BUILTIN_PRIORITY)
        .plugin(SetPlugin, BUILTIN_PRIORITY)
        .plugin(MapPlugin, BUILTIN_PRIORITY)
    }

    /// Values of exactly this type are shared with the copy, never traversed.
    pub fn wrapper(mut self, shape: &'static Shape) -> Self {
        self.wrappers.insert(shape.type_identifier);
        self
    }

    /// Values of every type matching `predicate` are shared with the copy.
    pub fn wrapper_predicate(
        mut self,
        predicate: impl Fn(&'static Shape) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.wrapper_predicates.push(Box::new(predicate));
        self
    }

    /// Values of exactly this type are copied by `copy`, and nothing else:
    /// what it returns is used as is.
    pub fn custom_copy(
        mut self,
        shape: &'static Shape,
        copy: impl Fn(&ObjRef) -> Result<ObjRef, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.custom_copies
            .insert(shape.type_identifier, Box::new(copy));
        self
    }

    /// Blank instances of exactly this type come from `supplier` instead of
    /// the type's constructor.
    pub fn instance_supplier(
        mut self,
        shape: &'static Shape,
        supplier: impl Fn() -> Object + Send + Sync + 'static,
    ) -> Self {
        self.suppliers
            .insert(shape.type_identifier, Box::new(supplier));
        self
    }

    /// Adds a plugin. Lower priorities are tried first; equal priorities in
    /// registration order.
    pub fn plugin(mut self, plugin: impl CopyPlugin + 'static, priority: i32) -> Self {
        self.plugins.push((priority, Box::new(plugin)));
        self
    }

    /// Finishes the engine.
    pub fn build(mut self) -> DeepCopy {
        self.plugins.sort_by_key(|(priority, _)| *priority);
        DeepCopy {
            wrappers: self.wrappers,
            wrapper_predicates: self.wrapper_predicates,
            custom_copies: self.custom_copies,
            suppliers: self.suppliers,
            plugins: self.plugins.into_iter().map(|(_, p)| p).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CopyContext, CopyError, Nested};

    struct Named(&'static str);

    impl CopyPlugin for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn supports(&self, _source: &ObjRef) -> bool {
            false
        }

        fn instantiate(
            &self,
            _source: &ObjRef,
            _context: &mut CopyContext,
            _nested: Nested<'_>,
        ) -> Result<bool, CopyError> {
            Ok(false)
        }
    }

    #[test]
    fn plugins_are_ordered_by_priority_then_registration() {
        replica_testhelpers::setup();

        let engine = DeepCopy::builder()
            .plugin(Named("late"), 10)
            .plugin(Named("first"), -1)
            .plugin(Named("tie"), 10)
            .build();
        let names: Vec<_> = engine.plugin_names().collect();
        assert_eq!(
            names,
            ["first", "late", "tie", "list plugin", "set plugin", "map plugin"]
        );
    }
}
