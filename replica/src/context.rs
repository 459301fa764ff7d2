use std::collections::HashMap;

use replica_core::{NodeId, ObjRef, Value};

use crate::CopyError;

/// Bookkeeping for one deep copy: which copy belongs to which source node,
/// in which order source nodes were discovered, and which of them are
/// containers to fill once their elements are complete.
///
/// Source nodes are keyed by identity, never by equality. The context holds
/// on to every source it saw, so identities stay valid until it is dropped.
#[derive(Default)]
pub struct CopyContext {
    copies: HashMap<NodeId, ObjRef>,
    discovered: Vec<ObjRef>,
    /// Marked containers whose instantiation has not returned yet.
    marked: Vec<ObjRef>,
    value_dependent: Vec<ObjRef>,
    /// Index of the plugin that instantiated each plugin-handled node.
    pub(crate) handlers: HashMap<NodeId, usize>,
}

impl CopyContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `copy` as the copy of `source`. The first registration of a
    /// source also appends it to the discovery order.
    pub fn put_copy_instance_for(&mut self, source: &ObjRef, copy: ObjRef) {
        if self.copies.insert(source.id(), copy).is_none() {
            self.discovered.push(source.clone());
        }
    }

    /// The copy registered for `source`, if any.
    pub fn copy_instance_for(&self, source: &ObjRef) -> Option<&ObjRef> {
        self.copies.get(&source.id())
    }

    /// Returns true if `source` has a registered copy.
    pub fn exists(&self, source: &ObjRef) -> bool {
        self.copies.contains_key(&source.id())
    }

    /// Marks `source` as a container whose copy is filled in the last phase.
    ///
    /// The container joins [`Self::value_dependent`] once its instantiation
    /// returns, after everything it reaches has been instantiated.
    pub fn register_value_dependent(&mut self, source: &ObjRef) {
        if !self.is_marked(source) {
            self.marked.push(source.clone());
        }
    }

    pub(crate) fn is_marked(&self, source: &ObjRef) -> bool {
        self.marked.iter().any(|m| m.ptr_eq(source))
    }

    /// Moves `source` from the marked containers to the value-dependent
    /// ones, if it was marked.
    pub(crate) fn complete(&mut self, source: &ObjRef) {
        if let Some(index) = self.marked.iter().position(|m| m.ptr_eq(source)) {
            let node = self.marked.remove(index);
            self.value_dependent.push(node);
        }
    }

    /// Completes the containers a plugin marked besides the node it handled.
    pub(crate) fn complete_remaining(&mut self) {
        self.value_dependent.append(&mut self.marked);
    }

    /// Every source node with a registered copy, in discovery order.
    pub fn discovered(&self) -> &[ObjRef] {
        &self.discovered
    }

    /// Containers marked with [`Self::register_value_dependent`], in the order
    /// their instantiation completed. A container reached from inside another
    /// one comes first, however early it was discovered.
    pub fn value_dependent(&self) -> &[ObjRef] {
        &self.value_dependent
    }

    /// Maps a source value to its copy: empty references and scalars map to
    /// themselves, nodes to their registered copy.
    pub fn resolve(&self, source: &Value) -> Result<Value, CopyError> {
        match source {
            Value::Ref(node) => self
                .copy_instance_for(node)
                .map(|copy| Value::Ref(copy.clone()))
                .ok_or(CopyError::Unregistered {
                    shape: node.shape(),
                }),
            other => Ok(other.clone()),
        }
    }

    /// Like [`Self::resolve`], for a node.
    pub fn resolve_node(&self, source: &ObjRef) -> Result<ObjRef, CopyError> {
        self.copy_instance_for(source)
            .cloned()
            .ok_or(CopyError::Unregistered {
                shape: source.shape(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_by_identity() {
        let a = ObjRef::text("same");
        let b = ObjRef::text("same");
        let mut cx = CopyContext::new();

        cx.put_copy_instance_for(&a, a.clone());
        assert!(cx.exists(&a));
        assert!(!cx.exists(&b));

        cx.put_copy_instance_for(&b, ObjRef::text("other"));
        cx.put_copy_instance_for(&a, a.clone());
        assert_eq!(cx.discovered().len(), 2);
        assert!(cx.discovered()[0].ptr_eq(&a));
    }

    #[test]
    fn value_dependents_join_on_completion() {
        let outer = ObjRef::text("outer");
        let inner = ObjRef::text("inner");
        let mut cx = CopyContext::new();

        cx.register_value_dependent(&outer);
        cx.register_value_dependent(&inner);
        cx.register_value_dependent(&outer);
        assert!(cx.value_dependent().is_empty());

        cx.complete(&inner);
        cx.complete(&outer);
        cx.complete(&outer);
        assert_eq!(cx.value_dependent().len(), 2);
        assert!(cx.value_dependent()[0].ptr_eq(&inner));
        assert!(cx.value_dependent()[1].ptr_eq(&outer));
    }

    #[test]
    fn resolve_passes_scalars_through() {
        let cx = CopyContext::new();
        assert!(cx.resolve(&Value::Null).unwrap().is_null());
        assert!(cx.resolve(&Value::from(3)).unwrap().as_scalar().is_some());
        let err = cx.resolve(&ObjRef::text("x").into()).unwrap_err();
        assert!(matches!(err, CopyError::Unregistered { .. }));
    }
}
