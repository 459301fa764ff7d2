use replica_core::{AccessError, Data, Field, Layout, ObjRef, Value};

/// One instance field of a node that holds something.
#[derive(Clone, Debug)]
pub struct FieldSlot {
    /// Slot index in the node's layout
    pub index: usize,
    /// The field occupying the slot
    pub field: &'static Field,
    /// What the slot holds: a scalar or a reference, never `Null`
    pub value: Value,
}

/// Walks the instance fields of a node that currently hold a value, own
/// fields first, then inherited ones. Shared fields are never visited.
///
/// Slots are read one at a time as the walk advances, so the node is not kept
/// borrowed between items. Nodes that are not structs have no fields.
pub struct FieldsWithValue {
    node: ObjRef,
    layout: Layout,
    index: usize,
}

impl FieldsWithValue {
    /// Starts a walk over `node`. Fails if a struct node does not have one slot
    /// per field of its shape.
    pub fn new(node: &ObjRef) -> Result<Self, AccessError> {
        let shape = node.shape();
        if let Data::Struct(slots) = &*node.data()? {
            let expected = shape.slot_count();
            if slots.len() != expected {
                return Err(AccessError::LayoutMismatch {
                    shape,
                    expected,
                    actual: slots.len(),
                });
            }
        } else if shape.is_struct() {
            return Err(AccessError::WasNotA {
                shape,
                expected: "struct",
            });
        }
        Ok(Self {
            node: node.clone(),
            layout: shape.layout(),
            index: 0,
        })
    }
}

impl Iterator for FieldsWithValue {
    type Item = Result<FieldSlot, AccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let field = self.layout.next()?;
            let index = self.index;
            self.index += 1;
            match self.node.slot(index) {
                Ok(Value::Null) => continue,
                Ok(value) => return Some(Ok(FieldSlot { index, field, value })),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
