use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};

use crate::{AccessError, Value, hash_code, natural_cmp, value_eq};

/// An element or key stored in a hashed container, with its hash code computed
/// once, at insertion time.
#[derive(Clone, Debug)]
pub struct Key {
    value: Value,
    hash: u64,
}

impl Key {
    /// Computes the hash code of `value` and wraps it.
    pub fn new(value: Value) -> Result<Self, AccessError> {
        let hash = hash_code(&value)?;
        Ok(Self { value, hash })
    }

    /// The wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The hash code computed when the key was created.
    pub fn hash_code(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && value_eq(&self.value, &other.value)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

type CompareFn = dyn Fn(&Value, &Value) -> Result<Ordering, AccessError>;

/// An explicit ordering function for sorted containers.
///
/// Cloning a comparator shares the function: a container created with
/// [`SetData::empty_like`] orders its elements exactly like the source set.
#[derive(Clone)]
pub struct Comparator(Rc<CompareFn>);

impl Comparator {
    /// Wraps an ordering function.
    pub fn new(f: impl Fn(&Value, &Value) -> Result<Ordering, AccessError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Orders two values.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, AccessError> {
        (self.0)(a, b)
    }

    /// Returns true if both comparators share the same function.
    pub fn ptr_eq(&self, other: &Comparator) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparator({:p})", Rc::as_ptr(&self.0))
    }
}

fn compare(a: &Value, b: &Value, comparator: Option<&Comparator>) -> Result<Ordering, AccessError> {
    match comparator {
        Some(comparator) => comparator.compare(a, b),
        None => natural_cmp(a, b),
    }
}

/// Binary search with a fallible ordering. `Ok(index)` if found, `Err(insertion point)` if not.
fn search<T>(
    items: &[T],
    key: impl Fn(&T) -> &Value,
    needle: &Value,
    comparator: Option<&Comparator>,
) -> Result<Result<usize, usize>, AccessError> {
    let (mut lo, mut hi) = (0, items.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match compare(key(&items[mid]), needle, comparator)? {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return Ok(Ok(mid)),
        }
    }
    Ok(Err(lo))
}

/// Where a value goes in a container, computed before the container is
/// borrowed mutably.
#[derive(Debug)]
pub enum Slot {
    /// An equal element or key already sits at this index
    Occupied(usize),
    /// Not present in a hashed container
    Hashed(Key),
    /// Not present in a sorted container; insert at this index
    Sorted(usize),
}

/// Elements of a set.
#[derive(Debug)]
pub enum SetData {
    /// Placement by hash and equality, iteration in insertion order
    Hashed(IndexSet<Key>),
    /// Placement and iteration by the comparator, or natural order without one
    Sorted {
        /// Explicit ordering function
        comparator: Option<Comparator>,
        /// Elements, kept ordered
        items: Vec<Value>,
    },
}

impl SetData {
    /// An empty hashed set.
    pub fn hashed() -> Self {
        SetData::Hashed(IndexSet::new())
    }

    /// An empty sorted set.
    pub fn sorted(comparator: Option<Comparator>) -> Self {
        SetData::Sorted {
            comparator,
            items: Vec::new(),
        }
    }

    /// An empty set of the same kind, with the same comparator.
    pub fn empty_like(&self) -> Self {
        match self {
            SetData::Hashed(_) => SetData::hashed(),
            SetData::Sorted { comparator, .. } => SetData::sorted(comparator.clone()),
        }
    }

    /// The explicit ordering function, if any.
    pub fn comparator(&self) -> Option<&Comparator> {
        match self {
            SetData::Hashed(_) => None,
            SetData::Sorted { comparator, .. } => comparator.as_ref(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            SetData::Hashed(set) => set.len(),
            SetData::Sorted { items, .. } => items.len(),
        }
    }

    /// Returns true if the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates in container order.
    pub fn iter(&self) -> SetIter<'_> {
        match self {
            SetData::Hashed(set) => SetIter::Hashed(set.iter()),
            SetData::Sorted { items, .. } => SetIter::Sorted(items.iter()),
        }
    }

    /// Finds where `value` belongs, using its hash code and equality, or the ordering.
    pub fn locate(&self, value: &Value) -> Result<Slot, AccessError> {
        match self {
            SetData::Hashed(set) => {
                let key = Key::new(value.clone())?;
                Ok(match set.get_index_of(&key) {
                    Some(index) => Slot::Occupied(index),
                    None => Slot::Hashed(key),
                })
            }
            SetData::Sorted { comparator, items } => {
                Ok(match search(items, |v| v, value, comparator.as_ref())? {
                    Ok(index) => Slot::Occupied(index),
                    Err(index) => Slot::Sorted(index),
                })
            }
        }
    }

    /// Puts `value` at a slot returned by [`Self::locate`] on this very set.
    /// Returns false if an equal element was already present.
    pub fn place(&mut self, slot: Slot, value: Value) -> bool {
        match (self, slot) {
            (_, Slot::Occupied(_)) => false,
            (SetData::Hashed(set), Slot::Hashed(key)) => set.insert(key),
            (SetData::Sorted { items, .. }, Slot::Sorted(index)) => {
                items.insert(index.min(items.len()), value);
                true
            }
            (SetData::Hashed(set), Slot::Sorted(_)) => Key::new(value).is_ok_and(|k| set.insert(k)),
            (SetData::Sorted { items, .. }, Slot::Hashed(key)) => {
                items.push(key.value);
                true
            }
        }
    }

    /// Inserts `value`. Returns false if an equal element was already present.
    pub fn insert(&mut self, value: Value) -> Result<bool, AccessError> {
        let slot = self.locate(&value)?;
        Ok(self.place(slot, value))
    }

    /// Returns true if an element equal to `value` is present.
    pub fn contains(&self, value: &Value) -> Result<bool, AccessError> {
        Ok(matches!(self.locate(value)?, Slot::Occupied(_)))
    }

    /// Sum of the element hash codes.
    pub fn hash_sum(&self) -> Result<u64, AccessError> {
        match self {
            SetData::Hashed(set) => Ok(set
                .iter()
                .fold(0u64, |acc, key| acc.wrapping_add(key.hash))),
            SetData::Sorted { items, .. } => items
                .iter()
                .try_fold(0u64, |acc, v| Ok(acc.wrapping_add(hash_code(v)?))),
        }
    }
}

/// Iterator over the elements of a [`SetData`].
pub enum SetIter<'a> {
    #[doc(hidden)]
    Hashed(indexmap::set::Iter<'a, Key>),
    #[doc(hidden)]
    Sorted(core::slice::Iter<'a, Value>),
}

impl<'a> Iterator for SetIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SetIter::Hashed(it) => it.next().map(Key::value),
            SetIter::Sorted(it) => it.next(),
        }
    }
}

/// Entries of a map.
#[derive(Debug)]
pub enum MapData {
    /// Placement by key hash and equality, iteration in insertion order
    Hashed(IndexMap<Key, Value>),
    /// Placement and iteration by key, using the comparator or natural order
    Sorted {
        /// Explicit key ordering function
        comparator: Option<Comparator>,
        /// Entries, kept ordered by key
        entries: Vec<(Value, Value)>,
    },
}

impl MapData {
    /// An empty hashed map.
    pub fn hashed() -> Self {
        MapData::Hashed(IndexMap::new())
    }

    /// An empty sorted map.
    pub fn sorted(comparator: Option<Comparator>) -> Self {
        MapData::Sorted {
            comparator,
            entries: Vec::new(),
        }
    }

    /// An empty map of the same kind, with the same comparator.
    pub fn empty_like(&self) -> Self {
        match self {
            MapData::Hashed(_) => MapData::hashed(),
            MapData::Sorted { comparator, .. } => MapData::sorted(comparator.clone()),
        }
    }

    /// The explicit key ordering function, if any.
    pub fn comparator(&self) -> Option<&Comparator> {
        match self {
            MapData::Hashed(_) => None,
            MapData::Sorted { comparator, .. } => comparator.as_ref(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            MapData::Hashed(map) => map.len(),
            MapData::Sorted { entries, .. } => entries.len(),
        }
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(key, value)` pairs in container order.
    pub fn iter(&self) -> MapIter<'_> {
        match self {
            MapData::Hashed(map) => MapIter::Hashed(map.iter()),
            MapData::Sorted { entries, .. } => MapIter::Sorted(entries.iter()),
        }
    }

    /// Finds where `key` belongs.
    pub fn locate(&self, key: &Value) -> Result<Slot, AccessError> {
        match self {
            MapData::Hashed(map) => {
                let key = Key::new(key.clone())?;
                Ok(match map.get_index_of(&key) {
                    Some(index) => Slot::Occupied(index),
                    None => Slot::Hashed(key),
                })
            }
            MapData::Sorted {
                comparator,
                entries,
            } => Ok(
                match search(entries, |(k, _)| k, key, comparator.as_ref())? {
                    Ok(index) => Slot::Occupied(index),
                    Err(index) => Slot::Sorted(index),
                },
            ),
        }
    }

    /// Puts an entry at a slot returned by [`Self::locate`] on this very map.
    /// Returns the value previously associated with the key.
    pub fn place(&mut self, slot: Slot, key: Value, value: Value) -> Option<Value> {
        match (self, slot) {
            (MapData::Hashed(map), Slot::Occupied(index)) => map
                .get_index_mut(index)
                .map(|(_, old)| core::mem::replace(old, value)),
            (MapData::Sorted { entries, .. }, Slot::Occupied(index)) => entries
                .get_mut(index)
                .map(|(_, old)| core::mem::replace(old, value)),
            (MapData::Hashed(map), Slot::Hashed(key)) => map.insert(key, value),
            (MapData::Sorted { entries, .. }, Slot::Sorted(index)) => {
                entries.insert(index.min(entries.len()), (key, value));
                None
            }
            (MapData::Hashed(map), Slot::Sorted(_)) => {
                Key::new(key).ok().and_then(|k| map.insert(k, value))
            }
            (MapData::Sorted { entries, .. }, Slot::Hashed(key)) => {
                entries.push((key.value, value));
                None
            }
        }
    }

    /// Associates `value` with `key`. Returns the previous value, if any.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>, AccessError> {
        let slot = self.locate(&key)?;
        Ok(self.place(slot, key, value))
    }

    /// Looks up the value associated with `key`.
    pub fn get(&self, key: &Value) -> Result<Option<&Value>, AccessError> {
        Ok(match self.locate(key)? {
            Slot::Occupied(index) => match self {
                MapData::Hashed(map) => map.get_index(index).map(|(_, v)| v),
                MapData::Sorted { entries, .. } => entries.get(index).map(|(_, v)| v),
            },
            _ => None,
        })
    }

    /// Sum over the entries of `hash(key) ^ hash(value)`.
    pub fn hash_sum(&self) -> Result<u64, AccessError> {
        self.iter().try_fold(0u64, |acc, (k, v)| {
            Ok(acc.wrapping_add(hash_code(k)? ^ hash_code(v)?))
        })
    }
}

/// Iterator over the entries of a [`MapData`].
pub enum MapIter<'a> {
    #[doc(hidden)]
    Hashed(indexmap::map::Iter<'a, Key, Value>),
    #[doc(hidden)]
    Sorted(core::slice::Iter<'a, (Value, Value)>),
}

impl<'a> Iterator for MapIter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MapIter::Hashed(it) => it.next().map(|(k, v)| (k.value(), v)),
            MapIter::Sorted(it) => it.next().map(|(k, v)| (k, v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjRef, Scalar};

    fn int(i: i64) -> Value {
        Value::Scalar(Scalar::Int(i))
    }

    #[test]
    fn hashed_set_keeps_insertion_order_and_rejects_duplicates() {
        let mut set = SetData::hashed();
        assert!(set.insert(int(3)).unwrap());
        assert!(set.insert(int(1)).unwrap());
        assert!(!set.insert(int(3)).unwrap());
        let items: Vec<_> = set.iter().cloned().collect();
        assert!(value_eq(&items[0], &int(3)));
        assert!(value_eq(&items[1], &int(1)));
        assert!(set.contains(&int(1)).unwrap());
    }

    #[test]
    fn text_elements_are_found_by_value() {
        let mut set = SetData::hashed();
        set.insert(ObjRef::text("a").into()).unwrap();
        assert!(set.contains(&ObjRef::text("a").into()).unwrap());
        assert!(!set.contains(&ObjRef::text("b").into()).unwrap());
    }

    #[test]
    fn sorted_set_uses_comparator() {
        let reversed = Comparator::new(|a, b| natural_cmp(b, a));
        let mut set = SetData::sorted(Some(reversed.clone()));
        for i in [2, 5, 1] {
            set.insert(int(i)).unwrap();
        }
        let items: Vec<_> = set
            .iter()
            .filter_map(|v| v.as_scalar().and_then(|s| s.as_int()))
            .collect();
        assert_eq!(items, [5, 2, 1]);

        let copy = set.empty_like();
        assert!(copy.is_empty());
        assert!(copy.comparator().is_some_and(|c| c.ptr_eq(&reversed)));
    }

    #[test]
    fn sorted_set_without_order_fails() {
        let mut set = SetData::sorted(None);
        set.insert(int(1)).unwrap();
        let err = set.insert(Value::Null).unwrap_err();
        assert!(matches!(err, AccessError::NoOrdering { .. }));
    }

    #[test]
    fn map_insert_replaces_values() {
        let mut map = MapData::sorted(None);
        assert!(map.insert(int(2), int(20)).unwrap().is_none());
        assert!(map.insert(int(1), int(10)).unwrap().is_none());
        let old = map.insert(int(2), int(21)).unwrap();
        assert!(old.is_some_and(|v| value_eq(&v, &int(20))));
        assert_eq!(map.len(), 2);
        let first = map.iter().next().map(|(k, _)| k.clone());
        assert!(first.is_some_and(|k| value_eq(&k, &int(1))));
        assert!(map.get(&int(2)).unwrap().is_some_and(|v| value_eq(v, &int(21))));
    }
}
