//! Value equality, hashing and ordering: what hashed and sorted containers
//! place their elements by.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use crate::{AccessError, Data, ObjRef, Value};

/// Hashes anything hashable with the standard library's default hasher.
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Value equality.
///
/// Identical nodes are always equal. Otherwise a shape's own `eq` wins; text,
/// boxed scalars, decimals, dates and enum variants compare by payload; lists,
/// sets and maps compare structurally. Structs and arrays without an `eq`
/// compare by identity. A node that cannot be read compares unequal.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Scalar(x), Value::Scalar(y)) => x == y,
        (Value::Ref(x), Value::Ref(y)) => ref_eq(x, y),
        _ => false,
    }
}

fn ref_eq(a: &ObjRef, b: &ObjRef) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    if a.shape() == b.shape()
        && let Some(eq) = a.shape().vtable.eq
    {
        return eq(a, b);
    }
    let (Ok(x), Ok(y)) = (a.data(), b.data()) else {
        return false;
    };
    match (&*x, &*y) {
        (Data::Text(p), Data::Text(q)) => p == q,
        (Data::Boxed(p), Data::Boxed(q)) => p == q,
        (Data::Decimal(p), Data::Decimal(q)) => p == q,
        (Data::Date(p), Data::Date(q)) => p == q,
        (Data::DateTime(p), Data::DateTime(q)) => p == q,
        (Data::Variant(p), Data::Variant(q)) => a.shape() == b.shape() && p == q,
        (Data::List(p), Data::List(q)) => {
            p.len() == q.len() && p.iter().zip(q).all(|(l, r)| value_eq(l, r))
        }
        (Data::Set(p), Data::Set(q)) => {
            p.len() == q.len() && p.iter().all(|v| q.contains(v).unwrap_or(false))
        }
        (Data::Map(p), Data::Map(q)) => {
            p.len() == q.len()
                && p.iter().all(|(k, v)| {
                    q.get(k)
                        .ok()
                        .flatten()
                        .is_some_and(|other| value_eq(v, other))
                })
        }
        _ => false,
    }
}

/// Hash code consistent with [`value_eq`].
///
/// Fails when a node along the way cannot be read.
pub fn hash_code(value: &Value) -> Result<u64, AccessError> {
    match value {
        Value::Null => Ok(0),
        Value::Scalar(s) => Ok(hash_of(s)),
        Value::Ref(r) => ref_hash(r),
    }
}

fn ref_hash(node: &ObjRef) -> Result<u64, AccessError> {
    if let Some(hash) = node.shape().vtable.hash {
        return Ok(hash(node));
    }
    let data = node.data()?;
    match &*data {
        Data::Text(s) => Ok(hash_of(s.as_str())),
        Data::Boxed(s) => Ok(hash_of(s)),
        Data::Decimal(d) => Ok(hash_of(d)),
        Data::Date(d) => Ok(hash_of(d)),
        Data::DateTime(dt) => Ok(hash_of(dt)),
        Data::Variant(v) => Ok(hash_of(&(node.shape().type_identifier, v))),
        Data::List(items) => items.iter().try_fold(1u64, |acc, item| {
            Ok(acc.wrapping_mul(31).wrapping_add(hash_code(item)?))
        }),
        Data::Set(set) => set.hash_sum(),
        Data::Map(map) => map.hash_sum(),
        Data::Struct(_) | Data::Array(_) | Data::Primitives(_) => Ok(hash_of(&node.id())),
    }
}

/// Natural ordering between two values.
///
/// Scalars of the same type, text, boxed scalars, decimals, dates and variants
/// of the same enum are ordered by payload; other nodes need a `cmp` in their
/// shape's vtable. Everything else is [`AccessError::NoOrdering`].
pub fn natural_cmp(a: &Value, b: &Value) -> Result<Ordering, AccessError> {
    let no_ordering = || AccessError::NoOrdering {
        left: a.type_name(),
        right: b.type_name(),
    };
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => x.partial_order(y).ok_or_else(no_ordering),
        (Value::Ref(x), Value::Ref(y)) => {
            if x.shape() == y.shape()
                && let Some(cmp) = x.shape().vtable.cmp
            {
                return Ok(cmp(x, y));
            }
            let (p, q) = (x.data()?, y.data()?);
            match (&*p, &*q) {
                (Data::Text(l), Data::Text(r)) => Ok(l.cmp(r)),
                (Data::Boxed(l), Data::Boxed(r)) => l.partial_order(r).ok_or_else(no_ordering),
                (Data::Decimal(l), Data::Decimal(r)) => Ok(l.cmp(r)),
                (Data::Date(l), Data::Date(r)) => Ok(l.cmp(r)),
                (Data::DateTime(l), Data::DateTime(r)) => Ok(l.cmp(r)),
                (Data::Variant(l), Data::Variant(r)) if x.shape() == y.shape() => Ok(l.cmp(r)),
                _ => Err(no_ordering()),
            }
        }
        _ => Err(no_ordering()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scalar, builtins};
    use rust_decimal::Decimal;

    #[test]
    fn payload_equality_and_hashing_agree() {
        let a: Value = ObjRef::text("Dave").into();
        let b: Value = ObjRef::text("Dave").into();
        assert!(value_eq(&a, &b));
        assert_eq!(hash_code(&a).unwrap(), hash_code(&b).unwrap());

        let x: Value = ObjRef::decimal(Decimal::new(1056, 2)).into();
        let y: Value = ObjRef::decimal(Decimal::new(1056, 2)).into();
        assert!(value_eq(&x, &y));
        assert!(!value_eq(&x, &a));
    }

    #[test]
    fn lists_compare_structurally_across_list_shapes() {
        let items = || [ObjRef::text("a").into(), Value::from(3)];
        let a = ObjRef::list(&builtins::ARRAY_LIST, items()).unwrap();
        let b = ObjRef::list(&builtins::LINKED_LIST, items()).unwrap();
        assert!(value_eq(&a.clone().into(), &b.clone().into()));
        assert_eq!(
            hash_code(&a.into()).unwrap(),
            hash_code(&b.into()).unwrap()
        );
    }

    #[test]
    fn arrays_compare_by_identity() {
        let a = ObjRef::array(&builtins::OBJECT_ARRAY, []).unwrap();
        let b = ObjRef::array(&builtins::OBJECT_ARRAY, []).unwrap();
        assert!(value_eq(&a.clone().into(), &a.clone().into()));
        assert!(!value_eq(&a.into(), &b.into()));
    }

    #[test]
    fn natural_order() {
        let one = Value::Scalar(Scalar::Int(1));
        let two = Value::Scalar(Scalar::Int(2));
        assert_eq!(natural_cmp(&one, &two).unwrap(), Ordering::Less);

        let a: Value = ObjRef::text("a").into();
        let b: Value = ObjRef::text("b").into();
        assert_eq!(natural_cmp(&b, &a).unwrap(), Ordering::Greater);

        let err = natural_cmp(&one, &a).unwrap_err();
        assert_eq!(
            err,
            AccessError::NoOrdering {
                left: "int",
                right: "String"
            }
        );
    }
}
