// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The closed value type and its shared composite nodes.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::anchor::{NodeId, WeakAnchor};
use crate::callable::Callable;
use crate::marker::Marker;
use crate::module_type::ModuleType;

/// Coarse classification of a [`Value`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKind {
    /// Undefined, null, booleans, numbers, text, bytes.
    Primitive,
    /// Function or class constructor.
    Callable,
    /// Symbol-like unique marker.
    OpaqueMarker,
    /// Field-ordered record.
    Record,
    /// Ordered sequence.
    Sequence,
    /// Anything else; rendered through its `Display` text.
    Foreign,
}

/// A node in a dynamic metadata graph.
///
/// `Integer` and `Number` are one numeric domain: an integral `Number` hashes
/// the same as the equal `Integer`.
#[derive(Clone)]
pub enum Value {
    /// Absent value.
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Function or class constructor.
    Callable(Callable),
    /// Unique marker.
    Marker(Marker),
    /// Shared record node.
    Record(Record),
    /// Shared sequence node.
    Sequence(Sequence),
    /// Leaf of an unknown kind.
    Foreign(Arc<dyn fmt::Display + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary displayable leaf.
    pub fn foreign<T>(leaf: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Self::Foreign(Arc::new(leaf))
    }

    /// Classify this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined
            | Self::Null
            | Self::Bool(_)
            | Self::Integer(_)
            | Self::Number(_)
            | Self::Text(_)
            | Self::Bytes(_) => ValueKind::Primitive,
            Self::Callable(_) => ValueKind::Callable,
            Self::Marker(_) => ValueKind::OpaqueMarker,
            Self::Record(_) => ValueKind::Record,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Foreign(_) => ValueKind::Foreign,
        }
    }

    /// Returns `true` for [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Identity of a composite value; `None` for leaves.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Record(r) => Some(r.node_id()),
            Self::Sequence(s) => Some(s.node_id()),
            _ => None,
        }
    }

    /// Non-owning handle to a composite value; `None` for leaves.
    pub fn anchor(&self) -> Option<WeakAnchor> {
        match self {
            Self::Record(r) => Some(r.anchor()),
            Self::Sequence(s) => Some(s.anchor()),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Callable(c) => f.debug_tuple("Callable").field(&c.name()).finish(),
            Self::Marker(m) => f.debug_tuple("Marker").field(&m.description()).finish(),
            Self::Record(r) => r.fmt(f),
            Self::Sequence(s) => s.fmt(f),
            Self::Foreign(leaf) => write!(f, "Foreign({leaf})"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Self::Callable(c)
    }
}

impl From<&ModuleType> for Value {
    fn from(ty: &ModuleType) -> Self {
        Self::Callable(ty.as_callable())
    }
}

impl From<Marker> for Value {
    fn from(m: Marker) -> Self {
        Self::Marker(m)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Record(r)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Self::Sequence(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(Sequence::from_values(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

type Fields = Vec<(String, Value)>;

/// Shared, mutable record whose fields keep their insertion order.
///
/// Re-inserting an existing key replaces the value in place; the field keeps
/// its original position.
#[derive(Clone, Default)]
pub struct Record(Arc<RwLock<Fields>>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Fields> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Fields> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builder form of [`insert`](Record::insert).
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field, returning the previous value if the key existed.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        let mut fields = self.write();
        if let Some(slot) = fields.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        fields.push((key, value));
        None
    }

    /// Remove a field, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut fields = self.write();
        let idx = fields.iter().position(|(k, _)| k == key)?;
        Some(fields.remove(idx).1)
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Snapshot of the fields in insertion order.
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.read().clone()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Identity of this record.
    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Non-owning handle to this record.
    pub fn anchor(&self) -> WeakAnchor {
        WeakAnchor::new(&self.0)
    }

    /// Returns `true` if both handles share one record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.node_id())
            .field("keys", &self.keys())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Shared, mutable ordered sequence.
#[derive(Clone, Default)]
pub struct Sequence(Arc<RwLock<Vec<Value>>>);

impl Sequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence owning `items`.
    pub fn from_values(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builder form of [`push`](Sequence::push).
    pub fn with(self, item: impl Into<Value>) -> Self {
        self.push(item);
        self
    }

    /// Append an element.
    pub fn push(&self, item: impl Into<Value>) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item.into());
    }

    /// Element at `idx`.
    pub fn get(&self, idx: usize) -> Option<Value> {
        self.read().get(idx).cloned()
    }

    /// Snapshot of the elements in order.
    pub fn items(&self) -> Vec<Value> {
        self.read().clone()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Identity of this sequence.
    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Non-owning handle to this sequence.
    pub fn anchor(&self) -> WeakAnchor {
        WeakAnchor::new(&self.0)
    }

    /// Returns `true` if both handles share one sequence.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("id", &self.node_id())
            .field("len", &self.len())
            .finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for Sequence {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_insertion_order() {
        let r = Record::new().with("b", 1).with("a", 2).with("c", 3);
        assert_eq!(r.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let r = Record::new().with("x", 1).with("y", 2);
        let prev = r.insert("x", "again");
        assert!(matches!(prev, Some(Value::Integer(1))));
        assert_eq!(r.keys(), vec!["x", "y"]);
        assert!(matches!(r.get("x"), Some(Value::Text(ref s)) if s == "again"));
    }

    #[test]
    fn self_reference_shares_identity() {
        let r = Record::new().with("test", true);
        r.insert("circular", r.clone());
        match r.get("circular") {
            Some(Value::Record(inner)) => assert!(inner.ptr_eq(&r)),
            other => unreachable!("unexpected {other:?}"),
        }
        // Debug output is shallow, so this terminates.
        assert!(format!("{r:?}").contains("circular"));
        r.remove("circular");
    }

    #[test]
    fn kinds_are_classified() {
        assert_eq!(Value::from(1).kind(), ValueKind::Primitive);
        assert_eq!(Value::from("1").kind(), ValueKind::Primitive);
        assert_eq!(Value::Undefined.kind(), ValueKind::Primitive);
        assert_eq!(
            Value::from(Callable::constructor("A")).kind(),
            ValueKind::Callable
        );
        assert_eq!(Value::from(Marker::new("m")).kind(), ValueKind::OpaqueMarker);
        assert_eq!(Value::from(Record::new()).kind(), ValueKind::Record);
        assert_eq!(Value::from(Sequence::new()).kind(), ValueKind::Sequence);
        assert_eq!(Value::foreign(std::net::Ipv4Addr::LOCALHOST).kind(), ValueKind::Foreign);
    }

    #[test]
    fn only_composites_have_identity() {
        assert!(Value::from(1).node_id().is_none());
        assert!(Value::from(Record::new()).node_id().is_some());
        assert!(Value::from(Sequence::new()).anchor().is_some());
    }

    #[test]
    fn option_maps_to_undefined() {
        assert!(Value::from(None::<i64>).is_undefined());
        assert!(matches!(Value::from(Some(3)), Value::Integer(3)));
    }
}
