//! Identity collapse for entity graphs.
//!
//! Independent fetches of the same row produce distinct in-memory objects,
//! while the codec's reference table works on object identity. The table
//! here maps `(entity path, primary key)` to the first instance seen in one
//! encode session so later duplicates are written as back-references.
//!
//! When two instances share a key but differ in attribute values, the first
//! one seen wins.

use crate::{
    codec::{EncodeContext, ObjectResolver},
    orm::alias::assigned_key,
    value::{ObjectRef, Value},
};
use std::collections::HashMap;
use tracing::debug;

///
/// IdentityKey
/// Hashable projection of a primary-key value.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum IdentityKey {
    Int(i64),
    Text(String),
    /// Any other key shape, keyed by its debug rendering.
    Other(String),
}

impl IdentityKey {
    /// Project a key value; absent values have no identity.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            value if value.is_absent() => None,
            Value::Int(key) => Some(Self::Int(*key)),
            Value::Text(key) => Some(Self::Text(key.clone())),
            other => Some(Self::Other(format!("{other:?}"))),
        }
    }
}

///
/// IdentityTable
///
/// Session-scoped map: entity path → (primary key → canonical instance).
/// One table per top-level encode; never shared between sessions.
///

#[derive(Debug, Default)]
pub struct IdentityTable {
    entries: HashMap<&'static str, HashMap<IdentityKey, ObjectRef>>,
}

impl IdentityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &str, key: &IdentityKey) -> Option<&ObjectRef> {
        self.entries.get(path).and_then(|keys| keys.get(key))
    }

    pub fn insert(&mut self, path: &'static str, key: IdentityKey, object: ObjectRef) {
        self.entries.entry(path).or_default().insert(key, object);
    }

    /// Return the canonical instance for `(path, key)`, registering `object`
    /// as canonical when the pair is new.
    pub fn canonical(&mut self, path: &'static str, key: IdentityKey, object: &ObjectRef) -> ObjectRef {
        self.entries
            .entry(path)
            .or_default()
            .entry(key)
            .or_insert_with(|| object.clone())
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

///
/// IdentityResolver
///
/// Encoder hook that substitutes the canonical instance for saved entities.
/// Transient instances and non-entities fall through to the default path.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityResolver;

impl ObjectResolver for IdentityResolver {
    fn resolve(&self, object: &ObjectRef, ctx: &mut EncodeContext) -> Option<ObjectRef> {
        let key = assigned_key(&**object)?;
        let key = IdentityKey::from_value(&key)?;
        let path = object.class().path;

        let canonical = ctx.identity_mut().canonical(path, key, object);
        if !canonical.ptr_eq(object) {
            debug!(entity = path, "collapsed duplicate entity onto canonical instance");
        }

        Some(canonical)
    }
}
