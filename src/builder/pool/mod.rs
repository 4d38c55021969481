//! Interning pools.
//!
//! One pool per kind of DEX item. Every pool maps a semantic key to exactly one canonical
//! builder reference and is safe to use from many threads at once:
//!
//! - a lookup on the `DashMap` shard answers repeated keys without building anything
//! - on a miss, the constituents (strings, types, ...) are interned first, outside the shard lock
//! - the final insert goes through `entry().or_insert_with()`, so concurrent callers racing on
//!   the same key converge on the first installed value and allocate only one slot row
//!
//! The class pool differs: it rejects duplicates instead of returning them and keeps its
//! entries in an ordered `SkipMap` (see [`ClassPool`]).

mod annotation;
mod class;
mod field;
mod method;
mod proto;
mod string;
mod types;

pub use annotation::{
    AnnotationPool, AnnotationSetPool, BuilderAnnotation, BuilderAnnotationRc,
    BuilderAnnotationSet, BuilderAnnotationSetRc,
};
pub use class::{ClassPool, ClassSlot, MethodSlot};
pub use field::FieldPool;
pub use method::MethodPool;
pub use proto::ProtoPool;
pub use string::StringPool;
pub use types::{TypeListPool, TypePool};

use std::{borrow::Borrow, hash::Hash, sync::Arc};

use dashmap::DashMap;

use crate::{
    builder::slots::{SlotId, SlotKind, SlotTable},
    Result,
};

/// Insert-if-absent map from key to canonical `Arc`, plus the slot table of its values
#[derive(Debug)]
pub(crate) struct InternTable<K, V, S>
where
    K: Hash + Eq,
    S: SlotKind,
{
    entries: DashMap<K, Arc<V>>,
    slots: SlotTable<S>,
}

impl<K, V, S> InternTable<K, V, S>
where
    K: Hash + Eq,
    S: SlotKind,
{
    pub(crate) fn new() -> Self {
        InternTable {
            entries: DashMap::new(),
            slots: SlotTable::new(),
        }
    }

    /// Canonical value for `key`, if already interned
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Install `make(slot)` under `key` unless another value won the race
    pub(crate) fn insert_with(&self, key: K, make: impl FnOnce(SlotId) -> V) -> Arc<V> {
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(make(self.slots.allocate())));
        Arc::clone(entry.value())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn values(&self) -> Vec<Arc<V>> {
        self.entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub(crate) fn sorted(&self) -> Vec<Arc<V>>
    where
        V: Ord,
    {
        let mut values = self.values();
        values.sort();
        values
    }

    pub(crate) fn slot(&self, id: SlotId, kind: S) -> Result<u32> {
        self.slots.get(id, kind)
    }

    pub(crate) fn set_slot(&self, id: SlotId, kind: S, value: u32) -> Result<()> {
        self.slots.set(id, kind, value)
    }
}
