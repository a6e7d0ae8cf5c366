//! # Key-Value Entity Store
//!
//! Implements the `EntityStore` port over any `KeyValueStore`.
//!
//! Entities are JSON documents stored under `{Kind}:{id}` keys, e.g.
//! `Proposal:1->2-5`. Writes are staged in memory and only reach the
//! backend on `commit`, as one atomic batch. Reads see staged writes first,
//! so a handler observes its own uncommitted changes.

use crate::domain::{Entity, StoreError};
use crate::ports::outbound::{BatchOperation, EntityStore, KeyValueStore};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Staging entity store backed by a key-value store.
pub struct KvEntityStore<KV: KeyValueStore> {
    kv: KV,
    /// Pending writes. `None` marks a staged delete.
    staged: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<KV: KeyValueStore> KvEntityStore<KV> {
    /// Wrap a key-value backend.
    pub fn new(kv: KV) -> Self {
        Self {
            kv,
            staged: BTreeMap::new(),
        }
    }

    /// Write every staged change in one atomic batch.
    ///
    /// On failure the staged changes are dropped and the backend is untouched.
    pub fn commit(&mut self) -> Result<usize, StoreError> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let operations: Vec<BatchOperation> = std::mem::take(&mut self.staged)
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::put(key, value),
                None => BatchOperation::delete(key),
            })
            .collect();
        let count = operations.len();

        self.kv.atomic_batch_write(operations)?;
        Ok(count)
    }

    /// Drop every staged change.
    pub fn discard(&mut self) {
        self.staged.clear();
    }

    /// Number of staged changes.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &KV {
        &self.kv
    }

    /// Unwrap the backend. Staged changes are lost.
    pub fn into_inner(self) -> KV {
        self.kv
    }
}

fn storage_key<E: Entity>(id: impl Display) -> Vec<u8> {
    format!("{}:{}", E::KIND, id).into_bytes()
}

fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(entity).map_err(|e| StoreError::SerializationError {
        message: format!("{} {}: {}", E::KIND, entity.id(), e),
    })
}

fn decode<E: Entity>(bytes: &[u8]) -> Result<E, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::SerializationError {
        message: format!("{}: {}", E::KIND, e),
    })
}

impl<KV: KeyValueStore> EntityStore for KvEntityStore<KV> {
    fn load<E: Entity>(&self, key: &E::Key) -> Result<Option<E>, StoreError> {
        let key = storage_key::<E>(key);
        let bytes = match self.staged.get(&key) {
            Some(staged) => staged.clone(),
            None => self.kv.get(&key)?,
        };
        bytes.map(|b| decode(&b)).transpose()
    }

    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError> {
        let value = encode(entity)?;
        self.staged.insert(storage_key::<E>(entity.id()), Some(value));
        Ok(())
    }

    fn remove<E: Entity>(&mut self, key: &E::Key) -> Result<(), StoreError> {
        self.staged.insert(storage_key::<E>(key), None);
        Ok(())
    }

    fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        let prefix = format!("{}:", E::KIND).into_bytes();

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.kv.prefix_scan(&prefix)?.into_iter().collect();
        for (key, value) in self.staged.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            match value {
                Some(value) => merged.insert(key.clone(), value.clone()),
                None => merged.remove(key),
            };
        }

        merged.values().map(|bytes| decode(bytes)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKVStore;
    use crate::domain::{Address, ChainId, DirectionKey, ProposalCount, Relayer};

    const ALICE: Address = Address([0xAA; 20]);
    const BOB: Address = Address([0xBB; 20]);

    #[test]
    fn test_storage_key_format() {
        let key = storage_key::<ProposalCount>(DirectionKey::new(ChainId(1), ChainId(2)));
        assert_eq!(key, b"ProposalCount:1->2".to_vec());
    }

    #[test]
    fn test_staged_writes_visible_before_commit() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        store.save(&Relayer::new(ALICE, 100, 10)).unwrap();

        assert!(store.load::<Relayer>(&ALICE).unwrap().is_some());
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_commit_writes_backend() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        store.save(&Relayer::new(ALICE, 100, 10)).unwrap();
        store.save(&Relayer::new(BOB, 100, 10)).unwrap();

        assert_eq!(store.commit().unwrap(), 2);
        assert_eq!(store.staged_len(), 0);
        assert_eq!(store.backend().len(), 2);
        assert!(store
            .backend()
            .get(format!("Relayer:{}", ALICE.to_hex()).as_bytes())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_discard_drops_staged_writes() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        store.save(&Relayer::new(ALICE, 100, 10)).unwrap();
        store.commit().unwrap();

        store.remove::<Relayer>(&ALICE).unwrap();
        store.save(&Relayer::new(BOB, 100, 10)).unwrap();
        store.discard();

        assert!(store.load::<Relayer>(&ALICE).unwrap().is_some());
        assert!(store.load::<Relayer>(&BOB).unwrap().is_none());
    }

    #[test]
    fn test_staged_delete_hides_committed_entity() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        store.save(&Relayer::new(ALICE, 100, 10)).unwrap();
        store.commit().unwrap();

        store.remove::<Relayer>(&ALICE).unwrap();

        assert!(store.load::<Relayer>(&ALICE).unwrap().is_none());
        assert!(store.list::<Relayer>().unwrap().is_empty());
    }

    #[test]
    fn test_list_merges_staged_and_committed() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        store.save(&Relayer::new(ALICE, 100, 10)).unwrap();
        store.commit().unwrap();
        store.save(&Relayer::new(BOB, 200, 20)).unwrap();
        store
            .save(&ProposalCount::new(DirectionKey::new(ChainId(1), ChainId(2))))
            .unwrap();

        let relayers = store.list::<Relayer>().unwrap();
        assert_eq!(relayers.len(), 2);
        assert_eq!(store.list::<ProposalCount>().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_document_is_serialization_error() {
        let mut kv = InMemoryKVStore::new();
        kv.put(format!("Relayer:{}", ALICE.to_hex()).as_bytes(), b"not json")
            .unwrap();
        let store = KvEntityStore::new(kv);

        let err = store.load::<Relayer>(&ALICE).unwrap_err();
        assert!(matches!(err, StoreError::SerializationError { .. }));
    }
}
