//! # Outbound Ports (Driven Ports)
//!
//! Collaborators the reconciler requires the host application to provide:
//! an entity store, the raw key-value store beneath it, and a chain reader.

use crate::domain::{Address, ChainId, Entity, ReconcilerError, RoleId, StoreError};
use async_trait::async_trait;

/// Typed entity repository.
///
/// `save` is an id-keyed upsert; `remove` is a no-op for absent ids.
pub trait EntityStore {
    /// Load an entity by its typed key.
    fn load<E: Entity>(&self, key: &E::Key) -> Result<Option<E>, StoreError>;

    /// Insert or overwrite an entity.
    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError>;

    /// Delete an entity by its typed key.
    fn remove<E: Entity>(&mut self, key: &E::Key) -> Result<(), StoreError>;

    /// All stored entities of one type.
    fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError>;
}

/// Result of a prefix scan: (key, value) pairs.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Production: `RocksDbStore` (feature `rocksdb`)
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), StoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, StoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Read-only calls against the bridge contract.
///
/// Queried once at startup to build the `ReconcilerContext`.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Chain id the bridge contract reports for its own chain.
    async fn chain_id(&self, contract: &Address) -> Result<ChainId, ReconcilerError>;

    /// The contract's relayer role identifier.
    async fn relayer_role(&self, contract: &Address) -> Result<RoleId, ReconcilerError>;
}
