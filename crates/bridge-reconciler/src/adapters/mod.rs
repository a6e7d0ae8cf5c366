//! # Adapters
//!
//! Implementations of the outbound ports: key-value backends, the staging
//! entity store on top of them, and a static chain reader.

pub mod chain_reader;
pub mod entity_store;
pub mod storage;

pub use chain_reader::{default_relayer_role, StaticChainReader};
pub use entity_store::KvEntityStore;
pub use storage::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbStore};
