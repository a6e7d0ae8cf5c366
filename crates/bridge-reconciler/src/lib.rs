//! # Bridge Reconciler
//!
//! Materializes a queryable view of a cross-chain bridge's on-chain activity
//! from its ordered event stream.
//!
//! ## Entities
//!
//! | Entity | Id | Created by |
//! |--------|----|------------|
//! | `Relayer` | `0x…` address | role grant / relayer-added |
//! | `Deposit` | `{origin}->{destination}-{nonce}` | origin deposit, or first proposal signal |
//! | `Proposal` | same as its deposit | first proposal signal |
//! | `ProposalCount` | `{origin}->{destination}` | first proposal of a direction |
//! | `Vote` | `{proposal}-{voter}` | vote signal |
//!
//! ## Processing Model
//!
//! - One event at a time, in source order
//! - Every event is atomic: all of its writes land in one batch, or none do
//! - Skippable errors (unknown relayer, unknown status code) discard the
//!   event under the default `Skip` policy, or stop the stream under `Halt`
//!
//! ## Module Structure
//!
//! ```text
//! bridge-reconciler/
//! ├── domain/          # Entities, keys, events, config, errors
//! ├── ports/           # ReconcilerApi, EntityStore, KeyValueStore, ChainReader
//! ├── handlers/        # Per-entity event handlers
//! ├── adapters/        # KV backends, staging entity store, chain reader
//! ├── service/         # Reconciler (dispatch, atomicity, policy)
//! └── bus/             # Async channel/stream driver
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod bus;
pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{default_relayer_role, InMemoryKVStore, KvEntityStore, StaticChainReader};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use bus::{decode_event, BusAdapterError, ReconcilerBusAdapter, ReplaySummary};
pub use domain::{
    Address, BridgeEvent, Bytes32, ChainEvent, ChainId, DataHash, Deposit, DepositKey,
    DirectionKey, EntityKind, EventOutcome, MissingEntityPolicy, Proposal, ProposalCount,
    ProposalStatus, ReconcilerConfig, ReconcilerContext, ReconcilerError, Relayer, ResourceId,
    RoleId, StampPolicy, StoreError, Vote, VoteKey,
};
pub use ports::{ChainReader, EntityStore, KeyValueStore, ReconcilerApi, Snapshot};
pub use service::{resolve_context, Reconciler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
