//! # Event Stream Adapter
//!
//! Drives the reconciler from an asynchronous event source.
//!
//! ## Architecture
//!
//! ```text
//! [Event Source] ──mpsc / Stream──→ [ReconcilerBusAdapter] ──apply──→ [Reconciler]
//!                                          │
//!                                          ↓
//!                                    [ReplaySummary]
//! ```
//!
//! Events are consumed on a single task, strictly in arrival order. A fatal
//! error stops the loop; skipped events are counted and the loop continues.
//!
//! ## Event Subscriptions
//!
//! | Event | Handler |
//! |-------|---------|
//! | `RelayerAdded` | relayer lifecycle |
//! | `RoleGranted` | relayer lifecycle (relayer role only) |
//! | `RelayerRemoved` | relayer lifecycle |
//! | `Deposit` | deposit recorder |
//! | `ProposalEvent` | proposal tracker |
//! | `ProposalVote` | vote recorder |

mod adapter;

pub use adapter::{decode_event, BusAdapterError, ReconcilerBusAdapter, ReplaySummary};

// Event type constants for the bus
pub mod event_types {
    pub const RELAYER_ADDED: &str = "RelayerAdded";
    pub const ROLE_GRANTED: &str = "RoleGranted";
    pub const RELAYER_REMOVED: &str = "RelayerRemoved";
    pub const DEPOSIT: &str = "Deposit";
    pub const PROPOSAL_EVENT: &str = "ProposalEvent";
    pub const PROPOSAL_VOTE: &str = "ProposalVote";
}
