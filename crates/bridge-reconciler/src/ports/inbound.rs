//! # Inbound Ports
//!
//! API trait defining what the reconciler can do: apply events, and answer
//! read-only queries over the materialized entities.

use crate::domain::{
    Address, ChainEvent, Deposit, DepositKey, DirectionKey, EventOutcome, Proposal,
    ProposalCount, ReconcilerError, Relayer, Vote, VoteKey,
};
use serde::Serialize;

/// Every materialized entity, for export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Authorized relayers.
    pub relayers: Vec<Relayer>,
    /// Deposits, origin-side and mirrored.
    pub deposits: Vec<Deposit>,
    /// Destination-side proposals.
    pub proposals: Vec<Proposal>,
    /// Per-direction proposal totals.
    pub proposal_counts: Vec<ProposalCount>,
    /// Relayer votes.
    pub votes: Vec<Vote>,
}

/// Reconciler API - inbound port.
///
/// No write operation exists besides `apply`: all mutation is driven by the
/// event source.
pub trait ReconcilerApi {
    /// Apply one event atomically.
    ///
    /// ## Returns
    ///
    /// - `Ok(Applied)`: all writes committed
    /// - `Ok(Created)`: all writes committed, one of them a new proposal
    /// - `Ok(Ignored)`: event irrelevant, nothing written
    /// - `Ok(Skipped)`: skippable error under the skip policy, nothing written
    /// - `Err(_)`: fatal error, nothing written, the stream must stop
    fn apply(&mut self, event: &ChainEvent) -> Result<EventOutcome, ReconcilerError>;

    /// Relayer by address.
    fn relayer(&self, address: &Address) -> Result<Option<Relayer>, ReconcilerError>;

    /// Deposit by key.
    fn deposit(&self, key: &DepositKey) -> Result<Option<Deposit>, ReconcilerError>;

    /// Proposal by key.
    fn proposal(&self, key: &DepositKey) -> Result<Option<Proposal>, ReconcilerError>;

    /// Proposal total for a direction.
    fn proposal_count(
        &self,
        direction: &DirectionKey,
    ) -> Result<Option<ProposalCount>, ReconcilerError>;

    /// Vote by key.
    fn vote(&self, key: &VoteKey) -> Result<Option<Vote>, ReconcilerError>;

    /// All currently authorized relayers.
    fn relayers(&self) -> Result<Vec<Relayer>, ReconcilerError>;

    /// Every materialized entity.
    fn snapshot(&self) -> Result<Snapshot, ReconcilerError>;
}
