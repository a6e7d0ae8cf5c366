//! # Bridge Events
//!
//! Decoded bridge contract events as delivered by the event source, and the
//! outcome of applying one.
//!
//! Every event travels inside a [`ChainEvent`] envelope carrying the block and
//! transaction context the handlers need (timestamp, height, sender).

use super::entities::EntityKind;
use super::value_objects::{
    Address, BlockNumber, ChainId, DataHash, DepositNonce, ResourceId, RoleId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// A bridge event with its block and transaction context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    /// Contract that emitted the event.
    pub contract: Address,
    /// Height of the including block.
    pub block_number: BlockNumber,
    /// Timestamp of the including block.
    pub block_timestamp: Timestamp,
    /// Sender of the including transaction.
    pub tx_sender: Address,
    /// Decoded event payload.
    pub event: BridgeEvent,
}

/// Bridge contract events consumed by the reconciler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BridgeEvent {
    /// Dedicated relayer-added signal. No role check applies.
    RelayerAdded {
        relayer: Address,
    },

    /// Access-control role grant. Only the relayer role is relevant.
    RoleGranted {
        role: RoleId,
        account: Address,
        sender: Address,
    },

    /// Relayer revocation.
    RelayerRemoved {
        relayer: Address,
    },

    /// Deposit initiated on this (origin) chain.
    Deposit {
        destination_chain_id: ChainId,
        resource_id: ResourceId,
        deposit_nonce: DepositNonce,
    },

    /// Proposal created or status changed on this (destination) chain.
    ProposalEvent {
        origin_chain_id: ChainId,
        deposit_nonce: DepositNonce,
        status: u8,
        resource_id: ResourceId,
        data_hash: DataHash,
    },

    /// Relayer vote on a proposal on this (destination) chain.
    ProposalVote {
        origin_chain_id: ChainId,
        deposit_nonce: DepositNonce,
        status: u8,
        resource_id: ResourceId,
    },
}

impl BridgeEvent {
    /// Event name, used as a log field and metric label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RelayerAdded { .. } => "RelayerAdded",
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RelayerRemoved { .. } => "RelayerRemoved",
            Self::Deposit { .. } => "Deposit",
            Self::ProposalEvent { .. } => "ProposalEvent",
            Self::ProposalVote { .. } => "ProposalVote",
        }
    }
}

/// Result of applying one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Writes were committed.
    Applied,
    /// Writes were committed and a new entity came into existence.
    Created {
        /// Kind of the new entity.
        kind: EntityKind,
    },
    /// The event is irrelevant; nothing was written.
    Ignored {
        /// Why the event was ignored.
        reason: &'static str,
    },
    /// A skippable error occurred; the event's writes were discarded.
    Skipped {
        /// The error that caused the skip.
        reason: String,
    },
}

impl EventOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied | Self::Created { .. } => "applied",
            Self::Ignored { .. } => "ignored",
            Self::Skipped { .. } => "skipped",
        }
    }
}
