//! # Domain Entities
//!
//! The materialized entities exposed to consumers: `Relayer`, `Deposit`,
//! `Proposal`, `ProposalCount` and `Vote`.
//!
//! Field names serialize in camelCase so stored documents keep the shape
//! consumers already query.

use super::config::StampPolicy;
use super::value_objects::{
    Address, BlockNumber, ChainId, DataHash, DepositKey, DepositNonce, DirectionKey,
    ProposalStatus, ResourceId, Timestamp, VoteKey,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type tag. Part of every storage key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Authorized relayer.
    Relayer,
    /// Cross-chain transfer request.
    Deposit,
    /// Destination-side finalization record.
    Proposal,
    /// Per-direction proposal total.
    ProposalCount,
    /// Relayer ballot.
    Vote,
}

impl EntityKind {
    /// Type name used in storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relayer => "Relayer",
            Self::Deposit => "Deposit",
            Self::Proposal => "Proposal",
            Self::ProposalCount => "ProposalCount",
            Self::Vote => "Vote",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persistable entity addressed by type and id.
pub trait Entity: Serialize + DeserializeOwned {
    /// Entity type tag.
    const KIND: EntityKind;

    /// Typed identifier. Its `Display` output is the stored id.
    type Key: fmt::Display;

    /// Stored id.
    fn id(&self) -> &str;
}

/// An account authorized to submit proposals and votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relayer {
    /// Lowercase hex address.
    pub id: String,
    /// Raw account address.
    pub address: Address,
    /// Timestamp of the authorization grant.
    pub added_at: Timestamp,
    /// Block height of the authorization grant.
    pub added_at_block: BlockNumber,
    /// Votes cast since the latest grant.
    pub vote_count: u64,
}

impl Relayer {
    /// Create a freshly authorized relayer with a zero tally.
    pub fn new(address: Address, added_at: Timestamp, added_at_block: BlockNumber) -> Self {
        Self {
            id: address.to_hex(),
            address,
            added_at,
            added_at_block,
            vote_count: 0,
        }
    }

    /// Re-apply an authorization grant. The tally is reset.
    pub fn regrant(&mut self, added_at: Timestamp, added_at_block: BlockNumber) {
        self.added_at = added_at;
        self.added_at_block = added_at_block;
        self.vote_count = 0;
    }
}

impl Entity for Relayer {
    const KIND: EntityKind = EntityKind::Relayer;
    type Key = Address;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A requested cross-chain transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// `{origin}->{destination}-{nonce}`.
    pub id: String,
    /// Chain the transfer leaves.
    pub origin_chain_id: ChainId,
    /// Chain the transfer arrives on.
    pub destination_chain_id: ChainId,
    /// Asset/resource class.
    pub resource_id: ResourceId,
    /// Per-direction sequence number.
    pub nonce: DepositNonce,
    /// Timestamp of first observation.
    pub created_at: Timestamp,
    /// Linked proposal id; set only when created from the destination side.
    pub proposal: Option<String>,
}

impl Deposit {
    /// Deposit observed on the origin side.
    pub fn new(key: DepositKey, resource_id: ResourceId, created_at: Timestamp) -> Self {
        Self {
            id: key.to_string(),
            origin_chain_id: key.origin,
            destination_chain_id: key.destination,
            resource_id,
            nonce: key.nonce,
            created_at,
            proposal: None,
        }
    }

    /// Deposit first observed through its proposal on the destination side.
    pub fn mirrored(key: DepositKey, resource_id: ResourceId, created_at: Timestamp) -> Self {
        let mut deposit = Self::new(key, resource_id, created_at);
        deposit.proposal = Some(key.to_string());
        deposit
    }

    /// Typed key of this deposit.
    pub fn key(&self) -> DepositKey {
        DepositKey::new(self.origin_chain_id, self.destination_chain_id, self.nonce)
    }
}

impl Entity for Deposit {
    const KIND: EntityKind = EntityKind::Deposit;
    type Key = DepositKey;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Destination-side finalization record for a deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Same id as the deposit.
    pub id: String,
    /// Copied from the deposit.
    pub origin_chain_id: ChainId,
    /// Copied from the deposit.
    pub destination_chain_id: ChainId,
    /// Copied from the deposit.
    pub resource_id: ResourceId,
    /// Proposed payload hash.
    pub data_hash: DataHash,
    /// Current status.
    pub status: ProposalStatus,
    /// Timestamp of first observation.
    pub created_at: Timestamp,
    /// Sender of the first observed status transaction.
    pub created_by: String,
    /// When the proposal last passed.
    pub passed_at: Option<Timestamp>,
    /// Sender of the transaction that passed it.
    pub passed_by: Option<String>,
    /// When the proposal was last executed.
    pub executed_at: Option<Timestamp>,
    /// Sender of the executing transaction.
    pub executed_by: Option<String>,
    /// When the proposal was last cancelled.
    pub cancelled_at: Option<Timestamp>,
    /// Sender of the cancelling transaction.
    pub cancelled_by: Option<String>,
}

impl Proposal {
    /// Create an inactive proposal. Chain and resource fields come from the
    /// deposit, never from the raw signal.
    pub fn new(
        deposit: &Deposit,
        data_hash: DataHash,
        created_at: Timestamp,
        created_by: Address,
    ) -> Self {
        Self {
            id: deposit.id.clone(),
            origin_chain_id: deposit.origin_chain_id,
            destination_chain_id: deposit.destination_chain_id,
            resource_id: deposit.resource_id,
            data_hash,
            status: ProposalStatus::Inactive,
            created_at,
            created_by: created_by.to_hex(),
            passed_at: None,
            passed_by: None,
            executed_at: None,
            executed_by: None,
            cancelled_at: None,
            cancelled_by: None,
        }
    }

    /// Overwrite the status and stamp the matching `*At`/`*By` pair.
    ///
    /// Returns the previous status.
    pub fn apply_status(
        &mut self,
        status: ProposalStatus,
        at: Timestamp,
        by: Address,
        policy: StampPolicy,
    ) -> ProposalStatus {
        let previous = self.status;
        self.status = status;

        let (at_slot, by_slot) = match status {
            ProposalStatus::Passed => (&mut self.passed_at, &mut self.passed_by),
            ProposalStatus::Executed => (&mut self.executed_at, &mut self.executed_by),
            ProposalStatus::Cancelled => (&mut self.cancelled_at, &mut self.cancelled_by),
            ProposalStatus::Inactive | ProposalStatus::Active => return previous,
        };

        if policy == StampPolicy::LastWriteWins || at_slot.is_none() {
            *at_slot = Some(at);
            *by_slot = Some(by.to_hex());
        }
        previous
    }
}

impl Entity for Proposal {
    const KIND: EntityKind = EntityKind::Proposal;
    type Key = DepositKey;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Running total of proposals ever created for one direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCount {
    /// `{origin}->{destination}`.
    pub id: String,
    /// Source chain of the direction.
    pub origin_chain_id: ChainId,
    /// Target chain of the direction.
    pub destination_chain_id: ChainId,
    /// Proposals created for this direction.
    pub proposal_count: u64,
}

impl ProposalCount {
    /// Zeroed counter for a direction.
    pub fn new(direction: DirectionKey) -> Self {
        Self {
            id: direction.to_string(),
            origin_chain_id: direction.origin,
            destination_chain_id: direction.destination,
            proposal_count: 0,
        }
    }

    /// Count one newly created proposal.
    pub fn increment(&mut self) {
        self.proposal_count += 1;
    }
}

impl Entity for ProposalCount {
    const KIND: EntityKind = EntityKind::ProposalCount;
    type Key = DirectionKey;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A relayer's ballot on a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// `{proposalId}-{voter}`.
    pub id: String,
    /// Voting relayer id.
    pub relayer: String,
    /// Voted proposal id.
    pub proposal: String,
    /// Always `true`.
    pub is_yes_vote: bool,
    /// Always `false`.
    pub is_no_vote: bool,
    /// Timestamp of the vote signal.
    pub voted_at: Timestamp,
}

impl Vote {
    /// Affirmative vote. The bridge contract emits no negative-vote signal.
    pub fn yes(key: VoteKey, voted_at: Timestamp) -> Self {
        Self {
            id: key.to_string(),
            relayer: key.voter.to_hex(),
            proposal: key.proposal.to_string(),
            is_yes_vote: true,
            is_no_vote: false,
            voted_at,
        }
    }
}

impl Entity for Vote {
    const KIND: EntityKind = EntityKind::Vote;
    type Key = VoteKey;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Bytes32;

    fn key() -> DepositKey {
        DepositKey::new(ChainId(1), ChainId(2), 5)
    }

    fn test_proposal() -> Proposal {
        let deposit = Deposit::mirrored(key(), Bytes32([7u8; 32]), 100);
        Proposal::new(&deposit, Bytes32([9u8; 32]), 100, Address([0xBB; 20]))
    }

    #[test]
    fn test_relayer_new_zero_tally() {
        let relayer = Relayer::new(Address([0xAA; 20]), 100, 10);
        assert_eq!(relayer.id, Address([0xAA; 20]).to_hex());
        assert_eq!(relayer.vote_count, 0);
    }

    #[test]
    fn test_relayer_regrant_resets_tally() {
        let mut relayer = Relayer::new(Address([0xAA; 20]), 100, 10);
        relayer.vote_count = 12;
        relayer.regrant(300, 30);
        assert_eq!(relayer.vote_count, 0);
        assert_eq!(relayer.added_at, 300);
        assert_eq!(relayer.added_at_block, 30);
    }

    #[test]
    fn test_origin_deposit_has_no_proposal_link() {
        let deposit = Deposit::new(key(), Bytes32([7u8; 32]), 100);
        assert_eq!(deposit.id, "1->2-5");
        assert!(deposit.proposal.is_none());
        assert_eq!(deposit.key(), key());
    }

    #[test]
    fn test_mirrored_deposit_links_proposal() {
        let deposit = Deposit::mirrored(key(), Bytes32([7u8; 32]), 100);
        assert_eq!(deposit.proposal.as_deref(), Some("1->2-5"));
    }

    #[test]
    fn test_proposal_copies_deposit_fields() {
        let proposal = test_proposal();
        assert_eq!(proposal.id, "1->2-5");
        assert_eq!(proposal.origin_chain_id, ChainId(1));
        assert_eq!(proposal.destination_chain_id, ChainId(2));
        assert_eq!(proposal.resource_id, Bytes32([7u8; 32]));
        assert_eq!(proposal.status, ProposalStatus::Inactive);
    }

    #[test]
    fn test_apply_status_stamps_terminal_fields() {
        let mut proposal = test_proposal();
        let previous =
            proposal.apply_status(ProposalStatus::Passed, 200, Address([1; 20]), StampPolicy::LastWriteWins);
        assert_eq!(previous, ProposalStatus::Inactive);
        assert_eq!(proposal.passed_at, Some(200));
        assert_eq!(proposal.passed_by, Some(Address([1; 20]).to_hex()));
        assert!(proposal.executed_at.is_none());
    }

    #[test]
    fn test_apply_status_active_stamps_nothing() {
        let mut proposal = test_proposal();
        proposal.apply_status(ProposalStatus::Active, 200, Address([1; 20]), StampPolicy::LastWriteWins);
        assert_eq!(proposal.status, ProposalStatus::Active);
        assert!(proposal.passed_at.is_none());
        assert!(proposal.cancelled_at.is_none());
    }

    #[test]
    fn test_last_write_wins_restamps() {
        let mut proposal = test_proposal();
        proposal.apply_status(ProposalStatus::Executed, 200, Address([1; 20]), StampPolicy::LastWriteWins);
        proposal.apply_status(ProposalStatus::Executed, 300, Address([2; 20]), StampPolicy::LastWriteWins);
        assert_eq!(proposal.executed_at, Some(300));
        assert_eq!(proposal.executed_by, Some(Address([2; 20]).to_hex()));
    }

    #[test]
    fn test_first_write_wins_keeps_stamp() {
        let mut proposal = test_proposal();
        proposal.apply_status(ProposalStatus::Executed, 200, Address([1; 20]), StampPolicy::FirstWriteWins);
        proposal.apply_status(ProposalStatus::Executed, 300, Address([2; 20]), StampPolicy::FirstWriteWins);
        assert_eq!(proposal.executed_at, Some(200));
        assert_eq!(proposal.executed_by, Some(Address([1; 20]).to_hex()));
    }

    #[test]
    fn test_status_regression_allowed() {
        let mut proposal = test_proposal();
        proposal.apply_status(ProposalStatus::Executed, 200, Address([1; 20]), StampPolicy::LastWriteWins);
        let previous =
            proposal.apply_status(ProposalStatus::Inactive, 300, Address([1; 20]), StampPolicy::LastWriteWins);
        assert_eq!(previous, ProposalStatus::Executed);
        assert_eq!(proposal.status, ProposalStatus::Inactive);
        assert_eq!(proposal.executed_at, Some(200));
    }

    #[test]
    fn test_proposal_count_increment() {
        let mut count = ProposalCount::new(key().direction());
        assert_eq!(count.id, "1->2");
        count.increment();
        count.increment();
        assert_eq!(count.proposal_count, 2);
    }

    #[test]
    fn test_vote_is_always_yes() {
        let vote = Vote::yes(VoteKey::new(key(), Address([0xAA; 20])), 200);
        assert!(vote.is_yes_vote);
        assert!(!vote.is_no_vote);
        assert_eq!(vote.proposal, "1->2-5");
        assert_eq!(vote.relayer, Address([0xAA; 20]).to_hex());
    }

    #[test]
    fn test_entity_serializes_camel_case() {
        let relayer = Relayer::new(Address([0xAA; 20]), 100, 10);
        let json = serde_json::to_value(&relayer).unwrap();
        assert_eq!(json["voteCount"], 0);
        assert_eq!(json["addedAtBlock"], 10);
    }
}
