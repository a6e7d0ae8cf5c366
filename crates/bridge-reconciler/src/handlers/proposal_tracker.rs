//! # Proposal Tracker
//!
//! Destination-side proposal lifecycle.
//!
//! A status signal may be the first the reconciler hears of a deposit (the
//! origin chain is indexed separately, or not at all), so the deposit is
//! mirrored on demand. The proposal is created on its first signal and the
//! per-direction counter is bumped exactly then.
//!
//! ## Status codes
//!
//! | Code | Status | Stamps |
//! |------|--------|--------|
//! | 0 | Inactive | - |
//! | 1 | Active | - |
//! | 2 | Passed | `passedAt`, `passedBy` |
//! | 3 | Executed | `executedAt`, `executedBy` |
//! | 4 | Cancelled | `cancelledAt`, `cancelledBy` |
//!
//! There is no terminal lock: any code overwrites any prior status.

use crate::domain::{
    Address, ChainId, DataHash, Deposit, DepositKey, DepositNonce, EntityKind, EventOutcome,
    Proposal, ProposalCount, ProposalStatus, ReconcilerContext, ReconcilerError, ResourceId,
    StampPolicy, Timestamp,
};
use crate::ports::EntityStore;
use tracing::debug;

/// One proposal status signal as observed on the local (destination) chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSignal {
    /// Chain the deposit was made on.
    pub origin_chain_id: ChainId,
    /// Resource being bridged.
    pub resource_id: ResourceId,
    /// Hash of the deposit payload.
    pub data_hash: DataHash,
    /// Deposit nonce, unique per direction.
    pub nonce: DepositNonce,
    /// Raw status code, validated on apply.
    pub status_code: u8,
    /// Block timestamp of the signal.
    pub timestamp: Timestamp,
    /// Sender of the transaction carrying the signal.
    pub actor: Address,
}

/// Apply a proposal status signal.
///
/// The status code is validated before anything is written. Returns
/// `Created` when this signal brought the proposal into existence.
pub fn on_proposal_status_signal<S: EntityStore>(
    store: &mut S,
    ctx: &ReconcilerContext,
    stamp_policy: StampPolicy,
    signal: StatusSignal,
) -> Result<EventOutcome, ReconcilerError> {
    let status = ProposalStatus::try_from(signal.status_code)?;
    let key = DepositKey::new(signal.origin_chain_id, ctx.local_chain_id, signal.nonce);

    let deposit = match store.load::<Deposit>(&key)? {
        Some(deposit) => deposit,
        None => {
            let deposit = Deposit::mirrored(key, signal.resource_id, signal.timestamp);
            store.save(&deposit)?;
            debug!("[bridge] Mirrored deposit {} from proposal signal", deposit.id);
            deposit
        }
    };

    let (mut proposal, outcome) = match store.load::<Proposal>(&key)? {
        Some(proposal) => (proposal, EventOutcome::Applied),
        None => (
            create_proposal(store, &deposit, &signal)?,
            EventOutcome::Created {
                kind: EntityKind::Proposal,
            },
        ),
    };

    let previous = proposal.apply_status(status, signal.timestamp, signal.actor, stamp_policy);
    store.save(&proposal)?;

    debug!(
        "[bridge] Proposal {} status {} -> {}",
        proposal.id, previous, status
    );
    Ok(outcome)
}

fn create_proposal<S: EntityStore>(
    store: &mut S,
    deposit: &Deposit,
    signal: &StatusSignal,
) -> Result<Proposal, ReconcilerError> {
    let proposal = Proposal::new(deposit, signal.data_hash, signal.timestamp, signal.actor);

    let direction = deposit.key().direction();
    let mut count = store
        .load::<ProposalCount>(&direction)?
        .unwrap_or_else(|| ProposalCount::new(direction));
    count.increment();
    store.save(&count)?;

    debug!(
        "[bridge] Proposal {} created ({} total for {})",
        proposal.id, count.proposal_count, count.id
    );
    Ok(proposal)
}
