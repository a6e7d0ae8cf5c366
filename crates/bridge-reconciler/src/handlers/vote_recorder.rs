//! Relayer vote recording.

use crate::domain::{
    Address, ChainId, DepositKey, DepositNonce, EntityKind, EventOutcome, ReconcilerContext,
    ReconcilerError, Relayer, Timestamp, Vote, VoteKey,
};
use crate::ports::EntityStore;
use tracing::debug;

/// Record an affirmative vote and bump the voter's tally.
///
/// Fails with `MissingRequiredEntity` when the voter is not a known relayer;
/// the staged vote is then discarded together with the rest of the event.
pub fn on_vote_cast<S: EntityStore>(
    store: &mut S,
    ctx: &ReconcilerContext,
    origin_chain_id: ChainId,
    nonce: DepositNonce,
    voter: Address,
    timestamp: Timestamp,
) -> Result<EventOutcome, ReconcilerError> {
    let proposal = DepositKey::new(origin_chain_id, ctx.local_chain_id, nonce);
    let vote = Vote::yes(VoteKey::new(proposal, voter), timestamp);
    store.save(&vote)?;

    let mut relayer = store.load::<Relayer>(&voter)?.ok_or_else(|| {
        ReconcilerError::MissingRequiredEntity {
            kind: EntityKind::Relayer,
            id: voter.to_hex(),
        }
    })?;
    relayer.vote_count += 1;
    store.save(&relayer)?;

    debug!(
        "[bridge] Vote {} recorded (relayer tally {})",
        vote.id, relayer.vote_count
    );
    Ok(EventOutcome::Applied)
}
