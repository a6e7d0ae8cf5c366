//! # Relayer Lifecycle
//!
//! Grants and revocations of the relayer role.
//!
//! Two grant paths exist: the generic access-control `RoleGranted` event
//! (filtered by the relayer role id) and the dedicated `RelayerAdded` event
//! (no filter). Both upsert the relayer and reset its vote tally.

use crate::domain::{
    Address, BlockNumber, EventOutcome, ReconcilerContext, ReconcilerError, Relayer, RoleId,
    Timestamp,
};
use crate::ports::EntityStore;
use tracing::debug;

/// Handle a role grant. Grants of any role other than the relayer role are
/// ignored.
pub fn on_authorization_granted<S: EntityStore>(
    store: &mut S,
    ctx: &ReconcilerContext,
    account: Address,
    role: RoleId,
    timestamp: Timestamp,
    block_height: BlockNumber,
) -> Result<EventOutcome, ReconcilerError> {
    if role != ctx.relayer_role {
        debug!("[bridge] Ignoring grant of role {} to {}", role, account);
        return Ok(EventOutcome::Ignored {
            reason: "role is not the relayer role",
        });
    }
    on_relayer_added(store, account, timestamp, block_height)
}

/// Handle the dedicated relayer-added signal.
pub fn on_relayer_added<S: EntityStore>(
    store: &mut S,
    account: Address,
    timestamp: Timestamp,
    block_height: BlockNumber,
) -> Result<EventOutcome, ReconcilerError> {
    let relayer = match store.load::<Relayer>(&account)? {
        Some(mut existing) => {
            debug!(
                "[bridge] Re-granting relayer {} (tally {} reset)",
                existing.id, existing.vote_count
            );
            existing.regrant(timestamp, block_height);
            existing
        }
        None => Relayer::new(account, timestamp, block_height),
    };

    store.save(&relayer)?;
    debug!(
        "[bridge] Relayer {} authorized at block {}",
        relayer.id, block_height
    );
    Ok(EventOutcome::Applied)
}

/// Handle a revocation. Votes cast by the relayer are kept.
pub fn on_revoked<S: EntityStore>(
    store: &mut S,
    account: Address,
) -> Result<EventOutcome, ReconcilerError> {
    store.remove::<Relayer>(&account)?;
    debug!("[bridge] Relayer {} revoked", account);
    Ok(EventOutcome::Applied)
}
