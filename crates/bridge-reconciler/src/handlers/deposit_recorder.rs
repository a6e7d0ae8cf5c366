//! Origin-side deposit recording.

use crate::domain::{
    ChainId, Deposit, DepositKey, DepositNonce, EventOutcome, ReconcilerContext, ReconcilerError,
    ResourceId, Timestamp,
};
use crate::ports::EntityStore;
use tracing::debug;

/// Record a deposit initiated on the local chain.
///
/// Always writes a fresh deposit: the origin side emits each nonce once, and
/// a mirrored deposit created earlier from the destination side is replaced.
pub fn on_deposit_initiated<S: EntityStore>(
    store: &mut S,
    ctx: &ReconcilerContext,
    destination_chain_id: ChainId,
    resource_id: ResourceId,
    nonce: DepositNonce,
    timestamp: Timestamp,
) -> Result<EventOutcome, ReconcilerError> {
    let key = DepositKey::new(ctx.local_chain_id, destination_chain_id, nonce);
    let deposit = Deposit::new(key, resource_id, timestamp);

    store.save(&deposit)?;
    debug!("[bridge] Deposit {} recorded", deposit.id);
    Ok(EventOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryKVStore, KvEntityStore};
    use crate::domain::Bytes32;

    #[test]
    fn test_deposit_uses_local_chain_as_origin() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        let ctx = ReconcilerContext::new(ChainId(1), Bytes32([0; 32]));

        on_deposit_initiated(&mut store, &ctx, ChainId(2), Bytes32([7; 32]), 5, 100).unwrap();

        let key = DepositKey::new(ChainId(1), ChainId(2), 5);
        let deposit = store.load::<Deposit>(&key).unwrap().unwrap();
        assert_eq!(deposit.id, "1->2-5");
        assert_eq!(deposit.created_at, 100);
        assert_eq!(deposit.resource_id, Bytes32([7; 32]));
        assert!(deposit.proposal.is_none());
    }

    #[test]
    fn test_repeated_deposit_keeps_single_entity() {
        let mut store = KvEntityStore::new(InMemoryKVStore::new());
        let ctx = ReconcilerContext::new(ChainId(1), Bytes32([0; 32]));

        on_deposit_initiated(&mut store, &ctx, ChainId(2), Bytes32([7; 32]), 5, 100).unwrap();
        on_deposit_initiated(&mut store, &ctx, ChainId(2), Bytes32([7; 32]), 5, 120).unwrap();

        let deposits = store.list::<Deposit>().unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].created_at, 120);
    }
}
