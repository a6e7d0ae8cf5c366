//! # Commit Metrics Tests
//!
//! Entity counters move only once an event's writes are committed. Lives in
//! its own test binary because the counters are process-wide.

use bridge_reconciler::ports::{BatchOperation, ScanResult};
use bridge_reconciler::{
    default_relayer_role, Address, BridgeEvent, Bytes32, ChainEvent, ChainId, DepositKey,
    EntityStore, InMemoryKVStore, KeyValueStore, KvEntityStore, Reconciler, ReconcilerApi,
    ReconcilerConfig, ReconcilerContext, ReconcilerError, Relayer, StoreError,
};
use bridge_telemetry::metrics::{PROPOSALS_CREATED, VOTES_RECORDED};

const LOCAL_CHAIN: ChainId = ChainId(2);
const RELAYER_A: Address = Address([0xAA; 20]);
const SENDER_B: Address = Address([0xBB; 20]);

/// Store whose reads work but whose batch writes always fail.
struct ReadOnlyKVStore {
    inner: InMemoryKVStore,
}

impl KeyValueStore for ReadOnlyKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, _operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        Err(StoreError::IOError {
            message: "disk full".to_string(),
        })
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, StoreError> {
        self.inner.prefix_scan(prefix)
    }
}

fn with_relayer() -> InMemoryKVStore {
    let mut store = KvEntityStore::new(InMemoryKVStore::new());
    store.save(&Relayer::new(RELAYER_A, 100, 10)).unwrap();
    store.commit().unwrap();
    store.into_inner()
}

fn context() -> ReconcilerContext {
    ReconcilerContext::new(LOCAL_CHAIN, default_relayer_role())
}

fn at(timestamp: u64, sender: Address, event: BridgeEvent) -> ChainEvent {
    ChainEvent {
        contract: Address::ZERO,
        block_number: timestamp / 10,
        block_timestamp: timestamp,
        tx_sender: sender,
        event,
    }
}

fn status(code: u8) -> BridgeEvent {
    BridgeEvent::ProposalEvent {
        origin_chain_id: ChainId(1),
        deposit_nonce: 5,
        status: code,
        resource_id: Bytes32([0x42; 32]),
        data_hash: Bytes32([0x99; 32]),
    }
}

fn vote() -> BridgeEvent {
    BridgeEvent::ProposalVote {
        origin_chain_id: ChainId(1),
        deposit_nonce: 5,
        status: 1,
        resource_id: Bytes32([0x42; 32]),
    }
}

#[test]
fn test_entity_counters_follow_commits() {
    let proposals = PROPOSALS_CREATED.get();
    let votes = VOTES_RECORDED.get();
    let key = DepositKey::new(ChainId(1), LOCAL_CHAIN, 5);

    // Discarded batches leave the counters alone
    let mut failing = Reconciler::new(
        ReadOnlyKVStore {
            inner: with_relayer(),
        },
        context(),
        ReconcilerConfig::default(),
    );
    let err = failing.apply(&at(150, SENDER_B, status(1))).unwrap_err();
    assert!(matches!(err, ReconcilerError::Store(_)));
    let err = failing.apply(&at(160, RELAYER_A, vote())).unwrap_err();
    assert!(matches!(err, ReconcilerError::Store(_)));

    assert!(failing.proposal(&key).unwrap().is_none());
    assert_eq!(PROPOSALS_CREATED.get(), proposals);
    assert_eq!(VOTES_RECORDED.get(), votes);

    // Committed: one creation despite two signals, one vote
    let mut healthy = Reconciler::new(with_relayer(), context(), ReconcilerConfig::default());
    healthy.apply(&at(150, SENDER_B, status(1))).unwrap();
    healthy.apply(&at(155, SENDER_B, status(2))).unwrap();
    healthy.apply(&at(160, RELAYER_A, vote())).unwrap();

    assert!(healthy.proposal(&key).unwrap().is_some());
    assert_eq!(PROPOSALS_CREATED.get(), proposals + 1.0);
    assert_eq!(VOTES_RECORDED.get(), votes + 1.0);
}
