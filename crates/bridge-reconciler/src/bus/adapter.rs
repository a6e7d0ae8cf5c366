//! # Reconciler Bus Adapter
//!
//! Connects the reconciler to a channel or stream of decoded events.

use crate::domain::{ChainEvent, EventOutcome, ReconcilerError};
use crate::ports::inbound::ReconcilerApi;
use crate::ports::outbound::KeyValueStore;
use crate::service::Reconciler;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use super::event_types;

/// Error types for the bus adapter
#[derive(Debug, Error)]
pub enum BusAdapterError {
    /// Failed to decode an event payload
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The reconciler hit a fatal error
    #[error("Reconciler error: {0}")]
    Reconciler(#[from] ReconcilerError),
}

/// Decode one JSON-encoded `ChainEvent`.
pub fn decode_event(payload: &str) -> Result<ChainEvent, BusAdapterError> {
    serde_json::from_str(payload).map_err(|e| BusAdapterError::Deserialization(e.to_string()))
}

/// Per-outcome event tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Events whose writes were committed.
    pub applied: u64,
    /// Events irrelevant to the reconciler.
    pub ignored: u64,
    /// Events discarded under the skip policy.
    pub skipped: u64,
}

impl ReplaySummary {
    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Applied | EventOutcome::Created { .. } => self.applied += 1,
            EventOutcome::Ignored { .. } => self.ignored += 1,
            EventOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Events consumed.
    pub fn total(&self) -> u64 {
        self.applied + self.ignored + self.skipped
    }
}

/// Adapter that feeds events into a `Reconciler`.
///
/// ## Example
///
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(config.channel_capacity);
/// let mut adapter = ReconcilerBusAdapter::new(reconciler);
///
/// let summary = adapter.run(rx).await?;
/// ```
pub struct ReconcilerBusAdapter<KV: KeyValueStore> {
    reconciler: Reconciler<KV>,
    summary: ReplaySummary,
}

impl<KV: KeyValueStore> ReconcilerBusAdapter<KV> {
    /// Create a new bus adapter wrapping the given reconciler.
    pub fn new(reconciler: Reconciler<KV>) -> Self {
        Self {
            reconciler,
            summary: ReplaySummary::default(),
        }
    }

    /// Get the list of event types this adapter subscribes to.
    pub fn subscriptions() -> Vec<&'static str> {
        vec![
            event_types::RELAYER_ADDED,
            event_types::ROLE_GRANTED,
            event_types::RELAYER_REMOVED,
            event_types::DEPOSIT,
            event_types::PROPOSAL_EVENT,
            event_types::PROPOSAL_VOTE,
        ]
    }

    /// Apply one decoded event.
    pub fn handle_event(&mut self, event: &ChainEvent) -> Result<EventOutcome, BusAdapterError> {
        let outcome = self.reconciler.apply(event)?;
        self.summary.record(&outcome);
        debug!(
            "[bridge] {} at block {}: {}",
            event.event.name(),
            event.block_number,
            outcome.label()
        );
        Ok(outcome)
    }

    /// Decode and apply one JSON payload.
    pub fn handle_payload(&mut self, payload: &str) -> Result<EventOutcome, BusAdapterError> {
        let event = decode_event(payload)?;
        self.handle_event(&event)
    }

    /// Consume a channel until every sender is dropped.
    pub async fn run(
        &mut self,
        receiver: mpsc::Receiver<ChainEvent>,
    ) -> Result<ReplaySummary, BusAdapterError> {
        self.run_stream(ReceiverStream::new(receiver)).await
    }

    /// Consume a stream until it ends or an event fails fatally.
    pub async fn run_stream<S>(&mut self, mut events: S) -> Result<ReplaySummary, BusAdapterError>
    where
        S: Stream<Item = ChainEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            self.handle_event(&event)?;
        }

        info!(
            "[bridge] Event stream drained: {} applied, {} ignored, {} skipped",
            self.summary.applied, self.summary.ignored, self.summary.skipped
        );
        Ok(self.summary)
    }

    /// Tally so far.
    pub fn summary(&self) -> ReplaySummary {
        self.summary
    }

    /// Access the underlying reconciler for queries.
    pub fn reconciler(&self) -> &Reconciler<KV> {
        &self.reconciler
    }

    /// Unwrap the reconciler.
    pub fn into_inner(self) -> Reconciler<KV> {
        self.reconciler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKVStore;
    use crate::domain::{
        Address, BridgeEvent, Bytes32, ChainId, MissingEntityPolicy, ReconcilerConfig,
        ReconcilerContext,
    };

    const ROLE: Bytes32 = Bytes32([0x11; 32]);
    const ALICE: Address = Address([0xAA; 20]);

    fn adapter(policy: MissingEntityPolicy) -> ReconcilerBusAdapter<InMemoryKVStore> {
        let config = ReconcilerConfig {
            missing_entity_policy: policy,
            ..Default::default()
        };
        ReconcilerBusAdapter::new(Reconciler::new(
            InMemoryKVStore::new(),
            ReconcilerContext::new(ChainId(2), ROLE),
            config,
        ))
    }

    fn event(block: u64, event: BridgeEvent) -> ChainEvent {
        ChainEvent {
            contract: Address::ZERO,
            block_number: block,
            block_timestamp: block * 10,
            tx_sender: ALICE,
            event,
        }
    }

    fn vote(nonce: u64) -> BridgeEvent {
        BridgeEvent::ProposalVote {
            origin_chain_id: ChainId(1),
            deposit_nonce: nonce,
            status: 1,
            resource_id: Bytes32([7; 32]),
        }
    }

    #[test]
    fn test_subscriptions() {
        let subs = ReconcilerBusAdapter::<InMemoryKVStore>::subscriptions();
        assert_eq!(subs.len(), 6);
        assert!(subs.contains(&"ProposalVote"));
    }

    #[test]
    fn test_handle_payload_rejects_garbage() {
        let mut adapter = adapter(MissingEntityPolicy::Skip);
        let err = adapter.handle_payload("{not json").unwrap_err();
        assert!(matches!(err, BusAdapterError::Deserialization(_)));
    }

    #[test]
    fn test_handle_payload_applies_event() {
        let mut adapter = adapter(MissingEntityPolicy::Skip);
        let payload = format!(
            r#"{{"contract":"{zero}","blockNumber":1,"blockTimestamp":10,"txSender":"{zero}",
               "event":{{"type":"RelayerAdded","relayer":"{alice}"}}}}"#,
            zero = Address::ZERO,
            alice = ALICE
        );

        let outcome = adapter.handle_payload(&payload).unwrap();

        assert_eq!(outcome, EventOutcome::Applied);
        assert!(adapter.reconciler().relayer(&ALICE).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_run_drains_channel_in_order() {
        let mut adapter = adapter(MissingEntityPolicy::Skip);
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            tx.send(event(1, BridgeEvent::RelayerAdded { relayer: ALICE }))
                .await
                .unwrap();
            tx.send(event(2, vote(5))).await.unwrap();
            tx.send(event(3, vote(6))).await.unwrap();
            tx.send(event(4, BridgeEvent::RelayerRemoved { relayer: ALICE }))
                .await
                .unwrap();
            tx.send(event(5, vote(7))).await.unwrap();
        });

        let summary = adapter.run(rx).await.unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 4,
                ignored: 0,
                skipped: 1
            }
        );
        assert_eq!(summary.total(), 5);
        assert_eq!(adapter.reconciler().snapshot().unwrap().votes.len(), 2);
    }

    #[tokio::test]
    async fn test_run_stream_stops_on_fatal_error() {
        let mut adapter = adapter(MissingEntityPolicy::Halt);
        let events = tokio_stream::iter(vec![
            event(1, vote(5)),
            event(2, BridgeEvent::RelayerAdded { relayer: ALICE }),
        ]);

        let err = adapter.run_stream(events).await.unwrap_err();

        assert!(matches!(
            err,
            BusAdapterError::Reconciler(ReconcilerError::MissingRequiredEntity { .. })
        ));
        assert!(adapter.reconciler().relayer(&ALICE).unwrap().is_none());
    }
}
