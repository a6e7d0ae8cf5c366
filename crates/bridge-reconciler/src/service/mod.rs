//! # Reconciler Service
//!
//! The application service implementing `ReconcilerApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Routes each `BridgeEvent` to its handler
//! 2. Commits the handler's staged writes as one atomic batch, or discards
//!    them if the handler fails
//! 3. Applies the missing-entity policy to skippable errors
//! 4. Records one metric sample per event, plus the entity counters once the
//!    writes are committed


use crate::adapters::KvEntityStore;
use crate::domain::{
    Address, BridgeEvent, ChainEvent, Deposit, DepositKey, DirectionKey, EntityKind, EventOutcome,
    MissingEntityPolicy, Proposal, ProposalCount, ReconcilerConfig, ReconcilerContext,
    ReconcilerError, Relayer, Vote, VoteKey,
};
use crate::handlers::{self, StatusSignal};
use crate::ports::inbound::{ReconcilerApi, Snapshot};
use crate::ports::outbound::{ChainReader, EntityStore, KeyValueStore};
use bridge_telemetry::metrics;
use tracing::{error, info, warn};

/// Resolve the deployment context.
///
/// Configured overrides win; only missing values are read from the chain.
pub async fn resolve_context<R: ChainReader + ?Sized>(
    reader: &R,
    config: &ReconcilerConfig,
) -> Result<ReconcilerContext, ReconcilerError> {
    let local_chain_id = match config.local_chain_id {
        Some(chain_id) => chain_id,
        None => reader.chain_id(&config.bridge_contract).await?,
    };
    let relayer_role = match config.relayer_role {
        Some(role) => role,
        None => reader.relayer_role(&config.bridge_contract).await?,
    };

    info!(
        "[bridge] Context resolved: chain {} relayer role {}",
        local_chain_id, relayer_role
    );
    Ok(ReconcilerContext::new(local_chain_id, relayer_role))
}

/// The bridge reconciler.
///
/// Owns the entity store; events must be applied one at a time, in source
/// order.
pub struct Reconciler<KV: KeyValueStore> {
    store: KvEntityStore<KV>,
    context: ReconcilerContext,
    config: ReconcilerConfig,
}

impl<KV: KeyValueStore> Reconciler<KV> {
    /// Create a reconciler with an already resolved context.
    pub fn new(kv: KV, context: ReconcilerContext, config: ReconcilerConfig) -> Self {
        Self {
            store: KvEntityStore::new(kv),
            context,
            config,
        }
    }

    /// Create a reconciler, resolving the context through the chain reader.
    pub async fn connect<R: ChainReader + ?Sized>(
        kv: KV,
        reader: &R,
        config: ReconcilerConfig,
    ) -> Result<Self, ReconcilerError> {
        let context = resolve_context(reader, &config).await?;
        Ok(Self::new(kv, context, config))
    }

    /// Resolved deployment context.
    pub fn context(&self) -> &ReconcilerContext {
        &self.context
    }

    /// Active configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Unwrap the key-value backend.
    pub fn into_inner(self) -> KV {
        self.store.into_inner()
    }

    fn dispatch(&mut self, event: &ChainEvent) -> Result<EventOutcome, ReconcilerError> {
        let store = &mut self.store;
        let ctx = &self.context;

        match &event.event {
            BridgeEvent::RelayerAdded { relayer } => handlers::on_relayer_added(
                store,
                *relayer,
                event.block_timestamp,
                event.block_number,
            ),
            BridgeEvent::RoleGranted { role, account, .. } => handlers::on_authorization_granted(
                store,
                ctx,
                *account,
                *role,
                event.block_timestamp,
                event.block_number,
            ),
            BridgeEvent::RelayerRemoved { relayer } => handlers::on_revoked(store, *relayer),
            BridgeEvent::Deposit {
                destination_chain_id,
                resource_id,
                deposit_nonce,
            } => handlers::on_deposit_initiated(
                store,
                ctx,
                *destination_chain_id,
                *resource_id,
                *deposit_nonce,
                event.block_timestamp,
            ),
            BridgeEvent::ProposalEvent {
                origin_chain_id,
                deposit_nonce,
                status,
                resource_id,
                data_hash,
            } => handlers::on_proposal_status_signal(
                store,
                ctx,
                self.config.stamp_policy,
                StatusSignal {
                    origin_chain_id: *origin_chain_id,
                    resource_id: *resource_id,
                    data_hash: *data_hash,
                    nonce: *deposit_nonce,
                    status_code: *status,
                    timestamp: event.block_timestamp,
                    actor: event.tx_sender,
                },
            ),
            BridgeEvent::ProposalVote {
                origin_chain_id,
                deposit_nonce,
                ..
            } => handlers::on_vote_cast(
                store,
                ctx,
                *origin_chain_id,
                *deposit_nonce,
                event.tx_sender,
                event.block_timestamp,
            ),
        }
    }

    fn record_committed(event: &BridgeEvent, outcome: &EventOutcome) {
        match (event, outcome) {
            (
                _,
                EventOutcome::Created {
                    kind: EntityKind::Proposal,
                },
            ) => metrics::PROPOSALS_CREATED.inc(),
            (BridgeEvent::ProposalVote { .. }, EventOutcome::Applied) => {
                metrics::VOTES_RECORDED.inc()
            }
            _ => {}
        }
    }

    fn fail(&self, name: &str, event: &ChainEvent, err: ReconcilerError) -> ReconcilerError {
        error!(
            "[bridge] {} at block {} halted processing: {}",
            name, event.block_number, err
        );
        metrics::record_failure(name);
        err
    }
}

impl<KV: KeyValueStore> ReconcilerApi for Reconciler<KV> {
    fn apply(&mut self, event: &ChainEvent) -> Result<EventOutcome, ReconcilerError> {
        let name = event.event.name();

        let outcome = match self.dispatch(event) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.store.discard();

                if err.is_skippable() && self.config.missing_entity_policy == MissingEntityPolicy::Skip
                {
                    warn!(
                        "[bridge] Skipping {} at block {}: {}",
                        name, event.block_number, err
                    );
                    let outcome = EventOutcome::Skipped {
                        reason: err.to_string(),
                    };
                    metrics::record_event(name, outcome.label());
                    return Ok(outcome);
                }
                return Err(self.fail(name, event, err));
            }
        };

        if let Err(err) = self.store.commit() {
            return Err(self.fail(name, event, err.into()));
        }

        Self::record_committed(&event.event, &outcome);
        metrics::record_event(name, outcome.label());
        Ok(outcome)
    }

    fn relayer(&self, address: &Address) -> Result<Option<Relayer>, ReconcilerError> {
        Ok(self.store.load::<Relayer>(address)?)
    }

    fn deposit(&self, key: &DepositKey) -> Result<Option<Deposit>, ReconcilerError> {
        Ok(self.store.load::<Deposit>(key)?)
    }

    fn proposal(&self, key: &DepositKey) -> Result<Option<Proposal>, ReconcilerError> {
        Ok(self.store.load::<Proposal>(key)?)
    }

    fn proposal_count(
        &self,
        direction: &DirectionKey,
    ) -> Result<Option<ProposalCount>, ReconcilerError> {
        Ok(self.store.load::<ProposalCount>(direction)?)
    }

    fn vote(&self, key: &VoteKey) -> Result<Option<Vote>, ReconcilerError> {
        Ok(self.store.load::<Vote>(key)?)
    }

    fn relayers(&self) -> Result<Vec<Relayer>, ReconcilerError> {
        Ok(self.store.list::<Relayer>()?)
    }

    fn snapshot(&self) -> Result<Snapshot, ReconcilerError> {
        Ok(Snapshot {
            relayers: self.store.list()?,
            deposits: self.store.list()?,
            proposals: self.store.list()?,
            proposal_counts: self.store.list()?,
            votes: self.store.list()?,
        })
    }
}
