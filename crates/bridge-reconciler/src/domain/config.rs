//! # Reconciler Configuration
//!
//! Runtime configuration loaded from environment variables, and the
//! per-deployment context injected into every handler.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BRIDGE_CONTRACT_ADDRESS` | zero address | Bridge contract the chain reader queries |
//! | `BRIDGE_LOCAL_CHAIN_ID` | read from chain | Override of the local chain id |
//! | `BRIDGE_RELAYER_ROLE` | read from chain | Override of the relayer role id (32-byte hex) |
//! | `BRIDGE_MISSING_ENTITY_POLICY` | `skip` | `skip` or `halt` |
//! | `BRIDGE_STAMP_POLICY` | `last-write-wins` | `last-write-wins` or `first-write-wins` |
//! | `BRIDGE_CHANNEL_CAPACITY` | `1000` | Event channel buffer size |

use super::value_objects::{Address, ChainId, RoleId};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default event channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// What to do with an event whose processing hits a skippable error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingEntityPolicy {
    /// Discard the event's writes, log a warning, continue with the next event.
    #[default]
    Skip,
    /// Surface the error and stop the stream.
    Halt,
}

impl FromStr for MissingEntityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "halt" => Ok(Self::Halt),
            other => Err(format!("unknown missing-entity policy: {}", other)),
        }
    }
}

/// How terminal `*At`/`*By` proposal fields react to a redelivered status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampPolicy {
    /// Every signal re-stamps the fields with the latest occurrence.
    #[default]
    LastWriteWins,
    /// Fields are stamped once; later signals leave them untouched.
    FirstWriteWins,
}

impl FromStr for StampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-write-wins" | "last" => Ok(Self::LastWriteWins),
            "first-write-wins" | "first" => Ok(Self::FirstWriteWins),
            other => Err(format!("unknown stamp policy: {}", other)),
        }
    }
}

/// Reconciler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Bridge contract queried for the chain id and relayer role.
    pub bridge_contract: Address,
    /// Skip the chain-id read and use this value.
    pub local_chain_id: Option<ChainId>,
    /// Skip the relayer-role read and use this value.
    pub relayer_role: Option<RoleId>,
    /// Handling of skippable errors.
    pub missing_entity_policy: MissingEntityPolicy,
    /// Handling of redelivered terminal statuses.
    pub stamp_policy: StampPolicy,
    /// Event channel buffer size.
    pub channel_capacity: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            bridge_contract: Address::ZERO,
            local_chain_id: None,
            relayer_role: None,
            missing_entity_policy: MissingEntityPolicy::Skip,
            stamp_policy: StampPolicy::LastWriteWins,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ReconcilerConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bridge_contract: env::var("BRIDGE_CONTRACT_ADDRESS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bridge_contract),

            local_chain_id: env::var("BRIDGE_LOCAL_CHAIN_ID")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .map(ChainId),

            relayer_role: env::var("BRIDGE_RELAYER_ROLE")
                .ok()
                .and_then(|v| v.parse().ok()),

            missing_entity_policy: env::var("BRIDGE_MISSING_ENTITY_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.missing_entity_policy),

            stamp_policy: env::var("BRIDGE_STAMP_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stamp_policy),

            channel_capacity: env::var("BRIDGE_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(defaults.channel_capacity),
        }
    }
}

/// Deployment constants every handler needs, resolved once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcilerContext {
    /// Chain the indexed bridge contract lives on.
    pub local_chain_id: ChainId,
    /// Role identifier that marks an account as a relayer.
    pub relayer_role: RoleId,
}

impl ReconcilerContext {
    /// Create a context.
    pub fn new(local_chain_id: ChainId, relayer_role: RoleId) -> Self {
        Self {
            local_chain_id,
            relayer_role,
        }
    }
}
