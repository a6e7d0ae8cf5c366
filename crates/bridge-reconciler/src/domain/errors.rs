//! # Domain Errors
//!
//! Error types for the bridge reconciler.
//!
//! ## Taxonomy
//!
//! | Error | Recoverable | Meaning |
//! |-------|-------------|---------|
//! | `MissingRequiredEntity` | per policy | A handler expected a previously created entity |
//! | `UnknownStatusCode` | per policy | Proposal status code outside `0..=4` |
//! | `UpstreamReadFailure` | no | Chain reader unavailable |
//! | `Store` | no | Persistence failure |
//!
//! A role grant for a non-relayer role is NOT an error; it yields
//! `EventOutcome::Ignored`.

use super::entities::EntityKind;
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying key-value store failed.
    #[error("I/O error: {message}")]
    IOError {
        /// Backend error message.
        message: String,
    },

    /// Entity could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Codec error message.
        message: String,
    },
}

/// Errors raised while reconciling a single event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcilerError {
    /// A handler expected an entity to exist and found none.
    #[error("Missing required {kind} entity: {id}")]
    MissingRequiredEntity {
        /// Entity type that was looked up.
        kind: EntityKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// Proposal status code has no named status.
    #[error("Unknown proposal status code: {0}")]
    UnknownStatusCode(u8),

    /// The chain-read collaborator is unavailable.
    #[error("Upstream read failure: {0}")]
    UpstreamReadFailure(String),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReconcilerError {
    /// Whether the offending event may be skipped without corrupting state.
    ///
    /// Upstream and store failures always abort processing.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredEntity { .. } | Self::UnknownStatusCode(_)
        )
    }
}
