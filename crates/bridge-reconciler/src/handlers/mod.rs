//! # Event Handlers
//!
//! One module per entity family. Handlers read and write through the
//! `EntityStore` port only; atomicity is the caller's concern.

pub mod deposit_recorder;
pub mod proposal_tracker;
pub mod relayer_lifecycle;
pub mod vote_recorder;

pub use deposit_recorder::on_deposit_initiated;
pub use proposal_tracker::{on_proposal_status_signal, StatusSignal};
pub use relayer_lifecycle::{on_authorization_granted, on_relayer_added, on_revoked};
pub use vote_recorder::on_vote_cast;
