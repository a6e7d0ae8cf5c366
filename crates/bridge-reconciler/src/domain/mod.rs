//! # Domain Module
//!
//! Core domain types for the bridge reconciler: entities, identifiers,
//! events, configuration and errors. No I/O.

pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use value_objects::*;
