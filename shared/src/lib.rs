//! Shared types for the triage system
//!
//! Contains the domain model (patients, urgency levels, stats snapshots)
//! plus the error and logging plumbing used by every consumer of the
//! triage service. Service-internal types (undo entries, core structures)
//! live in the `triage` crate.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
