//! Shared error types for the triage system

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid urgency level: {value} (expected 1..=5)")]
    InvalidLevel { value: u8 },

    #[error("Invalid time window: {input}")]
    InvalidTimeWindow { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
