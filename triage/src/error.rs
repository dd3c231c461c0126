//! Triage-specific error types

use crate::traits::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Store operation '{operation}' failed: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Priority queue is empty")]
    EmptyQueue,

    #[error("Undo log is empty")]
    EmptyUndo,
}

impl TriageError {
    pub(crate) fn persistence(operation: &'static str, source: StoreError) -> Self {
        TriageError::Persistence { operation, source }
    }
}

pub type TriageResult<T> = Result<T, TriageError>;
