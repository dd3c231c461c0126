//! Trait definitions with mockall annotations for testing
//!
//! This module contains the backing-store contract the triage service
//! depends on, with mockall mock generation for dependency injection
//! in tests. The store's internal engine (SQL, files, remote service)
//! is deliberately outside the core; only this call contract is fixed.

use chrono::{DateTime, Utc};
use shared::{Patient, TimeWindow, UrgencyLevel};
use thiserror::Error;

/// Error surfaced by a failing store call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("write rejected: {message}")]
    WriteFailed { message: String },

    #[error("query failed: {message}")]
    QueryFailed { message: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Persistent patient repository abstraction for dependency injection
///
/// Every call is awaited inline by the service and blocks the operation
/// that issued it; there is no batching or write-behind. Implementations
/// must be safe to share across tasks.
#[mockall::automock]
#[async_trait::async_trait]
pub trait PatientStore: Send + Sync {
    /// Persist a new waiting patient
    ///
    /// # Parameters
    /// - `patient`: record to persist; its `id` field is ignored
    ///
    /// # Returns
    /// The identifier assigned by the store.
    async fn insert(&self, patient: Patient) -> Result<i64, StoreError>;

    /// Mark a patient as attended at the given time
    ///
    /// # Returns
    /// `true` if a row was updated, `false` if the id was unknown.
    async fn mark_attended(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Revert a patient to waiting, clearing its attention timestamp
    async fn revert_to_waiting(&self, id: i64) -> Result<bool, StoreError>;

    /// Physically delete a patient row (undo of a registration)
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Point lookup by identifier
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError>;

    /// Substring lookup by name, most recent arrivals first
    async fn find_by_name_like(&self, fragment: &str) -> Result<Vec<Patient>, StoreError>;

    /// All waiting patients, most urgent first (startup rehydration only)
    async fn list_waiting(&self) -> Result<Vec<Patient>, StoreError>;

    /// Attended patients with optional level/name filters inside a time window
    async fn list_attended_filtered(
        &self,
        level: Option<UrgencyLevel>,
        name_fragment: Option<String>,
        window: TimeWindow,
    ) -> Result<Vec<Patient>, StoreError>;

    /// Number of patients attended today
    async fn count_attended_today(&self) -> Result<u64, StoreError>;

    /// Average wait in minutes over patients attended today
    async fn avg_wait_minutes_today(&self) -> Result<f64, StoreError>;
}
