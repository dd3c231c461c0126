//! Test helpers and builder patterns for triage tests
//!
//! This module provides a builder over the mocked store to reduce test
//! boilerplate. Tests register the specific expectations their flow needs
//! first; `with_happy_store` appends permissive catch-all behaviors for
//! flows that do not inspect store interactions.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use shared::Patient;
use triage::{MockPatientStore, TriageService, UndoOutcome};

use super::fixtures::TestFixtures;

/// Builder pattern for creating test services with mocked persistence
pub struct TriageBuilder {
    store: MockPatientStore,
    history_capacity: usize,
}

impl TriageBuilder {
    pub fn new() -> Self {
        Self {
            store: MockPatientStore::new(),
            history_capacity: triage::core::DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Configure the store mock with a setup function
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockPatientStore),
    {
        setup(&mut self.store);
        self
    }

    /// Append permissive defaults: inserts hand out sequential ids and
    /// every other call succeeds with an empty result. Declared after the
    /// specific expectations so those keep precedence.
    pub fn with_happy_store(mut self) -> Self {
        let counter = Arc::new(AtomicI64::new(0));
        self.store
            .expect_insert()
            .returning(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) + 1))
            .times(0..);
        self.store
            .expect_mark_attended()
            .returning(|_, _| Ok(true))
            .times(0..);
        self.store
            .expect_revert_to_waiting()
            .returning(|_| Ok(true))
            .times(0..);
        self.store.expect_delete().returning(|_| Ok(true)).times(0..);
        self.store
            .expect_find_by_id()
            .returning(|_| Ok(None))
            .times(0..);
        self.store
            .expect_find_by_name_like()
            .returning(|_| Ok(Vec::new()))
            .times(0..);
        self.store
            .expect_list_waiting()
            .returning(|| Ok(Vec::new()))
            .times(0..);
        self.store
            .expect_list_attended_filtered()
            .returning(|_, _, _| Ok(Vec::new()))
            .times(0..);
        self.store
            .expect_count_attended_today()
            .returning(|| Ok(0))
            .times(0..);
        self.store
            .expect_avg_wait_minutes_today()
            .returning(|| Ok(0.0))
            .times(0..);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn build(self) -> TriageService<MockPatientStore> {
        TriageService::with_history_capacity(self.store, self.history_capacity)
    }
}

impl Default for TriageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Assertion helpers shared by the test suites
pub struct TestHelpers;

impl TestHelpers {
    /// Register the sample waiting set through the service, returning the
    /// patients in registration order.
    pub async fn register_sample_set(service: &TriageService<MockPatientStore>) -> Vec<Patient> {
        let mut registered = Vec::new();
        for fixture in TestFixtures::sample_waiting_set() {
            let patient = service
                .register(&fixture.name, fixture.age, &fixture.symptoms, fixture.level)
                .await
                .expect("registration should succeed");
            registered.push(patient);
        }
        registered
    }

    /// Assert the undo outcome reverted a registration for `name`.
    pub fn assert_registration_undone(outcome: &UndoOutcome, name: &str) {
        match outcome {
            UndoOutcome::RegistrationUndone { patient, description } => {
                assert_eq!(patient.name, name);
                assert!(description.contains(name), "description: {description}");
            }
            other => panic!("expected RegistrationUndone, got {other:?}"),
        }
    }

    /// Assert the undo outcome reverted an attention for `name`.
    pub fn assert_attention_undone(outcome: &UndoOutcome, name: &str) {
        match outcome {
            UndoOutcome::AttentionUndone { patient, description } => {
                assert_eq!(patient.name, name);
                assert!(description.contains(name), "description: {description}");
            }
            other => panic!("expected AttentionUndone, got {other:?}"),
        }
    }
}
