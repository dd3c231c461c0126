//! Unit tests for the triage service over a mocked store
//!
//! These tests verify service behavior in isolation: store-first writes,
//! failure handling, undo semantics and the search fallback rules, using
//! expectations on the mocked persistence layer.

mod common;
use common::{TestFixtures, TestHelpers, TriageBuilder};

use shared::{PatientStatus, UrgencyLevel};
use triage::{StoreError, TriageError, UndoOutcome};

/// Registration persists first, then lands in every structure
#[tokio::test]
async fn test_register_inserts_into_all_structures() {
    let service = TriageBuilder::new().with_happy_store().build();

    let patient = service
        .register("Ana", 30, "fever", UrgencyLevel::Urgent)
        .await
        .expect("registration should succeed");

    assert_eq!(patient.id, 1);
    assert_eq!(patient.status, PatientStatus::Waiting);
    assert_eq!(service.queue_size().await, 1);
    assert_eq!(service.undo_depth().await, 1);
    assert!(service.is_consistent().await);

    let found = service.search_by_id(1).await.unwrap();
    assert_eq!(found.expect("patient should be indexed").name, "Ana");
}

/// A failed store insert propagates and leaves no partial memory state
#[tokio::test]
async fn test_register_store_failure_leaves_memory_untouched() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_insert().times(1).returning(|_| {
                Err(StoreError::Unavailable {
                    message: "connection refused".to_string(),
                })
            });
        })
        .build();

    let result = service.register("Ana", 30, "fever", UrgencyLevel::Urgent).await;

    assert!(matches!(
        result,
        Err(TriageError::Persistence { operation: "insert", .. })
    ));
    assert_eq!(service.queue_size().await, 0);
    assert_eq!(service.undo_depth().await, 0);
    assert!(service.is_consistent().await);
}

/// Attending an empty queue is not an error
#[tokio::test]
async fn test_attend_next_on_empty_queue_returns_none() {
    let service = TriageBuilder::new().build();
    let attended = service.attend_next().await.unwrap();
    assert!(attended.is_none());
}

/// The most urgent patient comes out first and the store is told
#[tokio::test]
async fn test_attend_next_pops_most_urgent_and_updates_store() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store
                .expect_mark_attended()
                .times(1)
                .withf(|id, _at| *id == 2)
                .returning(|_, _| Ok(true));
        })
        .with_happy_store()
        .build();

    TestHelpers::register_sample_set(&service).await;

    let attended = service
        .attend_next()
        .await
        .unwrap()
        .expect("queue should not be empty");

    // Juana carries the only Resuscitation level in the sample set
    assert_eq!(attended.name, "Juana");
    assert_eq!(attended.status, PatientStatus::Attended);
    assert!(attended.attended_at.is_some());
    assert_eq!(service.queue_size().await, 4);
    assert_eq!(service.undo_depth().await, 6);
    assert!(service.is_consistent().await);

    let history = service.history_snapshot().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].name, "Juana");
}

/// A failed store update does not roll back the in-memory transition
#[tokio::test]
async fn test_attend_store_failure_keeps_memory_transition() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_insert().times(1).returning(|_| Ok(1));
            store.expect_mark_attended().times(1).returning(|_, _| {
                Err(StoreError::WriteFailed {
                    message: "disk full".to_string(),
                })
            });
        })
        .build();

    service
        .register("Ana", 30, "fever", UrgencyLevel::Urgent)
        .await
        .unwrap();

    let attended = service.attend_next().await.unwrap();
    assert!(attended.is_some(), "memory transition must survive store failure");
    assert_eq!(service.queue_size().await, 0);
    assert_eq!(service.history_snapshot().await.len(), 1);
    assert_eq!(service.undo_depth().await, 2);
    assert!(service.is_consistent().await);
}

/// Undoing a registration removes the record everywhere, store included
#[tokio::test]
async fn test_undo_register_removes_everywhere() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_insert().times(1).returning(|_| Ok(7));
            store
                .expect_delete()
                .times(1)
                .withf(|id| *id == 7)
                .returning(|_| Ok(true));
            store.expect_find_by_id().times(1).returning(|_| Ok(None));
        })
        .build();

    service
        .register("Ana", 30, "fever", UrgencyLevel::Urgent)
        .await
        .unwrap();

    let outcome = service.undo_last().await.unwrap();
    TestHelpers::assert_registration_undone(&outcome, "Ana");

    assert_eq!(service.queue_size().await, 0);
    assert_eq!(service.undo_depth().await, 0);
    assert!(service.is_consistent().await);
    assert!(service.search_by_id(7).await.unwrap().is_none());
}

/// Undoing an attention restores the waiting state and clears the history
#[tokio::test]
async fn test_undo_attend_restores_waiting_state() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_insert().times(1).returning(|_| Ok(3));
            store.expect_mark_attended().times(1).returning(|_, _| Ok(true));
            store
                .expect_revert_to_waiting()
                .times(1)
                .withf(|id| *id == 3)
                .returning(|_| Ok(true));
        })
        .build();

    service
        .register("Ana", 30, "fever", UrgencyLevel::Urgent)
        .await
        .unwrap();
    service.attend_next().await.unwrap();

    let outcome = service.undo_last().await.unwrap();
    TestHelpers::assert_attention_undone(&outcome, "Ana");

    let next = service.peek_next().await.expect("patient should wait again");
    assert_eq!(next.name, "Ana");
    assert_eq!(next.status, PatientStatus::Waiting);
    assert!(next.attended_at.is_none());
    assert!(service.history_snapshot().await.is_empty());
    assert_eq!(service.undo_depth().await, 1);
    assert!(service.is_consistent().await);
}

/// Undo on an empty log reports the nothing-to-undo outcome
#[tokio::test]
async fn test_undo_on_empty_log_returns_nothing() {
    let service = TriageBuilder::new().build();
    let outcome = service.undo_last().await.unwrap();
    assert_eq!(outcome, UndoOutcome::Nothing);
    assert_eq!(outcome.description(), "Nothing to undo.");
}

/// Startup rehydration fills the structures without recording undo entries
#[tokio::test]
async fn test_initialize_rehydrates_without_undo_entries() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store
                .expect_list_waiting()
                .times(1)
                .returning(|| Ok(TestFixtures::sample_waiting_set()));
        })
        .build();

    service.initialize().await.unwrap();

    assert_eq!(service.queue_size().await, 5);
    assert_eq!(service.undo_depth().await, 0);
    assert!(service.is_consistent().await);
    assert_eq!(
        service.peek_next().await.expect("queue is loaded").name,
        "Juana"
    );
}

/// An id missing from memory falls back to a store point query
#[tokio::test]
async fn test_search_by_id_falls_back_to_store() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store
                .expect_find_by_id()
                .times(1)
                .withf(|id| *id == 42)
                .returning(|_| {
                    Ok(Some(TestFixtures::attended_patient(
                        42,
                        "Rosa",
                        UrgencyLevel::Urgent,
                        0,
                    )))
                });
        })
        .build();

    let found = service.search_by_id(42).await.unwrap();
    let patient = found.expect("store fallback should find the patient");
    assert_eq!(patient.name, "Rosa");
    assert_eq!(patient.status, PatientStatus::Attended);
}

/// Exact-name fallback filters the store substring query to exact matches
#[tokio::test]
async fn test_search_by_name_exact_fallback_filters_exact() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_find_by_name_like().times(1).returning(|_| {
                Ok(vec![
                    TestFixtures::attended_patient(1, "Anastasia", UrgencyLevel::Urgent, 0),
                    TestFixtures::attended_patient(2, "Ana", UrgencyLevel::Urgent, 5),
                ])
            });
        })
        .build();

    let found = service.search_by_name_exact("Ana").await.unwrap();
    assert_eq!(found.expect("exact match exists in store").id, 2);
}

/// Any in-memory match suppresses the store substring fallback
#[tokio::test]
async fn test_name_contains_memory_match_suppresses_store() {
    // No find_by_name_like expectation: a store call would fail the mock.
    let service = TriageBuilder::new()
        .with_store(|store| {
            store.expect_insert().times(1).returning(|_| Ok(1));
        })
        .build();

    service
        .register("Juana", 40, "headache", UrgencyLevel::Urgent)
        .await
        .unwrap();

    let matches = service.search_by_name_contains("ana").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Juana");
}

/// Zero in-memory matches fall back to the store substring query
#[tokio::test]
async fn test_name_contains_falls_back_when_memory_has_no_match() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            store
                .expect_find_by_name_like()
                .times(1)
                .withf(|fragment| fragment == "ana")
                .returning(|_| {
                    Ok(vec![TestFixtures::attended_patient(
                        9,
                        "Anastasia",
                        UrgencyLevel::Urgent,
                        0,
                    )])
                });
        })
        .build();

    let matches = service.search_by_name_contains("ana").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Anastasia");
}

/// Stats combine structure metrics with the store-side aggregates
#[tokio::test]
async fn test_get_stats_aggregates_memory_and_store() {
    let service = TriageBuilder::new()
        .with_store(|store| {
            let mut next_id = 0;
            store.expect_insert().times(2).returning(move |_| {
                next_id += 1;
                Ok(next_id)
            });
            store.expect_mark_attended().times(1).returning(|_, _| Ok(true));
            store
                .expect_count_attended_today()
                .times(1)
                .returning(|| Ok(4));
            store
                .expect_avg_wait_minutes_today()
                .times(1)
                .returning(|| Ok(12.5));
        })
        .build();

    service
        .register("Ana", 30, "fever", UrgencyLevel::Urgent)
        .await
        .unwrap();
    service
        .register("Pedro", 60, "fracture", UrgencyLevel::NonUrgent)
        .await
        .unwrap();
    service.attend_next().await.unwrap();

    let stats = service.get_stats().await.unwrap();
    assert_eq!(stats.queue_size, 1);
    assert_eq!(stats.attended_today, 4);
    assert_eq!(stats.avg_wait_minutes, 12.5);
    assert_eq!(stats.undo_depth, 3);
    assert_eq!(stats.active_patients, 1);
    assert_eq!(stats.history_size, 1);
    assert_eq!(stats.avl_id_height, 1);
    assert_eq!(stats.avl_name_height, 1);
    assert!(stats.hash_load_factor > 0.0);
}
