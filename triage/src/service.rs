//! Main triage service implementation
//!
//! This is the single entry point for every mutation and query against the
//! triage working set. It coordinates the in-memory structures and the
//! injected patient store so they move together: one mutex guards all five
//! structures together with the paired store call, making `register`,
//! `attend_next` and `undo_last` mutually exclusive with each other and
//! with any read that needs a consistent snapshot.

use std::sync::Arc;

use chrono::Utc;
use shared::{Patient, PatientStatus, TimeWindow, TriageStats, UrgencyLevel};
use tokio::sync::Mutex;

use crate::core::{TriageState, UndoEntry, DEFAULT_HISTORY_CAPACITY};
use crate::error::{TriageError, TriageResult};
use crate::traits::PatientStore;

/// Result of `undo_last`
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The undo log was empty; nothing changed.
    Nothing,
    /// A registration was reverted: the patient is gone everywhere.
    RegistrationUndone { patient: Patient, description: String },
    /// An attention was reverted: the patient is waiting again.
    AttentionUndone { patient: Patient, description: String },
}

impl UndoOutcome {
    /// Human-readable description of what was undone.
    pub fn description(&self) -> &str {
        match self {
            UndoOutcome::Nothing => "Nothing to undo.",
            UndoOutcome::RegistrationUndone { description, .. }
            | UndoOutcome::AttentionUndone { description, .. } => description,
        }
    }
}

/// Triage coordinator over an injected patient store
pub struct TriageService<S: PatientStore> {
    /// Core state management
    state: Arc<Mutex<TriageState>>,

    /// Injected persistence (mockable for testing)
    store: S,
}

impl<S: PatientStore> TriageService<S> {
    /// Create a service with the default in-memory history capacity.
    pub fn new(store: S) -> Self {
        Self::with_history_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a service keeping at most `capacity` attended patients in
    /// the in-memory history (0 = unbounded).
    pub fn with_history_capacity(store: S, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(TriageState::with_history_capacity(capacity))),
            store,
        }
    }

    /// Rehydrate the active structures from the store at startup.
    ///
    /// Every waiting patient is pushed into the four active structures
    /// directly; the bulk load is not recorded in the undo log.
    pub async fn initialize(&self) -> TriageResult<()> {
        let waiting = self
            .store
            .list_waiting()
            .await
            .map_err(|e| TriageError::persistence("list_waiting", e))?;

        let mut state = self.state.lock().await;
        let count = waiting.len();
        for patient in waiting {
            state.admit(patient);
        }
        tracing::info!("🚀 Loaded {} waiting patients from store", count);
        Ok(())
    }

    /// Register a new patient:
    ///   1. Persist to the store → obtain the assigned id.
    ///   2. Insert into heap, both ordered indexes and the lookup table.
    ///   3. Push a Register entry onto the undo log.
    ///
    /// A failed store write propagates and leaves no trace in memory.
    pub async fn register(
        &self,
        name: &str,
        age: u32,
        symptoms: &str,
        level: UrgencyLevel,
    ) -> TriageResult<Patient> {
        let now = Utc::now();
        let mut patient = Patient {
            id: 0,
            name: name.trim().to_string(),
            age,
            symptoms: symptoms.trim().to_string(),
            level,
            status: PatientStatus::Waiting,
            arrival_at: now,
            attended_at: None,
            created_at: now,
        };

        let mut state = self.state.lock().await;

        // Store write first: nothing enters memory if it fails.
        let id = self
            .store
            .insert(patient.clone())
            .await
            .map_err(|e| TriageError::persistence("insert", e))?;
        patient.id = id;

        state.admit(patient.clone());
        state.push_undo(UndoEntry::Register(patient.clone()));

        tracing::info!(
            "🏥 Registered {} (ID {}, level {})",
            patient.name,
            patient.id,
            patient.level
        );
        Ok(patient)
    }

    /// Attend the most urgent waiting patient:
    ///   1. Pop from the heap; remove from the other active structures.
    ///   2. Stamp the attention time and append to the history.
    ///   3. Ask the store to mark it attended.
    ///   4. Push an Attend entry onto the undo log.
    ///
    /// Returns `None` when nobody is waiting. The in-memory transition is
    /// kept even when the store update fails; the failure is logged and
    /// memory and store may diverge until an external reconciliation.
    pub async fn attend_next(&self) -> TriageResult<Option<Patient>> {
        let mut state = self.state.lock().await;
        let Some(mut patient) = state.take_next() else {
            return Ok(None);
        };

        let attended_at = Utc::now();
        patient.status = PatientStatus::Attended;
        patient.attended_at = Some(attended_at);

        state.record_attended(patient.clone());

        if let Err(err) = self.store.mark_attended(patient.id, attended_at).await {
            tracing::warn!(
                "⚠️ Store mark_attended failed for ID {}: {}",
                patient.id,
                err
            );
        }

        state.push_undo(UndoEntry::Attend(patient.clone()));

        tracing::info!("✅ Attended {} (ID {})", patient.name, patient.id);
        Ok(Some(patient))
    }

    /// Undo the most recent action.
    ///
    /// Register entries delete the patient from every structure and from
    /// the store. Attend entries restore the waiting state, re-insert into
    /// the active structures, drop the patient from the history and revert
    /// the store row. Store failures are logged, not rolled back.
    pub async fn undo_last(&self) -> TriageResult<UndoOutcome> {
        let mut state = self.state.lock().await;
        let Some(entry) = state.pop_undo() else {
            return Ok(UndoOutcome::Nothing);
        };

        match entry {
            UndoEntry::Register(patient) => {
                state.evict(&patient);
                if let Err(err) = self.store.delete(patient.id).await {
                    tracing::warn!("⚠️ Store delete failed for ID {}: {}", patient.id, err);
                }
                let description = format!(
                    "Registration of \"{}\" (ID {}) undone.",
                    patient.name, patient.id
                );
                tracing::info!("↩️ {}", description);
                Ok(UndoOutcome::RegistrationUndone {
                    patient,
                    description,
                })
            }
            UndoEntry::Attend(snapshot) => {
                let mut patient = snapshot;
                patient.status = PatientStatus::Waiting;
                patient.attended_at = None;

                state.admit(patient.clone());
                state.remove_from_history(&patient);

                if let Err(err) = self.store.revert_to_waiting(patient.id).await {
                    tracing::warn!(
                        "⚠️ Store revert_to_waiting failed for ID {}: {}",
                        patient.id,
                        err
                    );
                }
                let description = format!(
                    "Attention of \"{}\" (ID {}) undone.",
                    patient.name, patient.id
                );
                tracing::info!("↩️ {}", description);
                Ok(UndoOutcome::AttentionUndone {
                    patient,
                    description,
                })
            }
        }
    }

    /// Most urgent waiting patient without removing it.
    pub async fn peek_next(&self) -> Option<Patient> {
        self.state.lock().await.peek_next().cloned()
    }

    /// Queue contents in full priority order, without mutating the queue.
    pub async fn queue_snapshot_sorted(&self) -> Vec<Patient> {
        self.state.lock().await.queue_snapshot_sorted()
    }

    /// In-memory history of attended patients, oldest to newest.
    pub async fn history_snapshot(&self) -> Vec<Patient> {
        self.state.lock().await.history_snapshot()
    }

    /// Point lookup by id over the active index, falling back to a store
    /// query for attended or evicted records.
    pub async fn search_by_id(&self, id: i64) -> TriageResult<Option<Patient>> {
        let state = self.state.lock().await;
        if let Some(patient) = state.search_by_id(id) {
            return Ok(Some(patient.clone()));
        }
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| TriageError::persistence("find_by_id", e))
    }

    /// Exact-name lookup over the active index, falling back to a store
    /// substring query filtered to the exact name.
    pub async fn search_by_name_exact(&self, name: &str) -> TriageResult<Option<Patient>> {
        let trimmed = name.trim();
        let state = self.state.lock().await;
        if let Some(patient) = state.search_by_name_exact(trimmed) {
            return Ok(Some(patient.clone()));
        }
        let candidates = self
            .store
            .find_by_name_like(trimmed)
            .await
            .map_err(|e| TriageError::persistence("find_by_name_like", e))?;
        Ok(candidates.into_iter().find(|p| p.name == trimmed))
    }

    /// Case-insensitive substring search over active patient names.
    ///
    /// Any in-memory match suppresses the store lookup, so attended records
    /// only surface when no active name matches the fragment.
    pub async fn search_by_name_contains(&self, fragment: &str) -> TriageResult<Vec<Patient>> {
        let state = self.state.lock().await;
        let matches = state.search_by_name_contains(fragment);
        if !matches.is_empty() {
            return Ok(matches);
        }
        self.store
            .find_by_name_like(fragment)
            .await
            .map_err(|e| TriageError::persistence("find_by_name_like", e))
    }

    /// Attended patients with optional level/name filters inside a time
    /// window. Pure store query; the active structures are not involved.
    pub async fn list_attended_filtered(
        &self,
        level: Option<UrgencyLevel>,
        name_fragment: Option<&str>,
        window: TimeWindow,
    ) -> TriageResult<Vec<Patient>> {
        self.store
            .list_attended_filtered(level, name_fragment.map(str::to_string), window)
            .await
            .map_err(|e| TriageError::persistence("list_attended_filtered", e))
    }

    /// Aggregate the in-memory structure metrics with the two store-side
    /// aggregates for the current day.
    pub async fn get_stats(&self) -> TriageResult<TriageStats> {
        let state = self.state.lock().await;
        let attended_today = self
            .store
            .count_attended_today()
            .await
            .map_err(|e| TriageError::persistence("count_attended_today", e))?;
        let avg_wait_minutes = self
            .store
            .avg_wait_minutes_today()
            .await
            .map_err(|e| TriageError::persistence("avg_wait_minutes_today", e))?;

        Ok(TriageStats {
            queue_size: state.queue_size(),
            attended_today,
            avg_wait_minutes,
            undo_depth: state.undo_depth(),
            active_patients: state.active_count(),
            hash_load_factor: state.hash_load_factor(),
            hash_collisions: state.hash_collisions(),
            avl_id_height: state.avl_id_height(),
            avl_name_height: state.avl_name_height(),
            history_size: state.history_size(),
        })
    }

    // Accessors for testing and debugging

    /// Check the cross-structure invariant over the current state.
    pub async fn is_consistent(&self) -> bool {
        self.state.lock().await.is_consistent()
    }

    /// Number of patients currently waiting.
    pub async fn queue_size(&self) -> usize {
        self.state.lock().await.queue_size()
    }

    /// Number of undoable actions currently recorded.
    pub async fn undo_depth(&self) -> usize {
        self.state.lock().await.undo_depth()
    }
}
