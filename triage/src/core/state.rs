//! Core triage state management
//!
//! `TriageState` owns the five in-memory structures and is the only place
//! where a patient moves across more than one of them. Every transition
//! here keeps the working-set invariant: a patient is in the priority
//! queue iff it is in the lookup table iff it is in both ordered indexes
//! iff it is still waiting.
//!
//! Store coordination and undo semantics live in the service; this module
//! is purely in-memory and synchronous.

use crate::core::avl_tree::AvlTree;
use crate::core::bounded_history::BoundedHistory;
use crate::core::hash_table::HashTable;
use crate::core::min_heap::MinHeap;
use crate::core::undo_stack::UndoStack;
use shared::Patient;

/// Attended patients kept in the in-memory recency history by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// A reversible action, carrying an owned snapshot of the patient as it
/// was when the action happened.
#[derive(Debug, Clone)]
pub enum UndoEntry {
    /// Reversed by removing the patient everywhere, store included.
    Register(Patient),
    /// Reversed by restoring the waiting state and leaving the history.
    Attend(Patient),
}

/// Main triage state containing all in-memory structures.
pub struct TriageState {
    /// Priority queue of waiting patients
    queue: MinHeap,

    /// Ordered index by patient id
    by_id: AvlTree<i64, Patient>,

    /// Ordered index by patient name
    by_name: AvlTree<String, Patient>,

    /// O(1) lookup table of active patients by id
    active: HashTable<i64, Patient>,

    /// Recency cache of attended patients
    history: BoundedHistory<Patient>,

    /// Reversible actions, most recent on top
    undo: UndoStack<UndoEntry>,
}

impl TriageState {
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            queue: MinHeap::new(),
            by_id: AvlTree::new(),
            by_name: AvlTree::new(),
            active: HashTable::new(),
            history: BoundedHistory::with_capacity(capacity),
            undo: UndoStack::new(),
        }
    }

    // Active-set transitions

    /// Insert a waiting patient into all four active structures.
    pub fn admit(&mut self, patient: Patient) {
        self.queue.push(patient.clone());
        self.by_id.insert(patient.id, patient.clone());
        self.by_name.insert(patient.name.clone(), patient.clone());
        self.active.put(patient.id, patient);
    }

    /// Pop the most urgent patient and remove it from the other three
    /// active structures. `None` when nobody is waiting.
    pub fn take_next(&mut self) -> Option<Patient> {
        if self.queue.is_empty() {
            return None;
        }
        let patient = self.queue.pop().ok()?;
        self.active.remove(&patient.id);
        self.by_id.delete(&patient.id);
        self.by_name.delete(&patient.name);
        Some(patient)
    }

    /// Remove a patient from all four active structures by identity.
    /// Used when a registration is undone.
    pub fn evict(&mut self, patient: &Patient) -> bool {
        let removed = self.queue.remove_by_id(patient.id);
        self.active.remove(&patient.id);
        self.by_id.delete(&patient.id);
        self.by_name.delete(&patient.name);
        removed
    }

    // History

    /// Append to the recency history; the oldest entry is evicted inline
    /// once the capacity is exceeded.
    pub fn record_attended(&mut self, patient: Patient) {
        self.history.add_last(patient);
    }

    /// Drop a patient from the recency history (undo of an attention).
    pub fn remove_from_history(&mut self, patient: &Patient) -> bool {
        self.history.remove_element(patient)
    }

    // Undo log

    pub fn push_undo(&mut self, entry: UndoEntry) {
        self.undo.push(entry);
    }

    /// Most recent undoable action, or `None` when there is nothing left.
    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        if self.undo.is_empty() {
            return None;
        }
        self.undo.pop().ok()
    }

    // Queries

    pub fn peek_next(&self) -> Option<&Patient> {
        self.queue.peek()
    }

    pub fn queue_snapshot_sorted(&self) -> Vec<Patient> {
        self.queue.sorted_snapshot()
    }

    /// History contents oldest to newest.
    pub fn history_snapshot(&self) -> Vec<Patient> {
        self.history.to_vec()
    }

    pub fn search_by_id(&self, id: i64) -> Option<&Patient> {
        self.by_id.search(&id)
    }

    pub fn search_by_name_exact(&self, name: &str) -> Option<&Patient> {
        self.by_name.search(&name.to_string())
    }

    /// Case-insensitive substring search over the active name index.
    ///
    /// Walks the full in-order sequence twice: once to count matches so the
    /// result allocates exactly once, once to collect them.
    pub fn search_by_name_contains(&self, fragment: &str) -> Vec<Patient> {
        let needle = fragment.trim().to_lowercase();
        let all = self.by_name.collect_all_ordered();

        let count = all
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .count();

        let mut matches = Vec::with_capacity(count);
        for patient in all {
            if patient.name.to_lowercase().contains(&needle) {
                matches.push(patient.clone());
            }
        }
        matches
    }

    // Structure metrics

    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn hash_load_factor(&self) -> f64 {
        self.active.load_factor()
    }

    pub fn hash_collisions(&self) -> u64 {
        self.active.collisions()
    }

    pub fn avl_id_height(&self) -> usize {
        self.by_id.height()
    }

    pub fn avl_name_height(&self) -> usize {
        self.by_name.height()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    // Accessors for testing and debugging

    /// Check the cross-structure invariant: the four active structures
    /// agree on size and on membership, and every active patient is still
    /// waiting.
    pub fn is_consistent(&self) -> bool {
        let n = self.queue.len();
        if self.active.len() != n || self.by_id.len() != n || self.by_name.len() != n {
            return false;
        }
        self.by_id.collect_all_ordered().iter().all(|patient| {
            patient.is_waiting()
                && self.queue.contains_id(patient.id)
                && self.active.contains_key(&patient.id)
                && self.by_name.search(&patient.name).is_some()
        })
    }
}

impl Default for TriageState {
    fn default() -> Self {
        Self::new()
    }
}
