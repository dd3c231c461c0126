//! Priority queue implemented as a binary min-heap over a growable buffer
//!
//! Ordering criterion:
//!   1) lower urgency level first (level 1 outranks level 5)
//!   2) ties broken by earlier arrival (FIFO within a level)

use crate::error::{TriageError, TriageResult};
use shared::Patient;
use std::cmp::Ordering;

const DEFAULT_CAPACITY: usize = 64;

/// Array-backed binary min-heap of waiting patients.
pub struct MinHeap {
    data: Vec<Patient>,
}

impl MinHeap {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(initial_capacity.max(4)),
        }
    }

    /// Insert a patient: place at the end and sift up until the heap
    /// property holds again. O(log n).
    pub fn push(&mut self, patient: Patient) {
        self.data.push(patient);
        self.sift_up(self.data.len() - 1);
    }

    /// Extract the most urgent patient. O(log n).
    ///
    /// Callers must check `is_empty()` first; popping an empty heap is a
    /// precondition violation surfaced as `EmptyQueue`.
    pub fn pop(&mut self) -> TriageResult<Patient> {
        if self.data.is_empty() {
            return Err(TriageError::EmptyQueue);
        }
        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let top = self.data.pop().expect("heap checked non-empty above");
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Ok(top)
    }

    /// Most urgent patient without extracting it. O(1).
    pub fn peek(&self) -> Option<&Patient> {
        self.data.first()
    }

    /// Remove the patient with the given id, wherever it sits in the heap.
    ///
    /// O(n) scan to locate, then the replacement element may need to move
    /// in either direction, so both sifts run.
    pub fn remove_by_id(&mut self, id: i64) -> bool {
        let Some(index) = self.data.iter().position(|p| p.id == id) else {
            return false;
        };
        let last = self.data.len() - 1;
        self.data.swap(index, last);
        self.data.pop();
        if index < self.data.len() {
            self.sift_up(index);
            self.sift_down(index);
        }
        true
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.data.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fully priority-ordered copy of the queue contents. O(n log n).
    ///
    /// Builds a scratch heap from a copy and drains it, so the original
    /// is never observed in a mutated state.
    pub fn sorted_snapshot(&self) -> Vec<Patient> {
        let mut scratch = MinHeap::with_capacity(self.data.len());
        for patient in &self.data {
            scratch.push(patient.clone());
        }
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Ok(patient) = scratch.pop() {
            sorted.push(patient);
        }
        sorted
    }

    // Internal operations

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if Self::compare(&self.data[i], &self.data[parent]) == Ordering::Less {
                self.data.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;

            if left < self.data.len()
                && Self::compare(&self.data[left], &self.data[smallest]) == Ordering::Less
            {
                smallest = left;
            }
            if right < self.data.len()
                && Self::compare(&self.data[right], &self.data[smallest]) == Ordering::Less
            {
                smallest = right;
            }

            if smallest != i {
                self.data.swap(i, smallest);
                i = smallest;
            } else {
                break;
            }
        }
    }

    /// Less = more urgent: lower level first, then earlier arrival.
    fn compare(a: &Patient, b: &Patient) -> Ordering {
        a.level
            .cmp(&b.level)
            .then_with(|| a.arrival_at.cmp(&b.arrival_at))
    }
}

impl Default for MinHeap {
    fn default() -> Self {
        Self::new()
    }
}
