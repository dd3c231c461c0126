//! In-process patient store implementation
//!
//! Reference implementation of the `PatientStore` contract backed by a
//! plain in-process table. It mirrors the row-store behavior the service
//! expects from a real database — id assignment on insert, status updates,
//! filtered history queries — and is what the integration tests and
//! embedded deployments run against. Durability is out of scope here.

use chrono::{DateTime, Duration, Utc};
use shared::{Patient, PatientStatus, TimeWindow, UrgencyLevel};
use tokio::sync::Mutex;

use crate::traits::{PatientStore, StoreError};

/// Row cap for name-fragment queries, newest arrivals first.
const NAME_QUERY_LIMIT: usize = 50;
/// Row cap for filtered history queries, newest attentions first.
const HISTORY_QUERY_LIMIT: usize = 500;

struct Inner {
    rows: Vec<Patient>,
    next_id: i64,
}

/// In-process `PatientStore` over a mutex-guarded row table.
pub struct MemoryPatientStore {
    inner: Mutex<Inner>,
}

impl MemoryPatientStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Seed the store with existing rows, keeping their ids. Useful for
    /// exercising startup rehydration.
    pub fn with_patients(rows: Vec<Patient>) -> Self {
        let next_id = rows.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner { rows, next_id }),
        }
    }

    fn name_matches(name: &str, fragment: &str) -> bool {
        name.to_lowercase().contains(&fragment.to_lowercase())
    }

    fn in_window(attended_at: Option<DateTime<Utc>>, window: TimeWindow, now: DateTime<Utc>) -> bool {
        let Some(at) = attended_at else {
            return false;
        };
        match window {
            TimeWindow::All => true,
            TimeWindow::Today => at.date_naive() == now.date_naive(),
            TimeWindow::LastHour => at >= now - Duration::hours(1),
        }
    }
}

impl Default for MemoryPatientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PatientStore for MemoryPatientStore {
    async fn insert(&self, patient: Patient) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let mut row = patient;
        row.id = id;
        // New rows are always stored waiting, whatever the caller stamped.
        row.status = PatientStatus::Waiting;
        row.attended_at = None;
        inner.rows.push(row);
        Ok(id)
    }

    async fn mark_attended(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.rows.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.status = PatientStatus::Attended;
                row.attended_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revert_to_waiting(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.rows.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.status = PatientStatus::Waiting;
                row.attended_at = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner.rows.retain(|p| p.id != id);
        Ok(inner.rows.len() < before)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name_like(&self, fragment: &str) -> Result<Vec<Patient>, StoreError> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Patient> = inner
            .rows
            .iter()
            .filter(|p| Self::name_matches(&p.name, fragment))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.arrival_at.cmp(&a.arrival_at));
        matches.truncate(NAME_QUERY_LIMIT);
        Ok(matches)
    }

    async fn list_waiting(&self) -> Result<Vec<Patient>, StoreError> {
        let inner = self.inner.lock().await;
        let mut waiting: Vec<Patient> = inner
            .rows
            .iter()
            .filter(|p| p.status == PatientStatus::Waiting)
            .cloned()
            .collect();
        waiting.sort_by(|a, b| a.level.cmp(&b.level).then(a.arrival_at.cmp(&b.arrival_at)));
        Ok(waiting)
    }

    async fn list_attended_filtered(
        &self,
        level: Option<UrgencyLevel>,
        name_fragment: Option<String>,
        window: TimeWindow,
    ) -> Result<Vec<Patient>, StoreError> {
        let now = Utc::now();
        let fragment = name_fragment.filter(|f| !f.trim().is_empty());
        let inner = self.inner.lock().await;
        let mut attended: Vec<Patient> = inner
            .rows
            .iter()
            .filter(|p| p.status == PatientStatus::Attended)
            .filter(|p| level.map_or(true, |l| p.level == l))
            .filter(|p| {
                fragment
                    .as_deref()
                    .map_or(true, |f| Self::name_matches(&p.name, f))
            })
            .filter(|p| Self::in_window(p.attended_at, window, now))
            .cloned()
            .collect();
        attended.sort_by(|a, b| b.attended_at.cmp(&a.attended_at));
        attended.truncate(HISTORY_QUERY_LIMIT);
        Ok(attended)
    }

    async fn count_attended_today(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let inner = self.inner.lock().await;
        let count = inner
            .rows
            .iter()
            .filter(|p| p.status == PatientStatus::Attended)
            .filter(|p| Self::in_window(p.attended_at, TimeWindow::Today, now))
            .count();
        Ok(count as u64)
    }

    async fn avg_wait_minutes_today(&self) -> Result<f64, StoreError> {
        let now = Utc::now();
        let inner = self.inner.lock().await;
        let waits: Vec<i64> = inner
            .rows
            .iter()
            .filter(|p| p.status == PatientStatus::Attended)
            .filter(|p| Self::in_window(p.attended_at, TimeWindow::Today, now))
            .map(|p| p.wait_minutes(now))
            .collect();

        if waits.is_empty() {
            return Ok(0.0);
        }
        Ok(waits.iter().sum::<i64>() as f64 / waits.len() as f64)
    }
}
