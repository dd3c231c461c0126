//! Core domain types used throughout the triage system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SharedError;

/// Urgency classification (simplified Manchester Triage System).
///
/// Lower ordinal = more urgent: level 1 outranks level 5. The derived
/// ordering follows the variant order, so `Resuscitation < NonUrgent`
/// sorts the most urgent level first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Resuscitation = 1,
    Emergent = 2,
    Urgent = 3,
    LessUrgent = 4,
    NonUrgent = 5,
}

impl UrgencyLevel {
    /// Numeric level, 1 (most urgent) through 5 (least urgent).
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a numeric level. Anything outside 1..=5 is rejected.
    pub fn from_u8(value: u8) -> Result<Self, SharedError> {
        match value {
            1 => Ok(UrgencyLevel::Resuscitation),
            2 => Ok(UrgencyLevel::Emergent),
            3 => Ok(UrgencyLevel::Urgent),
            4 => Ok(UrgencyLevel::LessUrgent),
            5 => Ok(UrgencyLevel::NonUrgent),
            other => Err(SharedError::InvalidLevel { value: other }),
        }
    }

    /// Human-readable description of the level for display surfaces.
    pub fn description(self) -> &'static str {
        match self {
            UrgencyLevel::Resuscitation => "Resuscitation",
            UrgencyLevel::Emergent => "Emergent",
            UrgencyLevel::Urgent => "Urgent",
            UrgencyLevel::LessUrgent => "Less Urgent",
            UrgencyLevel::NonUrgent => "Non-Urgent",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl std::str::FromStr for UrgencyLevel {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s.trim().parse().map_err(|_| SharedError::InvalidLevel { value: 0 })?;
        UrgencyLevel::from_u8(value)
    }
}

/// Lifecycle status of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    /// Awaiting attention; present in every active structure.
    Waiting,
    /// Already attended; only the recency history may still hold it.
    Attended,
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientStatus::Waiting => write!(f, "waiting"),
            PatientStatus::Attended => write!(f, "attended"),
        }
    }
}

/// A patient record in the triage working set.
///
/// The `id` is assigned by the backing store on insert and is immutable
/// afterwards. Equality is store identity: two snapshots of the same record
/// compare equal even when their status or timestamps differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub symptoms: String,
    pub level: UrgencyLevel,
    pub status: PatientStatus,
    pub arrival_at: DateTime<Utc>,
    pub attended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Waiting time in minutes: arrival to attention, or arrival to `now`
    /// while the patient is still waiting.
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> i64 {
        let end = self.attended_at.unwrap_or(now);
        (end - self.arrival_at).num_minutes()
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Patient {}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Patient[id={}, name={}, level={}, status={}]",
            self.id, self.name, self.level, self.status
        )
    }
}

/// Time window filter for attended-history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    All,
    Today,
    LastHour,
}

impl std::str::FromStr for TimeWindow {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeWindow::All),
            "today" => Ok(TimeWindow::Today),
            "last_hour" | "lasthour" => Ok(TimeWindow::LastHour),
            other => Err(SharedError::InvalidTimeWindow {
                input: other.to_string(),
            }),
        }
    }
}

/// System-wide triage metrics snapshot.
///
/// Combines in-memory structure metrics with two store-side aggregates
/// (attended count and average wait for the current day).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageStats {
    /// Patients currently waiting (priority queue size)
    pub queue_size: usize,

    /// Patients attended today (store aggregate)
    pub attended_today: u64,

    /// Average wait in minutes for patients attended today (store aggregate)
    pub avg_wait_minutes: f64,

    /// Undoable actions currently recorded
    pub undo_depth: usize,

    /// Active patients in the lookup table
    pub active_patients: usize,
    pub hash_load_factor: f64,
    pub hash_collisions: u64,

    /// Heights of the two ordered indexes
    pub avl_id_height: usize,
    pub avl_name_height: usize,

    /// Attended patients still in the in-memory recency history
    pub history_size: usize,
}
