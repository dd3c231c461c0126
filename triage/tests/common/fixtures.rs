//! Test fixtures and data for triage tests
//!
//! This module provides consistent test data and fixtures used across all
//! test suites.

use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::{Patient, PatientStatus, UrgencyLevel};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Small history capacity so eviction is easy to trigger
    pub const SMALL_HISTORY_CAPACITY: usize = 2;

    /// Names used by the substring-search scenarios
    pub const SEARCH_NAMES: [&'static str; 3] = ["Ana", "Juana", "Pedro"];

    /// Fixed reference instant so fixture timestamps are deterministic
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
            .single()
            .expect("fixed fixture time")
    }

    /// Waiting patient with a deterministic arrival offset in minutes
    pub fn waiting_patient(id: i64, name: &str, level: UrgencyLevel, arrival_offset_min: i64) -> Patient {
        let base = Self::base_time();
        Patient {
            id,
            name: name.to_string(),
            age: 35,
            symptoms: "checkup".to_string(),
            level,
            status: PatientStatus::Waiting,
            arrival_at: base + Duration::minutes(arrival_offset_min),
            attended_at: None,
            created_at: base,
        }
    }

    /// Attended patient whose attention happened after a 30 minute wait
    pub fn attended_patient(id: i64, name: &str, level: UrgencyLevel, arrival_offset_min: i64) -> Patient {
        let mut patient = Self::waiting_patient(id, name, level, arrival_offset_min);
        patient.status = PatientStatus::Attended;
        patient.attended_at = Some(patient.arrival_at + Duration::minutes(30));
        patient
    }

    /// A waiting set covering every urgency level, ids 1..=5
    pub fn sample_waiting_set() -> Vec<Patient> {
        vec![
            Self::waiting_patient(1, "Ana", UrgencyLevel::Urgent, 0),
            Self::waiting_patient(2, "Juana", UrgencyLevel::Resuscitation, 1),
            Self::waiting_patient(3, "Pedro", UrgencyLevel::NonUrgent, 2),
            Self::waiting_patient(4, "Luis", UrgencyLevel::Emergent, 3),
            Self::waiting_patient(5, "Marta", UrgencyLevel::LessUrgent, 4),
        ]
    }
}
