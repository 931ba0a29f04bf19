//! Canonical subject status and legacy alias normalization.
//!
//! Historical clients stored loose status strings ("todo", "done", "pass",
//! ...). Reads are normalized to one closed enumeration here, in a single
//! place, instead of scattering string comparisons across the codebase.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed status enumeration for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Passed,
}

impl SubjectStatus {
    /// Normalize any historical status string to its canonical variant.
    ///
    /// Unrecognized values fall back to `NotStarted`.
    pub fn normalize(raw: &str) -> SubjectStatus {
        match raw.trim().to_lowercase().as_str() {
            "todo" | "not started" | "not_started" => SubjectStatus::NotStarted,
            "in progress" | "in_progress" => SubjectStatus::InProgress,
            "done" | "pass" | "passed" | "complete" | "completed" => SubjectStatus::Passed,
            _ => SubjectStatus::NotStarted,
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectStatus::NotStarted => write!(f, "not_started"),
            SubjectStatus::InProgress => write!(f, "in_progress"),
            SubjectStatus::Passed => write!(f, "passed"),
        }
    }
}
