//! Per-subject progress records and the attempt-gating state machine.
//!
//! One [`ProgressRecord`] exists per user per module key, created on first
//! interaction and never deleted. All mutation goes through
//! [`ProgressRecord::mark_watched`] and [`ProgressRecord::record_attempt`],
//! which enforce the watch → attempt → pass/exhaust → rewatch cycle.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::key::ModuleKey;
use crate::status::SubjectStatus;

/// Minimum percentage for a subject to count as passed.
pub const PASS_THRESHOLD: u8 = 90;

/// Quiz attempts allowed per watch cycle before a rewatch is required.
pub const MAX_ATTEMPTS: u32 = 2;

/// A quiz score percentage, validated into 0..=100 at the boundary.
///
/// The state machine only ever sees a `Score`; out-of-range input is
/// rejected before it can touch a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    pub fn new(pct: i64) -> Result<Score, ProgressError> {
        if (0..=100).contains(&pct) {
            Ok(Score(pct as u8))
        } else {
            Err(ProgressError::ScoreOutOfRange(pct))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_passing(&self) -> bool {
        self.0 >= PASS_THRESHOLD
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Eligibility state of one subject, derived from its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Lesson not watched yet; the quiz is unavailable.
    NotWatched,
    /// Watched with attempts remaining.
    Eligible,
    /// Attempt limit spent without passing; only a rewatch restores eligibility.
    Exhausted,
    /// Best score reached the pass threshold.
    Passed,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::NotWatched => write!(f, "not watched"),
            GateState::Eligible => write!(f, "eligible"),
            GateState::Exhausted => write!(f, "exhausted"),
            GateState::Passed => write!(f, "passed"),
        }
    }
}

/// Result of one accepted quiz attempt.
#[derive(Debug, Clone, Copy)]
pub struct AttemptOutcome {
    pub passed: bool,
    /// Best-ever percentage after the attempt.
    pub pct: u8,
    pub attempts_since_watch: u32,
}

/// Authoritative per-user, per-subject progress state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(flatten)]
    pub key: ModuleKey,
    pub watched: bool,
    pub attempts_since_watch: u32,
    /// Best-ever quiz percentage, 0..=100. Never decreases across
    /// submissions or merges.
    pub pct: u8,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Fresh record for a subject with no prior interaction.
    pub fn new(key: ModuleKey, now: DateTime<Utc>) -> Self {
        Self {
            key,
            watched: false,
            attempts_since_watch: 0,
            pct: 0,
            last_attempt_at: None,
            updated_at: now,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.pct >= PASS_THRESHOLD
    }

    pub fn state(&self) -> GateState {
        if self.is_passed() {
            GateState::Passed
        } else if !self.watched {
            GateState::NotWatched
        } else if self.attempts_since_watch >= MAX_ATTEMPTS {
            GateState::Exhausted
        } else {
            GateState::Eligible
        }
    }

    pub fn status(&self) -> SubjectStatus {
        if self.is_passed() {
            SubjectStatus::Passed
        } else if self.watched || self.pct > 0 || self.last_attempt_at.is_some() {
            SubjectStatus::InProgress
        } else {
            SubjectStatus::NotStarted
        }
    }

    /// Whether a quiz attempt is currently allowed.
    pub fn can_attempt(&self) -> bool {
        self.watched && (self.is_passed() || self.attempts_since_watch < MAX_ATTEMPTS)
    }

    /// Record that the lesson was watched (again). Resets the per-watch
    /// attempt counter; the best-ever percentage is untouched.
    pub fn mark_watched(&mut self, now: DateTime<Utc>) {
        self.watched = true;
        self.attempts_since_watch = 0;
        self.updated_at = now;
    }

    /// Record one graded quiz attempt.
    ///
    /// The score is kept even on failure (it may still be the best-ever
    /// score); a passing score resets the per-watch attempt counter.
    pub fn record_attempt(
        &mut self,
        score: Score,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, ProgressError> {
        if !self.watched {
            return Err(ProgressError::WatchRequired(self.key.code()));
        }
        if !self.can_attempt() {
            return Err(ProgressError::AttemptsExhausted(self.key.code()));
        }

        let passed = score.is_passing();
        self.pct = self.pct.max(score.value());
        if passed {
            self.attempts_since_watch = 0;
        } else {
            self.attempts_since_watch += 1;
        }
        self.last_attempt_at = Some(now);
        self.updated_at = now;

        Ok(AttemptOutcome {
            passed,
            pct: self.pct,
            attempts_since_watch: self.attempts_since_watch,
        })
    }

    /// Overwrite this record with the server's view of the same module.
    ///
    /// The server is the last point of truth for multi-device use: on
    /// overlapping keys its values replace the local ones wholesale.
    pub fn overwrite_from_server(
        &mut self,
        pct: u8,
        watched: bool,
        attempts: u32,
        now: DateTime<Utc>,
    ) {
        self.pct = pct.min(100);
        self.watched = watched;
        self.attempts_since_watch = attempts;
        self.updated_at = now;
    }
}

/// The local working set: records keyed by canonical module code.
pub type ProgressMap = HashMap<String, ProgressRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProgressRecord {
        ProgressRecord::new(ModuleKey::new("Level 1", "1", "vitamins"), Utc::now())
    }

    #[test]
    fn score_validation() {
        assert_eq!(Score::new(0).unwrap().value(), 0);
        assert_eq!(Score::new(100).unwrap().value(), 100);
        assert!(Score::new(89).unwrap().value() < PASS_THRESHOLD);
        assert!(Score::new(90).unwrap().is_passing());
        assert!(matches!(
            Score::new(101),
            Err(ProgressError::ScoreOutOfRange(101))
        ));
        assert!(matches!(
            Score::new(-1),
            Err(ProgressError::ScoreOutOfRange(-1))
        ));
    }

    #[test]
    fn attempt_requires_watch() {
        let mut rec = record();
        assert_eq!(rec.state(), GateState::NotWatched);
        assert!(!rec.can_attempt());
        let err = rec.record_attempt(Score::new(95).unwrap(), Utc::now()).unwrap_err();
        assert!(matches!(err, ProgressError::WatchRequired(_)));
    }

    #[test]
    fn full_gating_sequence() {
        let mut rec = record();

        rec.mark_watched(Utc::now());
        assert!(rec.can_attempt());
        assert_eq!(rec.state(), GateState::Eligible);

        let out = rec.record_attempt(Score::new(60).unwrap(), Utc::now()).unwrap();
        assert!(!out.passed);
        assert_eq!(rec.attempts_since_watch, 1);
        assert_eq!(rec.pct, 60);
        assert!(rec.can_attempt());

        let out = rec.record_attempt(Score::new(70).unwrap(), Utc::now()).unwrap();
        assert!(!out.passed);
        assert_eq!(rec.attempts_since_watch, 2);
        assert_eq!(rec.pct, 70);
        assert!(!rec.can_attempt());
        assert_eq!(rec.state(), GateState::Exhausted);

        let err = rec.record_attempt(Score::new(99).unwrap(), Utc::now()).unwrap_err();
        assert!(matches!(err, ProgressError::AttemptsExhausted(_)));

        rec.mark_watched(Utc::now());
        assert_eq!(rec.attempts_since_watch, 0);
        assert!(rec.can_attempt());

        let out = rec.record_attempt(Score::new(95).unwrap(), Utc::now()).unwrap();
        assert!(out.passed);
        assert_eq!(rec.pct, 95);
        assert_eq!(rec.attempts_since_watch, 0);
        assert_eq!(rec.state(), GateState::Passed);
        assert_eq!(rec.status(), SubjectStatus::Passed);
    }

    #[test]
    fn failing_score_is_kept_when_best_ever() {
        let mut rec = record();
        rec.mark_watched(Utc::now());
        rec.record_attempt(Score::new(80).unwrap(), Utc::now()).unwrap();
        assert_eq!(rec.pct, 80);
        // A worse retry never lowers the best-ever percentage.
        rec.record_attempt(Score::new(40).unwrap(), Utc::now()).unwrap();
        assert_eq!(rec.pct, 80);
        assert_eq!(rec.attempts_since_watch, 2);
    }

    #[test]
    fn passed_subject_may_retake() {
        let mut rec = record();
        rec.mark_watched(Utc::now());
        rec.record_attempt(Score::new(92).unwrap(), Utc::now()).unwrap();
        assert!(rec.can_attempt());

        // A later failing retake keeps the best score and eligibility.
        let out = rec.record_attempt(Score::new(50).unwrap(), Utc::now()).unwrap();
        assert!(!out.passed);
        assert_eq!(rec.pct, 92);
        assert!(rec.is_passed());
        assert!(rec.can_attempt());
    }

    #[test]
    fn pct_stays_in_bounds() {
        let mut rec = record();
        rec.mark_watched(Utc::now());
        for score in [0, 100, 55, 100, 1] {
            let _ = rec.record_attempt(Score::new(score).unwrap(), Utc::now());
            assert!(rec.pct <= 100);
        }
        rec.overwrite_from_server(100, true, 0, Utc::now());
        assert!(rec.pct <= 100);
    }

    #[test]
    fn server_overwrite_replaces_local_values() {
        let mut rec = record();
        rec.mark_watched(Utc::now());
        rec.record_attempt(Score::new(70).unwrap(), Utc::now()).unwrap();

        rec.overwrite_from_server(40, false, 1, Utc::now());
        assert_eq!(rec.pct, 40);
        assert!(!rec.watched);
        assert_eq!(rec.attempts_since_watch, 1);
    }

    #[test]
    fn status_tracks_interaction() {
        let mut rec = record();
        assert_eq!(rec.status(), SubjectStatus::NotStarted);
        rec.mark_watched(Utc::now());
        assert_eq!(rec.status(), SubjectStatus::InProgress);
        rec.record_attempt(Score::new(95).unwrap(), Utc::now()).unwrap();
        assert_eq!(rec.status(), SubjectStatus::Passed);
    }
}
