//! Domain error types.
//!
//! These represent rule violations inside the progress engine. Network and
//! API failures live in `academy-client`; the engine treats those as
//! transient and degrades to the local cache instead of propagating them.

use thiserror::Error;

/// Errors produced by the progress rules.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// A quiz score outside the 0..=100 range reached the boundary.
    #[error("score {0} is out of range (expected 0..=100)")]
    ScoreOutOfRange(i64),

    /// A module code string that does not parse as `level::chapter::subject`.
    #[error("malformed module code: {0:?}")]
    InvalidModuleCode(String),

    /// A module key that does not exist in the loaded curriculum.
    #[error("module {0} is not part of the curriculum")]
    UnknownModule(String),

    /// A quiz attempt on a subject whose lesson has not been watched.
    #[error("lesson for {0} must be watched before attempting the quiz")]
    WatchRequired(String),

    /// A quiz attempt after the per-watch attempt limit was spent.
    #[error("attempt limit reached for {0}; rewatch the lesson to try again")]
    AttemptsExhausted(String),

    /// An action on a chapter that is still gated by mandatory chapters.
    #[error("chapter {chapter_id} of {level_key} is locked until all mandatory chapters are completed")]
    ChapterLocked {
        level_key: String,
        chapter_id: String,
    },
}

impl ProgressError {
    /// Returns `true` for input-validation failures that must be rejected
    /// at the boundary, before the state machine is consulted.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ProgressError::ScoreOutOfRange(_)
                | ProgressError::InvalidModuleCode(_)
                | ProgressError::UnknownModule(_)
        )
    }
}
