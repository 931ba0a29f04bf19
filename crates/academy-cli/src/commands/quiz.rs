//! The `academy quiz` command.
//!
//! Records a graded quiz attempt. Grading itself (question selection and
//! ordering) happens in the quiz collaborator; this command receives the
//! resulting percentage.

use std::path::PathBuf;

use anyhow::Result;

use academy_core::record::Score;

pub async fn execute(
    level: String,
    chapter: String,
    subject: String,
    score: i64,
    config: Option<PathBuf>,
) -> Result<()> {
    // Validate before anything touches the state machine.
    let score = Score::new(score)?;

    let config = super::load_config(config.as_deref())?;
    let mut tracker = super::build_tracker(&config)?;

    let key = super::module_key(&level, &chapter, &subject);
    let outcome = tracker.record_attempt(&key, score).await?;

    if outcome.passed {
        println!("Passed {key} with {score} (best {}%).", outcome.pct);
    } else {
        println!(
            "Not passed: {key} at {score} (best {}%, attempt {} since last watch).",
            outcome.pct, outcome.attempts_since_watch
        );
        if !tracker.can_attempt(&key)? {
            println!("Attempt limit reached; rewatch the lesson to try again.");
        }
    }

    Ok(())
}
