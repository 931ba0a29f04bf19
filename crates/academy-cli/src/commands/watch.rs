//! The `academy watch` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(
    level: String,
    chapter: String,
    subject: String,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let mut tracker = super::build_tracker(&config)?;

    let key = super::module_key(&level, &chapter, &subject);
    tracker.mark_watched(&key).await?;

    let state = tracker.gate_state(&key)?;
    println!("Lesson {key} marked as watched ({state}).");

    Ok(())
}
