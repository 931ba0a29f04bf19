//! The `academy status` command.
//!
//! Fully local: renders the best currently-known progress from the cache
//! without touching the network.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let tracker = super::build_tracker(&config)?;

    for level in tracker.overview() {
        println!("{} — {}%", level.level_key, level.pct);

        let mut table = Table::new();
        table.set_header(vec![
            "Chapter", "Title", "Progress", "Passed", "Completed", "Access",
        ]);
        for chapter in &level.chapters {
            table.add_row(vec![
                chapter.summary.chapter_id.clone(),
                chapter.summary.title.clone(),
                format!("{}%", chapter.summary.pct),
                format!(
                    "{}/{}",
                    chapter.summary.passed_subjects, chapter.summary.total_subjects
                ),
                (if chapter.summary.completed { "yes" } else { "no" }).to_string(),
                (if chapter.unlocked { "open" } else { "locked" }).to_string(),
            ]);
        }
        println!("{table}\n");
    }

    Ok(())
}
