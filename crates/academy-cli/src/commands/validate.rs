//! The `academy validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(curriculum: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let path = match curriculum {
        Some(path) => path,
        None => {
            let config = super::load_config(config.as_deref())?;
            config.curriculum_path()
        }
    };

    let curriculum = academy_core::parser::load_curriculum(&path)?;

    let mut subjects = 0usize;
    for level in &curriculum.levels {
        let chapter_count = level.chapters.len();
        let subject_count: usize = level.chapters.iter().map(|c| c.subjects.len()).sum();
        subjects += subject_count;
        println!(
            "Level: {} ({chapter_count} chapters, {subject_count} subjects)",
            level.key
        );
    }

    let warnings = academy_core::parser::validate_curriculum(&curriculum);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.location, w.message);
    }

    if warnings.is_empty() {
        println!("Curriculum valid ({subjects} subjects).");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
