//! TOML curriculum loader.
//!
//! Loads the read-only curriculum from a TOML file and validates it for
//! common authoring mistakes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Chapter, Curriculum, Level, Subject};

/// Intermediate TOML structure for curriculum files.
#[derive(Debug, Deserialize)]
struct TomlCurriculumFile {
    #[serde(default)]
    levels: Vec<TomlLevel>,
}

#[derive(Debug, Deserialize)]
struct TomlLevel {
    key: String,
    #[serde(default)]
    chapters: Vec<TomlChapter>,
}

#[derive(Debug, Deserialize)]
struct TomlChapter {
    id: String,
    title: String,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    subjects: Vec<TomlSubject>,
}

#[derive(Debug, Deserialize)]
struct TomlSubject {
    id: String,
    title: String,
    #[serde(default)]
    minutes: Option<u32>,
    #[serde(default)]
    video_ref: Option<String>,
    #[serde(default)]
    quiz_ref: Option<String>,
}

/// Load a curriculum from a TOML file.
pub fn load_curriculum(path: &Path) -> Result<Curriculum> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read curriculum file: {}", path.display()))?;
    parse_curriculum_str(&content, path)
}

/// Parse a TOML string into a `Curriculum` (useful for testing).
pub fn parse_curriculum_str(content: &str, source_path: &Path) -> Result<Curriculum> {
    let parsed: TomlCurriculumFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let levels = parsed
        .levels
        .into_iter()
        .map(|l| Level {
            key: l.key,
            chapters: l
                .chapters
                .into_iter()
                .map(|c| Chapter {
                    id: c.id,
                    title: c.title,
                    mandatory: c.mandatory,
                    subjects: c
                        .subjects
                        .into_iter()
                        .map(|s| Subject {
                            id: s.id,
                            title: s.title,
                            minutes: s.minutes,
                            video_ref: s.video_ref,
                            quiz_ref: s.quiz_ref,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(Curriculum { levels })
}

/// A warning from curriculum validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Where the issue was found (level key, possibly chapter/subject path).
    pub location: String,
    /// Warning message.
    pub message: String,
}

/// Validate a curriculum for common issues.
pub fn validate_curriculum(curriculum: &Curriculum) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_levels = std::collections::HashSet::new();
    for level in &curriculum.levels {
        if !seen_levels.insert(&level.key) {
            warnings.push(ValidationWarning {
                location: level.key.clone(),
                message: format!("duplicate level key: {}", level.key),
            });
        }

        let mut seen_chapters = std::collections::HashSet::new();
        for chapter in &level.chapters {
            let location = format!("{}/{}", level.key, chapter.id);
            if !seen_chapters.insert(&chapter.id) {
                warnings.push(ValidationWarning {
                    location: location.clone(),
                    message: format!("duplicate chapter id: {}", chapter.id),
                });
            }

            if chapter.subjects.is_empty() {
                warnings.push(ValidationWarning {
                    location: location.clone(),
                    message: "chapter has no subjects and can never be completed".into(),
                });
            }

            let mut seen_subjects = std::collections::HashSet::new();
            for subject in &chapter.subjects {
                if !seen_subjects.insert(&subject.id) {
                    warnings.push(ValidationWarning {
                        location: format!("{location}/{}", subject.id),
                        message: format!("duplicate subject id: {}", subject.id),
                    });
                }
                if subject.quiz_ref.is_none() {
                    warnings.push(ValidationWarning {
                        location: format!("{location}/{}", subject.id),
                        message: "subject has no quiz and cannot be passed".into(),
                    });
                }
            }
        }

        // A level with gated chapters but nothing mandatory leaves every
        // chapter open from the start.
        let has_mandatory = level.chapters.iter().any(|c| c.mandatory);
        if !level.chapters.is_empty() && !has_mandatory {
            warnings.push(ValidationWarning {
                location: level.key.clone(),
                message: "level has no mandatory chapter; nothing gates later chapters".into(),
            });
        }
    }

    warnings
}
