//! Curriculum data model.
//!
//! The curriculum is read-only reference data: a hierarchy of levels,
//! chapters, and subjects loaded once at startup and never mutated by the
//! progress engine.

use serde::{Deserialize, Serialize};

use crate::key::ModuleKey;

/// The smallest trackable unit: one lesson paired with one graded quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Short, stable identifier (kebab/snake case).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Recommended lesson length in minutes.
    #[serde(default)]
    pub minutes: Option<u32>,
    /// Lesson video reference (URL or asset id).
    #[serde(default)]
    pub video_ref: Option<String>,
    /// Quiz slug backing this subject, if the quiz exists yet.
    #[serde(default)]
    pub quiz_ref: Option<String>,
}

/// A themed group of subjects.
///
/// `mandatory` chapters gate every non-mandatory chapter of the level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter identifier within the level, e.g. "1".."8".
    pub id: String,
    /// Display title.
    pub title: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Chapter {
    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == subject_id)
    }
}

/// Top-level curriculum grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Stable level key, e.g. "Niveau 1".
    pub key: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Level {
    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Chapters flagged mandatory, in curriculum order.
    pub fn mandatory_chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter().filter(|c| c.mandatory)
    }
}

/// The full curriculum, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Curriculum {
    pub fn level(&self, level_key: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.key == level_key)
    }

    pub fn chapter(&self, level_key: &str, chapter_id: &str) -> Option<&Chapter> {
        self.level(level_key).and_then(|l| l.chapter(chapter_id))
    }

    pub fn subject(&self, key: &ModuleKey) -> Option<&Subject> {
        self.chapter(&key.level_key, &key.chapter_id)
            .and_then(|c| c.subject(&key.subject_id))
    }

    /// Whether the key addresses a subject that exists in this curriculum.
    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.subject(key).is_some()
    }

    /// Every module key in the curriculum, in display order.
    pub fn module_keys(&self) -> Vec<ModuleKey> {
        let mut keys = Vec::new();
        for level in &self.levels {
            for chapter in &level.chapters {
                for subject in &chapter.subjects {
                    keys.push(ModuleKey::new(&level.key, &chapter.id, &subject.id));
                }
            }
        }
        keys
    }
}
