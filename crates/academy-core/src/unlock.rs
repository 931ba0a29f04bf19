//! Cross-chapter prerequisite policy.
//!
//! A pure function of curriculum and current progress, recomputed on every
//! query; it holds no state of its own. Subjects inside a chapter are
//! unordered; the only gate is at chapter granularity.

use crate::aggregate::chapter_completed;
use crate::model::Level;
use crate::record::ProgressMap;

/// Whether every mandatory chapter of the level is completed (strict
/// all-subjects-passed completion, never the average).
pub fn mandatory_completed(progress: &ProgressMap, level: &Level) -> bool {
    level
        .mandatory_chapters()
        .all(|c| chapter_completed(progress, &level.key, c))
}

/// Whether a chapter is currently reachable.
///
/// Mandatory chapters are always reachable; a non-mandatory chapter opens
/// only once every mandatory chapter of its level is completed. Unknown
/// chapter ids are locked.
pub fn chapter_unlocked(progress: &ProgressMap, level: &Level, chapter_id: &str) -> bool {
    let Some(chapter) = level.chapter(chapter_id) else {
        return false;
    };
    if chapter.mandatory {
        return true;
    }
    mandatory_completed(progress, level)
}
