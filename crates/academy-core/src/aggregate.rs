//! Display aggregation of progress percentages.
//!
//! These rollups feed progress bars and summary tables. They are display
//! aggregates only. Chapter completion, and everything built on it
//! (unlocking, certification), uses the stricter all-subjects-passed
//! rule, never the average. A chapter can show 97% and still be
//! incomplete.

use serde::{Deserialize, Serialize};

use crate::key::ModuleKey;
use crate::model::{Chapter, Level};
use crate::record::{ProgressMap, PASS_THRESHOLD};

/// Best-ever percentage for one subject; 0 if no record exists.
pub fn subject_pct(progress: &ProgressMap, key: &ModuleKey) -> u8 {
    progress.get(&key.code()).map(|r| r.pct.min(100)).unwrap_or(0)
}

/// Whether one subject is passed (best-ever percentage at the threshold).
pub fn subject_passed(progress: &ProgressMap, key: &ModuleKey) -> bool {
    subject_pct(progress, key) >= PASS_THRESHOLD
}

/// Rounded mean of the chapter's subject percentages; 0 for an empty chapter.
pub fn chapter_pct(progress: &ProgressMap, level_key: &str, chapter: &Chapter) -> u8 {
    if chapter.subjects.is_empty() {
        return 0;
    }
    let sum: u32 = chapter
        .subjects
        .iter()
        .map(|s| subject_pct(progress, &ModuleKey::new(level_key, &chapter.id, &s.id)) as u32)
        .sum();
    (sum as f64 / chapter.subjects.len() as f64).round() as u8
}

/// Strict completion: every subject of the chapter is passed.
///
/// An empty chapter never counts as completed.
pub fn chapter_completed(progress: &ProgressMap, level_key: &str, chapter: &Chapter) -> bool {
    if chapter.subjects.is_empty() {
        return false;
    }
    chapter
        .subjects
        .iter()
        .all(|s| subject_passed(progress, &ModuleKey::new(level_key, &chapter.id, &s.id)))
}

/// Rounded mean of the level's chapter percentages; 0 for an empty level.
pub fn level_pct(progress: &ProgressMap, level: &Level) -> u8 {
    if level.chapters.is_empty() {
        return 0;
    }
    let sum: u32 = level
        .chapters
        .iter()
        .map(|c| chapter_pct(progress, &level.key, c) as u32)
        .sum();
    (sum as f64 / level.chapters.len() as f64).round() as u8
}

/// Display rollup for one chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub chapter_id: String,
    pub title: String,
    pub mandatory: bool,
    /// Rounded mean of subject percentages.
    pub pct: u8,
    pub passed_subjects: usize,
    pub total_subjects: usize,
    /// Strict all-subjects-passed completion.
    pub completed: bool,
}

/// Display rollup for one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level_key: String,
    pub pct: u8,
    pub chapters: Vec<ChapterSummary>,
}

/// Compute the display rollup for a level.
pub fn level_summary(progress: &ProgressMap, level: &Level) -> LevelSummary {
    let chapters = level
        .chapters
        .iter()
        .map(|chapter| {
            let passed_subjects = chapter
                .subjects
                .iter()
                .filter(|s| {
                    subject_passed(progress, &ModuleKey::new(&level.key, &chapter.id, &s.id))
                })
                .count();
            ChapterSummary {
                chapter_id: chapter.id.clone(),
                title: chapter.title.clone(),
                mandatory: chapter.mandatory,
                pct: chapter_pct(progress, &level.key, chapter),
                passed_subjects,
                total_subjects: chapter.subjects.len(),
                completed: chapter_completed(progress, &level.key, chapter),
            }
        })
        .collect();

    LevelSummary {
        level_key: level.key.clone(),
        pct: level_pct(progress, level),
        chapters,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{Chapter, Curriculum, Level, Subject};
    use crate::record::ProgressRecord;

    fn chapter(id: &str, subject_ids: &[&str]) -> Chapter {
        Chapter {
            id: id.into(),
            title: format!("Chapter {id}"),
            mandatory: false,
            subjects: subject_ids
                .iter()
                .map(|sid| Subject {
                    id: (*sid).into(),
                    title: (*sid).into(),
                    minutes: None,
                    video_ref: None,
                    quiz_ref: Some((*sid).into()),
                })
                .collect(),
        }
    }

    fn with_pct(progress: &mut ProgressMap, level: &str, chapter: &str, subject: &str, pct: u8) {
        let key = ModuleKey::new(level, chapter, subject);
        let mut rec = ProgressRecord::new(key.clone(), Utc::now());
        rec.watched = true;
        rec.pct = pct;
        progress.insert(key.code(), rec);
    }

    #[test]
    fn missing_records_count_as_zero() {
        let progress = ProgressMap::new();
        let key = ModuleKey::new("L", "1", "a");
        assert_eq!(subject_pct(&progress, &key), 0);
        assert_eq!(chapter_pct(&progress, "L", &chapter("1", &["a", "b"])), 0);
    }

    #[test]
    fn chapter_pct_is_rounded_mean() {
        let ch = chapter("1", &["a", "b", "c"]);
        let mut progress = ProgressMap::new();
        with_pct(&mut progress, "L", "1", "a", 100);
        with_pct(&mut progress, "L", "1", "b", 50);
        // c missing -> 0; mean of 100, 50, 0 = 50
        assert_eq!(chapter_pct(&progress, "L", &ch), 50);

        with_pct(&mut progress, "L", "1", "c", 1);
        // mean of 100, 50, 1 = 50.33 -> 50
        assert_eq!(chapter_pct(&progress, "L", &ch), 50);
    }

    #[test]
    fn high_average_does_not_complete_a_chapter() {
        // 4 subjects at 100, one at 85: shows 97% but is not completed.
        let ch = chapter("1", &["a", "b", "c", "d", "e"]);
        let mut progress = ProgressMap::new();
        for sid in ["a", "b", "c", "d"] {
            with_pct(&mut progress, "L", "1", sid, 100);
        }
        with_pct(&mut progress, "L", "1", "e", 85);

        assert_eq!(chapter_pct(&progress, "L", &ch), 97);
        assert!(!chapter_completed(&progress, "L", &ch));

        with_pct(&mut progress, "L", "1", "e", 90);
        assert!(chapter_completed(&progress, "L", &ch));
    }

    #[test]
    fn empty_chapter_is_never_completed() {
        let ch = chapter("9", &[]);
        let progress = ProgressMap::new();
        assert!(!chapter_completed(&progress, "L", &ch));
        assert_eq!(chapter_pct(&progress, "L", &ch), 0);
    }

    #[test]
    fn level_pct_averages_chapter_pcts() {
        let level = Level {
            key: "L".into(),
            chapters: vec![chapter("1", &["a"]), chapter("2", &["b"])],
        };
        let mut progress = ProgressMap::new();
        with_pct(&mut progress, "L", "1", "a", 100);
        with_pct(&mut progress, "L", "2", "b", 51);
        // mean of 100 and 51 = 75.5 -> 76
        assert_eq!(level_pct(&progress, &level), 76);

        let empty = Level {
            key: "E".into(),
            chapters: vec![],
        };
        assert_eq!(level_pct(&progress, &empty), 0);
    }

    #[test]
    fn summary_reports_passed_counts_and_completion() {
        let curriculum = Curriculum {
            levels: vec![Level {
                key: "L".into(),
                chapters: vec![chapter("1", &["a", "b"])],
            }],
        };
        let level = curriculum.level("L").unwrap();
        let mut progress = ProgressMap::new();
        with_pct(&mut progress, "L", "1", "a", 95);
        with_pct(&mut progress, "L", "1", "b", 89);

        let summary = level_summary(&progress, level);
        assert_eq!(summary.pct, 92);
        let ch = &summary.chapters[0];
        assert_eq!(ch.passed_subjects, 1);
        assert_eq!(ch.total_subjects, 2);
        assert!(!ch.completed);
    }
}
