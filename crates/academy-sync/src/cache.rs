//! The disconnected client cache.
//!
//! A JSON file holding the learner's locally known progress, nested
//! `level → chapter → subject`, plus the per-chapter certificate request
//! hints. The cache may be stale or ahead of the server; the
//! reconciliation protocol converges the two. Loads are tolerant: a
//! missing or corrupt file yields an empty cache rather than an error,
//! since the cache is never the source of truth.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::key::ModuleKey;
use academy_core::record::{ProgressMap, ProgressRecord};

/// Locally cached state for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectState {
    pub watched: bool,
    pub attempts_since_watch: u32,
    pub pct: u8,
}

type LevelMap = HashMap<String, HashMap<String, HashMap<String, SubjectState>>>;

/// The client-side progress cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressCache {
    #[serde(default)]
    levels: LevelMap,
    /// Certificate request hints keyed by `"level::chapter"`. A local
    /// optimization only; the issuer stays authoritative for idempotency.
    #[serde(default)]
    issued: HashMap<String, bool>,
}

impl ProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a cache file; a missing or unreadable file yields an empty cache.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("ignoring corrupt progress cache {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist the cache. Writes through a sibling temp file so a crash
    /// mid-write cannot leave a truncated cache behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize cache")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Cached state for one subject; a fresh default if none exists.
    pub fn subject_state(&self, key: &ModuleKey) -> SubjectState {
        self.levels
            .get(&key.level_key)
            .and_then(|chapters| chapters.get(&key.chapter_id))
            .and_then(|subjects| subjects.get(&key.subject_id))
            .copied()
            .unwrap_or_default()
    }

    /// Whether any state has been recorded for the subject.
    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.levels
            .get(&key.level_key)
            .and_then(|chapters| chapters.get(&key.chapter_id))
            .map(|subjects| subjects.contains_key(&key.subject_id))
            .unwrap_or(false)
    }

    fn entry(&mut self, key: &ModuleKey) -> &mut SubjectState {
        self.levels
            .entry(key.level_key.clone())
            .or_default()
            .entry(key.chapter_id.clone())
            .or_default()
            .entry(key.subject_id.clone())
            .or_default()
    }

    /// Materialize one subject's cache entry as a progress record the
    /// gating state machine can operate on.
    pub fn record(&self, key: &ModuleKey, now: DateTime<Utc>) -> ProgressRecord {
        let state = self.subject_state(key);
        ProgressRecord {
            key: key.clone(),
            watched: state.watched,
            attempts_since_watch: state.attempts_since_watch,
            pct: state.pct.min(100),
            last_attempt_at: None,
            updated_at: now,
        }
    }

    /// Write a mutated record back into the cache.
    pub fn store_record(&mut self, record: &ProgressRecord) {
        *self.entry(&record.key) = SubjectState {
            watched: record.watched,
            attempts_since_watch: record.attempts_since_watch,
            pct: record.pct.min(100),
        };
    }

    /// Overwrite one entry with the server's values (merge pass; the
    /// server wins on overlapping keys).
    pub fn apply_server_row(&mut self, key: &ModuleKey, pct: u8, watched: bool, attempts: u32) {
        *self.entry(key) = SubjectState {
            watched,
            attempts_since_watch: attempts,
            pct: pct.min(100),
        };
    }

    /// Snapshot the whole cache as a `ProgressMap` for aggregation,
    /// unlocking, and completion checks.
    pub fn to_progress_map(&self, now: DateTime<Utc>) -> ProgressMap {
        let mut map = ProgressMap::new();
        for (level_key, chapters) in &self.levels {
            for (chapter_id, subjects) in chapters {
                for subject_id in subjects.keys() {
                    let key = ModuleKey::new(level_key, chapter_id, subject_id);
                    map.insert(key.code(), self.record(&key, now));
                }
            }
        }
        map
    }

    /// Whether issuance was already requested for a chapter this device
    /// knows about.
    pub fn issue_requested(&self, level_key: &str, chapter_id: &str) -> bool {
        self.issued
            .get(&hint_key(level_key, chapter_id))
            .copied()
            .unwrap_or(false)
    }

    /// Remember that issuance was requested for a chapter.
    pub fn set_issue_requested(&mut self, level_key: &str, chapter_id: &str) {
        self.issued.insert(hint_key(level_key, chapter_id), true);
    }
}

fn hint_key(level_key: &str, chapter_id: &str) -> String {
    format!("{level_key}::{chapter_id}")
}
