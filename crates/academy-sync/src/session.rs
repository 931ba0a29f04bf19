//! Session tracker: one learner's view of the engine.
//!
//! Ties a learner action together end to end: gate mutation on the cached
//! record, cache persistence, a best-effort report to the server store,
//! and the certification check for the owning chapter. Network failures
//! never fail the local action: the learner always sees the best
//! currently-known local state, and the next reconciliation converges.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use academy_core::aggregate::{level_summary, ChapterSummary};
use academy_core::error::ProgressError;
use academy_core::key::ModuleKey;
use academy_core::model::Curriculum;
use academy_core::record::{AttemptOutcome, GateState, ProgressMap, Score};
use academy_core::traits::{
    Certificate, CertificateIssuer, ProgressStore, ProgressUpsert,
};
use academy_core::unlock::chapter_unlocked;

use crate::cache::ProgressCache;
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::trigger::{certify_all, certify_chapter};

/// Display state for one chapter, combining the aggregation rollup with
/// the unlock policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterOverview {
    #[serde(flatten)]
    pub summary: ChapterSummary,
    pub unlocked: bool,
}

/// Display state for one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelOverview {
    pub level_key: String,
    pub pct: u8,
    pub chapters: Vec<ChapterOverview>,
}

/// The per-session progress orchestrator.
pub struct ProgressTracker {
    curriculum: Curriculum,
    cache: ProgressCache,
    cache_path: PathBuf,
    store: Arc<dyn ProgressStore>,
    issuer: Arc<dyn CertificateIssuer>,
}

impl ProgressTracker {
    pub fn new(
        curriculum: Curriculum,
        cache: ProgressCache,
        cache_path: PathBuf,
        store: Arc<dyn ProgressStore>,
        issuer: Arc<dyn CertificateIssuer>,
    ) -> Self {
        Self {
            curriculum,
            cache,
            cache_path,
            store,
            issuer,
        }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Snapshot of all locally known progress.
    pub fn progress_map(&self) -> ProgressMap {
        self.cache.to_progress_map(Utc::now())
    }

    fn save_cache(&self) {
        if let Err(e) = self.cache.save(&self.cache_path) {
            tracing::warn!("failed to persist progress cache: {e:#}");
        }
    }

    fn require_known(&self, key: &ModuleKey) -> Result<(), ProgressError> {
        if self.curriculum.contains(key) {
            Ok(())
        } else {
            Err(ProgressError::UnknownModule(key.code()))
        }
    }

    fn require_unlocked(&self, key: &ModuleKey) -> Result<(), ProgressError> {
        let progress = self.progress_map();
        let level = self
            .curriculum
            .level(&key.level_key)
            .ok_or_else(|| ProgressError::UnknownModule(key.code()))?;
        if chapter_unlocked(&progress, level, &key.chapter_id) {
            Ok(())
        } else {
            Err(ProgressError::ChapterLocked {
                level_key: key.level_key.clone(),
                chapter_id: key.chapter_id.clone(),
            })
        }
    }

    /// Best-effort report of one record to the server store. Failures are
    /// logged; the backfill pass of the next reconciliation covers them.
    async fn report(&self, upsert: ProgressUpsert) {
        if let Err(e) = self.store.upsert(&[upsert]).await {
            tracing::warn!("progress upsert failed, will sync later: {e:#}");
        }
    }

    /// Current gate state of a subject.
    pub fn gate_state(&self, key: &ModuleKey) -> Result<GateState, ProgressError> {
        self.require_known(key)?;
        Ok(self.cache.record(key, Utc::now()).state())
    }

    /// Whether a quiz attempt is currently allowed for a subject.
    pub fn can_attempt(&self, key: &ModuleKey) -> Result<bool, ProgressError> {
        self.require_known(key)?;
        self.require_unlocked(key)?;
        Ok(self.cache.record(key, Utc::now()).can_attempt())
    }

    /// Record that the subject's lesson was watched.
    pub async fn mark_watched(&mut self, key: &ModuleKey) -> Result<(), ProgressError> {
        self.require_known(key)?;
        self.require_unlocked(key)?;

        let now = Utc::now();
        let mut record = self.cache.record(key, now);
        record.mark_watched(now);
        self.cache.store_record(&record);
        self.save_cache();

        self.report(ProgressUpsert {
            module_code: key.code(),
            level_key: key.level_key.clone(),
            chapter_id: key.chapter_id.clone(),
            watched: true,
            attempts: 0,
            pct: record.pct,
            last_attempt_at: None,
        })
        .await;

        certify_chapter(
            &mut self.cache,
            &self.curriculum,
            self.issuer.as_ref(),
            &key.level_key,
            &key.chapter_id,
        )
        .await;
        self.save_cache();

        Ok(())
    }

    /// Record one graded quiz attempt for the subject.
    pub async fn record_attempt(
        &mut self,
        key: &ModuleKey,
        score: Score,
    ) -> Result<AttemptOutcome, ProgressError> {
        self.require_known(key)?;
        self.require_unlocked(key)?;

        let now = Utc::now();
        let mut record = self.cache.record(key, now);
        let outcome = record.record_attempt(score, now)?;
        self.cache.store_record(&record);
        self.save_cache();

        self.report(ProgressUpsert {
            module_code: key.code(),
            level_key: key.level_key.clone(),
            chapter_id: key.chapter_id.clone(),
            watched: record.watched,
            attempts: record.attempts_since_watch,
            pct: record.pct,
            last_attempt_at: Some(now),
        })
        .await;

        certify_chapter(
            &mut self.cache,
            &self.curriculum,
            self.issuer.as_ref(),
            &key.level_key,
            &key.chapter_id,
        )
        .await;
        self.save_cache();

        Ok(outcome)
    }

    /// Reconcile the local cache with the server store, then sweep for
    /// chapters the restored progress may have completed.
    pub async fn reconcile(&mut self) -> ReconcileSummary {
        let summary = reconcile(&mut self.cache, &self.curriculum, self.store.as_ref()).await;
        certify_all(&mut self.cache, &self.curriculum, self.issuer.as_ref()).await;
        self.save_cache();
        summary
    }

    /// Certificates issued to the session user.
    pub async fn certificates(&self) -> anyhow::Result<Vec<Certificate>> {
        self.issuer.list_mine().await
    }

    /// Display rollup of every level, with unlock state per chapter.
    pub fn overview(&self) -> Vec<LevelOverview> {
        let progress = self.progress_map();
        self.curriculum
            .levels
            .iter()
            .map(|level| {
                let summary = level_summary(&progress, level);
                let chapters = summary
                    .chapters
                    .into_iter()
                    .map(|chapter| {
                        let unlocked = chapter_unlocked(&progress, level, &chapter.chapter_id);
                        ChapterOverview {
                            summary: chapter,
                            unlocked,
                        }
                    })
                    .collect();
                LevelOverview {
                    level_key: summary.level_key,
                    pct: summary.pct,
                    chapters,
                }
            })
            .collect()
    }
}
