//! Cache/server reconciliation protocol.
//!
//! Two data sources hold progress for the same learner: the disconnected
//! client cache (may be stale or ahead) and the authoritative server
//! store. Reconciliation is a two-phase merge:
//!
//! 1. **Merge pass (server → cache):** for every module present on the
//!    server, the server's values overwrite the cache entry. The server is
//!    the last point of truth for multi-device use.
//! 2. **Backfill pass (cache → server):** modules only the cache knows
//!    about (watched or scored) are queued for upsert, computed strictly
//!    from post-merge state.
//!
//! The whole operation is idempotent and best-effort: failures degrade to
//! "use current cache" and the next run recomputes everything from
//! scratch. There is no persistent retry queue.

use academy_core::model::Curriculum;
use academy_core::traits::{ProgressStore, ProgressUpsert};

use crate::cache::ProgressCache;

/// Upper bound on one backfill request; overflow is deferred to the next
/// run, not dropped.
pub const BACKFILL_BATCH_LIMIT: usize = 200;

/// What one reconciliation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Cache entries overwritten from the server.
    pub merged: usize,
    /// Client-only entries pushed to the server.
    pub backfilled: usize,
    /// Backfill candidates beyond the batch cap, left for the next run.
    pub deferred: usize,
}

/// Run one reconciliation pass for the session user.
///
/// Only module codes present in the curriculum are considered; stray cache
/// keys for retired modules are ignored.
pub async fn reconcile(
    cache: &mut ProgressCache,
    curriculum: &Curriculum,
    store: &dyn ProgressStore,
) -> ReconcileSummary {
    let server = match store.fetch().await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("progress fetch failed, keeping local cache: {e:#}");
            return ReconcileSummary::default();
        }
    };

    let keys = curriculum.module_keys();

    // Merge pass: server wins on every overlapping key.
    let mut merged = 0;
    for key in &keys {
        if let Some(row) = server.get(&key.code()) {
            cache.apply_server_row(key, row.pct, row.watched, row.attempts);
            merged += 1;
        }
    }

    // Backfill pass, computed from post-merge state so values the server
    // already superseded are never reintroduced.
    let mut queue = Vec::new();
    for key in &keys {
        if server.contains_key(&key.code()) {
            continue;
        }
        let state = cache.subject_state(key);
        if state.watched || state.pct > 0 {
            queue.push(ProgressUpsert {
                module_code: key.code(),
                level_key: key.level_key.clone(),
                chapter_id: key.chapter_id.clone(),
                watched: state.watched,
                attempts: state.attempts_since_watch,
                pct: state.pct,
                last_attempt_at: None,
            });
        }
    }

    let deferred = queue.len().saturating_sub(BACKFILL_BATCH_LIMIT);
    queue.truncate(BACKFILL_BATCH_LIMIT);

    let mut backfilled = 0;
    if !queue.is_empty() {
        match store.upsert(&queue).await {
            Ok(_) => backfilled = queue.len(),
            Err(e) => {
                tracing::warn!("progress backfill failed, will retry next run: {e:#}");
            }
        }
    }

    ReconcileSummary {
        merged,
        backfilled,
        deferred,
    }
}
