//! In-memory collaborators carrying the server-side contracts.
//!
//! Used by tests and offline development. The progress store applies the
//! same disciplines the server does, row sanitation and the
//! `pct = max(existing, incoming)` upsert rule, and the issuer performs
//! the authoritative existence-check-then-create, so the engine's
//! guarantees can be exercised without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use academy_core::traits::{
    Certificate, CertificateIssuer, IssueReceipt, IssueRequest, Notifier, ProgressRow,
    ProgressStore, ProgressUpsert, Session, UpsertAck,
};

// ---------------------------------------------------------------------------
// Progress store
// ---------------------------------------------------------------------------

/// In-memory implementation of [`ProgressStore`] with server semantics.
#[derive(Default)]
pub struct InMemoryProgressStore {
    rows: Mutex<HashMap<String, ProgressRow>>,
    upsert_calls: AtomicU32,
    fail_fetches: AtomicBool,
    fail_upserts: AtomicBool,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, e.g. with another device's progress.
    pub fn seed(self, rows: impl IntoIterator<Item = (String, ProgressRow)>) -> Self {
        self.rows.lock().unwrap().extend(rows);
        self
    }

    /// Make subsequent fetches fail, to exercise degraded paths.
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent upserts fail, to exercise degraded paths.
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::Relaxed);
    }

    /// Number of upsert batches received.
    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::Relaxed)
    }

    /// Current store contents, for assertions.
    pub fn snapshot(&self) -> HashMap<String, ProgressRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn fetch(&self) -> anyhow::Result<HashMap<String, ProgressRow>> {
        if self.fail_fetches.load(Ordering::Relaxed) {
            anyhow::bail!("store unavailable");
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn upsert(&self, rows: &[ProgressUpsert]) -> anyhow::Result<HashMap<String, UpsertAck>> {
        self.upsert_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_upserts.load(Ordering::Relaxed) {
            anyhow::bail!("store unavailable");
        }
        if rows.is_empty() {
            anyhow::bail!("empty payload");
        }

        let now = Utc::now();
        let mut stored = self.rows.lock().unwrap();
        let mut acks = HashMap::new();

        for row in rows {
            let module_code = row.module_code.trim();
            let level_key = row.level_key.trim();
            let chapter_id = row.chapter_id.trim();
            // Rows with missing keys are dropped, not errors.
            if module_code.is_empty() || level_key.is_empty() || chapter_id.is_empty() {
                continue;
            }
            let incoming_pct = row.pct.min(100);

            let entry = stored
                .entry(module_code.to_string())
                .and_modify(|existing| {
                    // Monotonic merge: a stale client can never regress pct.
                    existing.pct = existing.pct.max(incoming_pct);
                    existing.watched = row.watched;
                    existing.attempts = row.attempts;
                    existing.level_key = level_key.to_string();
                    existing.chapter_id = chapter_id.to_string();
                    if row.last_attempt_at.is_some() {
                        existing.last_attempt_at = row.last_attempt_at;
                    }
                    existing.updated_at = now;
                })
                .or_insert_with(|| ProgressRow {
                    level_key: level_key.to_string(),
                    chapter_id: chapter_id.to_string(),
                    watched: row.watched,
                    attempts: row.attempts,
                    pct: incoming_pct,
                    last_attempt_at: row.last_attempt_at,
                    updated_at: now,
                });

            acks.insert(
                module_code.to_string(),
                UpsertAck {
                    pct: entry.pct,
                    watched: entry.watched,
                    attempts: entry.attempts,
                    updated_at: entry.updated_at,
                },
            );
        }

        Ok(acks)
    }
}

// ---------------------------------------------------------------------------
// Certificate issuer
// ---------------------------------------------------------------------------

/// In-memory implementation of [`CertificateIssuer`].
///
/// Issuance is the transaction of record; the optional notifier is invoked
/// afterwards and independently; its failure is logged and never rolls
/// back the certificate.
pub struct InMemoryCertificateIssuer {
    session: Session,
    notifier: Option<Arc<dyn Notifier>>,
    certificates: Mutex<Vec<Certificate>>,
    issue_calls: AtomicU32,
    seq: AtomicU32,
}

impl InMemoryCertificateIssuer {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            notifier: None,
            certificates: Mutex::new(Vec::new()),
            issue_calls: AtomicU32::new(0),
            seq: AtomicU32::new(0),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Number of issue requests received (including `already` hits).
    pub fn issue_calls(&self) -> u32 {
        self.issue_calls.load(Ordering::Relaxed)
    }

    fn reference(&self, request: &IssueRequest) -> String {
        // e.g. "ACAD:1-C2-20240301-0003"
        let level_digits: String = request
            .level_key
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let level_digits = if level_digits.is_empty() {
            "N".to_string()
        } else {
            level_digits
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "ACAD:{}-C{}-{}-{:04}",
            level_digits,
            request.chapter_id,
            Utc::now().format("%Y%m%d"),
            seq
        )
    }
}

#[async_trait]
impl CertificateIssuer for InMemoryCertificateIssuer {
    async fn issue(&self, request: &IssueRequest) -> anyhow::Result<IssueReceipt> {
        self.issue_calls.fetch_add(1, Ordering::Relaxed);

        // Existence check before create: the issuer, not the caller, is
        // authoritative for idempotency.
        let certificate = {
            let mut certs = self.certificates.lock().unwrap();
            let existing = certs
                .iter()
                .find(|c| {
                    c.user_id == self.session.user_id
                        && c.level_key == request.level_key
                        && c.chapter_id == request.chapter_id
                })
                .cloned();
            if let Some(existing) = existing {
                return Ok(IssueReceipt {
                    certificate: existing,
                    already: true,
                });
            }

            let certificate = Certificate {
                id: Uuid::new_v4(),
                user_id: self.session.user_id.clone(),
                level_key: request.level_key.clone(),
                chapter_id: request.chapter_id.clone(),
                chapter_title: request.chapter_title.clone(),
                reference: self.reference(request),
                issued_at: Utc::now(),
                sent_at: None,
            };
            certs.push(certificate.clone());
            certificate
        };

        // Best-effort notification, after the record exists.
        let mut issued = certificate;
        if let Some(notifier) = &self.notifier {
            match notifier.certificate_issued(&issued).await {
                Ok(()) => {
                    let sent_at = Utc::now();
                    issued.sent_at = Some(sent_at);
                    let mut certs = self.certificates.lock().unwrap();
                    if let Some(stored) = certs.iter_mut().find(|c| c.id == issued.id) {
                        stored.sent_at = Some(sent_at);
                    }
                }
                Err(e) => {
                    tracing::warn!("certificate notification failed: {e:#}");
                }
            }
        }

        Ok(IssueReceipt {
            certificate: issued,
            already: false,
        })
    }

    async fn list_mine(&self) -> anyhow::Result<Vec<Certificate>> {
        let certs = self.certificates.lock().unwrap();
        Ok(certs
            .iter()
            .filter(|c| c.user_id == self.session.user_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Test notifier that records deliveries and can be made to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Uuid>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> Vec<Uuid> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn certificate_issued(&self, certificate: &Certificate) -> anyhow::Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            anyhow::bail!("smtp unavailable");
        }
        self.delivered.lock().unwrap().push(certificate.id);
        Ok(())
    }
}
