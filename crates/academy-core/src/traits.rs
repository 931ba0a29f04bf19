//! Collaborator contracts for the progress engine.
//!
//! These async traits are implemented by the `academy-client` crate (HTTP
//! and in-memory). The engine in `academy-sync` only ever talks to the
//! traits, so every guarantee it needs is written into the contract here.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Session identity
// ---------------------------------------------------------------------------

/// Identity of the current learner, supplied by the identity provider.
///
/// This core trusts it unconditionally; resolving credentials into a
/// `Session` is a collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Server record store
// ---------------------------------------------------------------------------

/// One row of the server progress map, keyed externally by module code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRow {
    pub level_key: String,
    pub chapter_id: String,
    pub watched: bool,
    pub attempts: u32,
    pub pct: u8,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// One row submitted to the store; upserts are keyed by
/// `(user, module_code)` on the server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpsert {
    pub module_code: String,
    pub level_key: String,
    pub chapter_id: String,
    pub watched: bool,
    pub attempts: u32,
    pub pct: u8,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Per-row acknowledgement returned by an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAck {
    pub pct: u8,
    pub watched: bool,
    pub attempts: u32,
    pub updated_at: DateTime<Utc>,
}

/// The authoritative per-user progress store.
///
/// Required discipline: each row upsert is atomic for its key, and the
/// store applies `pct = max(existing, incoming)` so a stale client can
/// never regress a percentage.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Full progress map for the session user, keyed by module code.
    async fn fetch(&self) -> anyhow::Result<HashMap<String, ProgressRow>>;

    /// Upsert a batch of rows; returns per-row acknowledgements keyed by
    /// module code.
    async fn upsert(&self, rows: &[ProgressUpsert]) -> anyhow::Result<HashMap<String, UpsertAck>>;
}

// ---------------------------------------------------------------------------
// Certificate issuance
// ---------------------------------------------------------------------------

/// An issued chapter certificate.
///
/// At most one exists per `(user_id, level_key, chapter_id)`. Immutable
/// except for `sent_at`, set once notification delivery succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub user_id: String,
    pub level_key: String,
    pub chapter_id: String,
    pub chapter_title: String,
    /// Human-readable certificate number.
    pub reference: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Request to issue a certificate for one completed chapter. The user is
/// implied by the session held by the issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    pub level_key: String,
    pub chapter_id: String,
    pub chapter_title: String,
}

/// Issuance result. `already = true` means a certificate for the triple
/// existed and was returned instead of created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueReceipt {
    pub certificate: Certificate,
    pub already: bool,
}

/// The certificate issuance collaborator.
///
/// Authoritative for idempotency: it looks up an existing certificate for
/// the `(user, level, chapter)` triple before creating one, so the call is
/// safe under duplicate concurrent requests.
#[async_trait]
pub trait CertificateIssuer: Send + Sync {
    async fn issue(&self, request: &IssueRequest) -> anyhow::Result<IssueReceipt>;

    /// Certificates already issued to the session user.
    async fn list_mine(&self) -> anyhow::Result<Vec<Certificate>>;
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Fire-and-forget delivery of an issued certificate (email in the
/// reference deployment). Failures are logged by the caller and never roll
/// back issuance.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn certificate_issued(&self, certificate: &Certificate) -> anyhow::Result<()>;
}
