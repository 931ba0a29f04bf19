//! HTTP client for the server progress record store.
//!
//! Wire contract: `GET /api/progress` returns the full per-user progress
//! map and `POST /api/progress` upserts a batch of rows, both wrapped in
//! the `{ ok, data, error }` envelope. Upserts are keyed by
//! `(user, moduleCode)` server-side and the server applies
//! `pct = max(existing, incoming)`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use academy_core::traits::{ProgressRow, ProgressStore, ProgressUpsert, UpsertAck};

use crate::error::ApiError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of [`ProgressStore`].
pub struct HttpProgressStore {
    base_url: String,
    token: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpProgressStore {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout_secs,
            client,
        }
    }

    fn classify(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct MapEnvelope<T> {
    ok: bool,
    #[serde(default)]
    data: Option<HashMap<String, T>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProgressRow {
    level_key: String,
    chapter_id: String,
    watched: bool,
    attempts: u32,
    pct: u8,
    #[serde(default)]
    last_attempt_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiUpsertRow<'a> {
    module_code: &'a str,
    level_key: &'a str,
    chapter_id: &'a str,
    watched: bool,
    attempts: u32,
    pct: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUpsertAck {
    pct: u8,
    watched: bool,
    attempts: u32,
    updated_at: DateTime<Utc>,
}

/// Map an error-status response to an `ApiError`, reading the body's
/// `{ ok: false, error }` envelope when it parses.
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if status == 401 {
        return ApiError::Unauthorized(body);
    }
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: Option<String>,
    }
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or(body);
    ApiError::Http { status, message }
}

#[async_trait]
impl ProgressStore for HttpProgressStore {
    #[instrument(skip(self))]
    async fn fetch(&self) -> anyhow::Result<HashMap<String, ProgressRow>> {
        let response = self
            .client
            .get(format!("{}/api/progress", self.base_url))
            .bearer_auth(&self.token)
            .header("cache-control", "no-store")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let envelope: MapEnvelope<ApiProgressRow> = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse progress map: {e}"))
        })?;
        if !envelope.ok {
            return Err(ApiError::InvalidResponse(
                envelope.error.unwrap_or_else(|| "server reported ok=false".into()),
            )
            .into());
        }

        let rows = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(code, row)| {
                (
                    code,
                    ProgressRow {
                        level_key: row.level_key,
                        chapter_id: row.chapter_id,
                        watched: row.watched,
                        attempts: row.attempts,
                        pct: row.pct.min(100),
                        last_attempt_at: row.last_attempt_at,
                        updated_at: row.updated_at,
                    },
                )
            })
            .collect();

        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn upsert(&self, rows: &[ProgressUpsert]) -> anyhow::Result<HashMap<String, UpsertAck>> {
        // The server rejects an empty payload; nothing to do client-side.
        if rows.is_empty() {
            return Ok(HashMap::new());
        }

        let payload: Vec<ApiUpsertRow<'_>> = rows
            .iter()
            .map(|r| ApiUpsertRow {
                module_code: &r.module_code,
                level_key: &r.level_key,
                chapter_id: &r.chapter_id,
                watched: r.watched,
                attempts: r.attempts,
                pct: r.pct.min(100),
                last_attempt_at: r.last_attempt_at,
            })
            .collect();

        let response = self
            .client
            .post(format!("{}/api/progress", self.base_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let envelope: MapEnvelope<ApiUpsertAck> = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse upsert acks: {e}"))
        })?;
        if !envelope.ok {
            return Err(ApiError::InvalidResponse(
                envelope.error.unwrap_or_else(|| "server reported ok=false".into()),
            )
            .into());
        }

        let acks = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(code, ack)| {
                (
                    code,
                    UpsertAck {
                        pct: ack.pct,
                        watched: ack.watched,
                        attempts: ack.attempts,
                        updated_at: ack.updated_at,
                    },
                )
            })
            .collect();

        Ok(acks)
    }
}
