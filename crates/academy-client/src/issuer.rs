//! HTTP client for the certificate issuance endpoint.
//!
//! `POST /api/certificates/issue` is safe to call repeatedly for the same
//! `(level, chapter)`: the server checks for an existing certificate
//! before creating one and answers with `already = true` when it finds
//! one. `GET /api/certificates/mine` lists the session user's
//! certificates.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use academy_core::traits::{Certificate, CertificateIssuer, IssueReceipt, IssueRequest};

use crate::error::ApiError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of [`CertificateIssuer`].
pub struct HttpCertificateIssuer {
    base_url: String,
    token: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpCertificateIssuer {
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

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiIssueRequest<'a> {
    level_key: &'a str,
    chapter_id: &'a str,
    chapter_title: &'a str,
}

#[derive(Deserialize)]
struct IssueEnvelope {
    ok: bool,
    #[serde(default)]
    certificate: Option<Certificate>,
    #[serde(default)]
    already: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ListEnvelope {
    ok: bool,
    #[serde(default)]
    data: Vec<Certificate>,
    #[serde(default)]
    error: Option<String>,
}

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
impl CertificateIssuer for HttpCertificateIssuer {
    #[instrument(skip(self, request), fields(level = %request.level_key, chapter = %request.chapter_id))]
    async fn issue(&self, request: &IssueRequest) -> anyhow::Result<IssueReceipt> {
        let body = ApiIssueRequest {
            level_key: &request.level_key,
            chapter_id: &request.chapter_id,
            chapter_title: &request.chapter_title,
        };

        let response = self
            .client
            .post(format!("{}/api/certificates/issue", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let envelope: IssueEnvelope = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse issue response: {e}"))
        })?;
        if !envelope.ok {
            return Err(ApiError::InvalidResponse(
                envelope.error.unwrap_or_else(|| "server reported ok=false".into()),
            )
            .into());
        }
        let certificate = envelope.certificate.ok_or_else(|| {
            ApiError::InvalidResponse("issue response missing certificate".into())
        })?;

        Ok(IssueReceipt {
            certificate,
            already: envelope.already,
        })
    }

    #[instrument(skip(self))]
    async fn list_mine(&self) -> anyhow::Result<Vec<Certificate>> {
        let response = self
            .client
            .get(format!("{}/api/certificates/mine", self.base_url))
            .bearer_auth(&self.token)
            .header("cache-control", "no-store")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        let envelope: ListEnvelope = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse certificate list: {e}"))
        })?;
        if !envelope.ok {
            return Err(ApiError::InvalidResponse(
                envelope.error.unwrap_or_else(|| "server reported ok=false".into()),
            )
            .into());
        }

        Ok(envelope.data)
    }
}
