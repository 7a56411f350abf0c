//! Completion-service seam.
//!
//! The runtime only needs "system context + prompt in, text out". The model
//! and vendor behind the hub are opaque. Timeouts are applied by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Header carrying the caller's trace id to the completion hub.
pub const TRACE_HEADER: &str = "x-trace-id";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("malformed completion reply: {0}")]
    InvalidReply(String),
}

/// One completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    #[serde(skip)]
    pub trace_id: String,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    /// Absent or null text is an empty reply, not a failure.
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for a completion hub exposing `POST /complete`.
#[derive(Debug, Clone)]
pub struct HttpCompletionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aos-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/complete", self.base_url)
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!(event = "completion.request", trace_id = %request.trace_id, url = %self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header(TRACE_HEADER, &request.trace_id)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidReply(e.to_string()))?;
        Ok(reply.text.unwrap_or_default())
    }
}
