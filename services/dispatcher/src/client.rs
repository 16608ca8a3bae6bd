//! Completion request dispatch
//!
//! One call to [`Dispatcher::dispatch`] is one POST to the completion
//! endpoint: it takes exactly one key rotation step, sends the request with
//! a bounded timeout, and classifies any failure into [`TransportError`].
//! No retry happens here — retry, if any, is the loop moving on to the next
//! prompt on its normal cadence.

use std::time::Duration;

use rotation::KeyRotator;
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::ApiConfig;

/// Transport-level failure of a single dispatch.
///
/// Always contained to one loop iteration: the caller logs it and proceeds.
/// A key rotation step has already been consumed by the time any of these
/// is produced.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Outcome of one dispatch: the answer text, or the transport failure.
pub type DispatchResult = std::result::Result<String, TransportError>;

/// Issues completion requests with rotating bearer keys.
#[derive(Debug)]
pub struct Dispatcher {
    client: reqwest::Client,
    endpoint: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(client: reqwest::Client, api: &ApiConfig) -> Self {
        Self {
            client,
            endpoint: api.endpoint.clone(),
            max_tokens: api.max_tokens,
            temperature: api.temperature,
            top_p: api.top_p,
            timeout: Duration::from_secs(api.timeout_secs),
        }
    }

    /// Issue one completion request for `prompt` against `model`.
    ///
    /// Takes the next key from `keys` (advancing its cursor by one whether
    /// or not the request succeeds), POSTs the chat body with
    /// `Authorization: Bearer <key>`, and returns the first choice's message
    /// content. A response missing that path is an empty answer, not a
    /// failure — only transport-level problems are.
    #[instrument(skip_all, fields(request_id = %request_id, model = %model))]
    pub async fn dispatch(
        &self,
        keys: &mut KeyRotator,
        prompt: &str,
        model: &str,
        request_id: &str,
    ) -> DispatchResult {
        let (key_position, key) = keys.next();

        let body = serde_json::json!({
            "messages": [{"role": "user", "content": prompt}],
            "model": model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "top_p": self.top_p,
        });

        info!(key_position, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key.expose())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout.as_secs())
                } else {
                    TransportError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

        // An answer the API didn't give back is an empty answer.
        let answer = json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(answer)
    }
}
