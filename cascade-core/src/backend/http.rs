//! HTTP adapter for the conductor's REST surface.
//!
//! This is the only module that looks at conductor error text. The wire
//! protocol still reports some conditions as legacy message strings
//! (`"... is still running"`, `"Cannot find trace for session ..."`,
//! `"Cannot find ..."`); [`classify_error_body`] translates those into
//! [`BackendError`] kinds exactly once, so the rest of the crate never
//! string-matches.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{ActivationRecord, SessionRecord, SessionSummary};

use super::traits::{BackendError, ConductorBackend, ListQuery};

/// Extra client-side budget on top of the server-side blocking window, so a
/// conductor that answers right at the deadline is not cut off mid-response.
const REQUEST_GRACE_SECS: u64 = 5;

/// Budget for the non-blocking endpoints (listing, activation get).
const PLAIN_REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct HttpConductor {
    client: Client,
    base_url: String,
}

impl HttpConductor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
        }
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: trim_trailing_slash(base_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Translate a conductor error message into a structured kind.
///
/// The substring conventions here are the conductor's wire contract; keep
/// them in sync with the service, and keep the matching confined to this
/// function.
fn classify_error_body(message: &str, session_id: &str) -> BackendError {
    if message.ends_with("is still running") {
        BackendError::StillRunning(session_id.to_string())
    } else if message.starts_with("Cannot find trace for session") {
        BackendError::TraceExpired(session_id.to_string())
    } else if message.contains("Cannot find") {
        BackendError::NotFound(message.to_string())
    } else {
        BackendError::Other(message.to_string())
    }
}

/// Translate a transport-level failure.
fn classify_transport_error(err: reqwest::Error) -> BackendError {
    if err.is_connect() {
        BackendError::ConnectionRefused(err.to_string())
    } else {
        BackendError::Other(err.to_string())
    }
}

async fn read_error(response: reqwest::Response, session_id: &str) -> BackendError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if !text.is_empty() => text,
        Err(_) => format!("conductor returned status {status}"),
    };
    debug!(%status, %message, "conductor error response");
    classify_error_body(&message, session_id)
}

#[async_trait::async_trait]
impl ConductorBackend for HttpConductor {
    async fn get_session(
        &self,
        session_id: &str,
        timeout_secs: u64,
        full: bool,
    ) -> Result<SessionRecord, BackendError> {
        let url = self.endpoint(&format!("/v1/sessions/{session_id}"));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("blocking", "true".to_string()),
                ("timeout", timeout_secs.to_string()),
                ("full", full.to_string()),
            ])
            .timeout(std::time::Duration::from_secs(
                timeout_secs.saturating_add(REQUEST_GRACE_SECS),
            ))
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(read_error(response, session_id).await);
        }

        response
            .json::<SessionRecord>()
            .await
            .map_err(|e| BackendError::Other(format!("malformed session record: {e}")))
    }

    async fn list_sessions(&self, query: &ListQuery) -> Result<Vec<SessionSummary>, BackendError> {
        let url = self.endpoint("/v1/sessions");
        let mut params: Vec<(&str, String)> = vec![("limit", query.limit.to_string())];
        if let Some(skip) = query.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(std::time::Duration::from_secs(PLAIN_REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(read_error(response, "").await);
        }

        response
            .json::<Vec<SessionSummary>>()
            .await
            .map_err(|e| BackendError::Other(format!("malformed session listing: {e}")))
    }

    async fn get_activation(
        &self,
        activation_id: &str,
    ) -> Result<ActivationRecord, BackendError> {
        let url = self.endpoint(&format!("/v1/activations/{activation_id}"));
        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(PLAIN_REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                warn!("activation fetch failed: {e}");
                classify_transport_error(e)
            })?;

        if !response.status().is_success() {
            return Err(read_error(response, activation_id).await);
        }

        response
            .json::<ActivationRecord>()
            .await
            .map_err(|e| BackendError::Other(format!("malformed activation record: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_still_running() {
        let err = classify_error_body("session abc123 is still running", "abc123");
        assert_eq!(err, BackendError::StillRunning("abc123".to_string()));
    }

    #[test]
    fn test_classify_trace_expired() {
        let err = classify_error_body("Cannot find trace for session abc123", "abc123");
        assert_eq!(err, BackendError::TraceExpired("abc123".to_string()));
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify_error_body("Cannot find session abc123", "abc123");
        assert_eq!(
            err,
            BackendError::NotFound("Cannot find session abc123".to_string())
        );
    }

    #[test]
    fn test_trace_expired_wins_over_not_found() {
        // both substrings are present; the more specific prefix must win
        let err = classify_error_body("Cannot find trace for session xyz", "xyz");
        assert!(matches!(err, BackendError::TraceExpired(_)));
    }

    #[test]
    fn test_classify_unknown_message() {
        let err = classify_error_body("internal conductor error", "abc123");
        assert_eq!(
            err,
            BackendError::Other("internal conductor error".to_string())
        );
    }

    #[test]
    fn test_base_url_normalization() {
        let backend = HttpConductor::new("http://localhost:8621///");
        assert_eq!(backend.base_url(), "http://localhost:8621");
        assert_eq!(
            backend.endpoint("/v1/sessions"),
            "http://localhost:8621/v1/sessions"
        );
    }
}
