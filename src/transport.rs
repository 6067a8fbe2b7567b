use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ChatConfig;
use crate::constants::{FALLBACK_REPLY, GENERIC_FAILURE_REPLY, MESSAGE_FIELD, TIMEOUT_REPLY};
use crate::message::Kind;

/// Success body of the message endpoint. Extra fields such as `analysis` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ReplyPayload {
    pub fn new(text: impl Into<String>, kind: Kind) -> Self {
        Self {
            text: Some(text.into()),
            kind: Some(kind.as_str().to_string()),
        }
    }

    /// Kind taken from the payload, `qa` when absent or unrecognised.
    pub fn kind(&self) -> Kind {
        match self.kind.as_deref() {
            None => Kind::Qa,
            Some(tag) => Kind::from_tag(tag).unwrap_or_else(|| {
                debug!(tag, "Unknown reply type, rendering as qa");
                Kind::Qa
            }),
        }
    }

    /// Reply text, or the fixed fallback phrase when it is missing or empty.
    pub fn text_or_fallback(&self) -> &str {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => FALLBACK_REPLY,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("server reported an error: {0}")]
    Server(String),
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Text rendered in the error bubble for this failure.
    pub fn reply_text(&self) -> &str {
        match self {
            TransportError::Timeout => TIMEOUT_REPLY,
            TransportError::Server(message) => message,
            TransportError::Other(_) => GENERIC_FAILURE_REPLY,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// The single outbound call the chat client makes.
pub trait Transport: Send + Sync {
    fn send(&self, text: &str) -> impl Future<Output = Result<ReplyPayload, TransportError>> + Send;
}

/// Posts the text form-encoded to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ChatConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, text), fields(endpoint = %self.endpoint, len = text.len()))]
    async fn send(&self, text: &str) -> Result<ReplyPayload, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .form(&[(MESSAGE_FIELD, text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => return Err(TransportError::Timeout),
                Err(_) => String::new(),
            };
            warn!(%status, "Message endpoint returned an error status");
            return Err(match server_error_message(&body) {
                Some(message) => TransportError::Server(message),
                None => TransportError::Other(format!("HTTP {}", status)),
            });
        }

        let reply = response.json::<ReplyPayload>().await?;
        debug!(kind = ?reply.kind, has_text = reply.text.is_some(), "Received reply");
        Ok(reply)
    }
}

/// Pulls a non-empty string `error` field out of a failure body.
fn server_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_defaults() {
        let reply: ReplyPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.kind(), Kind::Qa);
        assert_eq!(reply.text_or_fallback(), FALLBACK_REPLY);
    }

    #[test]
    fn test_reply_ignores_extra_fields() {
        let reply: ReplyPayload = serde_json::from_str(
            r#"{"text": "译文", "type": "translate", "analysis": {"translation": {}}}"#,
        )
        .unwrap();
        assert_eq!(reply.kind(), Kind::Translate);
        assert_eq!(reply.text_or_fallback(), "译文");
    }

    #[test]
    fn test_empty_text_uses_fallback() {
        let reply = ReplyPayload::new("", Kind::Qa);
        assert_eq!(reply.text_or_fallback(), FALLBACK_REPLY);
    }

    #[test]
    fn test_unknown_type_is_qa() {
        let reply: ReplyPayload = serde_json::from_str(r#"{"text": "x", "type": "haiku"}"#).unwrap();
        assert_eq!(reply.kind(), Kind::Qa);
    }

    #[test]
    fn test_error_reply_text() {
        assert_eq!(TransportError::Timeout.reply_text(), TIMEOUT_REPLY);
        assert_eq!(TransportError::Server("模型不可用".into()).reply_text(), "模型不可用");
        assert_eq!(TransportError::Other("boom".into()).reply_text(), GENERIC_FAILURE_REPLY);
    }

    #[test]
    fn test_server_error_message() {
        assert_eq!(server_error_message(r#"{"error": "bad"}"#), Some("bad".to_string()));
        assert_eq!(server_error_message(r#"{"error": ""}"#), None);
        assert_eq!(server_error_message(r#"{"error": 5}"#), None);
        assert_eq!(server_error_message("<html>500</html>"), None);
    }
}
