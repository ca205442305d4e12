//! HTTP client for the external embedding service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Client for the external embedding service.
///
/// Sends `POST {"text": ...}` to the configured endpoint and expects
/// `{"embedding": [..]}` back, or `{"error": "..."}` when the service
/// rejects the input. Every call carries a bounded deadline; there are
/// no retries — the submitter resubmits on failure.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    http: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    error: Option<String>,
}

impl EmbeddingClient {
    /// Creates a client for the service at `url` with a per-call
    /// deadline of `timeout_secs`.
    #[must_use]
    pub fn new(url: String, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            timeout_secs,
        }
    }

    /// Computes the embedding vector for `text`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::EmbeddingTimeout`] if the deadline elapses.
    /// - [`GatewayError::EmbeddingService`] on transport failure, a
    ///   non-success status, a malformed body, an empty embedding, or
    ///   an `error` field in the response.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let response = self
            .http
            .post(&self.url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::EmbeddingService(format!(
                "unexpected status {status}"
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(&e))?;

        parse_embedding(body)
    }

    fn transport_error(&self, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::EmbeddingTimeout(self.timeout_secs)
        } else {
            GatewayError::EmbeddingService(error.to_string())
        }
    }
}

/// Extracts the vector from a decoded service response.
fn parse_embedding(body: EmbedResponse) -> Result<Vec<f32>, GatewayError> {
    if let Some(message) = body.error {
        return Err(GatewayError::EmbeddingService(message));
    }
    match body.embedding {
        Some(embedding) if !embedding.is_empty() => Ok(embedding),
        Some(_) => Err(GatewayError::EmbeddingService(
            "service returned an empty embedding".to_string(),
        )),
        None => Err(GatewayError::EmbeddingService(
            "response carries neither embedding nor error".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn decode(json: &str) -> EmbedResponse {
        match serde_json::from_str(json) {
            Ok(body) => body,
            Err(e) => panic!("decode failed: {e}"),
        }
    }

    #[test]
    fn well_formed_response_yields_vector() {
        let body = decode(r#"{"embedding": [0.1, -0.2, 0.3]}"#);
        let Ok(embedding) = parse_embedding(body) else {
            panic!("expected vector");
        };
        assert_eq!(embedding.len(), 3);
    }

    #[test]
    fn error_field_maps_to_service_error() {
        let body = decode(r#"{"error": "model unavailable"}"#);
        let result = parse_embedding(body);
        let Err(GatewayError::EmbeddingService(message)) = result else {
            panic!("expected service error");
        };
        assert_eq!(message, "model unavailable");
    }

    #[test]
    fn empty_embedding_is_malformed() {
        let body = decode(r#"{"embedding": []}"#);
        assert!(matches!(
            parse_embedding(body),
            Err(GatewayError::EmbeddingService(_))
        ));
    }

    #[test]
    fn body_without_either_field_is_malformed() {
        let body = decode("{}");
        assert!(matches!(
            parse_embedding(body),
            Err(GatewayError::EmbeddingService(_))
        ));
    }

    #[test]
    fn request_serializes_text_field() {
        let json = serde_json::to_string(&EmbedRequest { text: "hiking" }).unwrap_or_default();
        assert_eq!(json, r#"{"text":"hiking"}"#);
    }
}
