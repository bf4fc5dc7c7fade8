//! Attestation payload generation.
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    config::MintConfig, credential::Credential, error::BadgeKitError,
    http_request::Request,
};

/// The body sent to the attestation backend.
#[derive(Debug, Clone, uniffi::Record)]
pub struct AttestationRequest {
    /// Address that receives the attestation.
    pub recipient: String,
    /// Replay-protection nonce of the recipient.
    pub nonce: u64,
    /// Credentials to attest, forwarded verbatim.
    pub credentials: Vec<Arc<Credential>>,
}

impl AttestationRequest {
    /// Renders the request as the JSON body expected by the backend:
    /// `{"recipient": ..., "nonce": ..., "credentials": [...]}`.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let credentials: Vec<&Value> =
            self.credentials.iter().map(|c| c.as_value()).collect();
        json!({
            "recipient": self.recipient,
            "nonce": self.nonce,
            "credentials": credentials,
        })
    }
}

/// The attestation payload returned by the backend.
///
/// Wraps the response `data` verbatim. A backend may answer successfully at the transport
/// level and still report a failure through an `error` key in `data`.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
pub struct AttestationPayload {
    data: Value,
}

#[uniffi::export]
impl AttestationPayload {
    /// Deserializes the payload `data` from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON.
    #[uniffi::constructor]
    pub fn from_json(json: &str) -> Result<Self, BadgeKitError> {
        let data = serde_json::from_str(json).map_err(|e| {
            BadgeKitError::SerializationError {
                error: format!("Failed to parse attestation payload: {e}"),
            }
        })?;
        Ok(Self { data })
    }

    /// Serializes the payload `data` to a JSON string.
    #[must_use]
    pub fn data_json(&self) -> String {
        self.data.to_string()
    }

    /// Returns the application-level error reported by the backend, if any.
    ///
    /// A `null` error counts as no error.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        match self.data.get("error")? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl AttestationPayload {
    /// Returns the payload `data`.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }
}

impl From<Value> for AttestationPayload {
    fn from(data: Value) -> Self {
        Self { data }
    }
}

/// Requests attestation payloads from a backend.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Sends `request` to `url` and returns the payload the backend answered with.
    ///
    /// # Errors
    /// Returns an error on transport failures or unreadable responses. An `error` reported
    /// inside a well-formed payload is not an `Err`.
    async fn fetch(
        &self,
        url: String,
        request: AttestationRequest,
    ) -> Result<Arc<AttestationPayload>, BadgeKitError>;
}

/// [`PayloadFetcher`] that POSTs the request as JSON over HTTPS.
#[derive(Debug, uniffi::Object)]
pub struct HttpPayloadFetcher {
    request: Request,
}

#[uniffi::export]
impl HttpPayloadFetcher {
    /// Creates a fetcher using the timeout and retry settings of `config`.
    #[uniffi::constructor]
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: MintConfig) -> Self {
        Self {
            request: Request::new(config.request_timeout(), config.max_retries),
        }
    }
}

#[async_trait]
impl PayloadFetcher for HttpPayloadFetcher {
    async fn fetch(
        &self,
        url: String,
        request: AttestationRequest,
    ) -> Result<Arc<AttestationPayload>, BadgeKitError> {
        let request_builder = self
            .request
            .post(&url)?
            .header("Content-Type", "application/json")
            .json(&request.to_json_value());
        let response = self.request.handle(request_builder).await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BadgeKitError::NetworkError {
                url,
                status: Some(status.as_u16()),
                error: format!("attestation request failed: {error_body}"),
            });
        }

        let data: Value =
            response
                .json()
                .await
                .map_err(|e| BadgeKitError::SerializationError {
                    error: format!("Failed to parse attestation response: {e}"),
                })?;

        Ok(Arc::new(AttestationPayload { data }))
    }
}
