//! Caller-supplied credentials and the mint request that carries them.

use std::sync::Arc;

use serde_json::Value;

use crate::error::BadgeKitError;

/// An opaque credential describing what is being attested.
///
/// The SDK never inspects a credential; it is forwarded verbatim to the attestation backend.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
pub struct Credential(Value);

#[uniffi::export]
impl Credential {
    /// Deserializes a `Credential` from any JSON value.
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON.
    #[uniffi::constructor]
    pub fn from_json(json: &str) -> Result<Self, BadgeKitError> {
        let value = serde_json::from_str(json).map_err(|e| BadgeKitError::InvalidInput {
            attribute: "credential".to_string(),
            reason: format!("invalid credential json: {e}"),
        })?;
        Ok(Self(value))
    }

    /// Serializes the credential back to JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }
}

impl Credential {
    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Credential {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Input to [`crate::MintWorkflow::mint`].
#[derive(Debug, Clone, uniffi::Record)]
pub struct MintRequest {
    /// The credentials to attest, in caller order.
    pub credentials: Vec<Arc<Credential>>,
}

impl MintRequest {
    /// Wraps plain JSON values into a request.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            credentials: values
                .into_iter()
                .map(|value| Arc::new(Credential::from(value)))
                .collect(),
        }
    }
}
