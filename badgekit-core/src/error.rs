use thiserror::Error;

/// Error outputs from `BadgeKit`
#[derive(Debug, Error, uniffi::Error)]
pub enum BadgeKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that failed validation.
        attribute: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Unexpected error serializing or deserializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Details of the failure.
        error: String,
    },
    /// Network connection error with details
    #[error("network_error: {url} ({status:?}): {error}")]
    NetworkError {
        /// The URL of the failed request.
        url: String,
        /// The HTTP status code, if a response was received.
        status: Option<u16>,
        /// Details of the failure.
        error: String,
    },
    /// The JSON-RPC node answered with an error object
    #[error("rpc_error {code}: {message}")]
    RpcError {
        /// The JSON-RPC error code.
        code: i64,
        /// The JSON-RPC error message.
        message: String,
    },
    /// The attestation could not be submitted on-chain
    #[error("issuance_failed: {reason}")]
    IssuanceFailed {
        /// Reason reported by the issuer.
        reason: String,
    },
    /// Unhandled error
    #[error("generic_error: {error}")]
    Generic {
        /// Details of the failure.
        error: String,
    },
    /// A foreign callback failed in an unexpected way
    #[error("unexpected_uniffi_callback_error: {error}")]
    UnexpectedUniFFICallbackError {
        /// Reason reported by the bindings.
        error: String,
    },
}

impl From<reqwest::Error> for BadgeKitError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError {
            url: error
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            status: error.status().map(|status| status.as_u16()),
            error: error.to_string(),
        }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for BadgeKitError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError {
            error: error.reason,
        }
    }
}
