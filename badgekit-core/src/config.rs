use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::{error::BadgeKitError, Environment};

/// The EAS contract is an OP-stack predeploy, so it has the same address on every chain we target.
pub static EAS_CONTRACT: Address = address!("0x4200000000000000000000000000000000000021");

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3; // total attempts = 4

/// Settings for a [`crate::MintWorkflow`] and the default collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct MintConfig {
    /// Endpoint of the backend that generates attestation payloads.
    pub attestation_url: String,
    /// JSON-RPC endpoint used to read the account nonce.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Contract exposing `getNonce(address)`.
    #[serde(default)]
    pub nonce_contract: Option<String>,
    /// Timeout for a single HTTP attempt, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How many times a transient HTTP failure is retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl MintConfig {
    /// Builds the SDK defaults for `environment`.
    ///
    /// `rpc_url` overrides the public RPC endpoint of the environment's chain.
    #[must_use]
    pub fn from_environment(
        environment: &Environment,
        attestation_url: String,
        rpc_url: Option<String>,
    ) -> Self {
        let default_rpc = match environment {
            Environment::Staging => "https://sepolia.base.org",
            Environment::Production => "https://mainnet.base.org",
        };

        Self {
            attestation_url,
            rpc_url: Some(rpc_url.unwrap_or_else(|| default_rpc.to_string())),
            nonce_contract: Some(EAS_CONTRACT.to_string()),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Deserializes a `MintConfig` from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or `attestation_url` is missing.
    pub fn from_json(json: &str) -> Result<Self, BadgeKitError> {
        serde_json::from_str(json).map_err(|e| BadgeKitError::InvalidInput {
            attribute: "config".to_string(),
            reason: format!("invalid config json: {e}"),
        })
    }

    /// Serializes the config to a JSON string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, BadgeKitError> {
        serde_json::to_string(self).map_err(|e| BadgeKitError::SerializationError {
            error: format!("critical unexpected error serializing config: {e}"),
        })
    }

    pub(crate) const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builds the SDK default [`MintConfig`] for `environment`.
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn default_mint_config(
    environment: Environment,
    attestation_url: String,
    rpc_url: Option<String>,
) -> MintConfig {
    MintConfig::from_environment(&environment, attestation_url, rpc_url)
}

/// Parses a [`MintConfig`] from JSON, filling in defaults for omitted optional fields.
///
/// # Errors
/// Returns an error if the JSON is invalid.
#[uniffi::export]
pub fn mint_config_from_json(json: &str) -> Result<MintConfig, BadgeKitError> {
    MintConfig::from_json(json)
}
