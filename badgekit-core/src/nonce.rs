//! Nonce lookup for the connected account.

use alloy_core::sol_types::SolCall;
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::MintConfig, error::BadgeKitError, http_request::Request,
    primitives::ParseFromForeignBinding,
};

#[allow(missing_docs, dead_code)]
mod abi {
    alloy_core::sol_types::sol! {
        #![sol(alloy_sol_types = alloy_core::sol_types)]

        interface IEAS {
            function getNonce(address account) external view returns (uint256);
        }
    }
}

/// Produces the replay-protection nonce for an account.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait NonceSource: Send + Sync {
    /// Returns the current nonce of `address`, or `None` if it cannot be determined.
    ///
    /// # Errors
    /// Returns an error if the lookup itself fails (e.g. the node is unreachable).
    async fn get_nonce(&self, address: String) -> Result<Option<u64>, BadgeKitError>;
}

/// Reads the nonce from the attestation contract with a JSON-RPC `eth_call`.
#[derive(Debug, uniffi::Object)]
pub struct RpcNonceSource {
    rpc_url: String,
    contract: Address,
    request: Request,
}

#[uniffi::export]
impl RpcNonceSource {
    /// Creates a nonce source from the `rpc_url` and `nonce_contract` of `config`.
    ///
    /// # Errors
    /// Returns an error if either setting is missing or the contract address is malformed.
    #[uniffi::constructor]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: MintConfig) -> Result<Self, BadgeKitError> {
        let rpc_url = config
            .rpc_url
            .clone()
            .ok_or_else(|| BadgeKitError::InvalidInput {
                attribute: "rpc_url".to_string(),
                reason: "an rpc url is required to read the nonce".to_string(),
            })?;
        let contract = config
            .nonce_contract
            .as_deref()
            .ok_or_else(|| BadgeKitError::InvalidInput {
                attribute: "nonce_contract".to_string(),
                reason: "a nonce contract is required to read the nonce".to_string(),
            })
            .and_then(|contract| Address::parse_from_ffi(contract, "nonce_contract"))?;

        Ok(Self {
            rpc_url,
            contract,
            request: Request::new(config.request_timeout(), config.max_retries),
        })
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (EthCall, &'static str),
}

#[derive(Serialize)]
struct EthCall {
    to: String,
    data: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[async_trait]
impl NonceSource for RpcNonceSource {
    async fn get_nonce(&self, address: String) -> Result<Option<u64>, BadgeKitError> {
        let account = Address::parse_from_ffi(&address, "address")?;
        let call = abi::IEAS::getNonceCall { account };

        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                EthCall {
                    to: self.contract.to_string(),
                    data: format!("0x{}", hex::encode(call.abi_encode())),
                },
                "latest",
            ),
        };

        let request_builder = self.request.post(&self.rpc_url)?.json(&body);
        let response = self.request.handle(request_builder).await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BadgeKitError::NetworkError {
                url: self.rpc_url.clone(),
                status: Some(status.as_u16()),
                error: format!("eth_call failed: {error_body}"),
            });
        }

        let rpc_response: JsonRpcResponse =
            response
                .json()
                .await
                .map_err(|e| BadgeKitError::SerializationError {
                    error: format!("Failed to parse eth_call response: {e}"),
                })?;

        if let Some(error) = rpc_response.error {
            return Err(BadgeKitError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .as_deref()
            .map_or(Ok(None), decode_nonce)
    }
}

/// Decodes an ABI `uint256` return word. An empty result means the contract is not deployed
/// at the configured address, so there is no nonce to report.
fn decode_nonce(result: &str) -> Result<Option<u64>, BadgeKitError> {
    let hex_data = result.strip_prefix("0x").unwrap_or(result);
    if hex_data.is_empty() {
        return Ok(None);
    }

    let bytes = hex::decode(hex_data).map_err(|e| BadgeKitError::SerializationError {
        error: format!("Failed to decode eth_call result: {e}"),
    })?;
    let word: [u8; 32] = bytes
        .get(..32)
        .and_then(|word| word.try_into().ok())
        .ok_or_else(|| BadgeKitError::SerializationError {
            error: format!("eth_call result too short: {} bytes", bytes.len()),
        })?;

    let (high, low) = word.split_at(24);
    if high.iter().any(|byte| *byte != 0) {
        return Err(BadgeKitError::SerializationError {
            error: "nonce does not fit in 64 bits".to_string(),
        });
    }

    let mut low_bytes = [0u8; 8];
    low_bytes.copy_from_slice(low);
    Ok(Some(u64::from_be_bytes(low_bytes)))
}

#[cfg(test)]
impl RpcNonceSource {
    /// Create a nonce source with a custom RPC URL (for testing).
    fn with_rpc_url(rpc_url: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            contract: crate::config::EAS_CONTRACT,
            request: Request::new(std::time::Duration::from_secs(5), 0),
        }
    }
}
