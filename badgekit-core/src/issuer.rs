use std::sync::Arc;

use crate::{error::BadgeKitError, payload::AttestationPayload};

/// Submits attestation payloads on-chain.
///
/// Implemented by the host on top of its attestation SDK and wallet signer. The call should
/// resolve once the submission is accepted, and fail if the user rejects the transaction or
/// the submission reverts.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait AttestationIssuer: Send + Sync {
    /// Records `payload` on-chain.
    ///
    /// # Errors
    /// Returns an error if the attestation could not be submitted.
    async fn issue(&self, payload: Arc<AttestationPayload>) -> Result<(), BadgeKitError>;
}
