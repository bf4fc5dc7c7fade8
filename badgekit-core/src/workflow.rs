//! The mint workflow: nonce, attestation payload, on-chain submission, navigation.
//!
//! Every step returns an explicit `Result` whose error is one of the three [`MintFailure`]s.
//! Failures never escape [`MintWorkflow::mint`]; they are logged with their cause, turned into
//! exactly one user notification and reflected in the [`WorkflowState`].

use std::{fmt, sync::Arc};

use tokio::sync::{watch, Mutex};

use crate::{
    account::AccountProvider,
    config::MintConfig,
    credential::{Credential, MintRequest},
    error::BadgeKitError,
    issuer::AttestationIssuer,
    nonce::{NonceSource, RpcNonceSource},
    notify::{Notification, NotificationSink, StepNavigator},
    payload::{AttestationPayload, AttestationRequest, HttpPayloadFetcher, PayloadFetcher},
};

/// Observable flags of a [`MintWorkflow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Record)]
pub struct WorkflowState {
    /// A mint is in progress.
    pub syncing: bool,
    /// The last mint reached the chain.
    pub minted_successfully: bool,
}

/// Why a mint stopped. Each failure maps to one user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MintFailure {
    /// No nonce could be resolved for the connected account.
    MissingNonce,
    /// The backend answered with an `error` instead of an attestation.
    AttestationGeneration,
    /// The payload could not be fetched or the on-chain submission failed.
    Onchain,
}

impl MintFailure {
    /// Title of every failure notification.
    pub const TITLE: &'static str = "Error";

    /// The message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingNonce => "An unexpected error occurred while trying to get the nonce.",
            Self::AttestationGeneration => {
                "An unexpected error occurred while generating attestations."
            }
            Self::Onchain => {
                "An unexpected error occurred while trying to bring the data onchain."
            }
        }
    }

    /// The notification reported for this failure.
    #[must_use]
    pub fn notification(self) -> Notification {
        Notification {
            title: Self::TITLE.to_string(),
            message: self.message().to_string(),
        }
    }
}

/// Result of a [`MintWorkflow::mint`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MintOutcome {
    /// The attestation was issued and the UI was advanced.
    Minted,
    /// The mint failed and the user was notified.
    Failed {
        /// What went wrong.
        failure: MintFailure,
    },
    /// Another mint on this workflow was still running; nothing was done.
    AlreadyInProgress,
}

/// Orchestrates minting a badge for the connected account.
///
/// Only one mint runs at a time per workflow. The state flags are reset when a mint starts
/// and `syncing` is cleared when it settles, including when the caller drops the future.
#[derive(uniffi::Object)]
pub struct MintWorkflow {
    attestation_url: String,
    account: Arc<dyn AccountProvider>,
    nonce_source: Arc<dyn NonceSource>,
    fetcher: Arc<dyn PayloadFetcher>,
    issuer: Arc<dyn AttestationIssuer>,
    notifier: Arc<dyn NotificationSink>,
    navigator: Arc<dyn StepNavigator>,
    state: watch::Sender<WorkflowState>,
    in_flight: Mutex<()>,
}

#[uniffi::export(async_runtime = "tokio")]
impl MintWorkflow {
    /// Creates a workflow from explicit collaborators.
    #[uniffi::constructor]
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        config: MintConfig,
        account: Arc<dyn AccountProvider>,
        nonce_source: Arc<dyn NonceSource>,
        fetcher: Arc<dyn PayloadFetcher>,
        issuer: Arc<dyn AttestationIssuer>,
        notifier: Arc<dyn NotificationSink>,
        navigator: Arc<dyn StepNavigator>,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            attestation_url: config.attestation_url,
            account,
            nonce_source,
            fetcher,
            issuer,
            notifier,
            navigator,
            state,
            in_flight: Mutex::new(()),
        }
    }

    /// Creates a workflow that reads the nonce over JSON-RPC and fetches payloads over HTTPS,
    /// both configured from `config`.
    ///
    /// # Errors
    /// Returns an error if `config` lacks the RPC settings needed to read the nonce.
    #[uniffi::constructor]
    pub fn with_defaults(
        config: MintConfig,
        account: Arc<dyn AccountProvider>,
        issuer: Arc<dyn AttestationIssuer>,
        notifier: Arc<dyn NotificationSink>,
        navigator: Arc<dyn StepNavigator>,
    ) -> Result<Self, BadgeKitError> {
        let nonce_source = Arc::new(RpcNonceSource::new(config.clone())?);
        let fetcher = Arc::new(HttpPayloadFetcher::new(config.clone()));
        Ok(Self::new(
            config,
            account,
            nonce_source,
            fetcher,
            issuer,
            notifier,
            navigator,
        ))
    }

    /// Mints a badge for `request`.
    ///
    /// The outcome is also reported through the state flags, the [`NotificationSink`] (on
    /// failure) and the [`StepNavigator`] (on success). Calling `mint` while another mint is
    /// running returns [`MintOutcome::AlreadyInProgress`] without side effects.
    pub async fn mint(&self, request: MintRequest) -> MintOutcome {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            log::warn!("mint requested while another mint is in flight, ignoring");
            return MintOutcome::AlreadyInProgress;
        };

        self.state.send_replace(WorkflowState {
            syncing: true,
            minted_successfully: false,
        });
        let _syncing = SyncingGuard(&self.state);

        match self.run(request).await {
            Ok(()) => {
                self.state.send_replace(WorkflowState {
                    syncing: false,
                    minted_successfully: true,
                });
                log::info!("attestation minted");
                self.navigator.advance();
                MintOutcome::Minted
            }
            Err(failure) => {
                self.state.send_replace(WorkflowState::default());
                self.notifier.failure(failure.notification());
                MintOutcome::Failed { failure }
            }
        }
    }

    /// Returns a snapshot of the state flags.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        *self.state.borrow()
    }

    /// Whether a mint is in progress.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.state.borrow().syncing
    }

    /// Whether the last mint reached the chain.
    #[must_use]
    pub fn is_minted_successfully(&self) -> bool {
        self.state.borrow().minted_successfully
    }
}

impl MintWorkflow {
    /// Observes every change of the state flags.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    async fn run(&self, request: MintRequest) -> Result<(), MintFailure> {
        let Some(recipient) = self.account.address() else {
            log::warn!("no connected account, cannot resolve a nonce");
            return Err(MintFailure::MissingNonce);
        };

        let nonce = self.resolve_nonce(&recipient).await?;
        let payload = self
            .generate_attestation(recipient, nonce, request.credentials)
            .await?;
        self.bring_onchain(payload).await
    }

    async fn resolve_nonce(&self, recipient: &str) -> Result<u64, MintFailure> {
        match self.nonce_source.get_nonce(recipient.to_string()).await {
            Ok(Some(nonce)) => {
                log::debug!("resolved nonce {nonce} for {recipient}");
                Ok(nonce)
            }
            Ok(None) => {
                log::warn!("no nonce available for {recipient}");
                Err(MintFailure::MissingNonce)
            }
            Err(e) => {
                log::warn!("nonce lookup for {recipient} failed: {e}");
                Err(MintFailure::Onchain)
            }
        }
    }

    async fn generate_attestation(
        &self,
        recipient: String,
        nonce: u64,
        credentials: Vec<Arc<Credential>>,
    ) -> Result<Arc<AttestationPayload>, MintFailure> {
        let request = AttestationRequest {
            recipient,
            nonce,
            credentials,
        };

        let payload = self
            .fetcher
            .fetch(self.attestation_url.clone(), request)
            .await
            .map_err(|e| {
                log::warn!("attestation request to {} failed: {e}", self.attestation_url);
                MintFailure::Onchain
            })?;

        if let Some(error) = payload.error() {
            log::warn!("attestation backend reported an error: {error}");
            return Err(MintFailure::AttestationGeneration);
        }

        Ok(payload)
    }

    async fn bring_onchain(&self, payload: Arc<AttestationPayload>) -> Result<(), MintFailure> {
        self.issuer.issue(payload).await.map_err(|e| {
            log::warn!("attestation issuance failed: {e}");
            MintFailure::Onchain
        })
    }
}

impl fmt::Debug for MintWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintWorkflow")
            .field("attestation_url", &self.attestation_url)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Clears `syncing` when the mint settles or its future is dropped mid-flight.
struct SyncingGuard<'a>(&'a watch::Sender<WorkflowState>);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            let was_syncing = state.syncing;
            state.syncing = false;
            was_syncing
        });
    }
}
