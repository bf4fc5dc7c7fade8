//! Common test utilities shared across integration tests.

#![allow(dead_code, missing_docs)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use badgekit_core::{
    AccountProvider, AttestationIssuer, AttestationPayload, AttestationRequest,
    BadgeKitError, MintConfig, MintRequest, MintWorkflow, NonceSource, Notification,
    NotificationSink, PayloadFetcher, StepNavigator,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

pub const TEST_ADDRESS: &str = "0xTestAddress";
pub const TEST_URL: &str = "https://attest.example.org/api/attestations";

pub struct FakeAccount(pub Option<String>);

impl AccountProvider for FakeAccount {
    fn address(&self) -> Option<String> {
        self.0.clone()
    }
}

/// What a [`FakeNonceSource`] answers with.
#[derive(Clone, Copy)]
pub enum NonceScript {
    Value(Option<u64>),
    Fail,
}

pub struct FakeNonceSource {
    script: NonceScript,
    pub calls: Mutex<Vec<String>>,
}

impl FakeNonceSource {
    pub fn new(script: NonceScript) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NonceSource for FakeNonceSource {
    async fn get_nonce(&self, address: String) -> Result<Option<u64>, BadgeKitError> {
        self.calls.lock().unwrap().push(address);
        match self.script {
            NonceScript::Value(nonce) => Ok(nonce),
            NonceScript::Fail => Err(BadgeKitError::NetworkError {
                url: "https://rpc.example.org".to_string(),
                status: None,
                error: "connection refused".to_string(),
            }),
        }
    }
}

/// What a [`FakeFetcher`] answers with.
#[derive(Clone)]
pub enum FetchScript {
    Data(Value),
    Fail,
    /// Never settles.
    Hang,
}

pub struct FakeFetcher {
    script: FetchScript,
    pub calls: Mutex<Vec<(String, AttestationRequest)>>,
    /// Signalled once a fetch has started.
    pub entered: Notify,
    /// When set, the fetch waits for this before answering.
    pub release: Option<Notify>,
}

impl FakeFetcher {
    pub fn new(script: FetchScript) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            entered: Notify::new(),
            release: None,
        }
    }

    pub fn gated(script: FetchScript) -> Self {
        Self {
            release: Some(Notify::new()),
            ..Self::new(script)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PayloadFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: String,
        request: AttestationRequest,
    ) -> Result<Arc<AttestationPayload>, BadgeKitError> {
        self.calls.lock().unwrap().push((url.clone(), request));
        self.entered.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }

        match &self.script {
            FetchScript::Data(data) => Ok(Arc::new(AttestationPayload::from(data.clone()))),
            FetchScript::Fail => Err(BadgeKitError::NetworkError {
                url,
                status: None,
                error: "Network error".to_string(),
            }),
            FetchScript::Hang => std::future::pending().await,
        }
    }
}

pub struct FakeIssuer {
    succeed: bool,
    pub issued: Mutex<Vec<Value>>,
}

impl FakeIssuer {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn issued(&self) -> Vec<Value> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttestationIssuer for FakeIssuer {
    async fn issue(&self, payload: Arc<AttestationPayload>) -> Result<(), BadgeKitError> {
        self.issued.lock().unwrap().push(payload.data().clone());
        if self.succeed {
            Ok(())
        } else {
            Err(BadgeKitError::IssuanceFailed {
                reason: "Attestation failed".to_string(),
            })
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn failure(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct CountingNavigator {
    pub advanced: AtomicUsize,
}

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.advanced.load(Ordering::SeqCst)
    }
}

impl StepNavigator for CountingNavigator {
    fn advance(&self) {
        self.advanced.fetch_add(1, Ordering::SeqCst);
    }
}

/// A workflow wired to fakes, with handles to inspect every collaborator.
pub struct Harness {
    pub workflow: Arc<MintWorkflow>,
    pub nonce_source: Arc<FakeNonceSource>,
    pub fetcher: Arc<FakeFetcher>,
    pub issuer: Arc<FakeIssuer>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<CountingNavigator>,
}

impl Harness {
    pub fn new(nonce: NonceScript, fetcher: FakeFetcher, issue_succeeds: bool) -> Self {
        Self::with_account(Some(TEST_ADDRESS), nonce, fetcher, issue_succeeds)
    }

    pub fn with_account(
        address: Option<&str>,
        nonce: NonceScript,
        fetcher: FakeFetcher,
        issue_succeeds: bool,
    ) -> Self {
        let nonce_source = Arc::new(FakeNonceSource::new(nonce));
        let fetcher = Arc::new(fetcher);
        let issuer = Arc::new(FakeIssuer::new(issue_succeeds));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(CountingNavigator::default());

        let config =
            MintConfig::from_json(&json!({ "attestation_url": TEST_URL }).to_string())
                .unwrap();
        let workflow = Arc::new(MintWorkflow::new(
            config,
            Arc::new(FakeAccount(address.map(ToString::to_string))),
            nonce_source.clone(),
            fetcher.clone(),
            issuer.clone(),
            notifier.clone(),
            navigator.clone(),
        ));

        Self {
            workflow,
            nonce_source,
            fetcher,
            issuer,
            notifier,
            navigator,
        }
    }
}

pub fn test_request() -> MintRequest {
    MintRequest::from_values([json!({ "credential": "testCredential" })])
}

pub fn test_data() -> Value {
    json!({ "attestation": "testAttestation" })
}
