//! `badgekit-core` mints credential badges for a connected wallet.
//!
//! The [`MintWorkflow`] fetches a nonce for the wallet, asks an attestation backend to
//! generate the attestation payload for the supplied credentials, submits that payload
//! on-chain and then tells the host UI to move forward. Every collaborator is a trait that
//! can be implemented in Rust or by the host application through the foreign bindings.
//!
//! ```rust,ignore
//! let workflow = MintWorkflow::with_defaults(
//!     MintConfig::from_environment(&Environment::Staging, attestation_url, None),
//!     account,
//!     issuer,
//!     notifier,
//!     navigator,
//! )?;
//! workflow.mint(MintRequest { credentials }).await;
//! assert!(workflow.state().minted_successfully);
//! ```
use strum::EnumString;

/// The environment the SDK is pointed at. Selects default chain endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Testnet deployments.
    Staging,
    /// Mainnet deployments.
    Production,
}

mod account;
pub use account::*;

mod config;
pub use config::*;

mod credential;
pub use credential::*;

mod error;
pub use error::*;

mod issuer;
pub use issuer::*;

/// Bridge between the `log` facade and a host-provided logger.
pub mod logger;

mod nonce;
pub use nonce::*;

mod notify;
pub use notify::*;

mod payload;
pub use payload::*;

mod workflow;
pub use workflow::*;

// private modules
mod http_request;
mod primitives;

uniffi::setup_scaffolding!("badgekit_core");
