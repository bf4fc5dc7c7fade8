/// Supplies the address of the currently connected wallet.
///
/// Implemented by the host's wallet connector. The address is read at the start of every
/// mint, so switching accounts between mints is picked up.
#[uniffi::export(with_foreign)]
pub trait AccountProvider: Send + Sync {
    /// Returns the connected address, or `None` when no wallet is connected.
    fn address(&self) -> Option<String>;
}

/// An [`AccountProvider`] bound to a single address.
#[derive(Debug, Clone, uniffi::Object)]
pub struct StaticAccount {
    address: String,
}

#[uniffi::export]
impl StaticAccount {
    /// Creates a provider that always reports `address`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(address: String) -> Self {
        Self { address }
    }
}

impl AccountProvider for StaticAccount {
    fn address(&self) -> Option<String> {
        Some(self.address.clone())
    }
}
