//! UI-facing callbacks: failure notifications and step navigation.

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Notification {
    /// Short heading, e.g. `"Error"`.
    pub title: String,
    /// Body shown to the user.
    pub message: String,
}

/// Shows notifications to the user.
#[uniffi::export(with_foreign)]
pub trait NotificationSink: Send + Sync {
    /// Reports a failure.
    fn failure(&self, notification: Notification);
}

/// Moves the host UI to the next step of the flow.
#[uniffi::export(with_foreign)]
pub trait StepNavigator: Send + Sync {
    /// Advances to the next step. Called once per successful mint.
    fn advance(&self);
}
