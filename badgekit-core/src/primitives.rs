use alloy_primitives::Address;
use std::str::FromStr;

use crate::error::BadgeKitError;

/// A trait for parsing primitive types from foreign bindings.
///
/// Host applications hand over addresses and other primitives as strings. This trait parses
/// them into their typed representation and reports which attribute was malformed.
///
/// # Examples
/// ```rust,ignore
/// let recipient = Address::parse_from_ffi("0x1234567890abcdef", "recipient")?;
/// ```
pub trait ParseFromForeignBinding {
    fn parse_from_ffi(s: &str, attr: &'static str) -> Result<Self, BadgeKitError>
    where
        Self: Sized;
}

impl ParseFromForeignBinding for Address {
    fn parse_from_ffi(s: &str, attr: &'static str) -> Result<Self, BadgeKitError> {
        Self::from_str(s).map_err(|e| BadgeKitError::InvalidInput {
            attribute: attr.to_string(),
            reason: e.to_string(),
        })
    }
}
