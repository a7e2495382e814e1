// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network addresses of physical devices.

use std::fmt;

/// Network address of a physical device.
///
/// Addresses are used for best-effort command delivery and to correlate
/// sensor poll results back to devices. They are stored as supplied;
/// [`is_valid_ipv4`](Self::is_valid_ipv4) offers a syntactic dotted-quad
/// check (with an optional `/mask` suffix) for callers that want to vet
/// addresses before registering a device. Registration itself does not
/// invoke it, matching the controller's historical behavior.
///
/// # Examples
///
/// ```
/// use casita_lib::types::DeviceAddress;
///
/// let addr = DeviceAddress::new("192.168.1.12");
/// assert!(addr.is_valid_ipv4());
///
/// let masked = DeviceAddress::new("10.0.0.1/24");
/// assert!(masked.is_valid_ipv4());
///
/// let bogus = DeviceAddress::new("not-an-address");
/// assert!(!bogus.is_valid_ipv4());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Creates a new device address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the address is a syntactically valid dotted quad,
    /// optionally followed by a `/mask` suffix.
    #[must_use]
    pub fn is_valid_ipv4(&self) -> bool {
        let host = self.0.split('/').next().unwrap_or_default();
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() != 4 {
            return false;
        }
        parts.iter().all(|part| part.parse::<u8>().is_ok())
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_dotted_quad() {
        assert!(DeviceAddress::new("192.168.1.12").is_valid_ipv4());
        assert!(DeviceAddress::new("0.0.0.0").is_valid_ipv4());
        assert!(DeviceAddress::new("255.255.255.255").is_valid_ipv4());
    }

    #[test]
    fn valid_with_mask() {
        assert!(DeviceAddress::new("10.0.0.1/24").is_valid_ipv4());
    }

    #[test]
    fn invalid_octet_count() {
        assert!(!DeviceAddress::new("10.0.0").is_valid_ipv4());
        assert!(!DeviceAddress::new("10.0.0.1.2").is_valid_ipv4());
    }

    #[test]
    fn invalid_octet_range() {
        assert!(!DeviceAddress::new("10.0.0.256").is_valid_ipv4());
        assert!(!DeviceAddress::new("10.0.0.-1").is_valid_ipv4());
    }

    #[test]
    fn invalid_garbage() {
        assert!(!DeviceAddress::new("not-an-address").is_valid_ipv4());
        assert!(!DeviceAddress::new("").is_valid_ipv4());
    }

    #[test]
    fn display_matches_input() {
        let addr = DeviceAddress::new("192.168.1.12");
        assert_eq!(addr.to_string(), "192.168.1.12");
        assert_eq!(addr.as_str(), "192.168.1.12");
    }
}
