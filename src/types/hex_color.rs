// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated hex color strings.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// A validated hex color string in `#RGB` or `#RRGGBB` form.
///
/// The leading `#` is required and hex digits are accepted in either case.
/// The string is stored exactly as supplied; no normalization is applied,
/// so `#FF0000` and `#ff0000` are distinct values that render identically.
///
/// # Examples
///
/// ```
/// use casita_lib::types::HexColor;
///
/// let color = HexColor::new("#ff8000").unwrap();
/// assert_eq!(color.as_str(), "#ff8000");
///
/// // Short form and uppercase are fine
/// assert!(HexColor::new("#F00").is_ok());
///
/// // Missing hash or wrong length is not
/// assert!(HexColor::new("ff8000").is_err());
/// assert!(HexColor::new("#ff80").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Creates a validated hex color.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidHexColor`] if the string does not match
    /// `#RGB` / `#RRGGBB` (case-insensitive).
    pub fn new(color: impl Into<String>) -> Result<Self, ValueError> {
        let color = color.into();
        if Self::is_valid(&color) {
            Ok(Self(color))
        } else {
            Err(ValueError::InvalidHexColor(color))
        }
    }

    /// Returns the default white color (`#ffffff`).
    #[must_use]
    pub fn white() -> Self {
        Self("#ffffff".to_string())
    }

    /// Returns the color string, including the leading `#`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the color with the `#` stripped.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }

    fn is_valid(color: &str) -> bool {
        let Some(digits) = color.strip_prefix('#') else {
            return false;
        };
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}
