// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for smart-home device control.
//!
//! This module provides type-safe representations of the values moved
//! around by the controller. Each type validates its input at construction
//! time, preventing runtime errors further in.
//!
//! # Types
//!
//! - [`DeviceType`] - Tag distinguishing the device variants
//! - [`DeviceAddress`] - Network address of a physical device
//! - [`HexColor`] - Validated `#RGB` / `#RRGGBB` color string
//! - [`HsvColor`] - HSV color (Hue 0-359, Saturation 0-100, Value 0-100)

mod address;
mod device_type;
mod hex_color;
mod hsv;

pub use address::DeviceAddress;
pub use device_type::{DeviceType, DeviceTypeEntry};
pub use hex_color::HexColor;
pub use hsv::HsvColor;
