// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-model
//!
//! Value types describing a sized spatial-accelerator mesh.
//!
//! - [`DeviceDescriptor`] — NP counts per class, skip DMA channels, HRC
//!   presence and per-NP SRAM, built through a checked constructor.
//! - [`SramSize`] — the per-NP input/weight SRAM split, with human-readable
//!   parsing (`"64K,128K"`).
//! - [`IpVersion`] — the hardware generation tag shared by models and devices.
//!
//! # Example
//! ```
//! use device_model::{DeviceDescriptor, SramSize};
//!
//! let device = DeviceDescriptor::create(8, 2, 1, true, Some(SramSize::parse("32K,64K").unwrap()), None)
//!     .unwrap();
//! assert_eq!(device.num_nodes(), 3);
//! ```

mod device;
mod error;
mod sram;
mod version;

pub use device::{DeviceDescriptor, NPS_PER_NODE};
pub use error::DeviceError;
pub use sram::{parse_bytes, SramSize};
pub use version::IpVersion;
