// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Virtual device descriptor.
//!
//! A [`DeviceDescriptor`] is a sized mesh: how many NPs of each class it
//! has, how many skip DMA channels connect passes, whether the input
//! capture unit (HRC) is present, and how much SRAM each NP owns.
//! Descriptors are plain values; a mapping oracle decides whether a model
//! actually fits one.

use crate::{DeviceError, IpVersion, SramSize};
use std::fmt;

/// NPs grouped into one mesh node.
pub const NPS_PER_NODE: u32 = 4;

/// A candidate or validated device configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceDescriptor {
    /// Hardware generation.
    pub version: IpVersion,
    /// Convolution / sequencer NPs (CNP1, CNP2, TNP-B).
    pub num_cnp_tnp: u32,
    /// Fully-connected NPs (FNP2, FNP3).
    pub num_fnp: u32,
    /// Skip DMA channels available for cross-pass buffering.
    pub num_skip_dma_channels: u32,
    /// Whether the hardware input capture unit is present.
    pub include_hrc: bool,
    /// SRAM owned by every NP.
    pub sram_size: SramSize,
}

impl DeviceDescriptor {
    /// Builds a device, checking each quantity.
    ///
    /// `sram_size` and `version` fall back to [`SramSize::DEFAULT`] and
    /// [`IpVersion::SUPPORTED`].
    ///
    /// # Errors
    /// [`DeviceError::ConstraintViolation`] if either SRAM region is empty.
    /// Counts are unsigned, and a device with no NPs is valid: models that
    /// run entirely on the HRC or the host need none.
    pub fn create(
        num_cnp_tnp: u32,
        num_fnp: u32,
        num_skip_dma_channels: u32,
        include_hrc: bool,
        sram_size: Option<SramSize>,
        version: Option<IpVersion>,
    ) -> Result<Self, DeviceError> {
        let sram_size = sram_size.unwrap_or_default();
        if sram_size.input_bytes == 0 || sram_size.weight_bytes == 0 {
            return Err(DeviceError::ConstraintViolation {
                detail: format!("SRAM regions must be non-empty, got {sram_size}"),
            });
        }

        Ok(Self {
            version: version.unwrap_or_default(),
            num_cnp_tnp,
            num_fnp,
            num_skip_dma_channels,
            include_hrc,
            sram_size,
        })
    }

    /// Total processing NPs (skip DMA channels are not NPs).
    pub fn num_nps(&self) -> u32 {
        self.num_cnp_tnp + self.num_fnp
    }

    /// Mesh nodes required to host every NP.
    pub fn num_nodes(&self) -> u32 {
        self.num_nps().div_ceil(NPS_PER_NODE)
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} device: {} CNP/TNP, {} FNP, {} skip DMA channels, HRC {}, SRAM {} ({} nodes)",
            self.version,
            self.num_cnp_tnp,
            self.num_fnp,
            self.num_skip_dma_channels,
            if self.include_hrc { "on" } else { "off" },
            self.sram_size,
            self.num_nodes(),
        )
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
