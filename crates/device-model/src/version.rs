// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Accelerator IP generations.

use crate::DeviceError;
use std::fmt;
use std::str::FromStr;

/// Hardware IP generation a model was compiled for, or a device implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpVersion {
    /// First-generation mesh (no skip DMA, no TNP).
    V1,
    /// Second-generation mesh with skip DMA channels and partial reconfiguration.
    V2,
}

impl IpVersion {
    /// The only generation the capacity planner can size devices for.
    pub const SUPPORTED: Self = Self::V2;

    /// Returns a short label, e.g. `"v2"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl Default for IpVersion {
    fn default() -> Self {
        Self::SUPPORTED
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpVersion {
    type Err = DeviceError;

    /// Accepts `"v1"`, `"1"`, `"v2"`, `"2"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" | "1.0" => Ok(Self::V1),
            "v2" | "2" | "2.0" => Ok(Self::V2),
            other => Err(DeviceError::UnknownVersion(other.to_string())),
        }
    }
}
