// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-NP shared SRAM sizing and human-readable byte parsing.
//!
//! Every NP in the mesh has the same SRAM split into an input region and a
//! weight region. A [`SramSize`] describes that split for a whole device.

use crate::DeviceError;
use std::fmt;

/// Input/weight SRAM available to each NP, in bytes.
///
/// # Parsing
/// `SramSize::parse("64K,128K")` reads `input,weight`; each half accepts the
/// same suffixes as [`parse_bytes`].
///
/// # Examples
/// ```
/// use device_model::SramSize;
///
/// let s = SramSize::parse("32K,64K").unwrap();
/// assert_eq!(s.input_bytes, 32 * 1024);
/// assert_eq!(s.weight_bytes, 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SramSize {
    /// Input (activation) SRAM per NP.
    pub input_bytes: u32,
    /// Weight SRAM per NP.
    pub weight_bytes: u32,
}

impl SramSize {
    /// Size used when a device is created without an explicit SRAM size.
    pub const DEFAULT: Self = Self {
        input_bytes: 64 * 1024,
        weight_bytes: 128 * 1024,
    };

    /// Zero-sized SRAM, the identity for [`SramSize::max`].
    pub const ZERO: Self = Self {
        input_bytes: 0,
        weight_bytes: 0,
    };

    pub fn new(input_bytes: u32, weight_bytes: u32) -> Self {
        Self {
            input_bytes,
            weight_bytes,
        }
    }

    /// Field-wise maximum of two sizes.
    pub fn max(self, other: Self) -> Self {
        Self {
            input_bytes: self.input_bytes.max(other.input_bytes),
            weight_bytes: self.weight_bytes.max(other.weight_bytes),
        }
    }

    /// Returns `true` if a footprint of `input`/`weight` bytes fits.
    pub fn fits(&self, input_bytes: u32, weight_bytes: u32) -> bool {
        input_bytes <= self.input_bytes && weight_bytes <= self.weight_bytes
    }

    /// Parses `"<input>,<weight>"`, e.g. `"64K,128K"`.
    pub fn parse(s: &str) -> Result<Self, DeviceError> {
        let (input, weight) = s.split_once(',').ok_or_else(|| DeviceError::InvalidSize {
            input: s.to_string(),
            detail: "expected '<input>,<weight>'".into(),
        })?;
        Ok(Self {
            input_bytes: parse_bytes(input)?,
            weight_bytes: parse_bytes(weight)?,
        })
    }
}

impl Default for SramSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SramSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input {} / weight {}",
            HumanBytes(self.input_bytes),
            HumanBytes(self.weight_bytes),
        )
    }
}

/// Formats a byte count with the largest exact binary suffix.
struct HumanBytes(u32);

impl fmt::Display for HumanBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b >= 1024 * 1024 && b % (1024 * 1024) == 0 {
            write!(f, "{} MB", b / (1024 * 1024))
        } else if b >= 1024 && b % 1024 == 0 {
            write!(f, "{} KB", b / 1024)
        } else {
            write!(f, "{b} B")
        }
    }
}

/// Parses a human-readable byte count.
///
/// Accepted formats: `"64K"`, `"64KB"`, `"1M"`, `"1MB"`, `"512B"` or a plain
/// number of bytes. Case-insensitive; surrounding whitespace is ignored.
pub fn parse_bytes(s: &str) -> Result<u32, DeviceError> {
    let s = s.trim();
    let invalid = |detail: &str| DeviceError::InvalidSize {
        input: s.to_string(),
        detail: detail.to_string(),
    };
    if s.is_empty() {
        return Err(invalid("empty size"));
    }

    let s_upper = s.to_uppercase();
    let (num_str, multiplier): (&str, u32) = if s_upper.ends_with("MB") {
        (&s[..s.len() - 2], 1024 * 1024)
    } else if s_upper.ends_with('M') {
        (&s[..s.len() - 1], 1024 * 1024)
    } else if s_upper.ends_with("KB") {
        (&s[..s.len() - 2], 1024)
    } else if s_upper.ends_with('K') {
        (&s[..s.len() - 1], 1024)
    } else if s_upper.ends_with('B') {
        (&s[..s.len() - 1], 1)
    } else {
        (s, 1)
    };

    let value: u32 = num_str
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number followed by an optional suffix (K, M)"))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("size overflows 32 bits"))
}
