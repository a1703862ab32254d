// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`MappingOracle`] trait and oracle implementations.
//!
//! An oracle is the ground truth for "does this model fit this device".
//! The planner never places layers itself; it proposes devices and reads
//! back the placement results the oracle writes into the model.

pub mod passes;
pub mod simulated;

use device_model::{DeviceDescriptor, SramSize};
use model_ir::{graph::Validated, ModelGraph};
use std::fmt;

/// How aggressively the oracle spreads layers over NPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    /// Use as few NPs as possible.
    #[default]
    Minimal,
    /// Spread layers over every available NP.
    AllNps,
}

/// Why an oracle rejected a model/device pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFailure {
    /// Human-readable diagnostic from the oracle.
    pub diagnostic: String,
}

impl MappingFailure {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

impl fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic)
    }
}

impl std::error::Error for MappingFailure {}

/// Placement and routing engine the planner validates devices against.
///
/// Implementations may be slow (a real placer) or synthetic
/// ([`simulated::SimulatedMesh`]); the planner only relies on this contract.
pub trait MappingOracle: Send + Sync {
    /// Human-readable name of this oracle.
    fn name(&self) -> &str;

    /// Maps `model` onto `device`.
    ///
    /// On success every layer's mapping and the model's device assignment
    /// are overwritten. On failure the model is left untouched.
    fn map(
        &self,
        model: &mut ModelGraph<Validated>,
        device: &DeviceDescriptor,
        mode: MapMode,
        hw_only: bool,
    ) -> Result<(), MappingFailure>;

    /// Least per-NP SRAM sufficient for the model's current mapping.
    fn minimal_memory(&self, model: &ModelGraph<Validated>) -> Result<SramSize, MappingFailure>;
}
