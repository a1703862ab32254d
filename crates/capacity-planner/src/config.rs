// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Planner configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! enable_hwpr = true
//! sram_size = "32K,64K"
//! minimal_memory = false
//! initial_num_nodes = 36
//! include_hrc = true
//! timeout_secs = 30
//! ```

use crate::{PlannerError, PlannerOptions};
use device_model::SramSize;
use std::path::Path;

/// Sizing configuration as written by users.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Size for hardware partial reconfiguration.
    pub enable_hwpr: bool,
    /// Per-NP SRAM as `"<input>,<weight>"` (e.g. `"64K,128K"`).
    pub sram_size: Option<String>,
    /// Shrink SRAM to the least size the mapping needs.
    pub minimal_memory: bool,
    /// Mesh nodes of the bootstrap device.
    pub initial_num_nodes: u32,
    /// Whether the sized device includes the input capture unit.
    pub include_hrc: bool,
    /// Wall-clock limit for one sizing run, enforced by the CLI.
    pub timeout_secs: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let options = PlannerOptions::default();
        Self {
            enable_hwpr: options.enable_hwpr,
            sram_size: None,
            minimal_memory: options.minimal_memory,
            initial_num_nodes: options.initial_num_nodes,
            include_hrc: options.include_hrc,
            timeout_secs: None,
        }
    }
}

impl PlannerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PlannerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PlannerError> {
        toml::from_str(toml_str)
            .map_err(|e| PlannerError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, PlannerError> {
        toml::to_string_pretty(self)
            .map_err(|e| PlannerError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the SRAM size string, if any.
    pub fn parse_sram_size(&self) -> Result<Option<SramSize>, PlannerError> {
        self.sram_size
            .as_deref()
            .map(SramSize::parse)
            .transpose()
            .map_err(|e| PlannerError::Config(format!("invalid sram_size: {e}")))
    }

    /// Converts into solver options.
    pub fn to_options(&self) -> Result<PlannerOptions, PlannerError> {
        Ok(PlannerOptions {
            enable_hwpr: self.enable_hwpr,
            sram_size: self.parse_sram_size()?,
            minimal_memory: self.minimal_memory,
            initial_num_nodes: self.initial_num_nodes,
            include_hrc: self.include_hrc,
        })
    }
}
