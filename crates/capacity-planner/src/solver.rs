// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Minimum-device search for a single model.
//!
//! # Algorithm
//!
//! ```text
//! version check ─► bootstrap device ─► oracle.map ─► count resources
//!                  (generous guess)                      │
//!                                      ┌─────────────────┴───────────────┐
//!                              hwpr off: model totals        hwpr on: pair peaks
//!                                                            + skip channel search
//!                                      └─────────────────┬───────────────┘
//!                                          optional minimal SRAM query
//!                                                        │
//!                                             final device ─► oracle.map
//! ```
//!
//! The caller's model is never modified; every mapping happens on a clone.

use crate::accounting::ResourceCount;
use crate::oracle::{MapMode, MappingFailure, MappingOracle};
use crate::sequencer::layer_pairs;
use crate::PlannerError;
use device_model::{DeviceDescriptor, IpVersion, SramSize, NPS_PER_NODE};
use model_ir::{graph::Validated, ModelGraph};

/// Knobs for [`compute_min_device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Size for hardware partial reconfiguration: only producer/consumer
    /// pairs need to be resident at once.
    pub enable_hwpr: bool,
    /// Per-NP SRAM of the sized device; `None` uses the device default.
    pub sram_size: Option<SramSize>,
    /// Shrink SRAM to the least size the mapping needs.
    pub minimal_memory: bool,
    /// Mesh nodes of the bootstrap device.
    pub initial_num_nodes: u32,
    /// Whether the sized device includes the input capture unit.
    pub include_hrc: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            enable_hwpr: false,
            sram_size: None,
            minimal_memory: false,
            initial_num_nodes: 36,
            include_hrc: true,
        }
    }
}

/// Computes the smallest device `oracle` can map `model` onto.
///
/// # Errors
/// - [`PlannerError::UnsupportedVersion`] before any oracle call if the
///   model is not a v2 model.
/// - [`PlannerError::InsufficientInitialNodes`] if the bootstrap device
///   cannot hold the dense layers.
/// - [`PlannerError::DeviceNotFound`] if the bootstrap or final mapping fails.
/// - [`PlannerError::UnsupportedTopology`] / [`PlannerError::NoFeasibleChannelCount`]
///   from the partial-reconfiguration path.
pub fn compute_min_device<O>(
    oracle: &O,
    model: &ModelGraph<Validated>,
    options: &PlannerOptions,
) -> Result<DeviceDescriptor, PlannerError>
where
    O: MappingOracle + ?Sized,
{
    if model.ip_version != IpVersion::SUPPORTED {
        return Err(PlannerError::UnsupportedVersion {
            found: model.ip_version,
            supported: IpVersion::SUPPORTED,
        });
    }

    let mut model = model.clone();
    tracing::info!("sizing '{}' with oracle '{}'", model.name, oracle.name());

    // ── Bootstrap ───────────────────────────────────────────────────
    let skip_upper_bound = count_u32(model.count_layers(|t| t.uses_skip_dma()));
    let fnp_guess = count_u32(model.count_layers(|t| t == model_ir::LayerType::Dense1D));
    let cnp_tnp_guess = NPS_PER_NODE
        .saturating_mul(options.initial_num_nodes)
        .checked_sub(fnp_guess)
        .ok_or(PlannerError::InsufficientInitialNodes {
            initial_num_nodes: options.initial_num_nodes,
            num_fnp: fnp_guess,
        })?;

    let bootstrap = DeviceDescriptor::create(
        cnp_tnp_guess,
        fnp_guess,
        skip_upper_bound,
        options.include_hrc,
        options.sram_size,
        None,
    )?;
    tracing::debug!("bootstrap: {bootstrap}");
    oracle
        .map(&mut model, &bootstrap, MapMode::Minimal, true)
        .map_err(not_found)?;

    // ── Resource counting ───────────────────────────────────────────
    let needed = if options.enable_hwpr {
        let peak = pair_peak(&model)?;
        tracing::info!(
            "pair peak: {} CNP/TNP, {} FNP; searching skip DMA channels up to {skip_upper_bound}",
            peak.cnp_tnp,
            peak.fnp,
        );
        let channels = search_skip_channels(oracle, &mut model, peak, skip_upper_bound, options)?;
        ResourceCount {
            skip_dma_channels: channels,
            ..peak
        }
    } else {
        ResourceCount::of_layers(model.layers())
    };
    tracing::info!("required resources: {needed}");

    // ── Memory ──────────────────────────────────────────────────────
    let sram_size = if options.minimal_memory {
        if let Some(given) = options.sram_size {
            tracing::warn!("minimal memory requested, ignoring SRAM size {given}");
        }
        let sram = oracle
            .minimal_memory(&model)
            .map_err(|e| PlannerError::MinimalMemory(e.diagnostic))?;
        tracing::info!("minimal SRAM: {sram}");
        Some(sram)
    } else {
        options.sram_size
    };

    // ── Final check ─────────────────────────────────────────────────
    let device = DeviceDescriptor::create(
        needed.cnp_tnp,
        needed.fnp,
        needed.skip_dma_channels,
        options.include_hrc,
        sram_size,
        None,
    )?;
    oracle
        .map(&mut model, &device, MapMode::Minimal, true)
        .map_err(not_found)?;

    tracing::info!("{}", device.summary());
    Ok(device)
}

/// Element-wise peak of CNP/TNP and FNP over every layer pair.
fn pair_peak(model: &ModelGraph<Validated>) -> Result<ResourceCount, PlannerError> {
    let mut peak = ResourceCount::default();
    for pair in layer_pairs(model) {
        let pair = pair?;
        peak = peak.max(pair.resources());
    }
    Ok(ResourceCount {
        skip_dma_channels: 0,
        ..peak
    })
}

/// Smallest channel count in `1..=upper_bound` that maps, or 0 when no
/// layer can use a channel.
fn search_skip_channels<O>(
    oracle: &O,
    model: &mut ModelGraph<Validated>,
    peak: ResourceCount,
    upper_bound: u32,
    options: &PlannerOptions,
) -> Result<u32, PlannerError>
where
    O: MappingOracle + ?Sized,
{
    let mut last_failure = String::new();
    for channels in 1..=upper_bound {
        let candidate = DeviceDescriptor::create(
            peak.cnp_tnp,
            peak.fnp,
            channels,
            options.include_hrc,
            options.sram_size,
            None,
        )?;
        match oracle.map(model, &candidate, MapMode::Minimal, true) {
            Ok(()) => {
                tracing::debug!("{channels} skip DMA channels: mapped");
                return Ok(channels);
            }
            Err(e) => {
                tracing::debug!("{channels} skip DMA channels: {e}");
                last_failure = e.diagnostic;
            }
        }
    }

    if upper_bound == 0 {
        return Ok(0);
    }
    Err(PlannerError::NoFeasibleChannelCount {
        upper_bound,
        last_failure,
    })
}

fn not_found(failure: MappingFailure) -> PlannerError {
    PlannerError::DeviceNotFound {
        reason: failure.diagnostic,
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
