// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Smallest device able to host each of several already-mapped models.

use crate::{PlannerError, ResourceCount};
use device_model::{DeviceDescriptor, SramSize};
use model_ir::{graph::Validated, ModelGraph};

/// Combines the devices of `models` into one that can run any of them.
///
/// Every model must already be mapped (e.g. by
/// [`crate::compute_min_device`] and a final oracle call) and all devices
/// must share a hardware version. No oracle is consulted: resource counts
/// come from the models' current mappings, SRAM sizes from their devices.
pub fn compute_common_device(
    models: &[ModelGraph<Validated>],
) -> Result<DeviceDescriptor, PlannerError> {
    let first = models.first().ok_or(PlannerError::EmptyInput)?;
    let version = first
        .device()
        .ok_or_else(|| PlannerError::UnmappedModel {
            model: first.name.clone(),
        })?
        .version;

    let mut needed = ResourceCount::default();
    let mut include_hrc = false;
    let mut sram_size = SramSize::ZERO;

    for model in models {
        let device = model.device().ok_or_else(|| PlannerError::UnmappedModel {
            model: model.name.clone(),
        })?;
        if device.version != version {
            return Err(PlannerError::VersionMismatch {
                model: model.name.clone(),
                expected: version,
                found: device.version,
            });
        }

        let count = ResourceCount::of_layers(model.layers());
        tracing::debug!("'{}' uses {count}", model.name);
        needed = needed.max(count);
        include_hrc |= device.include_hrc;
        sram_size = sram_size.max(device.sram_size);
    }

    let device = DeviceDescriptor::create(
        needed.cnp_tnp,
        needed.fnp,
        needed.skip_dma_channels,
        include_hrc,
        Some(sram_size),
        Some(version),
    )?;
    tracing::info!("common device for {} models: {}", models.len(), device.summary());
    Ok(device)
}
