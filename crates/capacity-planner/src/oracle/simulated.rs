// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Deterministic software mapping oracle.
//!
//! Places each layer on NPs by a fixed rule, then checks the result against
//! the device: every NP must fit its SRAM, every layer must fit the mesh on
//! its own, and layers are packed greedily into reconfiguration passes.
//!
//! # Placement rules
//!
//! ```text
//! InputData, Dequantizer       → host (no mapping)
//! InputConv2D, Stem            → HRC (empty mapping)
//! convolutions                 → ceil(units / 64)  × CNP1 (CNP2 if depthwise)
//! Dense1D                      → ceil(units / 128) × FNP2
//! Add, Concatenate (k inputs)  → (k - 1) × SKIP_DMA_STORE + (k - 1) × SKIP_DMA_LOAD
//! buffered temporal conv       → ceil(units / 64)  × TNP_B + 1 store + 1 load
//! ```
//!
//! Each NP carries `ceil(bytes / n)` of its layer's input and weight bytes.
//!
//! # Pass model
//!
//! Within a pass every layer is resident, so its resources add up. A layer
//! that would push the pass over the device limit opens the next pass:
//!
//! ```text
//! pass_use + layer_use <= device  →  extend pass
//! otherwise                       →  close pass, start new one
//! ```
//!
//! A dense layer wider than the device's FNPs is sliced: its neurons run
//! over several consecutive passes, each using every FNP. Any other layer
//! that does not fit the device on its own fails the mapping.

use crate::oracle::passes::{PassBuilder, PassPlan};
use crate::oracle::{MapMode, MappingFailure, MappingOracle};
use crate::ResourceCount;
use device_model::{DeviceDescriptor, SramSize};
use model_ir::{graph::Validated, Layer, LayerMapping, LayerType, ModelGraph, NpPlacement, NpType};

/// Filters a single CNP or TNP computes.
pub const FILTERS_PER_CNP: u32 = 64;

/// Neurons a single FNP computes.
pub const NEURONS_PER_FNP: u32 = 128;

/// Granularity of [`MappingOracle::minimal_memory`] results.
const SRAM_GRANULE: u32 = 1024;

/// Rule-based oracle standing in for a physical placer.
#[derive(Debug, Clone, Default)]
pub struct SimulatedMesh;

impl SimulatedMesh {
    pub fn new() -> Self {
        Self
    }

    /// Placement of one layer, or `None` if it runs on the host.
    fn place_layer(
        &self,
        layer: &Layer,
        device: &DeviceDescriptor,
        hw_only: bool,
    ) -> Result<Option<LayerMapping>, MappingFailure> {
        let units = layer.params.units.max(1);
        let mapping = match layer.layer_type {
            LayerType::InputData | LayerType::Dequantizer => return Ok(None),
            LayerType::InputConv2D | LayerType::Stem => {
                if device.include_hrc {
                    LayerMapping::default()
                } else if hw_only {
                    return Err(MappingFailure::new(format!(
                        "layer '{}' ({}) requires the HRC, which the device does not include",
                        layer.name, layer.layer_type,
                    )));
                } else {
                    return Ok(None);
                }
            }
            LayerType::Dense1D => {
                self.split(layer, NpType::Fnp2, units.div_ceil(NEURONS_PER_FNP), &[])
            }
            LayerType::Add | LayerType::Concatenate => {
                let k = layer.inbounds.len().saturating_sub(1);
                let mut nps = vec![NpPlacement::new(NpType::SkipDmaStore); k];
                nps.extend(vec![NpPlacement::new(NpType::SkipDmaLoad); k]);
                LayerMapping::new(nps)
            }
            LayerType::BufferTempConv | LayerType::DepthwiseBufferTempConv => self.split(
                layer,
                NpType::TnpB,
                units.div_ceil(FILTERS_PER_CNP),
                &[NpType::SkipDmaStore, NpType::SkipDmaLoad],
            ),
            t if t.is_depthwise() => {
                self.split(layer, NpType::Cnp2, units.div_ceil(FILTERS_PER_CNP), &[])
            }
            _ => self.split(layer, NpType::Cnp1, units.div_ceil(FILTERS_PER_CNP), &[]),
        };
        Ok(Some(mapping))
    }

    /// Spreads `layer` over `n` NPs of `np_type`, followed by `extra`
    /// memory-less placements.
    fn split(&self, layer: &Layer, np_type: NpType, n: u32, extra: &[NpType]) -> LayerMapping {
        let input = layer.params.input_bytes.div_ceil(n);
        let weight = layer.params.weight_bytes.div_ceil(n);
        let mut nps: Vec<NpPlacement> = (0..n)
            .map(|_| NpPlacement::with_memory(np_type, input, weight))
            .collect();
        nps.extend(extra.iter().copied().map(NpPlacement::new));
        LayerMapping::new(nps)
    }

    /// Placement of every layer, in id order.
    fn place_all(
        &self,
        model: &ModelGraph<Validated>,
        device: &DeviceDescriptor,
        hw_only: bool,
    ) -> Result<Vec<Option<LayerMapping>>, MappingFailure> {
        let mut placements = Vec::with_capacity(model.num_layers());
        for layer in model.iter_layers() {
            let placement = self.place_layer(layer, device, hw_only)?;
            if let Some(mapping) = &placement {
                check_sram(layer, mapping, &device.sram_size)?;
            }
            placements.push(placement);
        }
        Ok(placements)
    }

    /// Splits the model into passes on `device` without modifying it.
    pub fn plan_passes(
        &self,
        model: &ModelGraph<Validated>,
        device: &DeviceDescriptor,
    ) -> Result<PassPlan, MappingFailure> {
        let placements = self.place_all(model, device, false)?;
        pack_passes(model, &placements, device)
    }
}

/// Fails if any NP of `mapping` overflows `sram`.
fn check_sram(layer: &Layer, mapping: &LayerMapping, sram: &SramSize) -> Result<(), MappingFailure> {
    match mapping
        .nps
        .iter()
        .find(|np| !sram.fits(np.input_bytes, np.weight_bytes))
    {
        Some(np) => Err(MappingFailure::new(format!(
            "layer '{}' needs {} input / {} weight bytes on a {} NP, device SRAM is {}",
            layer.name, np.input_bytes, np.weight_bytes, np.np_type, sram,
        ))),
        None => Ok(()),
    }
}

fn device_limit(device: &DeviceDescriptor) -> ResourceCount {
    ResourceCount {
        cnp_tnp: device.num_cnp_tnp,
        fnp: device.num_fnp,
        skip_dma_channels: device.num_skip_dma_channels,
    }
}

/// Whether a layer over the FNP limit can be sliced across passes: it must
/// fit every other limit and the device must have at least one FNP.
fn spans_fnp_passes(need: ResourceCount, limit: ResourceCount) -> bool {
    limit.fnp > 0
        && ResourceCount {
            fnp: 0,
            ..need
        }
        .fits_within(&limit)
}

/// Greedy pass packing in topological order.
fn pack_passes(
    model: &ModelGraph<Validated>,
    placements: &[Option<LayerMapping>],
    device: &DeviceDescriptor,
) -> Result<PassPlan, MappingFailure> {
    let limit = device_limit(device);
    let mut builder = PassBuilder::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = ResourceCount::default();

    for (layer, placement) in model.iter_layers().zip(placements) {
        let Some(mapping) = placement else { continue };
        let need = ResourceCount::of_mapping(mapping);

        if !need.fits_within(&limit) {
            if !spans_fnp_passes(need, limit) {
                return Err(MappingFailure::new(format!(
                    "layer '{}' needs {need}, device offers {limit}",
                    layer.name,
                )));
            }
            // Neuron slices run back to back, each on every FNP.
            builder.add_pass(std::mem::take(&mut current), used);
            let mut remaining = need.fnp;
            while remaining > limit.fnp {
                let slice = ResourceCount {
                    fnp: limit.fnp,
                    ..need
                };
                builder.add_pass(vec![layer.id], slice);
                remaining -= limit.fnp;
            }
            used = ResourceCount {
                fnp: remaining,
                ..need
            };
            current.push(layer.id);
            continue;
        }

        let candidate = used.add(need);
        if candidate.fits_within(&limit) {
            used = candidate;
        } else {
            builder.add_pass(std::mem::take(&mut current), used);
            used = need;
        }
        current.push(layer.id);
    }
    builder.add_pass(current, used);

    Ok(builder.build())
}

impl MappingOracle for SimulatedMesh {
    fn name(&self) -> &str {
        "simulated-mesh"
    }

    fn map(
        &self,
        model: &mut ModelGraph<Validated>,
        device: &DeviceDescriptor,
        mode: MapMode,
        hw_only: bool,
    ) -> Result<(), MappingFailure> {
        // Every NP is already used at its full width, so both modes place
        // identically here.
        tracing::debug!(
            "mapping '{}' ({:?}, hw_only={hw_only}) on {device}",
            model.name,
            mode,
        );

        let placements = self.place_all(model, device, hw_only)?;
        let plan = pack_passes(model, &placements, device)?;
        tracing::debug!("{}", plan.summary());

        for (id, placement) in placements.into_iter().enumerate() {
            model.set_mapping(id, placement);
        }
        model.set_device(Some(device.clone()));
        Ok(())
    }

    fn minimal_memory(&self, model: &ModelGraph<Validated>) -> Result<SramSize, MappingFailure> {
        if !model.is_mapped() {
            return Err(MappingFailure::new(format!(
                "model '{}' has not been mapped",
                model.name
            )));
        }

        let peak = model
            .iter_layers()
            .filter_map(|l| l.mapping.as_ref())
            .flat_map(|m| m.nps.iter())
            .fold(SramSize::ZERO, |acc, np| {
                acc.max(SramSize::new(np.input_bytes, np.weight_bytes))
            });

        Ok(SramSize::new(round_up(peak.input_bytes), round_up(peak.weight_bytes)))
    }
}

/// Rounds up to the next whole granule, never below one.
fn round_up(bytes: u32) -> u32 {
    bytes
        .div_ceil(SRAM_GRANULE)
        .max(1)
        .saturating_mul(SRAM_GRANULE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_model::IpVersion;
    use model_ir::LayerParams;

    fn params(units: u32, input_bytes: u32, weight_bytes: u32) -> LayerParams {
        LayerParams {
            units,
            input_bytes,
            weight_bytes,
        }
    }

    fn layer(id: usize, name: &str, t: LayerType, inbounds: &[usize], units: u32) -> Layer {
        Layer::new(id, name, t, inbounds.to_vec()).with_params(params(units, 1024, 2048))
    }

    fn graph(layers: Vec<Layer>) -> ModelGraph<Validated> {
        ModelGraph::new("sim", IpVersion::V2, layers).validate().unwrap()
    }

    fn device(cnp: u32, fnp: u32, skip: u32) -> DeviceDescriptor {
        DeviceDescriptor::create(cnp, fnp, skip, true, None, None).unwrap()
    }

    /// input → conv(128) → conv(64) ─┬─ add → dense(200)
    ///                  └────────────┘
    fn residual() -> ModelGraph<Validated> {
        graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            layer(1, "conv_0", LayerType::Conv2D, &[0], 128),
            layer(2, "conv_1", LayerType::Conv2D, &[1], 64),
            layer(3, "add", LayerType::Add, &[1, 2], 1),
            layer(4, "dense", LayerType::Dense1D, &[3], 200),
        ])
    }

    #[test]
    fn test_placement_rules() {
        let mut g = residual();
        SimulatedMesh::new()
            .map(&mut g, &device(8, 2, 1), MapMode::Minimal, true)
            .unwrap();

        assert!(g.layer(0).unwrap().mapping.is_none());
        let conv0 = g.layer(1).unwrap().mapping.as_ref().unwrap();
        assert_eq!(conv0.count(NpType::Cnp1), 2);
        assert_eq!(conv0.nps[0].input_bytes, 512);
        assert_eq!(conv0.nps[0].weight_bytes, 1024);
        let add = g.layer(3).unwrap().mapping.as_ref().unwrap();
        assert_eq!(add.count(NpType::SkipDmaStore), 1);
        assert_eq!(add.count(NpType::SkipDmaLoad), 1);
        let dense = g.layer(4).unwrap().mapping.as_ref().unwrap();
        assert_eq!(dense.count(NpType::Fnp2), 2);
        assert_eq!(g.device(), Some(&device(8, 2, 1)));
    }

    #[test]
    fn test_depthwise_and_temporal() {
        let mut g = graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            layer(1, "dw", LayerType::DepthwiseConv2D, &[0], 65),
            layer(2, "btc", LayerType::BufferTempConv, &[1], 64),
        ]);
        SimulatedMesh::new()
            .map(&mut g, &device(4, 0, 1), MapMode::Minimal, true)
            .unwrap();

        let dw = g.layer(1).unwrap().mapping.as_ref().unwrap();
        assert_eq!(dw.count(NpType::Cnp2), 2);
        let btc = g.layer(2).unwrap().mapping.as_ref().unwrap();
        assert_eq!(btc.count(NpType::TnpB), 1);
        assert_eq!(btc.count(NpType::SkipDmaStore), 1);
        assert_eq!(btc.count(NpType::SkipDmaLoad), 1);
    }

    #[test]
    fn test_hrc_layers() {
        let layers = || {
            vec![
                layer(0, "input", LayerType::InputConv2D, &[], 32),
                layer(1, "conv", LayerType::Conv2D, &[0], 32),
            ]
        };
        let no_hrc = DeviceDescriptor::create(2, 0, 0, false, None, None).unwrap();

        let mut g = graph(layers());
        let err = SimulatedMesh::new()
            .map(&mut g, &no_hrc, MapMode::Minimal, true)
            .unwrap_err();
        assert!(err.diagnostic.contains("HRC"));
        assert!(!g.is_mapped());

        SimulatedMesh::new()
            .map(&mut g, &no_hrc, MapMode::Minimal, false)
            .unwrap();
        assert!(g.layer(0).unwrap().mapping.is_none());

        SimulatedMesh::new()
            .map(&mut g, &device(2, 0, 0), MapMode::Minimal, true)
            .unwrap();
        assert!(g.layer(0).unwrap().mapping.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_layer_too_large_for_device() {
        let mut g = residual();
        let err = SimulatedMesh::new()
            .map(&mut g, &device(1, 2, 1), MapMode::Minimal, true)
            .unwrap_err();
        assert!(err.diagnostic.contains("conv_0"));
        assert!(!g.is_mapped());
        assert!(g.layer(1).unwrap().mapping.is_none());
    }

    #[test]
    fn test_missing_skip_channel_fails() {
        let mut g = residual();
        let result = SimulatedMesh::new().map(&mut g, &device(8, 2, 0), MapMode::Minimal, true);
        assert!(result.is_err());
    }

    #[test]
    fn test_sram_overflow_fails() {
        let mut g = graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            Layer::new(1, "big", LayerType::Conv2D, vec![0]).with_params(params(64, 1024, 1 << 20)),
        ]);
        let err = SimulatedMesh::new()
            .map(&mut g, &device(4, 0, 0), MapMode::Minimal, true)
            .unwrap_err();
        assert!(err.diagnostic.contains("big"));
    }

    #[test]
    fn test_passes_pack_greedily() {
        let g = graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            layer(1, "c1", LayerType::Conv2D, &[0], 128),
            layer(2, "c2", LayerType::Conv2D, &[1], 64),
            layer(3, "c3", LayerType::Conv2D, &[2], 128),
        ]);
        let mesh = SimulatedMesh::new();

        let single = mesh.plan_passes(&g, &device(5, 0, 0)).unwrap();
        assert!(single.is_single_pass());
        assert_eq!(single.peak.cnp_tnp, 5);

        let split = mesh.plan_passes(&g, &device(3, 0, 0)).unwrap();
        assert_eq!(split.num_passes(), 2);
        assert_eq!(split.passes[0].layer_ids, vec![1, 2]);
        assert_eq!(split.passes[1].layer_ids, vec![3]);
        assert_eq!(split.peak.cnp_tnp, 3);
    }

    #[test]
    fn test_wide_dense_spans_passes() {
        // 300 neurons on 3 FNPs, device has 1.
        let mut g = graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            layer(1, "conv", LayerType::Conv2D, &[0], 64),
            layer(2, "fc", LayerType::Dense1D, &[1], 300),
            layer(3, "out", LayerType::Conv2D, &[2], 64),
        ]);
        let mesh = SimulatedMesh::new();
        let dev = device(4, 1, 0);

        let plan = mesh.plan_passes(&g, &dev).unwrap();
        assert_eq!(plan.num_passes(), 4);
        assert_eq!(plan.passes[0].layer_ids, vec![1]);
        assert_eq!(plan.passes[1].layer_ids, vec![2]);
        assert_eq!(plan.passes[2].layer_ids, vec![2]);
        assert_eq!(plan.passes[3].layer_ids, vec![2, 3]);
        assert_eq!(plan.peak.fnp, 1);
        assert_eq!(plan.peak.cnp_tnp, 1);

        mesh.map(&mut g, &dev, MapMode::Minimal, true).unwrap();
        let fc = g.layer(2).unwrap().mapping.as_ref().unwrap();
        assert_eq!(fc.count(NpType::Fnp2), 3);
    }

    #[test]
    fn test_wide_dense_needs_an_fnp() {
        let mut g = graph(vec![
            layer(0, "input", LayerType::InputData, &[], 1),
            layer(1, "fc", LayerType::Dense1D, &[0], 300),
        ]);
        let err = SimulatedMesh::new()
            .map(&mut g, &device(4, 0, 0), MapMode::Minimal, true)
            .unwrap_err();
        assert!(err.diagnostic.contains("fc"));
    }

    #[test]
    fn test_minimal_memory() {
        let mesh = SimulatedMesh::new();
        let mut g = residual();
        assert!(mesh.minimal_memory(&g).is_err());

        mesh.map(&mut g, &device(8, 2, 1), MapMode::Minimal, true)
            .unwrap();
        let sram = mesh.minimal_memory(&g).unwrap();
        assert_eq!(sram, SramSize::new(1024, 2048));

        let tight = DeviceDescriptor::create(8, 2, 1, true, Some(sram), None).unwrap();
        mesh.map(&mut g, &tight, MapMode::Minimal, true).unwrap();
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0), 1024);
        assert_eq!(round_up(1), 1024);
        assert_eq!(round_up(1024), 1024);
        assert_eq!(round_up(1025), 2048);
    }
}
