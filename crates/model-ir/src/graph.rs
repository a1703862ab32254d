// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: an accelerator model as a DAG of layers.
//!
//! Layers live in an arena (`Vec<Layer>`) indexed by their id. Edges are
//! stored only as inbound id lists; outbounds are derived on demand by a
//! reverse scan, so no layer ever owns another.
//!
//! # Type-State Pattern
//!
//! ```text
//! ModelGraph<Loaded>     — layers parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  — acyclic, single terminal, ready for planning.
//! ```
//!
//! Only a `ModelGraph<Validated>` can be mapped or sized. Mapping results
//! and the assigned device may change after validation; the topology may not.

use crate::{Layer, LayerMapping, LayerType, ModelError};
use device_model::{DeviceDescriptor, IpVersion};
use std::collections::HashSet;
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and is ready for planning.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The complete model: a layer arena, its hardware version and, once
/// mapped, the device it was mapped on.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable model name.
    pub name: String,
    /// Hardware generation the model was compiled for.
    pub ip_version: IpVersion,
    layers: Vec<Layer>,
    device: Option<DeviceDescriptor>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: impl Into<String>, ip_version: IpVersion, layers: Vec<Layer>) -> Self {
        Self {
            name: name.into(),
            ip_version,
            layers,
            device: None,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty.
    /// - Layer ids are consecutive starting from 0.
    /// - Layer names are unique.
    /// - Every inbound refers to an earlier layer (so the graph is acyclic).
    /// - Input layers have no inbounds.
    /// - Exactly one layer has no outbound.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "model graph contains no layers".into(),
            ));
        }

        let mut names = HashSet::new();
        let mut has_outbound = vec![false; self.layers.len()];
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.id != i {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("expected id {i}, got {}", layer.id),
                });
            }
            if !names.insert(layer.name.as_str()) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "duplicate layer name".into(),
                });
            }
            if layer.is_input() && !layer.inbounds.is_empty() {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "input layers cannot have inbounds".into(),
                });
            }
            for &src in &layer.inbounds {
                if src >= i {
                    return Err(ModelError::InvalidLayer {
                        layer: layer.name.clone(),
                        detail: format!("inbound {src} does not precede layer {i}"),
                    });
                }
                has_outbound[src] = true;
            }
        }

        let terminals: Vec<&str> = self
            .layers
            .iter()
            .filter(|l| !has_outbound[l.id])
            .map(|l| l.name.as_str())
            .collect();
        if terminals.len() != 1 {
            return Err(ModelError::InvalidGraph(format!(
                "expected exactly one output layer, found {}: {:?}",
                terminals.len(),
                terminals,
            )));
        }

        Ok(ModelGraph {
            name: self.name,
            ip_version: self.ip_version,
            layers: self.layers,
            device: self.device,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns a reference to a layer by id.
    pub fn layer(&self, id: usize) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Returns an iterator over the layers in arena (topological) order.
    pub fn iter_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// All layers as a slice, indexable by id.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Looks a layer up by name.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// The single layer without outbounds.
    pub fn terminal(&self) -> &Layer {
        // Validation guarantees the last layer is the only terminal one.
        &self.layers[self.layers.len() - 1]
    }

    /// Ids of the layers consuming `id`'s output.
    pub fn outbounds(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.layers
            .iter()
            .filter(move |l| l.inbounds.contains(&id))
            .map(|l| l.id)
    }

    /// Number of layers consuming `id`'s output.
    pub fn num_outbounds(&self, id: usize) -> usize {
        self.outbounds(id).count()
    }

    /// Counts layers whose type satisfies `pred`.
    pub fn count_layers(&self, pred: impl Fn(LayerType) -> bool) -> usize {
        self.layers.iter().filter(|l| pred(l.layer_type)).count()
    }

    /// The device this model was last mapped on, if any.
    pub fn device(&self) -> Option<&DeviceDescriptor> {
        self.device.as_ref()
    }

    /// Returns `true` once an oracle has assigned a device.
    pub fn is_mapped(&self) -> bool {
        self.device.is_some()
    }

    /// Replaces the placement result of one layer.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn set_mapping(&mut self, id: usize, mapping: Option<LayerMapping>) {
        self.layers[id].mapping = mapping;
    }

    /// Records the device the model is now mapped on.
    pub fn set_device(&mut self, device: Option<DeviceDescriptor>) {
        self.device = device;
    }

    /// Drops all placement results and the device assignment.
    pub fn clear_mapping(&mut self) {
        for layer in &mut self.layers {
            layer.mapping = None;
        }
        self.device = None;
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let mapped = self.layers.iter().filter(|l| l.is_mapped()).count();
        format!(
            "Model '{}' ({}): {} layers, {} mapped, output '{}'",
            self.name,
            self.ip_version,
            self.num_layers(),
            mapped,
            self.terminal().name,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelGraph '{}' ({} layers):", self.name, self.layers.len())?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Input → Conv → Conv → ... chain of `n` layers.
    fn make_chain(n: usize) -> Vec<Layer> {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Layer::new(0, "input", LayerType::InputData, vec![])
                } else {
                    Layer::new(i, format!("conv.{i}"), LayerType::Conv2D, vec![i - 1])
                }
            })
            .collect()
    }

    fn validated(layers: Vec<Layer>) -> ModelGraph<Validated> {
        ModelGraph::new("test", IpVersion::V2, layers).validate().unwrap()
    }

    #[test]
    fn test_validate_ok() {
        let graph = validated(make_chain(4));
        assert_eq!(graph.num_layers(), 4);
        assert_eq!(graph.terminal().name, "conv.3");
    }

    #[test]
    fn test_validate_empty() {
        let graph = ModelGraph::new("empty", IpVersion::V2, vec![]);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_bad_id() {
        let mut layers = make_chain(3);
        layers[1].id = 5;
        assert!(ModelGraph::new("bad", IpVersion::V2, layers).validate().is_err());
    }

    #[test]
    fn test_validate_forward_edge() {
        let mut layers = make_chain(3);
        layers[1].inbounds = vec![2];
        let err = ModelGraph::new("cycle", IpVersion::V2, layers)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidLayer { .. }));
    }

    #[test]
    fn test_validate_two_outputs() {
        let mut layers = make_chain(3);
        layers.push(Layer::new(3, "head.b", LayerType::Dense1D, vec![1]));
        let err = ModelGraph::new("fork", IpVersion::V2, layers)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidGraph(_)));
    }

    #[test]
    fn test_validate_duplicate_name() {
        let mut layers = make_chain(3);
        layers[2].name = "conv.1".into();
        assert!(ModelGraph::new("dup", IpVersion::V2, layers).validate().is_err());
    }

    #[test]
    fn test_outbounds() {
        let mut layers = make_chain(3);
        layers.push(Layer::new(3, "add", LayerType::Add, vec![1, 2]));
        let graph = validated(layers);
        let outs: Vec<usize> = graph.outbounds(1).collect();
        assert_eq!(outs, vec![2, 3]);
        assert_eq!(graph.num_outbounds(2), 1);
        assert_eq!(graph.num_outbounds(3), 0);
        assert_eq!(graph.count_layers(|t| t.is_merge()), 1);
    }

    #[test]
    fn test_mapping_state() {
        let mut graph = validated(make_chain(2));
        assert!(!graph.is_mapped());
        graph.set_mapping(1, Some(LayerMapping::default()));
        assert!(graph.layer(1).unwrap().is_mapped());
        graph.clear_mapping();
        assert!(!graph.layer(1).unwrap().is_mapped());
    }

    #[test]
    fn test_summary_and_display() {
        let graph = validated(make_chain(3));
        let s = graph.summary();
        assert!(s.contains("3 layers"));
        assert!(s.contains("v2"));
        let display = format!("{graph}");
        assert!(display.contains("conv.1"));
        assert!(display.contains("conv.2"));
    }

    #[test]
    fn test_layer_by_name() {
        let graph = validated(make_chain(3));
        assert_eq!(graph.layer_by_name("conv.2").unwrap().id, 2);
        assert!(graph.layer_by_name("missing").is_none());
    }
}
