// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest (`model.json`) lists the layers of an accelerator model in
//! topological order. Edges are written by layer name and resolved to arena
//! ids when the manifest is turned into a [`ModelGraph`].
//!
//! # Format
//! ```json
//! {
//!   "name": "ds_cnn_kws",
//!   "ip_version": "v2",
//!   "layers": [
//!     { "name": "input", "layer_type": "InputData" },
//!     { "name": "conv_0", "layer_type": "Conv2D", "inbounds": ["input"], "units": 64 },
//!     { "name": "dense", "layer_type": "Dense1D", "inbounds": ["conv_0"], "units": 10 }
//!   ]
//! }
//! ```
//!
//! A layer may also carry a pre-computed `mapping` when the model was
//! already mapped by an external tool.

use crate::graph::Validated;
use crate::{Layer, LayerMapping, LayerParams, LayerType, ModelError, ModelGraph};
use device_model::IpVersion;
use std::collections::HashMap;
use std::path::Path;

/// Top-level model manifest, deserialized from `model.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// Hardware generation the model targets.
    #[serde(default)]
    pub ip_version: IpVersion,
    /// Layers in topological order.
    pub layers: Vec<ManifestLayer>,
}

/// A single layer entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestLayer {
    pub name: String,
    /// Layer type string (e.g., `"Conv2D"`, `"buffer_temp_conv"`).
    pub layer_type: String,
    /// Names of the layers feeding this one.
    #[serde(default)]
    pub inbounds: Vec<String>,
    #[serde(default = "default_units")]
    pub units: u32,
    #[serde(default)]
    pub input_bytes: u32,
    #[serde(default)]
    pub weight_bytes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<LayerMapping>,
}

fn default_units() -> u32 {
    1
}

impl ModelManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Builds a manifest back from a graph, keeping any mappings.
    pub fn from_graph(graph: &ModelGraph<Validated>) -> Self {
        let layers = graph
            .iter_layers()
            .map(|l| ManifestLayer {
                name: l.name.clone(),
                layer_type: l.layer_type.as_str().to_string(),
                inbounds: l
                    .inbounds
                    .iter()
                    .filter_map(|&src| graph.layer(src).map(|s| s.name.clone()))
                    .collect(),
                units: l.params.units,
                input_bytes: l.params.input_bytes,
                weight_bytes: l.params.weight_bytes,
                mapping: l.mapping.clone(),
            })
            .collect();
        Self {
            name: graph.name.clone(),
            ip_version: graph.ip_version,
            layers,
        }
    }

    /// Serialises the manifest to pretty JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one layer is defined.
    /// - All layer type strings are recognised.
    /// - No duplicate layer names.
    /// - Every inbound names a layer listed earlier.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "manifest contains no layers".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for layer in &self.layers {
            if LayerType::from_str_loose(&layer.layer_type).is_none() {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("unrecognised layer type '{}'", layer.layer_type),
                });
            }
            for inbound in &layer.inbounds {
                if !seen.contains(inbound.as_str()) {
                    return Err(ModelError::UnknownInbound {
                        layer: layer.name.clone(),
                        inbound: inbound.clone(),
                    });
                }
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "duplicate layer name".into(),
                });
            }
        }

        Ok(())
    }

    /// Validates the manifest and converts it into a validated graph.
    pub fn into_graph(self) -> Result<ModelGraph<Validated>, ModelError> {
        self.validate()?;

        let mut ids: HashMap<&str, usize> = HashMap::new();
        let mut layers = Vec::with_capacity(self.layers.len());
        for (id, entry) in self.layers.iter().enumerate() {
            // Both lookups are covered by `validate`.
            let layer_type = LayerType::from_str_loose(&entry.layer_type).ok_or_else(|| {
                ModelError::InvalidLayer {
                    layer: entry.name.clone(),
                    detail: format!("unrecognised layer type '{}'", entry.layer_type),
                }
            })?;
            let inbounds = entry
                .inbounds
                .iter()
                .map(|name| {
                    ids.get(name.as_str()).copied().ok_or_else(|| ModelError::UnknownInbound {
                        layer: entry.name.clone(),
                        inbound: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut layer = Layer::new(id, entry.name.clone(), layer_type, inbounds).with_params(
                LayerParams {
                    units: entry.units,
                    input_bytes: entry.input_bytes,
                    weight_bytes: entry.weight_bytes,
                },
            );
            layer.mapping = entry.mapping.clone();
            ids.insert(entry.name.as_str(), id);
            layers.push(layer);
        }

        ModelGraph::new(self.name.clone(), self.ip_version, layers).validate()
    }
}
