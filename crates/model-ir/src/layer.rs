// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the accelerator model IR.
//!
//! Each [`Layer`] is a node of the model DAG: its type, its inbound edges
//! (indices of earlier layers in the arena, never owning references), the
//! sizing parameters an oracle needs, and the oracle's placement result once
//! the model has been mapped.

use crate::LayerMapping;

/// The kind of computation a layer performs on the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    /// Model input; fed by the host, never placed on an NP.
    InputData,
    /// Input convolution handled by the capture unit.
    InputConv2D,
    /// Patch-embedding stem handled by the capture unit.
    Stem,
    Conv2D,
    Conv2DTranspose,
    DepthwiseConv2D,
    DepthwiseConv2DTranspose,
    /// Fully-connected layer.
    Dense1D,
    /// Elementwise merge of several branches.
    Add,
    /// Channel concatenation of several branches.
    Concatenate,
    /// Temporal convolution over a FIFO of past frames.
    BufferTempConv,
    /// Depthwise temporal convolution over a FIFO of past frames.
    DepthwiseBufferTempConv,
    /// Output conversion to floating point, executed on the host.
    Dequantizer,
}

impl LayerType {
    /// Parses a layer type from a manifest string.
    ///
    /// Accepts snake_case names as well as the CamelCase names used by the
    /// vendor toolchain (`"Dense1D"`, `"BufferTempConv"`) and a few aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "inputdata" | "input" => Some(Self::InputData),
            "inputconv2d" | "inputconv" => Some(Self::InputConv2D),
            "stem" => Some(Self::Stem),
            "conv2d" | "conv" => Some(Self::Conv2D),
            "conv2dtranspose" => Some(Self::Conv2DTranspose),
            "depthwiseconv2d" | "dwconv" => Some(Self::DepthwiseConv2D),
            "depthwiseconv2dtranspose" => Some(Self::DepthwiseConv2DTranspose),
            "dense1d" | "dense" | "fc" => Some(Self::Dense1D),
            "add" => Some(Self::Add),
            "concatenate" | "concat" => Some(Self::Concatenate),
            "buffertempconv" | "btc" => Some(Self::BufferTempConv),
            "depthwisebuffertempconv" | "dwbtc" => Some(Self::DepthwiseBufferTempConv),
            "dequantizer" => Some(Self::Dequantizer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputData => "input_data",
            Self::InputConv2D => "input_conv2d",
            Self::Stem => "stem",
            Self::Conv2D => "conv2d",
            Self::Conv2DTranspose => "conv2d_transpose",
            Self::DepthwiseConv2D => "depthwise_conv2d",
            Self::DepthwiseConv2DTranspose => "depthwise_conv2d_transpose",
            Self::Dense1D => "dense1d",
            Self::Add => "add",
            Self::Concatenate => "concatenate",
            Self::BufferTempConv => "buffer_temp_conv",
            Self::DepthwiseBufferTempConv => "depthwise_buffer_temp_conv",
            Self::Dequantizer => "dequantizer",
        }
    }

    /// Elementwise-merge and concatenation layers.
    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Add | Self::Concatenate)
    }

    /// Buffered temporal convolutions.
    pub fn is_buffered_temporal(&self) -> bool {
        matches!(self, Self::BufferTempConv | Self::DepthwiseBufferTempConv)
    }

    /// Layers that may need a skip DMA channel once mapped.
    pub fn uses_skip_dma(&self) -> bool {
        self.is_merge() || self.is_buffered_temporal()
    }

    /// Convolution layers placed on CNPs.
    pub fn is_convolution(&self) -> bool {
        matches!(
            self,
            Self::Conv2D
                | Self::Conv2DTranspose
                | Self::DepthwiseConv2D
                | Self::DepthwiseConv2DTranspose
        )
    }

    pub fn is_depthwise(&self) -> bool {
        matches!(
            self,
            Self::DepthwiseConv2D | Self::DepthwiseConv2DTranspose | Self::DepthwiseBufferTempConv
        )
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing parameters consumed by a mapping oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerParams {
    /// Output filters (convolutions) or neurons (dense).
    pub units: u32,
    /// Input activation bytes the layer buffers.
    pub input_bytes: u32,
    /// Weight bytes the layer stores.
    pub weight_bytes: u32,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            units: 1,
            input_bytes: 0,
            weight_bytes: 0,
        }
    }
}

/// A single node of the model DAG.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Position in the graph arena; inbound edges refer to this.
    pub id: usize,
    /// Unique layer name.
    pub name: String,
    pub layer_type: LayerType,
    /// Ids of the layers feeding this one, in order.
    pub inbounds: Vec<usize>,
    #[serde(default)]
    pub params: LayerParams,
    /// Placement result; `None` until an oracle maps the layer.
    #[serde(default)]
    pub mapping: Option<LayerMapping>,
}

impl Layer {
    /// Creates an unmapped layer with default parameters.
    pub fn new(id: usize, name: impl Into<String>, layer_type: LayerType, inbounds: Vec<usize>) -> Self {
        Self {
            id,
            name: name.into(),
            layer_type,
            inbounds,
            params: LayerParams::default(),
            mapping: None,
        }
    }

    pub fn with_params(mut self, params: LayerParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_mapping(mut self, mapping: LayerMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn is_input(&self) -> bool {
        self.layer_type == LayerType::InputData
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        let nps = self.mapping.as_ref().map_or_else(
            || "unmapped".to_string(),
            |m| format!("{} NPs", m.nps.len()),
        );
        format!(
            "[{}] {} ({}) <- {:?}, {} units, {nps}",
            self.id, self.name, self.layer_type, self.inbounds, self.params.units,
        )
    }
}
