// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the capacity planner.

use device_model::{DeviceError, IpVersion};

/// Errors that can occur while sizing devices.
///
/// Every variant is terminal: the planner never returns a partially sized
/// device.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// The model targets a hardware generation the planner cannot size.
    #[error("only {supported} models are supported, current model version is {found}")]
    UnsupportedVersion {
        found: IpVersion,
        supported: IpVersion,
    },

    /// The initial node count cannot even hold the dense layers.
    #[error(
        "impossible to compute base device: {initial_num_nodes} initial nodes \
         cannot host {num_fnp} FNPs"
    )]
    InsufficientInitialNodes {
        initial_num_nodes: u32,
        num_fnp: u32,
    },

    /// A layer has several inbound branches and none (or more than one) is empty.
    #[error("layer '{layer}' has multiple inbounds, but {empty_branches} of them are empty branches (expected exactly 1)")]
    UnsupportedTopology {
        layer: String,
        empty_branches: usize,
    },

    /// No skip DMA channel count up to the upper bound let the model map.
    #[error("no skip DMA channel count in 1..={upper_bound} maps the model; last failure: {last_failure}")]
    NoFeasibleChannelCount {
        upper_bound: u32,
        last_failure: String,
    },

    /// The final sanity mapping failed.
    #[error("it was not possible to find a device for this model. Reason:\n{reason}")]
    DeviceNotFound { reason: String },

    /// The common-device aggregator received no model.
    #[error("the list of models cannot be empty")]
    EmptyInput,

    /// A model passed to the aggregator was never mapped on a device.
    #[error("model '{model}' is not mapped on a device")]
    UnmappedModel { model: String },

    /// Models passed to the aggregator were mapped on different generations.
    #[error("model devices have different versions: expected {expected}, '{model}' uses {found}")]
    VersionMismatch {
        model: String,
        expected: IpVersion,
        found: IpVersion,
    },

    /// The oracle could not report minimal memory for the model.
    #[error("minimal memory query failed: {0}")]
    MinimalMemory(String),

    /// A device could not be constructed from the computed quantities.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
