// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pass plans: how a mapped model is split into reconfiguration passes.
//!
//! A plan is a sequence of [`Pass`]es. All layers of a pass are resident on
//! the mesh at once; between passes the NPs are reprogrammed and buffered
//! data crosses over through skip DMA channels.

use crate::ResourceCount;

/// Consecutive layers programmed on the mesh together.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Pass {
    /// Index of this pass in execution order.
    pub pass_index: usize,
    /// Ids of the mapped layers in this pass.
    pub layer_ids: Vec<usize>,
    /// Resources the pass occupies.
    pub resources: ResourceCount,
}

impl Pass {
    pub fn num_layers(&self) -> usize {
        self.layer_ids.len()
    }
}

/// The passes a model was split into on a given device.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PassPlan {
    pub passes: Vec<Pass>,
    /// Element-wise peak across passes.
    pub peak: ResourceCount,
}

impl PassPlan {
    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    /// Returns `true` if the whole model runs in one pass.
    pub fn is_single_pass(&self) -> bool {
        self.passes.len() <= 1
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let sizes: Vec<usize> = self.passes.iter().map(Pass::num_layers).collect();
        format!(
            "{} passes, peak {}, layers per pass: {:?}",
            self.num_passes(),
            self.peak,
            sizes,
        )
    }
}

/// Builds a [`PassPlan`] incrementally.
#[derive(Debug, Default)]
pub(crate) struct PassBuilder {
    passes: Vec<Pass>,
    peak: ResourceCount,
}

impl PassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes a pass over `layer_ids`.
    pub fn add_pass(&mut self, layer_ids: Vec<usize>, resources: ResourceCount) {
        if layer_ids.is_empty() {
            return;
        }
        self.peak = self.peak.max(resources);
        self.passes.push(Pass {
            pass_index: self.passes.len(),
            layer_ids,
            resources,
        });
    }

    pub fn build(self) -> PassPlan {
        PassPlan {
            passes: self.passes,
            peak: self.peak,
        }
    }
}
