// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer-pair sequencing for pass-aware accounting.
//!
//! Under partial reconfiguration the mesh is reused pass after pass, but a
//! layer and its producer must be resident at the same time. The sequencer
//! walks the graph backward from the output layer and yields every such
//! `(predecessor, successor)` pair.
//!
//! # Branch resolution
//!
//! ```text
//!  input ── conv_0 ──┬── conv_1 ──┐
//!                    └────────────┴── add ── dense
//! ```
//!
//! - Merge layers (`add`) are executed by the consuming NP, so when a layer's
//!   only inbound is itself a merge point, the merge's inbounds are used.
//! - With several candidate inbounds, exactly one must be the *empty*
//!   branch: its source has a single consumer (`conv_1` above, whereas
//!   `conv_0` also feeds the skip connection). Anything else is rejected.
//!
//! A pair is yielded only when the successor is mapped and the predecessor
//! is either an input layer or mapped; the walk then continues from the
//! predecessor.

use crate::{PlannerError, ResourceCount};
use model_ir::{graph::Validated, Layer, ModelGraph};
use std::collections::VecDeque;

/// Two layers that must coexist in one pass.
#[derive(Debug, Clone, Copy)]
pub struct LayerPair<'a> {
    pub predecessor: &'a Layer,
    pub successor: &'a Layer,
}

impl<'a> LayerPair<'a> {
    /// Both layers, producer first.
    pub fn layers(&self) -> [&'a Layer; 2] {
        [self.predecessor, self.successor]
    }

    /// Resources the pair needs while resident together.
    pub fn resources(&self) -> ResourceCount {
        ResourceCount::of_layers(self.layers())
    }
}

/// Lazy iterator over the [`LayerPair`]s of a graph.
///
/// Yields `Err(UnsupportedTopology)` once and then stops if a branch cannot
/// be resolved.
#[derive(Debug, Clone)]
pub struct LayerPairs<'a> {
    graph: &'a ModelGraph<Validated>,
    queue: VecDeque<usize>,
    failed: bool,
}

/// Starts a fresh backward walk from the graph's output layer.
pub fn layer_pairs(graph: &ModelGraph<Validated>) -> LayerPairs<'_> {
    LayerPairs {
        graph,
        queue: VecDeque::from([graph.terminal().id]),
        failed: false,
    }
}

impl<'a> LayerPairs<'a> {
    /// Picks the layer that feeds `layer` within a pass, if any.
    fn resolve_predecessor(&self, layer: &'a Layer) -> Result<Option<&'a Layer>, PlannerError> {
        let layers: &'a [Layer] = self.graph.layers();
        let mut inbounds: &'a [usize] = &layer.inbounds;

        if let [only] = inbounds {
            let merge = &layers[*only];
            if merge.inbounds.len() > 1 {
                inbounds = &merge.inbounds;
            }
        }

        match inbounds {
            [] => Ok(None),
            [only] => Ok(Some(&layers[*only])),
            branches => {
                let empty: Vec<usize> = branches
                    .iter()
                    .copied()
                    .filter(|&id| self.graph.num_outbounds(id) == 1)
                    .collect();
                match empty.as_slice() {
                    [chosen] => Ok(Some(&layers[*chosen])),
                    _ => Err(PlannerError::UnsupportedTopology {
                        layer: layer.name.clone(),
                        empty_branches: empty.len(),
                    }),
                }
            }
        }
    }
}

impl<'a> Iterator for LayerPairs<'a> {
    type Item = Result<LayerPair<'a>, PlannerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(id) = self.queue.pop_front() {
            let successor = &self.graph.layers()[id];
            let predecessor = match self.resolve_predecessor(successor) {
                Ok(Some(p)) => p,
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    self.queue.clear();
                    return Some(Err(e));
                }
            };

            if successor.is_mapped() && (predecessor.is_input() || predecessor.is_mapped()) {
                self.queue.push_back(predecessor.id);
                return Some(Ok(LayerPair {
                    predecessor,
                    successor,
                }));
            }
        }

        None
    }
}
