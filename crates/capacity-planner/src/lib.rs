// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # capacity-planner
//!
//! Sizes the smallest virtual accelerator device that a model maps onto,
//! and the smallest device that can host each of several models.
//!
//! # Components
//!
//! | Component | Role |
//! |---|---|
//! | [`layer_pairs`] | Producer/consumer pairs that must share a pass |
//! | [`ResourceCount`] | CNP/TNP, FNP and skip DMA counts of a layer set |
//! | [`compute_min_device`] | Bootstrap, count, search, verify |
//! | [`compute_common_device`] | Maxima over already-mapped models |
//! | [`MappingOracle`] | Ground truth for "does this model fit" |
//! | [`SimulatedMesh`] | Deterministic rule-based oracle |
//!
//! # Example
//! ```no_run
//! use capacity_planner::{compute_min_device, PlannerOptions, SimulatedMesh};
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let model = ModelLoader::load(Path::new("./model.json")).unwrap();
//! let options = PlannerOptions { enable_hwpr: true, ..Default::default() };
//! let device = compute_min_device(&SimulatedMesh::new(), &model, &options).unwrap();
//! println!("needs {} nodes: {device}", device.num_nodes());
//! ```

pub mod accounting;
mod common;
mod config;
mod error;
pub mod oracle;
mod sequencer;
mod solver;

pub use accounting::{cnp_tnp_count, fnp_count, skip_dma_channels, ResourceCount};
pub use common::compute_common_device;
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use oracle::passes::{Pass, PassPlan};
pub use oracle::simulated::SimulatedMesh;
pub use oracle::{MapMode, MappingFailure, MappingOracle};
pub use sequencer::{layer_pairs, LayerPair, LayerPairs};
pub use solver::{compute_min_device, PlannerOptions};
