// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! Intermediate representation of a model compiled for the spatial
//! accelerator, after hardware conversion and before device sizing.
//!
//! - [`LayerType`] — the accelerator layer kinds (convolutions, dense,
//!   merges, buffered temporal convolutions, ...).
//! - [`Layer`] — one node of the DAG: inbound edges by id, sizing
//!   parameters and the oracle's [`LayerMapping`] once mapped.
//! - [`ModelGraph`] — the layer arena with a **type-state pattern**
//!   (`Loaded` → `Validated`) that guarantees acyclicity and a single
//!   output layer.
//! - [`ModelManifest`] / [`ModelLoader`] — JSON model descriptions on disk.
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let graph = ModelLoader::load(Path::new("./models/ds_cnn_kws.json")).unwrap();
//! println!("{}", graph.summary());
//! for layer in graph.iter_layers() {
//!     println!("  {}", layer.summary());
//! }
//! ```

mod error;
pub mod graph;
mod layer;
mod loader;
mod manifest;
mod mapping;

pub use error::ModelError;
pub use graph::ModelGraph;
pub use layer::{Layer, LayerParams, LayerType};
pub use loader::ModelLoader;
pub use manifest::{ManifestLayer, ModelManifest};
pub use mapping::{LayerMapping, NpClass, NpPlacement, NpType};
