// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from a manifest file or a model directory.
//!
//! A model path is either the manifest itself (`resnet.json`) or a
//! directory holding `model.json`.

use crate::{graph, ModelError, ModelGraph, ModelManifest};
use std::path::{Path, PathBuf};

/// Default manifest filename inside a model directory.
const MANIFEST_FILE: &str = "model.json";

/// Loads a model from disk into a validated [`ModelGraph`].
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let graph = ModelLoader::load(Path::new("./models/ds_cnn_kws")).unwrap();
/// println!("Loaded {} layers", graph.num_layers());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model.
    ///
    /// Steps:
    /// 1. Resolve the manifest path.
    /// 2. Parse and validate the manifest.
    /// 3. Resolve inbound names and validate the resulting graph.
    pub fn load(path: &Path) -> Result<ModelGraph<graph::Validated>, ModelError> {
        let manifest_path = Self::manifest_path(path);
        tracing::debug!("loading manifest '{}'", manifest_path.display());

        let manifest = ModelManifest::from_file(&manifest_path)?;
        let graph = manifest.into_graph()?;
        tracing::info!("{}", graph.summary());
        Ok(graph)
    }

    /// Returns the manifest file for a model path.
    pub fn manifest_path(path: &Path) -> PathBuf {
        if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        }
    }
}
