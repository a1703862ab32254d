// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the helpers they share.

pub mod common;
pub mod inspect;
pub mod size;

use anyhow::Context;
use capacity_planner::{compute_min_device, PlannerConfig, SimulatedMesh};
use device_model::DeviceDescriptor;
use model_ir::{graph::Validated, ModelGraph};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sizing flags shared by every subcommand. Each one overrides the
/// corresponding config file entry when given.
#[derive(Debug, Clone, clap::Args)]
pub struct SizingArgs {
    /// Size for hardware partial reconfiguration.
    #[arg(long)]
    pub hwpr: bool,

    /// Per-NP SRAM as "<input>,<weight>" (e.g. "64K,128K").
    #[arg(long)]
    pub sram_size: Option<String>,

    /// Shrink SRAM to the least size the mapping needs.
    #[arg(long)]
    pub minimal_memory: bool,

    /// Mesh nodes of the bootstrap device.
    #[arg(long)]
    pub initial_num_nodes: Option<u32>,

    /// Size a device without the input capture unit (HRC).
    #[arg(long)]
    pub no_hrc: bool,

    /// Abort a sizing run after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl SizingArgs {
    /// Layers these flags over `config`.
    pub fn apply(self, mut config: PlannerConfig) -> PlannerConfig {
        config.enable_hwpr |= self.hwpr;
        config.minimal_memory |= self.minimal_memory;
        if self.no_hrc {
            config.include_hrc = false;
        }
        if let Some(sram) = self.sram_size {
            config.sram_size = Some(sram);
        }
        if let Some(n) = self.initial_num_nodes {
            config.initial_num_nodes = n;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        config
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the `-v` count when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads the config file if one was given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PlannerConfig> {
    match path {
        Some(p) => PlannerConfig::from_file(p)
            .with_context(|| format!("failed to load config '{}'", p.display())),
        None => Ok(PlannerConfig::default()),
    }
}

/// Loads and validates a model.
pub fn load_model(path: &Path) -> anyhow::Result<ModelGraph<Validated>> {
    model_ir::ModelLoader::load(path)
        .with_context(|| format!("failed to load model from '{}'", path.display()))
}

/// Runs the planner on the blocking pool, bounded by the configured timeout.
pub async fn size_model(
    model: ModelGraph<Validated>,
    config: &PlannerConfig,
) -> anyhow::Result<DeviceDescriptor> {
    let options = config.to_options()?;
    let name = model.name.clone();
    tracing::debug!("sizing '{name}' with {options:?}");
    let task = tokio::task::spawn_blocking(move || {
        compute_min_device(&SimulatedMesh::new(), &model, &options)
    });

    let joined = match config.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
            Ok(joined) => joined,
            Err(_) => {
                eprintln!("error: sizing '{name}' timed out after {secs}s");
                // The blocking thread cannot be cancelled and the runtime
                // would wait for it on shutdown.
                std::process::exit(2);
            }
        },
        None => task.await,
    };

    joined
        .context("sizing task panicked")?
        .with_context(|| format!("cannot size a device for '{name}'"))
}
