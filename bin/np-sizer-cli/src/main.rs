// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # np-sizer
//!
//! Command-line interface for the accelerator capacity planner.
//!
//! ## Usage
//! ```bash
//! # Size the smallest device for one model
//! np-sizer size --model ./models/ds_cnn_kws.json --hwpr
//!
//! # Smallest device that runs any of several models
//! np-sizer common ./models/kws.json ./models/vww.json --sram-size 32K,64K
//!
//! # Layer table, sequencer pairs and pass plan
//! np-sizer inspect --model ./models/ds_cnn_kws.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "np-sizer",
    about = "Minimum virtual device sizing for spatial NP-mesh accelerators",
    version,
    author
)]
struct Cli {
    /// Path to a TOML planner configuration (CLI flags take precedence).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimal device for a model.
    Size {
        /// Model manifest, or a directory containing `model.json`.
        #[arg(short, long)]
        model: PathBuf,

        #[command(flatten)]
        sizing: commands::SizingArgs,

        /// Print the device as JSON instead of a report.
        #[arg(long)]
        json: bool,
    },

    /// Compute one device able to run each of several models.
    Common {
        /// Model manifests or model directories.
        #[arg(required = true, num_args = 1..)]
        models: Vec<PathBuf>,

        #[command(flatten)]
        sizing: commands::SizingArgs,

        /// Print the device as JSON instead of a report.
        #[arg(long)]
        json: bool,
    },

    /// Inspect a model: layer table, placements, sequencer pairs and passes.
    Inspect {
        /// Model manifest, or a directory containing `model.json`.
        #[arg(short, long)]
        model: PathBuf,

        #[command(flatten)]
        sizing: commands::SizingArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Size {
            model,
            sizing,
            json,
        } => commands::size::execute(model, sizing.apply(config), json).await,
        Commands::Common {
            models,
            sizing,
            json,
        } => commands::common::execute(models, sizing.apply(config), json).await,
        Commands::Inspect { model, sizing } => {
            commands::inspect::execute(model, sizing.apply(config)).await
        }
    }
}
