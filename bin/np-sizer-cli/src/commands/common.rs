// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `np-sizer common` command: one device for several models.
//!
//! Each model is sized on its own, mapped on its own device, and the
//! mapped models are then combined.

use anyhow::Context;
use capacity_planner::{
    compute_common_device, MapMode, MappingOracle, PlannerConfig, SimulatedMesh,
};
use std::path::PathBuf;

pub async fn execute(
    models: Vec<PathBuf>,
    config: PlannerConfig,
    json: bool,
) -> anyhow::Result<()> {
    let oracle = SimulatedMesh::new();
    let mut mapped = Vec::with_capacity(models.len());
    let mut own_devices = Vec::with_capacity(models.len());

    for path in &models {
        let mut graph = super::load_model(path)?;
        let device = super::size_model(graph.clone(), &config).await?;
        oracle
            .map(&mut graph, &device, MapMode::Minimal, true)
            .with_context(|| format!("cannot map '{}' on its own device", graph.name))?;
        own_devices.push(device);
        mapped.push(graph);
    }

    let common = compute_common_device(&mapped)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&common)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               np-sizer · Common Device               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!(
        "  {:<28} {:>8} {:>6} {:>6} {:>6}",
        "Model", "CNP/TNP", "FNP", "Skip", "Nodes",
    );
    println!("  {}", "-".repeat(58));
    for (graph, device) in mapped.iter().zip(&own_devices) {
        println!(
            "  {:<28} {:>8} {:>6} {:>6} {:>6}",
            graph.name,
            device.num_cnp_tnp,
            device.num_fnp,
            device.num_skip_dma_channels,
            device.num_nodes(),
        );
    }
    println!("  {}", "-".repeat(58));
    println!(
        "  {:<28} {:>8} {:>6} {:>6} {:>6}",
        "common",
        common.num_cnp_tnp,
        common.num_fnp,
        common.num_skip_dma_channels,
        common.num_nodes(),
    );
    println!();
    println!("  {common}");
    println!();
    Ok(())
}
