// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `np-sizer size` command: minimal device for one model.

use capacity_planner::PlannerConfig;
use device_model::NPS_PER_NODE;
use std::path::PathBuf;

pub async fn execute(model: PathBuf, config: PlannerConfig, json: bool) -> anyhow::Result<()> {
    let graph = super::load_model(&model)?;

    if json {
        let device = super::size_model(graph, &config).await?;
        println!("{}", serde_json::to_string_pretty(&device)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               np-sizer · Device Sizing               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  Config:");
    println!("   Model:          {}", model.display());
    println!("   HW reconfig:    {}", on_off(config.enable_hwpr));
    println!(
        "   SRAM size:      {}",
        config.sram_size.as_deref().unwrap_or("default")
    );
    println!("   Minimal memory: {}", on_off(config.minimal_memory));
    println!("   Initial nodes:  {}", config.initial_num_nodes);
    println!("   HRC:            {}", on_off(config.include_hrc));
    println!();

    println!("  [1/2] {}", graph.summary());
    println!("  [2/2] Searching for the minimal device...");
    let device = super::size_model(graph, &config).await?;
    println!();

    println!("  Result:");
    println!("   CNP/TNP:           {}", device.num_cnp_tnp);
    println!("   FNP:               {}", device.num_fnp);
    println!("   Skip DMA channels: {}", device.num_skip_dma_channels);
    println!("   SRAM per NP:       {}", device.sram_size);
    println!();
    println!(
        "  Model needs {} nodes ({} NPs, {NPS_PER_NODE} per node)",
        device.num_nodes(),
        device.num_nps(),
    );
    println!();
    Ok(())
}

pub(crate) fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
