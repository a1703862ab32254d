// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `np-sizer inspect` command: display model structure and how it maps.
//!
//! Prints the layer table, sizes the model, then shows the placement of
//! every layer on the minimal device, the layer pairs that must share a
//! pass, and the pass plan.

use anyhow::Context;
use capacity_planner::{layer_pairs, MapMode, MappingOracle, PlannerConfig, SimulatedMesh};
use model_ir::{LayerMapping, NpType};
use std::path::PathBuf;

pub async fn execute(model: PathBuf, config: PlannerConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              np-sizer · Model Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut graph = super::load_model(&model)?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Model:   {}", graph.name);
    println!("  Version: {}", graph.ip_version);
    println!("  Layers:  {}", graph.num_layers());
    println!("  Output:  {}", graph.terminal().name);
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<4} {:<24} {:<26} {:>6} {:>9} {:>9}  Inbounds",
        "Id", "Name", "Type", "Units", "In KB", "W KB",
    );
    println!("  {}", "-".repeat(92));
    for layer in graph.iter_layers() {
        let inbounds: Vec<&str> = layer
            .inbounds
            .iter()
            .filter_map(|&id| graph.layer(id).map(|l| l.name.as_str()))
            .collect();
        println!(
            "  {:<4} {:<24} {:<26} {:>6} {:>9.1} {:>9.1}  {}",
            layer.id,
            truncate(&layer.name, 24),
            layer.layer_type.as_str(),
            layer.params.units,
            f64::from(layer.params.input_bytes) / 1024.0,
            f64::from(layer.params.weight_bytes) / 1024.0,
            inbounds.join(", "),
        );
    }
    println!();

    // ── Mapping ────────────────────────────────────────────────
    let oracle = SimulatedMesh::new();
    let device = super::size_model(graph.clone(), &config).await?;
    oracle
        .map(&mut graph, &device, MapMode::Minimal, true)
        .with_context(|| format!("cannot map '{}' on {device}", graph.name))?;
    println!("  Device: {device}");
    println!();

    println!("  {:<24} Placement", "Layer");
    println!("  {}", "-".repeat(60));
    for layer in graph.iter_layers() {
        let placement = match &layer.mapping {
            None => "host".to_string(),
            Some(m) if m.is_empty() => "HRC".to_string(),
            Some(m) => describe(m),
        };
        println!("  {:<24} {placement}", truncate(&layer.name, 24));
    }
    println!();

    // ── Layer Pairs ────────────────────────────────────────────
    println!("  Layer pairs (must share a pass):");
    match layer_pairs(&graph).collect::<Result<Vec<_>, _>>() {
        Ok(pairs) => {
            for pair in pairs {
                println!(
                    "   {:<24} → {:<24} {}",
                    truncate(&pair.predecessor.name, 24),
                    truncate(&pair.successor.name, 24),
                    pair.resources(),
                );
            }
        }
        Err(e) => println!("   unavailable: {e}"),
    }
    println!();

    // ── Passes ─────────────────────────────────────────────────
    let plan = oracle
        .plan_passes(&graph, &device)
        .with_context(|| format!("cannot plan passes for '{}'", graph.name))?;
    println!("  Passes: {}", plan.summary());
    for pass in &plan.passes {
        let names: Vec<&str> = pass
            .layer_ids
            .iter()
            .filter_map(|&id| graph.layer(id).map(|l| l.name.as_str()))
            .collect();
        println!(
            "   #{:<3} {:<36} {}",
            pass.pass_index,
            pass.resources.to_string(),
            names.join(", "),
        );
    }
    println!();
    Ok(())
}

/// Counts placements by type, e.g. `2×CNP1, 1×SKIP_DMA_STORE`.
fn describe(mapping: &LayerMapping) -> String {
    const ORDER: [NpType; 7] = [
        NpType::Cnp1,
        NpType::Cnp2,
        NpType::TnpB,
        NpType::Fnp2,
        NpType::Fnp3,
        NpType::SkipDmaStore,
        NpType::SkipDmaLoad,
    ];
    ORDER
        .iter()
        .filter_map(|&t| match mapping.count(t) {
            0 => None,
            n => Some(format!("{n}×{t}")),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
