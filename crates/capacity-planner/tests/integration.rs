// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: manifest → graph → sizing → aggregation.
//!
//! These run the full planner against the simulated mesh, the same way the
//! CLI does, and check the properties a sized device must satisfy.

use capacity_planner::{
    compute_common_device, compute_min_device, layer_pairs, MapMode, MappingOracle,
    PlannerConfig, PlannerError, PlannerOptions, ResourceCount, SimulatedMesh,
};
use device_model::{DeviceDescriptor, IpVersion, SramSize};
use model_ir::{graph::Validated, ModelGraph, ModelLoader, ModelManifest};

// ── Helpers ────────────────────────────────────────────────────

fn model(json: &str) -> ModelGraph<Validated> {
    ModelManifest::from_json(json).unwrap().into_graph().unwrap()
}

fn dense_chain() -> ModelGraph<Validated> {
    model(
        r#"{ "name": "dense_chain", "layers": [
            { "name": "input", "layer_type": "InputData" },
            { "name": "fc1", "layer_type": "Dense1D", "inbounds": ["input"], "units": 100 },
            { "name": "fc2", "layer_type": "Dense1D", "inbounds": ["fc1"], "units": 10 }
        ] }"#,
    )
}

fn two_branch_merge() -> ModelGraph<Validated> {
    model(
        r#"{ "name": "two_branch", "layers": [
            { "name": "input", "layer_type": "InputData" },
            { "name": "conv_a", "layer_type": "Conv2D", "inbounds": ["input"], "units": 32 },
            { "name": "conv_b", "layer_type": "Conv2D", "inbounds": ["input"], "units": 32 },
            { "name": "merge", "layer_type": "Add", "inbounds": ["conv_a", "conv_b"] },
            { "name": "output", "layer_type": "Conv2D", "inbounds": ["merge"], "units": 16 }
        ] }"#,
    )
}

/// Stem followed by `blocks` residual blocks of two convolutions and a dense head.
fn resnet(blocks: usize) -> ModelGraph<Validated> {
    let mut layers = vec![
        r#"{ "name": "input", "layer_type": "InputConv2D", "units": 16, "input_bytes": 4096 }"#
            .to_string(),
        r#"{ "name": "stem", "layer_type": "Conv2D", "inbounds": ["input"], "units": 64,
             "input_bytes": 8192, "weight_bytes": 9216 }"#
            .to_string(),
    ];
    let mut prev = "stem".to_string();
    for b in 0..blocks {
        layers.push(format!(
            r#"{{ "name": "b{b}.conv1", "layer_type": "Conv2D", "inbounds": ["{prev}"],
                  "units": 64, "input_bytes": 8192, "weight_bytes": 36864 }}"#
        ));
        layers.push(format!(
            r#"{{ "name": "b{b}.conv2", "layer_type": "Conv2D", "inbounds": ["b{b}.conv1"],
                  "units": 64, "input_bytes": 8192, "weight_bytes": 36864 }}"#
        ));
        layers.push(format!(
            r#"{{ "name": "b{b}.add", "layer_type": "Add", "inbounds": ["{prev}", "b{b}.conv2"] }}"#
        ));
        prev = format!("b{b}.add");
    }
    layers.push(format!(
        r#"{{ "name": "head", "layer_type": "Dense1D", "inbounds": ["{prev}"],
              "units": 10, "weight_bytes": 640 }}"#
    ));
    model(&format!(
        r#"{{ "name": "resnet_{blocks}", "ip_version": "v2", "layers": [{}] }}"#,
        layers.join(",")
    ))
}

/// Sizes `graph`, then maps it on the result so it can be aggregated.
fn size_and_map(graph: &ModelGraph<Validated>, options: &PlannerOptions) -> ModelGraph<Validated> {
    let oracle = SimulatedMesh::new();
    let device = compute_min_device(&oracle, graph, options).unwrap();
    let mut mapped = graph.clone();
    oracle
        .map(&mut mapped, &device, MapMode::Minimal, true)
        .unwrap();
    mapped
}

// ── Single-model sizing ────────────────────────────────────────

#[test]
fn test_dense_chain_without_reconfiguration() {
    let device =
        compute_min_device(&SimulatedMesh::new(), &dense_chain(), &PlannerOptions::default())
            .unwrap();
    assert_eq!(device.num_fnp, 2);
    assert_eq!(device.num_skip_dma_channels, 0);
    assert_eq!(device.num_cnp_tnp, 0);
}

#[test]
fn test_two_branch_merge_needs_one_channel() {
    let device = compute_min_device(
        &SimulatedMesh::new(),
        &two_branch_merge(),
        &PlannerOptions::default(),
    )
    .unwrap();
    assert_eq!(device.num_skip_dma_channels, 1);
    assert_eq!(device.num_cnp_tnp, 3);
}

/// Conv and depthwise stages on 4 NPs each, then a dense layer on 3 FNPs.
fn plain_chain() -> ModelGraph<Validated> {
    model(
        r#"{ "name": "plain", "layers": [
            { "name": "input", "layer_type": "InputData" },
            { "name": "c1", "layer_type": "Conv2D", "inbounds": ["input"], "units": 200 },
            { "name": "dw", "layer_type": "DepthwiseConv2D", "inbounds": ["c1"], "units": 200 },
            { "name": "fc", "layer_type": "Dense1D", "inbounds": ["dw"], "units": 300 }
        ] }"#,
    )
}

#[test]
fn test_no_merge_layers_no_channels() {
    let device =
        compute_min_device(&SimulatedMesh::new(), &plain_chain(), &PlannerOptions::default())
            .unwrap();
    assert_eq!(device.num_skip_dma_channels, 0);
    assert_eq!(device.num_cnp_tnp, 8);
    assert_eq!(device.num_fnp, 3);
}

#[test]
fn test_no_merge_layers_no_channels_hwpr() {
    let options = PlannerOptions {
        enable_hwpr: true,
        ..Default::default()
    };
    let device = compute_min_device(&SimulatedMesh::new(), &plain_chain(), &options).unwrap();
    assert_eq!(device.num_skip_dma_channels, 0);
    // Peak pairs: c1 → dw (8 CNP) and dw → fc (3 FNP).
    assert_eq!(device.num_cnp_tnp, 8);
    assert_eq!(device.num_fnp, 3);
}

#[test]
fn test_wide_classifier_head() {
    let graph = model(
        r#"{ "name": "classifier", "layers": [
            { "name": "input", "layer_type": "InputData" },
            { "name": "conv", "layer_type": "Conv2D", "inbounds": ["input"], "units": 64 },
            { "name": "logits", "layer_type": "Dense1D", "inbounds": ["conv"], "units": 1000 }
        ] }"#,
    );
    for enable_hwpr in [false, true] {
        let options = PlannerOptions {
            enable_hwpr,
            ..Default::default()
        };
        let device = compute_min_device(&SimulatedMesh::new(), &graph, &options).unwrap();
        assert_eq!(device.num_fnp, 8);
        assert_eq!(device.num_cnp_tnp, 1);
    }
}

#[test]
fn test_single_pass_cnp_equals_sum_of_placements() {
    let graph = resnet(3);
    let oracle = SimulatedMesh::new();
    let device = compute_min_device(&oracle, &graph, &PlannerOptions::default()).unwrap();

    let mut mapped = graph.clone();
    oracle
        .map(&mut mapped, &device, MapMode::Minimal, true)
        .unwrap();
    let counted = ResourceCount::of_layers(mapped.layers());
    assert_eq!(device.num_cnp_tnp, counted.cnp_tnp);
    assert_eq!(device.num_cnp_tnp, 7);
    assert_eq!(device.num_skip_dma_channels, 3);
    assert!(oracle.plan_passes(&mapped, &device).unwrap().is_single_pass());
}

#[test]
fn test_reconfiguration_needs_fewer_nps() {
    let graph = resnet(4);
    let oracle = SimulatedMesh::new();
    let single = compute_min_device(&oracle, &graph, &PlannerOptions::default()).unwrap();
    let hwpr = compute_min_device(
        &oracle,
        &graph,
        &PlannerOptions {
            enable_hwpr: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(hwpr.num_nps() < single.num_nps());
    assert_eq!(hwpr.num_cnp_tnp, 2);
    assert_eq!(hwpr.num_skip_dma_channels, 1);

    let mut mapped = graph.clone();
    oracle.map(&mut mapped, &hwpr, MapMode::Minimal, true).unwrap();
    assert!(oracle.plan_passes(&mapped, &hwpr).unwrap().num_passes() > 1);
}

#[test]
fn test_channel_search_never_skips_feasible_count() {
    let graph = resnet(2);
    let oracle = SimulatedMesh::new();
    let options = PlannerOptions {
        enable_hwpr: true,
        ..Default::default()
    };
    let device = compute_min_device(&oracle, &graph, &options).unwrap();

    // Every smaller count must be rejected by the oracle.
    for channels in 1..device.num_skip_dma_channels {
        let candidate = DeviceDescriptor::create(
            device.num_cnp_tnp,
            device.num_fnp,
            channels,
            true,
            None,
            None,
        )
        .unwrap();
        let mut probe = graph.clone();
        assert!(oracle
            .map(&mut probe, &candidate, MapMode::Minimal, true)
            .is_err());
    }
}

#[test]
fn test_sequencer_pairs_are_mapped() {
    let mapped = size_and_map(&resnet(2), &PlannerOptions::default());
    let pairs: Vec<_> = layer_pairs(&mapped).collect::<Result<_, _>>().unwrap();
    assert!(!pairs.is_empty());
    for pair in pairs {
        assert!(pair.successor.is_mapped());
        assert!(pair.predecessor.is_input() || pair.predecessor.is_mapped());
    }
}

#[test]
fn test_minimal_memory_shrinks_sram() {
    let options = PlannerOptions {
        minimal_memory: true,
        ..Default::default()
    };
    let device = compute_min_device(&SimulatedMesh::new(), &resnet(1), &options).unwrap();
    assert_eq!(device.sram_size, SramSize::new(8 * 1024, 36 * 1024));
}

#[test]
fn test_hrc_required_for_input_conv() {
    let options = PlannerOptions {
        include_hrc: false,
        ..Default::default()
    };
    let err = compute_min_device(&SimulatedMesh::new(), &resnet(1), &options).unwrap_err();
    assert!(matches!(err, PlannerError::DeviceNotFound { .. }));
}

#[test]
fn test_unsupported_version_rejected() {
    let graph = model(
        r#"{ "name": "legacy", "ip_version": "v1", "layers": [
            { "name": "input", "layer_type": "InputData" },
            { "name": "fc", "layer_type": "Dense1D", "inbounds": ["input"] }
        ] }"#,
    );
    let err =
        compute_min_device(&SimulatedMesh::new(), &graph, &PlannerOptions::default()).unwrap_err();
    assert!(matches!(err, PlannerError::UnsupportedVersion { .. }));
}

// ── Aggregation ────────────────────────────────────────────────

#[test]
fn test_common_device_covers_every_model() {
    let options = PlannerOptions::default();
    let models = vec![
        size_and_map(&dense_chain(), &options),
        size_and_map(&two_branch_merge(), &options),
        size_and_map(&resnet(2), &options),
    ];
    let common = compute_common_device(&models).unwrap();
    assert_eq!(common.num_fnp, 2);
    assert_eq!(common.num_cnp_tnp, 5);
    assert_eq!(common.num_skip_dma_channels, 2);
    assert!(common.include_hrc);

    let oracle = SimulatedMesh::new();
    for m in &models {
        let mut probe = m.clone();
        oracle.map(&mut probe, &common, MapMode::Minimal, true).unwrap();
    }
}

#[test]
fn test_common_device_of_one_model() {
    let options = PlannerOptions::default();
    let graph = resnet(2);
    let own = compute_min_device(&SimulatedMesh::new(), &graph, &options).unwrap();
    let common = compute_common_device(&[size_and_map(&graph, &options)]).unwrap();
    assert_eq!(common, own);
}

#[test]
fn test_common_device_empty() {
    assert!(matches!(
        compute_common_device(&[]),
        Err(PlannerError::EmptyInput)
    ));
}

#[test]
fn test_common_device_requires_mapping() {
    let err = compute_common_device(&[dense_chain()]).unwrap_err();
    assert!(matches!(err, PlannerError::UnmappedModel { .. }));
}

// ── Config and loading ─────────────────────────────────────────

#[test]
fn test_config_drives_sizing() {
    let config = PlannerConfig::from_toml(
        r#"
enable_hwpr = true
sram_size = "16K,64K"
"#,
    )
    .unwrap();
    let options = config.to_options().unwrap();
    let device = compute_min_device(&SimulatedMesh::new(), &resnet(3), &options).unwrap();
    assert_eq!(device.sram_size, SramSize::new(16 * 1024, 64 * 1024));
    assert_eq!(device.version, IpVersion::V2);
}

#[test]
fn test_load_and_size_from_disk() {
    let dir = std::env::temp_dir().join(format!("np-sizer-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let json = ModelManifest::from_graph(&two_branch_merge())
        .to_json()
        .unwrap();
    std::fs::write(dir.join("model.json"), json).unwrap();

    let graph = ModelLoader::load(&dir).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    let device =
        compute_min_device(&SimulatedMesh::new(), &graph, &PlannerOptions::default()).unwrap();
    assert_eq!(device.num_skip_dma_channels, 1);
}
