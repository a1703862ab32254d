// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Placement results attached to layers by a mapping oracle.
//!
//! A mapped layer owns a [`LayerMapping`]: the ordered list of NPs the
//! oracle assigned to it. Skip DMA loads and stores are listed alongside
//! ordinary pipeline NPs and told apart by their [`NpType`].

/// Hardware unit type of a single placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpType {
    /// Convolution NP, first flavour.
    Cnp1,
    /// Convolution NP, second flavour (depthwise capable).
    Cnp2,
    /// Temporal sequencer NP.
    TnpB,
    /// Fully-connected NP.
    Fnp2,
    /// Fully-connected NP with external weight storage.
    Fnp3,
    /// Skip DMA channel reading buffered data back into a pass.
    SkipDmaLoad,
    /// Skip DMA channel buffering data out of a pass.
    SkipDmaStore,
}

/// Coarse resource class an [`NpType`] is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpClass {
    /// CNP1, CNP2 and TNP-B.
    CnpTnp,
    /// FNP2 and FNP3.
    Fnp,
    /// Skip DMA load or store.
    SkipDma,
}

impl NpType {
    pub fn class(&self) -> NpClass {
        match self {
            Self::Cnp1 | Self::Cnp2 | Self::TnpB => NpClass::CnpTnp,
            Self::Fnp2 | Self::Fnp3 => NpClass::Fnp,
            Self::SkipDmaLoad | Self::SkipDmaStore => NpClass::SkipDma,
        }
    }

    /// Returns `true` for ordinary pipeline NPs.
    pub fn is_resident(&self) -> bool {
        self.class() != NpClass::SkipDma
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cnp1 => "CNP1",
            Self::Cnp2 => "CNP2",
            Self::TnpB => "TNP_B",
            Self::Fnp2 => "FNP2",
            Self::Fnp3 => "FNP3",
            Self::SkipDmaLoad => "SKIP_DMA_LOAD",
            Self::SkipDmaStore => "SKIP_DMA_STORE",
        }
    }
}

impl std::fmt::Display for NpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One NP (or skip DMA endpoint) assigned to a layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NpPlacement {
    pub np_type: NpType,
    /// Input SRAM this NP uses, in bytes.
    #[serde(default)]
    pub input_bytes: u32,
    /// Weight SRAM this NP uses, in bytes.
    #[serde(default)]
    pub weight_bytes: u32,
}

impl NpPlacement {
    /// A placement with no SRAM footprint.
    pub fn new(np_type: NpType) -> Self {
        Self {
            np_type,
            input_bytes: 0,
            weight_bytes: 0,
        }
    }

    pub fn with_memory(np_type: NpType, input_bytes: u32, weight_bytes: u32) -> Self {
        Self {
            np_type,
            input_bytes,
            weight_bytes,
        }
    }
}

/// The oracle's placement result for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerMapping {
    /// Placements in the order the oracle produced them.
    pub nps: Vec<NpPlacement>,
}

impl LayerMapping {
    pub fn new(nps: Vec<NpPlacement>) -> Self {
        Self { nps }
    }

    /// Iterates over placements of the given type.
    pub fn of_type(&self, np_type: NpType) -> impl Iterator<Item = &NpPlacement> {
        self.nps.iter().filter(move |np| np.np_type == np_type)
    }

    /// Iterates over placements counted under `class`.
    pub fn of_class(&self, class: NpClass) -> impl Iterator<Item = &NpPlacement> {
        self.nps.iter().filter(move |np| np.np_type.class() == class)
    }

    /// Number of placements of the given type.
    pub fn count(&self, np_type: NpType) -> usize {
        self.of_type(np_type).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nps.is_empty()
    }
}
