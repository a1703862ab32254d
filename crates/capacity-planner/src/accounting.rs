// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resource accounting over placement results.
//!
//! Every function here is a pure count over the mappings of a set of layers,
//! whether that set is one [`crate::LayerPair`] or a whole model. Unmapped
//! layers contribute nothing.
//!
//! # Skip DMA channels
//!
//! A physical channel alternates between storing and loading, so the
//! channels a set of layers needs is the larger of the two directions:
//!
//! ```text
//! skip_dma_channels = max(#SKIP_DMA_LOAD, #SKIP_DMA_STORE)
//! ```

use model_ir::{Layer, LayerMapping, NpClass, NpType};

/// Counts placements across `layers` for which `pred` holds.
fn count_nps<'a, I, F>(layers: I, pred: F) -> u32
where
    I: IntoIterator<Item = &'a Layer>,
    F: Fn(NpType) -> bool,
{
    let count = layers
        .into_iter()
        .filter_map(|l| l.mapping.as_ref())
        .flat_map(|m| m.nps.iter())
        .filter(|np| pred(np.np_type))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Skip DMA channels needed by `layers`.
pub fn skip_dma_channels<'a, I>(layers: I) -> u32
where
    I: IntoIterator<Item = &'a Layer> + Clone,
{
    let loads = count_nps(layers.clone(), |t| t == NpType::SkipDmaLoad);
    let stores = count_nps(layers, |t| t == NpType::SkipDmaStore);
    loads.max(stores)
}

/// CNP1, CNP2 and TNP-B placements in `layers`.
pub fn cnp_tnp_count<'a, I>(layers: I) -> u32
where
    I: IntoIterator<Item = &'a Layer>,
{
    count_nps(layers, |t| t.class() == NpClass::CnpTnp)
}

/// FNP2 and FNP3 placements in `layers`.
pub fn fnp_count<'a, I>(layers: I) -> u32
where
    I: IntoIterator<Item = &'a Layer>,
{
    count_nps(layers, |t| t.class() == NpClass::Fnp)
}

/// The three resource quantities a device is sized by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResourceCount {
    pub cnp_tnp: u32,
    pub fnp: u32,
    pub skip_dma_channels: u32,
}

impl ResourceCount {
    /// Counts every resource over `layers`.
    pub fn of_layers<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a Layer> + Clone,
    {
        Self {
            cnp_tnp: cnp_tnp_count(layers.clone()),
            fnp: fnp_count(layers.clone()),
            skip_dma_channels: skip_dma_channels(layers),
        }
    }

    /// Counts every resource in a single layer's placement result.
    pub fn of_mapping(mapping: &LayerMapping) -> Self {
        let count = |class| u32::try_from(mapping.of_class(class).count()).unwrap_or(u32::MAX);
        let loads = u32::try_from(mapping.count(NpType::SkipDmaLoad)).unwrap_or(u32::MAX);
        let stores = u32::try_from(mapping.count(NpType::SkipDmaStore)).unwrap_or(u32::MAX);
        Self {
            cnp_tnp: count(NpClass::CnpTnp),
            fnp: count(NpClass::Fnp),
            skip_dma_channels: loads.max(stores),
        }
    }

    /// Element-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self {
            cnp_tnp: self.cnp_tnp.max(other.cnp_tnp),
            fnp: self.fnp.max(other.fnp),
            skip_dma_channels: self.skip_dma_channels.max(other.skip_dma_channels),
        }
    }

    /// Element-wise sum.
    pub fn add(self, other: Self) -> Self {
        Self {
            cnp_tnp: self.cnp_tnp + other.cnp_tnp,
            fnp: self.fnp + other.fnp,
            skip_dma_channels: self.skip_dma_channels + other.skip_dma_channels,
        }
    }

    /// Returns `true` if every quantity is within `limit`.
    pub fn fits_within(&self, limit: &Self) -> bool {
        self.cnp_tnp <= limit.cnp_tnp
            && self.fnp <= limit.fnp
            && self.skip_dma_channels <= limit.skip_dma_channels
    }
}

impl std::fmt::Display for ResourceCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} CNP/TNP, {} FNP, {} skip DMA",
            self.cnp_tnp, self.fnp, self.skip_dma_channels
        )
    }
}
