// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device construction.

/// Errors that can occur when building a device descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// A requested quantity is outside what a device can describe.
    #[error("device constraint violated: {detail}")]
    ConstraintViolation { detail: String },

    /// A human-readable byte size could not be parsed.
    #[error("invalid size '{input}': {detail}")]
    InvalidSize { input: String, detail: String },

    /// An unknown hardware version string.
    #[error("unknown IP version '{0}'")]
    UnknownVersion(String),
}
