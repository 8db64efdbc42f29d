// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES-GCM
//!
//! - [`field`]: GF(2^128) arithmetic in GCM bit order
//! - [`multiplier`]: GHASH multipliers (reference and table driven)
//! - [`exponentiator`]: powers of `H` for late associated data
//! - [`engine`]: the streaming [`GcmEngine`]

pub mod engine;
pub mod exponentiator;
pub mod field;
pub mod multiplier;

pub use engine::{AesGcm, GcmEngine};
pub use exponentiator::Tables1kGcmExponentiator;
pub use field::FieldElement;
pub use multiplier::{
    BasicGcmMultiplier, DynGcmMultiplier, Tables2x256GcmMultiplier, Tables8kGcmMultiplier,
};
