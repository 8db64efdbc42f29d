// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES-CCM
//!
//! [`CcmEngine`] combines a [`CbcMac`] over the formatted packet with a
//! [`CtrMode`] keystream.

pub mod cbc_mac;
pub mod ctr;
pub mod engine;

pub use cbc_mac::CbcMac;
pub use ctr::CtrMode;
pub use engine::{AesCcm, CcmEngine};
