// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Shared layer for the record-layer AEAD engines
//!
//! This crate holds everything the engines and the record layer agree on
//! without depending on any cipher code: the record-layer error type and its
//! TLS alert mapping, engine configuration, a bounded event log, protocol
//! constants and algorithm identifiers.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default)
//!
//! # Security
//!
//! Nothing in this crate ever holds key material. The event log stores short
//! formatted messages only, and callers must never format secrets into it.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod constants;
pub mod errors;
pub mod log;
pub mod types;

// Re-export commonly used items
pub use config::AeadConfig;
pub use errors::{Error, Result};
pub use types::{AeadAlgorithm, Direction};
