// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Streaming AEAD engines for a TLS record layer
//!
//! This crate provides the record-protection ciphers behind TLS 1.2/1.3,
//! each as an incremental engine with caller-provided output buffers:
//!
//! - **AES-GCM**: GHASH over pluggable multipliers (reference, 8 KiB nibble
//!   tables, 2×256 byte tables), arbitrary-length IVs, truncated tags,
//!   associated data supplied after the payload, and nonce-reuse refusal
//! - **AES-CCM**: packet-mode CBC-MAC plus CTR with 4..16 byte tags
//! - **ChaCha20-Poly1305**: RFC 8439 with a scalar and a two-lane keystream
//!
//! [`RecordCipher`] selects one engine per direction from an
//! [`AeadAlgorithm`](aead_common::AeadAlgorithm) and is what the record layer
//! calls.
//!
//! # Security Requirements
//!
//! - Tags are compared in constant time
//! - Failed decryption never releases plaintext
//! - Key schedules and per-message scratch state are zeroized on drop
//! - Key material is never logged

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// Core modules
pub mod error;
pub mod pack;
pub mod traits;
pub mod zeroize_utils;

// Block cipher
pub mod block_cipher;

// AEAD engines
pub mod ccm;
pub mod chacha;
pub mod gcm;

// Record-layer façade
pub mod record;

// Known Answer Tests
pub mod kat;

// Re-export main traits and types
pub use error::{CryptoError, CryptoResult, ErrorKind};
pub use traits::{AeadCipher, AeadParameters, BlockCipher, GcmExponentiator, GcmMultiplier};

// Re-export engine implementations
pub use block_cipher::AesCipher;
pub use ccm::AesCcm;
pub use chacha::ChaCha20Poly1305;
pub use gcm::AesGcm;
pub use record::RecordCipher;
