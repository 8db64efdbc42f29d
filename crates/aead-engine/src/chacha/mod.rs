// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! ChaCha20-Poly1305
//!
//! - [`chacha20`]: the RFC 8439 stream cipher with scalar and wide backends
//! - [`poly1305`]: the one-time authenticator
//! - [`engine`]: the AEAD construction

pub mod chacha20;
pub mod engine;
pub mod poly1305;

pub use chacha20::ChaCha7539;
pub use engine::ChaCha20Poly1305;
pub use poly1305::Poly1305;
