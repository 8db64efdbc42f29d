// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Protocol constants for the AEAD engines
//!
//! Sizes come from NIST SP 800-38C/D, RFC 8439 and RFC 8446.

// =============================================================================
// Block Cipher Constants
// =============================================================================

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const AES128_KEY_SIZE: usize = 16;

/// AES-192 key size in bytes
pub const AES192_KEY_SIZE: usize = 24;

/// AES-256 key size in bytes
pub const AES256_KEY_SIZE: usize = 32;

// =============================================================================
// GCM Constants
// =============================================================================

/// Nonce length that takes the `nonce || 0^31 || 1` fast path
pub const GCM_STANDARD_NONCE_SIZE: usize = 12;

/// Smallest GCM tag in bits
pub const GCM_MIN_TAG_BITS: usize = 32;

/// Largest GCM tag in bits
pub const GCM_MAX_TAG_BITS: usize = 128;

/// Counter blocks available to one message: `2^32 - 2`
///
/// Counter value 1 belongs to `J0` and the 32-bit counter must not wrap.
pub const GCM_MAX_BLOCKS_PER_MESSAGE: u32 = u32::MAX - 1;

// =============================================================================
// CCM Constants
// =============================================================================

/// Shortest CCM nonce in bytes
pub const CCM_MIN_NONCE_SIZE: usize = 7;

/// Longest CCM nonce in bytes
pub const CCM_MAX_NONCE_SIZE: usize = 13;

/// Smallest CCM tag in bytes
pub const CCM_MIN_TAG_SIZE: usize = 4;

/// Largest CCM tag in bytes
pub const CCM_MAX_TAG_SIZE: usize = 16;

/// Tag size used when only a nonce is supplied
pub const CCM_DEFAULT_TAG_SIZE: usize = 8;

/// AAD lengths below this use a two-byte length prefix
pub const CCM_SHORT_AAD_LIMIT: usize = 0xFF00;

// =============================================================================
// ChaCha20-Poly1305 Constants
// =============================================================================

/// ChaCha20 key size in bytes
pub const CHACHA20_KEY_SIZE: usize = 32;

/// ChaCha20 nonce size in bytes (RFC 8439)
pub const CHACHA20_NONCE_SIZE: usize = 12;

/// ChaCha20 keystream block size in bytes
pub const CHACHA20_BLOCK_SIZE: usize = 64;

/// Poly1305 one-time key size in bytes
pub const POLY1305_KEY_SIZE: usize = 32;

/// Poly1305 tag size in bytes
pub const POLY1305_TAG_SIZE: usize = 16;

// =============================================================================
// Record Layer Constants
// =============================================================================

/// Maximum tag size across all engines
pub const MAX_TAG_SIZE: usize = 16;

/// TLS record plaintext limit (2^14)
pub const MAX_RECORD_PLAINTEXT: usize = 16_384;

/// TLS 1.3 ciphertext expansion allowance (2^14 + 256)
pub const MAX_RECORD_CIPHERTEXT: usize = MAX_RECORD_PLAINTEXT + 256;

/// Nonce size used by every TLS AEAD suite
pub const TLS_AEAD_NONCE_SIZE: usize = 12;
