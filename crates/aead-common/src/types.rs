// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Algorithm identifiers and record direction

use core::fmt;

use crate::constants::{
    AES128_KEY_SIZE, AES256_KEY_SIZE, CCM_DEFAULT_TAG_SIZE, CHACHA20_KEY_SIZE, MAX_TAG_SIZE,
    TLS_AEAD_NONCE_SIZE,
};

/// Engine family behind an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadFamily {
    /// AES in Galois/Counter Mode
    Gcm,
    /// AES in Counter with CBC-MAC mode
    Ccm,
    /// ChaCha20 stream cipher with Poly1305
    ChaCha20Poly1305,
}

/// AEAD algorithm negotiated for a record protection context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AeadAlgorithm {
    /// AES-128-GCM, 16-byte tag
    Aes128Gcm = 0xB0,
    /// AES-256-GCM, 16-byte tag
    Aes256Gcm = 0xB1,
    /// ChaCha20-Poly1305 (RFC 8439)
    ChaCha20Poly1305 = 0xB2,
    /// AES-128-CCM, 16-byte tag
    Aes128Ccm = 0xB3,
    /// AES-128-CCM with an 8-byte tag
    Aes128Ccm8 = 0xB4,
    /// AES-256-CCM, 16-byte tag
    Aes256Ccm = 0xB5,
}

impl AeadAlgorithm {
    /// Every supported algorithm
    pub const ALL: [Self; 6] = [
        Self::Aes128Gcm,
        Self::Aes256Gcm,
        Self::ChaCha20Poly1305,
        Self::Aes128Ccm,
        Self::Aes128Ccm8,
        Self::Aes256Ccm,
    ];

    /// Create from raw byte value
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0xB0 => Some(Self::Aes128Gcm),
            0xB1 => Some(Self::Aes256Gcm),
            0xB2 => Some(Self::ChaCha20Poly1305),
            0xB3 => Some(Self::Aes128Ccm),
            0xB4 => Some(Self::Aes128Ccm8),
            0xB5 => Some(Self::Aes256Ccm),
            _ => None,
        }
    }

    /// Map a TLS 1.3 cipher suite to its record protection algorithm
    #[must_use]
    pub const fn from_tls13_suite(suite: u16) -> Option<Self> {
        match suite {
            0x1301 => Some(Self::Aes128Gcm),
            0x1302 => Some(Self::Aes256Gcm),
            0x1303 => Some(Self::ChaCha20Poly1305),
            0x1304 => Some(Self::Aes128Ccm),
            0x1305 => Some(Self::Aes128Ccm8),
            _ => None,
        }
    }

    /// TLS 1.3 cipher suite value, if the algorithm has one
    #[must_use]
    pub const fn tls13_suite(&self) -> Option<u16> {
        match self {
            Self::Aes128Gcm => Some(0x1301),
            Self::Aes256Gcm => Some(0x1302),
            Self::ChaCha20Poly1305 => Some(0x1303),
            Self::Aes128Ccm => Some(0x1304),
            Self::Aes128Ccm8 => Some(0x1305),
            Self::Aes256Ccm => None,
        }
    }

    /// Engine family
    #[must_use]
    pub const fn family(&self) -> AeadFamily {
        match self {
            Self::Aes128Gcm | Self::Aes256Gcm => AeadFamily::Gcm,
            Self::Aes128Ccm | Self::Aes128Ccm8 | Self::Aes256Ccm => AeadFamily::Ccm,
            Self::ChaCha20Poly1305 => AeadFamily::ChaCha20Poly1305,
        }
    }

    /// Key size in bytes
    #[must_use]
    pub const fn key_size(&self) -> usize {
        match self {
            Self::Aes128Gcm | Self::Aes128Ccm | Self::Aes128Ccm8 => AES128_KEY_SIZE,
            Self::Aes256Gcm | Self::Aes256Ccm => AES256_KEY_SIZE,
            Self::ChaCha20Poly1305 => CHACHA20_KEY_SIZE,
        }
    }

    /// Per-record nonce size in bytes
    #[must_use]
    pub const fn nonce_size(&self) -> usize {
        TLS_AEAD_NONCE_SIZE
    }

    /// Tag size in bytes used on the wire
    #[must_use]
    pub const fn tag_size(&self) -> usize {
        match self {
            Self::Aes128Ccm8 => CCM_DEFAULT_TAG_SIZE,
            _ => MAX_TAG_SIZE,
        }
    }

    /// Human-readable algorithm name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Aes128Gcm => "AES-128-GCM",
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
            Self::Aes128Ccm => "AES-128-CCM",
            Self::Aes128Ccm8 => "AES-128-CCM-8",
            Self::Aes256Ccm => "AES-256-CCM",
        }
    }
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction a cipher instance protects records in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Outgoing records (seal)
    Encrypt,
    /// Incoming records (open)
    Decrypt,
}

impl Direction {
    /// Create from the `for_encryption` flag used by the engines
    #[must_use]
    pub const fn from_encrypting(for_encryption: bool) -> Self {
        if for_encryption {
            Self::Encrypt
        } else {
            Self::Decrypt
        }
    }

    /// Whether this is the sealing direction
    #[must_use]
    pub const fn is_encrypt(&self) -> bool {
        matches!(self, Self::Encrypt)
    }
}
