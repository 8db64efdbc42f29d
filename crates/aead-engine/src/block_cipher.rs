// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES block cipher adapter
//!
//! Wraps the RustCrypto `aes` crate behind [`BlockCipher`]. The key size
//! picks AES-128, AES-192 or AES-256. Key schedules are zeroized on drop by
//! the `aes` crate's `zeroize` feature.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};

use crate::error::{CryptoError, CryptoResult};
use crate::traits::BlockCipher;

/// AES with a runtime-selected key size
#[derive(Clone, Default)]
pub enum AesCipher {
    /// No key installed yet
    #[default]
    Unkeyed,
    /// 128-bit key schedule
    Aes128(Aes128),
    /// 192-bit key schedule
    Aes192(Aes192),
    /// 256-bit key schedule
    Aes256(Aes256),
}

impl AesCipher {
    /// Create an unkeyed cipher
    #[must_use]
    pub const fn new() -> Self {
        Self::Unkeyed
    }

    /// Create a cipher keyed with `key`
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` unless the key is 16, 24 or 32 bytes.
    pub fn with_key(key: &[u8]) -> CryptoResult<Self> {
        let mut cipher = Self::new();
        cipher.init(key)?;
        Ok(cipher)
    }

    /// Installed key size in bytes, 0 if unkeyed
    #[must_use]
    pub const fn key_size(&self) -> usize {
        match self {
            Self::Unkeyed => 0,
            Self::Aes128(_) => 16,
            Self::Aes192(_) => 24,
            Self::Aes256(_) => 32,
        }
    }
}

impl BlockCipher for AesCipher {
    fn init(&mut self, key: &[u8]) -> CryptoResult<()> {
        *self = match key.len() {
            16 => Self::Aes128(Aes128::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            24 => Self::Aes192(Aes192::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            32 => Self::Aes256(Aes256::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            _ => return Err(CryptoError::InvalidKey),
        };
        Ok(())
    }

    fn is_keyed(&self) -> bool {
        !matches!(self, Self::Unkeyed)
    }

    fn encrypt_block(&self, block: &mut [u8; 16]) {
        let mut b = Block::from(*block);
        match self {
            Self::Unkeyed => return,
            Self::Aes128(c) => c.encrypt_block(&mut b),
            Self::Aes192(c) => c.encrypt_block(&mut b),
            Self::Aes256(c) => c.encrypt_block(&mut b),
        }
        block.copy_from_slice(&b);
    }

    fn name(&self) -> &'static str {
        "AES"
    }
}
