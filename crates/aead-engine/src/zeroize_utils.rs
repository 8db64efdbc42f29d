// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Secure memory utilities
//!
//! Output scrubbing for failed decryptions and a zeroizing holder for raw
//! key bytes waiting to be installed into an engine.

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Securely zero memory, preventing compiler optimization
///
/// Used to wipe plaintext that was written before authentication failed.
#[inline(never)]
#[allow(unsafe_code)]
pub fn secure_zero(data: &mut [u8]) {
    for byte in data.iter_mut() {
        // SAFETY: `byte` is a valid, exclusively borrowed `u8`.
        unsafe {
            ptr::write_volatile(byte, 0);
        }
    }

    compiler_fence(Ordering::SeqCst);
}

/// Largest raw key the engines accept
pub const MAX_KEY_SIZE: usize = 32;

/// Raw key bytes that zeroize on drop
///
/// Holds a 16, 24 or 32 byte key between `set_key` and the next engine
/// initialisation. Never implements `Debug` with contents.
#[derive(Clone)]
pub struct SecureKey {
    data: [u8; MAX_KEY_SIZE],
    len: usize,
}

impl SecureKey {
    /// Copy a key
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if the key is empty or longer
    /// than [`MAX_KEY_SIZE`].
    pub fn from_slice(key: &[u8]) -> CryptoResult<Self> {
        if key.is_empty() || key.len() > MAX_KEY_SIZE {
            return Err(CryptoError::InvalidKey);
        }
        let mut data = [0u8; MAX_KEY_SIZE];
        data[..key.len()].copy_from_slice(key);
        Ok(Self {
            data,
            len: key.len(),
        })
    }

    /// Key bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Key length in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; empty keys are rejected at construction
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for SecureKey {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl core::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecureKey({} bytes)", self.len)
    }
}

impl Zeroize for SecureKey {
    fn zeroize(&mut self) {
        secure_zero(&mut self.data);
        self.len = 0;
    }
}

impl Drop for SecureKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}
