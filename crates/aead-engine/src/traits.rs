// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core engine traits
//!
//! These traits are the seams between the layers of the crate:
//!
//! 1. [`BlockCipher`]: a keyed 128-bit permutation (AES)
//! 2. [`GcmMultiplier`] / [`GcmExponentiator`]: GHASH field arithmetic
//! 3. [`AeadCipher`]: the streaming AEAD contract every engine implements
//!
//! Table-driven and wide implementations sit behind the same trait as their
//! reference counterpart, so they can be swapped and cross-checked.

use crate::error::CryptoResult;

/// A 128-bit block cipher used in the forward direction only
///
/// GCM and CCM never call the inverse permutation.
pub trait BlockCipher {
    /// Install a key, replacing any previous key schedule
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if the key length is not supported.
    fn init(&mut self, key: &[u8]) -> CryptoResult<()>;

    /// Whether a key schedule is installed
    fn is_keyed(&self) -> bool;

    /// Encrypt one block in place
    ///
    /// Engines only call this after a successful [`BlockCipher::init`]; an
    /// unkeyed cipher leaves the block untouched.
    fn encrypt_block(&self, block: &mut [u8; 16]);

    /// Algorithm name, e.g. `"AES"`
    fn name(&self) -> &'static str;
}

/// Multiplication by a fixed hash subkey `H` in GF(2^128)
pub trait GcmMultiplier {
    /// Precompute for `H`; re-initialising with the same `H` is a no-op
    fn init(&mut self, h: &[u8; 16]);

    /// Replace `x` with `x · H`
    fn multiply_h(&self, x: &mut [u8; 16]);
}

/// Powers of a fixed field element, used to fold late AAD into GHASH
pub trait GcmExponentiator {
    /// Set the base `x`
    fn init(&mut self, x: &[u8; 16]);

    /// Write `x^pow` to `output`
    fn exponentiate_x(&mut self, pow: u64, output: &mut [u8; 16]);
}

/// Parameters for (re)initialising an AEAD engine
#[derive(Clone, Copy)]
pub struct AeadParameters<'a> {
    /// New key, or `None` to keep the installed key schedule
    pub key: Option<&'a [u8]>,
    /// Nonce (IV)
    pub nonce: &'a [u8],
    /// Tag length in bits
    pub mac_size_bits: usize,
    /// Associated data authenticated before anything passed to `process_aad`
    pub associated_text: Option<&'a [u8]>,
}

impl<'a> AeadParameters<'a> {
    /// Parameters with a fresh key
    #[must_use]
    pub const fn new(key: &'a [u8], mac_size_bits: usize, nonce: &'a [u8]) -> Self {
        Self {
            key: Some(key),
            nonce,
            mac_size_bits,
            associated_text: None,
        }
    }

    /// Parameters that keep the key already installed in the engine
    #[must_use]
    pub const fn reuse_key(mac_size_bits: usize, nonce: &'a [u8]) -> Self {
        Self {
            key: None,
            nonce,
            mac_size_bits,
            associated_text: None,
        }
    }

    /// Attach initial associated text
    #[must_use]
    pub const fn with_associated_text(mut self, associated_text: &'a [u8]) -> Self {
        self.associated_text = Some(associated_text);
        self
    }

    /// Tag length in bytes
    #[must_use]
    pub const fn mac_size(&self) -> usize {
        self.mac_size_bits / 8
    }
}

impl core::fmt::Debug for AeadParameters<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Key bytes are never printed.
        f.debug_struct("AeadParameters")
            .field("key", &self.key.map(<[u8]>::len))
            .field("nonce_len", &self.nonce.len())
            .field("mac_size_bits", &self.mac_size_bits)
            .field("associated_text_len", &self.associated_text.map(<[u8]>::len))
            .finish()
    }
}

/// Streaming authenticated encryption with associated data
///
/// Call order per message: [`init`](AeadCipher::init), any number of
/// `process_aad*`, any number of `process_byte*`, then
/// [`do_final`](AeadCipher::do_final). After `do_final` the engine must be
/// initialised again before the next message.
///
/// Output buffers are caller-provided. [`update_output_size`] and
/// [`output_size`] give the exact space each call needs.
///
/// [`update_output_size`]: AeadCipher::update_output_size
/// [`output_size`]: AeadCipher::output_size
pub trait AeadCipher {
    /// Algorithm name, e.g. `"AES/GCM"`
    fn algorithm_name(&self) -> &'static str;

    /// Start a message
    ///
    /// # Errors
    ///
    /// Returns a configuration error for bad key, nonce or tag sizes,
    /// `KeyNotSet` if no key is available, or `NonceReuse` when encrypting
    /// under the previous (key, nonce) pair.
    fn init(&mut self, for_encryption: bool, params: &AeadParameters<'_>) -> CryptoResult<()>;

    /// Add one byte of associated data
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` outside a message.
    fn process_aad_byte(&mut self, input: u8) -> CryptoResult<()> {
        self.process_aad(&[input])
    }

    /// Add associated data
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` outside a message, `InvalidState` if the
    /// engine cannot accept AAD after payload.
    fn process_aad(&mut self, input: &[u8]) -> CryptoResult<()>;

    /// Process one payload byte
    ///
    /// # Errors
    ///
    /// As [`AeadCipher::process_bytes`].
    fn process_byte(&mut self, input: u8, output: &mut [u8]) -> CryptoResult<usize> {
        self.process_bytes(&[input], output)
    }

    /// Process payload bytes, returning the number of bytes written
    ///
    /// # Errors
    ///
    /// Returns `BufferTooSmall`, `NotInitialized` or `CounterExhausted`.
    fn process_bytes(&mut self, input: &[u8], output: &mut [u8]) -> CryptoResult<usize>;

    /// Finish the message, returning the number of bytes written
    ///
    /// Encryption appends the tag. Decryption verifies it and writes the
    /// remaining plaintext.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` on tag mismatch or truncated input.
    fn do_final(&mut self, output: &mut [u8]) -> CryptoResult<usize>;

    /// Tag computed by the last `do_final`
    fn mac(&self) -> &[u8];

    /// Output bytes `process_bytes` would write for `len` more input bytes
    fn update_output_size(&self, len: usize) -> usize;

    /// Output bytes `do_final` would write after `len` more input bytes
    fn output_size(&self, len: usize) -> usize;

    /// Drop per-message state and the stored tag
    fn reset(&mut self);
}

/// Constant-time comparison
///
/// Compares two byte slices in constant time to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
