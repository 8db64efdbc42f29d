// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Galois/Counter Mode (NIST SP 800-38D)
//!
//! A streaming engine: associated data and payload may arrive in pieces of
//! any size and the output is identical to a one-shot computation.
//!
//! # Message phases
//!
//! ```text
//! init ──► AAD ──► payload ──► do_final ──► (finalised; init again)
//!           ▲         │
//!           └─ late ──┘
//! ```
//!
//! AAD supplied after payload has started is still authenticated: the AAD
//! hash used when the payload began is corrected at `do_final` by
//! multiplying the difference with `H^c`.
//!
//! # Security
//!
//! - Encrypting twice under one (key, nonce) pair is rejected. The engine
//!   keeps the last nonce and a SHA3-256 fingerprint of the last key.
//! - Tags are compared in constant time.
//! - A message may use at most `2^32 - 2` counter blocks.

use alloc::vec::Vec;
use sha3::{Digest, Sha3_256};
use zeroize::Zeroize;

use aead_common::config::GcmMultiplierKind;
use aead_common::constants::{
    BLOCK_SIZE, GCM_MAX_BLOCKS_PER_MESSAGE, GCM_MAX_TAG_BITS, GCM_MIN_TAG_BITS,
    GCM_STANDARD_NONCE_SIZE, MAX_TAG_SIZE,
};

use super::exponentiator::Tables1kGcmExponentiator;
use super::field;
use super::multiplier::DynGcmMultiplier;
use crate::block_cipher::AesCipher;
use crate::error::{CryptoError, CryptoResult};
use crate::pack;
use crate::traits::{
    constant_time_eq, AeadCipher, AeadParameters, BlockCipher, GcmExponentiator, GcmMultiplier,
};
use crate::zeroize_utils::secure_zero;

/// GCM over AES with a configurable multiplier
pub type AesGcm = GcmEngine<AesCipher, DynGcmMultiplier>;

/// Fold `data` (at most one block, zero padded) into `y`
#[inline]
fn ghash_partial<M: GcmMultiplier>(m: &M, y: &mut [u8; 16], data: &[u8]) {
    pack::xor_in_place(y, data);
    m.multiply_h(y);
}

fn key_fingerprint(key: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha3_256::digest(key));
    out
}

/// Streaming GCM engine
pub struct GcmEngine<C: BlockCipher, M: GcmMultiplier> {
    cipher: C,
    multiplier: M,
    exponentiator: Tables1kGcmExponentiator,

    for_encryption: bool,
    initialised: bool,
    mac_size: usize,
    last_key_fingerprint: Option<[u8; 32]>,
    nonce: Vec<u8>,
    initial_associated_text: Vec<u8>,

    h: [u8; 16],
    j0: [u8; 16],
    mac_block: [u8; MAX_TAG_SIZE],

    // Payload buffer: one block, plus the candidate tag when decrypting.
    buf_block: [u8; BLOCK_SIZE + MAX_TAG_SIZE],
    buf_off: usize,

    s: [u8; 16],
    s_at: [u8; 16],
    s_at_pre: [u8; 16],
    counter: [u8; 16],
    blocks_remaining: u32,
    total_length: u64,

    at_block: [u8; 16],
    at_block_pos: usize,
    at_length: u64,
    at_length_pre: u64,
}

impl GcmEngine<AesCipher, DynGcmMultiplier> {
    /// AES-GCM using the given multiplier
    #[must_use]
    pub fn with_multiplier(kind: GcmMultiplierKind) -> Self {
        Self::new(AesCipher::new(), DynGcmMultiplier::new(kind))
    }
}

impl Default for GcmEngine<AesCipher, DynGcmMultiplier> {
    fn default() -> Self {
        Self::with_multiplier(GcmMultiplierKind::Tables8k)
    }
}

impl<C: BlockCipher, M: GcmMultiplier> GcmEngine<C, M> {
    /// Create an engine around an (unkeyed) block cipher
    pub fn new(cipher: C, multiplier: M) -> Self {
        Self {
            cipher,
            multiplier,
            exponentiator: Tables1kGcmExponentiator::new(),
            for_encryption: false,
            initialised: false,
            mac_size: MAX_TAG_SIZE,
            last_key_fingerprint: None,
            nonce: Vec::new(),
            initial_associated_text: Vec::new(),
            h: [0u8; 16],
            j0: [0u8; 16],
            mac_block: [0u8; MAX_TAG_SIZE],
            buf_block: [0u8; BLOCK_SIZE + MAX_TAG_SIZE],
            buf_off: 0,
            s: [0u8; 16],
            s_at: [0u8; 16],
            s_at_pre: [0u8; 16],
            counter: [0u8; 16],
            blocks_remaining: GCM_MAX_BLOCKS_PER_MESSAGE,
            total_length: 0,
            at_block: [0u8; 16],
            at_block_pos: 0,
            at_length: 0,
            at_length_pre: 0,
        }
    }

    /// The underlying block cipher
    pub fn underlying_cipher(&self) -> &C {
        &self.cipher
    }

    /// Whether the engine is encrypting
    pub const fn is_encrypting(&self) -> bool {
        self.for_encryption
    }

    /// Whether a message is in progress
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Tag length in bytes for the current message
    pub const fn mac_size(&self) -> usize {
        self.mac_size
    }

    /// Counter blocks still available to the current message
    pub const fn blocks_remaining(&self) -> u32 {
        self.blocks_remaining
    }

    fn check_status(&self) -> CryptoResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(CryptoError::NotInitialized)
        }
    }

    fn buf_length(&self) -> usize {
        if self.for_encryption {
            BLOCK_SIZE
        } else {
            BLOCK_SIZE + self.mac_size
        }
    }

    fn compute_j0(&mut self) {
        self.j0 = [0u8; 16];
        if self.nonce.len() == GCM_STANDARD_NONCE_SIZE {
            self.j0[..GCM_STANDARD_NONCE_SIZE].copy_from_slice(&self.nonce);
            self.j0[15] = 0x01;
        } else {
            for chunk in self.nonce.chunks(BLOCK_SIZE) {
                ghash_partial(&self.multiplier, &mut self.j0, chunk);
            }
            let mut x = [0u8; 16];
            pack::u64_to_be(self.nonce.len() as u64 * 8, &mut x, 8);
            ghash_partial(&self.multiplier, &mut self.j0, &x);
        }
    }

    /// Clear everything belonging to the current message
    fn reset_message_state(&mut self) {
        self.s.zeroize();
        self.s_at.zeroize();
        self.s_at_pre.zeroize();
        self.at_block.zeroize();
        self.buf_block.zeroize();
        self.at_block_pos = 0;
        self.at_length = 0;
        self.at_length_pre = 0;
        self.counter = self.j0;
        self.blocks_remaining = GCM_MAX_BLOCKS_PER_MESSAGE;
        self.buf_off = 0;
        self.total_length = 0;
    }

    /// Leave the message: state cleared, tag kept, new `init` required
    fn finish(&mut self) {
        self.reset_message_state();
        self.initialised = false;
    }

    fn absorb_aad(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            let take = (BLOCK_SIZE - self.at_block_pos).min(input.len());
            self.at_block[self.at_block_pos..self.at_block_pos + take]
                .copy_from_slice(&input[..take]);
            self.at_block_pos += take;
            input = &input[take..];

            if self.at_block_pos == BLOCK_SIZE {
                ghash_partial(&self.multiplier, &mut self.s_at, &self.at_block);
                self.at_block_pos = 0;
                self.at_length += BLOCK_SIZE as u64;
            }
        }
    }

    fn feed_initial_associated_text(&mut self) {
        let aad = core::mem::take(&mut self.initial_associated_text);
        self.absorb_aad(&aad);
        self.initial_associated_text = aad;
    }

    /// Freeze the AAD hash at the first payload block
    fn init_cipher(&mut self) {
        if self.at_length > 0 {
            self.s_at_pre = self.s_at;
            self.at_length_pre = self.at_length;
        }

        if self.at_block_pos > 0 {
            ghash_partial(
                &self.multiplier,
                &mut self.s_at_pre,
                &self.at_block[..self.at_block_pos],
            );
            self.at_length_pre += self.at_block_pos as u64;
        }

        if self.at_length_pre > 0 {
            self.s = self.s_at_pre;
        }
    }

    fn next_ctr_block(&mut self) -> CryptoResult<[u8; 16]> {
        if self.blocks_remaining == 0 {
            return Err(CryptoError::CounterExhausted);
        }
        self.blocks_remaining -= 1;

        let c = pack::be_to_u32(&self.counter, 12).wrapping_add(1);
        pack::u32_to_be(c, &mut self.counter, 12);

        let mut block = self.counter;
        self.cipher.encrypt_block(&mut block);
        Ok(block)
    }

    fn process_block(&mut self, block: &[u8; 16], output: &mut [u8]) -> CryptoResult<()> {
        if self.total_length == 0 {
            self.init_cipher();
        }

        let mut ctr = self.next_ctr_block()?;
        if self.for_encryption {
            pack::xor_in_place(&mut ctr, block);
            ghash_partial(&self.multiplier, &mut self.s, &ctr);
            output[..BLOCK_SIZE].copy_from_slice(&ctr);
        } else {
            ghash_partial(&self.multiplier, &mut self.s, block);
            for ((o, k), c) in output[..BLOCK_SIZE].iter_mut().zip(&ctr).zip(block) {
                *o = k ^ c;
            }
        }

        self.total_length += BLOCK_SIZE as u64;
        Ok(())
    }

    fn process_partial(&mut self, len: usize, output: &mut [u8]) -> CryptoResult<()> {
        let ctr = self.next_ctr_block()?;
        let mut block = [0u8; 16];
        block[..len].copy_from_slice(&self.buf_block[..len]);

        if self.for_encryption {
            pack::xor_in_place(&mut block[..len], &ctr);
            ghash_partial(&self.multiplier, &mut self.s, &block[..len]);
        } else {
            ghash_partial(&self.multiplier, &mut self.s, &block[..len]);
            pack::xor_in_place(&mut block[..len], &ctr);
        }

        output[..len].copy_from_slice(&block[..len]);
        self.total_length += len as u64;
        Ok(())
    }

    /// Correct `S` for associated data that arrived after the payload began
    fn fold_late_aad(&mut self) {
        if self.at_block_pos > 0 {
            ghash_partial(
                &self.multiplier,
                &mut self.s_at,
                &self.at_block[..self.at_block_pos],
            );
        }

        if self.at_length_pre > 0 {
            pack::xor_in_place(&mut self.s_at, &self.s_at_pre);
        }

        // One power of H per full or partial ciphertext block.
        let c = (self.total_length * 8 + 127) >> 7;
        let mut h_c = [0u8; 16];
        self.exponentiator.init(&self.h);
        self.exponentiator.exponentiate_x(c, &mut h_c);

        field::multiply_blocks(&mut self.s_at, &h_c);
        pack::xor_in_place(&mut self.s, &self.s_at);
        h_c.zeroize();
    }

    #[cfg(test)]
    pub(crate) fn set_blocks_remaining(&mut self, blocks: u32) {
        self.blocks_remaining = blocks;
    }
}

impl<C: BlockCipher, M: GcmMultiplier> AeadCipher for GcmEngine<C, M> {
    fn algorithm_name(&self) -> &'static str {
        match self.cipher.name() {
            "AES" => "AES/GCM",
            _ => "GCM",
        }
    }

    fn init(&mut self, for_encryption: bool, params: &AeadParameters<'_>) -> CryptoResult<()> {
        self.initialised = false;

        let bits = params.mac_size_bits;
        if !(GCM_MIN_TAG_BITS..=GCM_MAX_TAG_BITS).contains(&bits) || bits % 8 != 0 {
            return Err(CryptoError::InvalidTagSize);
        }
        if params.nonce.is_empty() {
            return Err(CryptoError::InvalidNonce);
        }

        let fingerprint = params.key.map(key_fingerprint);

        if for_encryption && !self.nonce.is_empty() && self.nonce.as_slice() == params.nonce {
            let same_key = match (&fingerprint, &self.last_key_fingerprint) {
                (None, _) => true,
                (Some(new), Some(last)) => constant_time_eq(new, last),
                (Some(_), None) => false,
            };
            if same_key {
                return Err(CryptoError::NonceReuse);
            }
        }

        if let Some(key) = params.key {
            self.cipher.init(key)?;
            self.h = [0u8; 16];
            self.cipher.encrypt_block(&mut self.h);
            self.multiplier.init(&self.h);
            self.last_key_fingerprint = fingerprint;
        } else if !self.cipher.is_keyed() {
            return Err(CryptoError::KeyNotSet);
        }

        self.for_encryption = for_encryption;
        self.mac_size = bits / 8;
        self.mac_block.zeroize();

        self.nonce.clear();
        self.nonce.extend_from_slice(params.nonce);
        self.initial_associated_text.zeroize();
        self.initial_associated_text.clear();
        if let Some(aad) = params.associated_text {
            self.initial_associated_text.extend_from_slice(aad);
        }

        self.compute_j0();
        self.reset_message_state();
        self.initialised = true;
        self.feed_initial_associated_text();
        Ok(())
    }

    fn process_aad(&mut self, input: &[u8]) -> CryptoResult<()> {
        self.check_status()?;
        self.absorb_aad(input);
        Ok(())
    }

    fn process_bytes(&mut self, mut input: &[u8], output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;
        if output.len() < self.update_output_size(input.len()) {
            return Err(CryptoError::BufferTooSmall);
        }

        let mut produced = 0;

        if self.for_encryption {
            if self.buf_off > 0 {
                let take = (BLOCK_SIZE - self.buf_off).min(input.len());
                self.buf_block[self.buf_off..self.buf_off + take].copy_from_slice(&input[..take]);
                self.buf_off += take;
                input = &input[take..];

                if self.buf_off == BLOCK_SIZE {
                    let mut block = [0u8; 16];
                    block.copy_from_slice(&self.buf_block[..BLOCK_SIZE]);
                    self.process_block(&block, &mut output[produced..])?;
                    self.buf_off = 0;
                    produced += BLOCK_SIZE;
                }
            }

            let mut chunks = input.chunks_exact(BLOCK_SIZE);
            for chunk in &mut chunks {
                let mut block = [0u8; 16];
                block.copy_from_slice(chunk);
                self.process_block(&block, &mut output[produced..])?;
                produced += BLOCK_SIZE;
            }

            let rest = chunks.remainder();
            if !rest.is_empty() {
                self.buf_block[self.buf_off..self.buf_off + rest.len()].copy_from_slice(rest);
                self.buf_off += rest.len();
            }
        } else {
            // The last mac_size bytes seen might be the tag, so a block is
            // only released once mac_size bytes have arrived after it.
            let buf_length = self.buf_length();
            while !input.is_empty() {
                let take = (buf_length - self.buf_off).min(input.len());
                self.buf_block[self.buf_off..self.buf_off + take].copy_from_slice(&input[..take]);
                self.buf_off += take;
                input = &input[take..];

                if self.buf_off == buf_length {
                    let mut block = [0u8; 16];
                    block.copy_from_slice(&self.buf_block[..BLOCK_SIZE]);
                    self.process_block(&block, &mut output[produced..])?;
                    self.buf_block.copy_within(BLOCK_SIZE..buf_length, 0);
                    self.buf_off = self.mac_size;
                    produced += BLOCK_SIZE;
                }
            }
        }

        Ok(produced)
    }

    fn do_final(&mut self, output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;

        let mut extra = self.buf_off;
        if self.for_encryption {
            if output.len() < extra + self.mac_size {
                return Err(CryptoError::BufferTooSmall);
            }
        } else {
            if extra < self.mac_size {
                self.finish();
                return Err(CryptoError::AuthenticationFailed);
            }
            extra -= self.mac_size;
            if output.len() < extra {
                return Err(CryptoError::BufferTooSmall);
            }
        }

        if self.total_length == 0 {
            self.init_cipher();
        }

        if extra > 0 {
            if let Err(e) = self.process_partial(extra, output) {
                self.finish();
                return Err(e);
            }
        }

        self.at_length += self.at_block_pos as u64;
        if self.at_length > self.at_length_pre {
            self.fold_late_aad();
        }

        let mut x = [0u8; 16];
        pack::u64_to_be(self.at_length * 8, &mut x, 0);
        pack::u64_to_be(self.total_length * 8, &mut x, 8);
        ghash_partial(&self.multiplier, &mut self.s, &x);

        let mut tag = self.j0;
        self.cipher.encrypt_block(&mut tag);
        pack::xor_in_place(&mut tag, &self.s);

        let mac_size = self.mac_size;
        self.mac_block.zeroize();
        self.mac_block[..mac_size].copy_from_slice(&tag[..mac_size]);
        tag.zeroize();

        let result = if self.for_encryption {
            output[extra..extra + mac_size].copy_from_slice(&self.mac_block[..mac_size]);
            extra + mac_size
        } else {
            let received = &self.buf_block[extra..extra + mac_size];
            if !constant_time_eq(&self.mac_block[..mac_size], received) {
                secure_zero(&mut output[..extra]);
                self.finish();
                return Err(CryptoError::AuthenticationFailed);
            }
            extra
        };

        self.finish();
        Ok(result)
    }

    fn mac(&self) -> &[u8] {
        &self.mac_block[..self.mac_size]
    }

    fn update_output_size(&self, len: usize) -> usize {
        let mut total = len + self.buf_off;
        if !self.for_encryption {
            if total < self.mac_size {
                return 0;
            }
            total -= self.mac_size;
        }
        total - total % BLOCK_SIZE
    }

    fn output_size(&self, len: usize) -> usize {
        let total = len + self.buf_off;
        if self.for_encryption {
            total + self.mac_size
        } else {
            total.saturating_sub(self.mac_size)
        }
    }

    fn reset(&mut self) {
        self.reset_message_state();
        self.mac_block.zeroize();

        // A decrypting engine may reprocess under the same nonce; an
        // encrypting one must be given a new nonce.
        if !self.for_encryption && !self.nonce.is_empty() && self.cipher.is_keyed() {
            self.initialised = true;
            self.feed_initial_associated_text();
        } else {
            self.initialised = false;
        }
    }
}

impl<C: BlockCipher, M: GcmMultiplier> Drop for GcmEngine<C, M> {
    fn drop(&mut self) {
        self.h.zeroize();
        self.j0.zeroize();
        self.mac_block.zeroize();
        self.buf_block.zeroize();
        self.s.zeroize();
        self.s_at.zeroize();
        self.s_at_pre.zeroize();
        self.counter.zeroize();
        self.at_block.zeroize();
        self.initial_associated_text.zeroize();
        if let Some(fp) = self.last_key_fingerprint.as_mut() {
            fp.zeroize();
        }
    }
}
