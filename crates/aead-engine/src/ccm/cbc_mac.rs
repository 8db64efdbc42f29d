// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! CBC-MAC with zero padding
//!
//! Only CCM uses this. Its inputs are self-delimiting (the first block
//! encodes the payload length) so plain zero padding is sufficient.

use zeroize::{Zeroize, ZeroizeOnDrop};

use aead_common::constants::BLOCK_SIZE;

use crate::pack;
use crate::traits::BlockCipher;

/// Incremental CBC-MAC state
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CbcMac {
    chain: [u8; 16],
    buf: [u8; 16],
    buf_off: usize,
}

impl CbcMac {
    /// Start a MAC with a zero IV
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chain: [0u8; 16],
            buf: [0u8; 16],
            buf_off: 0,
        }
    }

    /// Absorb bytes
    pub fn update<C: BlockCipher>(&mut self, cipher: &C, mut input: &[u8]) {
        while !input.is_empty() {
            let take = (BLOCK_SIZE - self.buf_off).min(input.len());
            self.buf[self.buf_off..self.buf_off + take].copy_from_slice(&input[..take]);
            self.buf_off += take;
            input = &input[take..];

            // Keep a full block back so finalize always has one to close.
            if self.buf_off == BLOCK_SIZE && !input.is_empty() {
                self.compress(cipher);
            }
        }
    }

    fn compress<C: BlockCipher>(&mut self, cipher: &C) {
        pack::xor_in_place(&mut self.chain, &self.buf);
        cipher.encrypt_block(&mut self.chain);
        self.buf = [0u8; 16];
        self.buf_off = 0;
    }

    /// Pad the last block with zeros and return the full-width MAC
    pub fn finalize<C: BlockCipher>(mut self, cipher: &C) -> [u8; 16] {
        if self.buf_off > 0 {
            self.compress(cipher);
        }
        self.chain
    }
}

impl Default for CbcMac {
    fn default() -> Self {
        Self::new()
    }
}
