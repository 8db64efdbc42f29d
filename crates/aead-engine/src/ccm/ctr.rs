// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Counter mode keystream for CCM
//!
//! The whole 16-byte counter block is incremented as one big-endian integer.
//! CCM's length check guarantees the count never leaves the final `q` bytes.

use zeroize::{Zeroize, ZeroizeOnDrop};

use aead_common::constants::BLOCK_SIZE;

use crate::pack;
use crate::traits::BlockCipher;

/// Counter-mode stream over a borrowed block cipher
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CtrMode {
    counter: [u8; 16],
    keystream: [u8; 16],
}

impl CtrMode {
    /// Start counting from `iv`
    #[must_use]
    pub const fn new(iv: [u8; 16]) -> Self {
        Self {
            counter: iv,
            keystream: [0u8; 16],
        }
    }

    /// Current counter block
    pub const fn counter(&self) -> &[u8; 16] {
        &self.counter
    }

    fn increment(&mut self) {
        for byte in self.counter.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }

    /// Encrypt the counter and advance it
    pub fn next_block<C: BlockCipher>(&mut self, cipher: &C) -> [u8; 16] {
        let mut block = self.counter;
        cipher.encrypt_block(&mut block);
        self.increment();
        block
    }

    /// XOR `input` with the keystream into `output`
    ///
    /// A trailing partial block consumes a whole counter value.
    pub fn apply<C: BlockCipher>(&mut self, cipher: &C, input: &[u8], output: &mut [u8]) {
        for (inp, out) in input.chunks(BLOCK_SIZE).zip(output.chunks_mut(BLOCK_SIZE)) {
            self.keystream = self.next_block(cipher);
            out[..inp.len()].copy_from_slice(inp);
            pack::xor_in_place(&mut out[..inp.len()], &self.keystream);
        }
    }
}
