// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! ChaCha20 stream cipher (RFC 8439 §2.3, §2.4)
//!
//! State layout (sixteen little-endian words):
//!
//! ```text
//! cccccccc cccccccc cccccccc cccccccc     c = "expand 32-byte k"
//! kkkkkkkk kkkkkkkk kkkkkkkk kkkkkkkk     k = key
//! kkkkkkkk kkkkkkkk kkkkkkkk kkkkkkkk
//! bbbbbbbb nnnnnnnn nnnnnnnn nnnnnnnn     b = block counter, n = nonce
//! ```
//!
//! The block counter is 32 bits. The block with counter `u32::MAX` is the
//! last one; asking for more fails with `CounterExhausted` rather than
//! wrapping onto keystream already used.

use zeroize::{Zeroize, ZeroizeOnDrop};

use aead_common::config::ChaChaBackend;
use aead_common::constants::{CHACHA20_BLOCK_SIZE, CHACHA20_KEY_SIZE, CHACHA20_NONCE_SIZE};

use crate::error::{CryptoError, CryptoResult};
use crate::pack;

const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

const ROUNDS: usize = 20;

/// Blocks produced per call by the wide backend
const LANES: usize = 2;

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

/// One block for the counter currently in `state`
fn block(state: &[u32; 16], out: &mut [u8]) {
    let mut x = *state;
    for _ in 0..ROUNDS / 2 {
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 1, 5, 9, 13);
        quarter_round(&mut x, 2, 6, 10, 14);
        quarter_round(&mut x, 3, 7, 11, 15);
        quarter_round(&mut x, 0, 5, 10, 15);
        quarter_round(&mut x, 1, 6, 11, 12);
        quarter_round(&mut x, 2, 7, 8, 13);
        quarter_round(&mut x, 3, 4, 9, 14);
    }
    for (i, word) in x.iter().enumerate() {
        pack::u32_to_le(word.wrapping_add(state[i]), out, i * 4);
    }
    x.zeroize();
}

// ----------------------------------------------------------------------------
// Wide backend: word i of every lane sits side by side, so each step of the
// quarter round is one operation across all lanes.
// ----------------------------------------------------------------------------

type Lanes = [[u32; LANES]; 16];

#[inline(always)]
fn add(x: &mut Lanes, dst: usize, src: usize) {
    for l in 0..LANES {
        x[dst][l] = x[dst][l].wrapping_add(x[src][l]);
    }
}

#[inline(always)]
fn xor_rotate(x: &mut Lanes, dst: usize, src: usize, bits: u32) {
    for l in 0..LANES {
        x[dst][l] = (x[dst][l] ^ x[src][l]).rotate_left(bits);
    }
}

#[inline(always)]
fn quarter_round_wide(x: &mut Lanes, a: usize, b: usize, c: usize, d: usize) {
    add(x, a, b);
    xor_rotate(x, d, a, 16);
    add(x, c, d);
    xor_rotate(x, b, c, 12);
    add(x, a, b);
    xor_rotate(x, d, a, 8);
    add(x, c, d);
    xor_rotate(x, b, c, 7);
}

/// `LANES` consecutive blocks starting at the counter in `state`
///
/// The caller guarantees the counter does not wrap across lanes.
fn block_wide(state: &[u32; 16], out: &mut [u8]) {
    let mut initial: Lanes = [[0u32; LANES]; 16];
    for (i, word) in state.iter().enumerate() {
        initial[i] = [*word; LANES];
    }
    for l in 0..LANES {
        initial[12][l] = state[12].wrapping_add(l as u32);
    }

    let mut x = initial;
    for _ in 0..ROUNDS / 2 {
        quarter_round_wide(&mut x, 0, 4, 8, 12);
        quarter_round_wide(&mut x, 1, 5, 9, 13);
        quarter_round_wide(&mut x, 2, 6, 10, 14);
        quarter_round_wide(&mut x, 3, 7, 11, 15);
        quarter_round_wide(&mut x, 0, 5, 10, 15);
        quarter_round_wide(&mut x, 1, 6, 11, 12);
        quarter_round_wide(&mut x, 2, 7, 8, 13);
        quarter_round_wide(&mut x, 3, 4, 9, 14);
    }

    for l in 0..LANES {
        let base = l * CHACHA20_BLOCK_SIZE;
        for i in 0..16 {
            pack::u32_to_le(x[i][l].wrapping_add(initial[i][l]), out, base + i * 4);
        }
    }
    x.zeroize();
    initial.zeroize();
}

/// ChaCha20 with a 96-bit nonce and 32-bit block counter
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChaCha7539 {
    state: [u32; 16],
    #[zeroize(skip)]
    backend: ChaChaBackend,
    keystream: [u8; CHACHA20_BLOCK_SIZE * LANES],
    ks_len: usize,
    ks_pos: usize,
    keyed: bool,
    exhausted: bool,
}

impl ChaCha7539 {
    /// Create an unkeyed cipher
    #[must_use]
    pub fn new(backend: ChaChaBackend) -> Self {
        let mut state = [0u32; 16];
        state[..4].copy_from_slice(&SIGMA);
        Self {
            state,
            backend,
            keystream: [0u8; CHACHA20_BLOCK_SIZE * LANES],
            ks_len: 0,
            ks_pos: 0,
            keyed: false,
            exhausted: false,
        }
    }

    /// Keystream backend in use
    pub const fn backend(&self) -> ChaChaBackend {
        self.backend
    }

    /// Whether a key is installed
    pub const fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Install a key (or keep the current one) and a nonce, at block 0
    ///
    /// # Errors
    ///
    /// `InvalidKey`, `InvalidNonce`, or `KeyNotSet` when `key` is `None` and
    /// no key was ever installed.
    pub fn init(&mut self, key: Option<&[u8]>, nonce: &[u8]) -> CryptoResult<()> {
        if let Some(key) = key {
            if key.len() != CHACHA20_KEY_SIZE {
                return Err(CryptoError::InvalidKey);
            }
        } else if !self.keyed {
            return Err(CryptoError::KeyNotSet);
        }
        if nonce.len() != CHACHA20_NONCE_SIZE {
            return Err(CryptoError::InvalidNonce);
        }

        if let Some(key) = key {
            for i in 0..8 {
                self.state[4 + i] = pack::le_to_u32(key, i * 4);
            }
            self.keyed = true;
        }
        for i in 0..3 {
            self.state[13 + i] = pack::le_to_u32(nonce, i * 4);
        }
        self.seek_block(0);
        Ok(())
    }

    /// Counter of the next block to be generated
    pub const fn block_counter(&self) -> u32 {
        self.state[12]
    }

    /// Position the stream at the start of block `counter`
    pub fn seek_block(&mut self, counter: u32) {
        self.state[12] = counter;
        self.keystream.zeroize();
        self.ks_len = 0;
        self.ks_pos = 0;
        self.exhausted = false;
    }

    fn refill(&mut self) -> CryptoResult<()> {
        if self.exhausted {
            return Err(CryptoError::CounterExhausted);
        }

        let counter = self.state[12];
        let blocks = match self.backend {
            ChaChaBackend::Wide if counter != u32::MAX => {
                block_wide(&self.state, &mut self.keystream);
                LANES
            }
            _ => {
                block(&self.state, &mut self.keystream[..CHACHA20_BLOCK_SIZE]);
                1
            }
        };

        let (next, wrapped) = counter.overflowing_add(blocks as u32);
        self.state[12] = next;
        self.exhausted = wrapped;
        self.ks_len = blocks * CHACHA20_BLOCK_SIZE;
        self.ks_pos = 0;
        Ok(())
    }

    /// XOR the keystream into `data`
    ///
    /// # Errors
    ///
    /// Returns `KeyNotSet` before `init`, `CounterExhausted` past the last
    /// block. Bytes before the failure point have been processed.
    pub fn apply_keystream(&mut self, mut data: &mut [u8]) -> CryptoResult<()> {
        if !self.keyed {
            return Err(CryptoError::KeyNotSet);
        }
        while !data.is_empty() {
            if self.ks_pos == self.ks_len {
                self.refill()?;
            }
            let take = (self.ks_len - self.ks_pos).min(data.len());
            let (head, tail) = data.split_at_mut(take);
            pack::xor_in_place(head, &self.keystream[self.ks_pos..self.ks_pos + take]);
            self.ks_pos += take;
            data = tail;
        }
        Ok(())
    }

    /// Encrypt or decrypt `input` into `output`
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` if `output` is shorter than `input`, otherwise as
    /// [`ChaCha7539::apply_keystream`].
    pub fn process_bytes(&mut self, input: &[u8], output: &mut [u8]) -> CryptoResult<()> {
        if output.len() < input.len() {
            return Err(CryptoError::BufferTooSmall);
        }
        let out = &mut output[..input.len()];
        out.copy_from_slice(input);
        self.apply_keystream(out)
    }

    /// The next 64 bytes of raw keystream
    ///
    /// # Errors
    ///
    /// As [`ChaCha7539::apply_keystream`].
    ///
    /// The buffered copy is scrubbed once handed out.
    pub fn keystream_block(&mut self, out: &mut [u8; CHACHA20_BLOCK_SIZE]) -> CryptoResult<()> {
        out.fill(0);
        let result = self.apply_keystream(out);
        self.scrub_consumed();
        result
    }

    /// Zero the part of the keystream buffer already used
    pub fn scrub_consumed(&mut self) {
        self.keystream[..self.ks_pos].zeroize();
    }

    /// Zero the keystream buffer and discard any unused bytes
    ///
    /// The stream resumes at the next block counter.
    pub fn clear_keystream(&mut self) {
        self.keystream.zeroize();
        self.ks_len = 0;
        self.ks_pos = 0;
    }

    #[cfg(test)]
    pub(crate) fn keystream_buffer(&self) -> &[u8] {
        &self.keystream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn key() -> [u8; 32] {
        core::array::from_fn(|i| i as u8)
    }

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn test_rfc8439_block_function() {
        let nonce = unhex("000000090000004a00000000");
        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let mut c = ChaCha7539::new(backend);
            c.init(Some(&key()), &nonce).unwrap();
            c.seek_block(1);
            let mut out = [0u8; 64];
            c.keystream_block(&mut out).unwrap();
            assert_eq!(
                out.to_vec(),
                unhex(
                    "10f1e7e4d13b5915500fdd1fa32071c4c7d1f4c733c068030422aa9ac3d46c4e\
                     d2826446079faa0914c2d705d98b02a2b5129cd1de164eb9cbd083e8a2503c4e"
                ),
                "{backend:?}"
            );
            assert_eq!(c.block_counter(), if backend == ChaChaBackend::Wide { 3 } else { 2 });
        }
    }

    #[test]
    fn test_wide_matches_scalar() {
        let nonce = [7u8; 12];
        let mut scalar = ChaCha7539::new(ChaChaBackend::Scalar);
        let mut wide = ChaCha7539::new(ChaChaBackend::Wide);
        scalar.init(Some(&key()), &nonce).unwrap();
        wide.init(Some(&key()), &nonce).unwrap();

        let mut a = vec![0u8; 1000];
        let mut b = vec![0u8; 1000];
        // Uneven chunks exercise partial use of the two-block buffer.
        let mut off = 0;
        for len in [3usize, 64, 61, 128, 200, 1, 543] {
            scalar.apply_keystream(&mut a[off..off + len]).unwrap();
            wide.apply_keystream(&mut b[off..off + len]).unwrap();
            off += len;
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_counter_exhaustion() {
        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let mut c = ChaCha7539::new(backend);
            c.init(Some(&key()), &[0u8; 12]).unwrap();
            c.seek_block(u32::MAX - 1);
            let mut data = [0u8; 128];
            c.apply_keystream(&mut data).unwrap();
            let mut one = [0u8; 1];
            assert_eq!(
                c.apply_keystream(&mut one).err(),
                Some(CryptoError::CounterExhausted),
                "{backend:?}"
            );
        }
    }

    #[test]
    fn test_last_block_is_usable() {
        let mut c = ChaCha7539::new(ChaChaBackend::Wide);
        c.init(Some(&key()), &[0u8; 12]).unwrap();
        c.seek_block(u32::MAX);
        let mut out = [0u8; 64];
        c.keystream_block(&mut out).unwrap();
        assert_eq!(c.block_counter(), 0);
        assert_eq!(c.keystream_block(&mut out).err(), Some(CryptoError::CounterExhausted));
    }

    #[test]
    fn test_parameter_errors() {
        let mut c = ChaCha7539::new(ChaChaBackend::Scalar);
        assert_eq!(c.init(None, &[0u8; 12]).err(), Some(CryptoError::KeyNotSet));
        assert_eq!(c.init(Some(&[0u8; 16]), &[0u8; 12]).err(), Some(CryptoError::InvalidKey));
        assert_eq!(c.init(Some(&key()), &[0u8; 8]).err(), Some(CryptoError::InvalidNonce));
        let mut buf = [0u8; 4];
        assert_eq!(c.apply_keystream(&mut buf).err(), Some(CryptoError::KeyNotSet));
        c.init(Some(&key()), &[0u8; 12]).unwrap();
        assert_eq!(
            c.process_bytes(&[0u8; 5], &mut buf).err(),
            Some(CryptoError::BufferTooSmall)
        );
    }

    #[test]
    fn test_keystream_block_scrubbed() {
        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let mut c = ChaCha7539::new(backend);
            c.init(Some(&key()), &[2u8; 12]).unwrap();
            let mut out = [0u8; 64];
            c.keystream_block(&mut out).unwrap();
            assert!(c.keystream_buffer()[..64].iter().all(|&b| b == 0), "{backend:?}");

            // The second wide lane is still live and must continue the stream.
            let mut next = [0u8; 64];
            c.keystream_block(&mut next).unwrap();
            let mut reference = ChaCha7539::new(ChaChaBackend::Scalar);
            reference.init(Some(&key()), &[2u8; 12]).unwrap();
            reference.seek_block(1);
            let mut expected = [0u8; 64];
            reference.keystream_block(&mut expected).unwrap();
            assert_eq!(next, expected, "{backend:?}");
        }
    }

    #[test]
    fn test_clear_keystream_resumes_at_next_block() {
        let mut c = ChaCha7539::new(ChaChaBackend::Wide);
        c.init(Some(&key()), &[3u8; 12]).unwrap();
        let mut data = [0u8; 10];
        c.apply_keystream(&mut data).unwrap();
        c.clear_keystream();
        assert!(c.keystream_buffer().iter().all(|&b| b == 0));
        assert_eq!(c.block_counter(), 2);
    }

    #[test]
    fn test_rekey_with_nonce_only() {
        let mut c = ChaCha7539::new(ChaChaBackend::Scalar);
        c.init(Some(&key()), &[1u8; 12]).unwrap();
        let mut first = [0u8; 64];
        c.keystream_block(&mut first).unwrap();
        c.init(None, &[1u8; 12]).unwrap();
        let mut again = [0u8; 64];
        c.keystream_block(&mut again).unwrap();
        assert_eq!(first, again);
    }
}
