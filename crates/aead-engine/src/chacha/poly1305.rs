// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Poly1305 one-time authenticator (RFC 8439 §2.5)
//!
//! The 130-bit accumulator and the clamped `r` are held in five 26-bit limbs
//! so every product fits in a `u64`. The final reduction selects between
//! `h` and `h - p` with a mask.

use zeroize::{Zeroize, ZeroizeOnDrop};

use aead_common::constants::{POLY1305_KEY_SIZE, POLY1305_TAG_SIZE};

use crate::error::{CryptoError, CryptoResult};
use crate::pack;

const MASK26: u32 = 0x03ff_ffff;

/// Streaming Poly1305
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    s: [u32; 4],
    h: [u32; 5],
    buf: [u8; 16],
    buf_off: usize,
    keyed: bool,
}

impl Poly1305 {
    /// Create an unkeyed authenticator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            r: [0; 5],
            s: [0; 4],
            h: [0; 5],
            buf: [0; 16],
            buf_off: 0,
            keyed: false,
        }
    }

    /// Install a one-time key `r ‖ s` and start a new tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` unless the key is 32 bytes.
    pub fn init(&mut self, key: &[u8]) -> CryptoResult<()> {
        if key.len() != POLY1305_KEY_SIZE {
            return Err(CryptoError::InvalidKey);
        }

        let t0 = pack::le_to_u32(key, 0);
        let t1 = pack::le_to_u32(key, 4);
        let t2 = pack::le_to_u32(key, 8);
        let t3 = pack::le_to_u32(key, 12);

        // Clamp r and split into limbs.
        self.r = [
            t0 & 0x03ff_ffff,
            ((t0 >> 26) | (t1 << 6)) & 0x03ff_ff03,
            ((t1 >> 20) | (t2 << 12)) & 0x03ff_c0ff,
            ((t2 >> 14) | (t3 << 18)) & 0x03f0_3fff,
            (t3 >> 8) & 0x000f_ffff,
        ];
        for i in 0..4 {
            self.s[i] = pack::le_to_u32(key, 16 + i * 4);
        }

        self.keyed = true;
        self.reset();
        Ok(())
    }

    /// Whether a key is installed
    pub const fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Start a new tag under the same key
    pub fn reset(&mut self) {
        self.h = [0; 5];
        self.buf.zeroize();
        self.buf_off = 0;
    }

    /// Forget the key and all state
    pub fn clear(&mut self) {
        self.r.zeroize();
        self.s.zeroize();
        self.reset();
        self.keyed = false;
    }

    fn process_block(&mut self, m: &[u8; 16], hibit: u32) {
        let t0 = pack::le_to_u32(m, 0);
        let t1 = pack::le_to_u32(m, 4);
        let t2 = pack::le_to_u32(m, 8);
        let t3 = pack::le_to_u32(m, 12);

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;
        h0 += t0 & MASK26;
        h1 += ((t0 >> 26) | (t1 << 6)) & MASK26;
        h2 += ((t1 >> 20) | (t2 << 12)) & MASK26;
        h3 += ((t2 >> 14) | (t3 << 18)) & MASK26;
        h4 += (t3 >> 8) | hibit;

        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);
        let (h0, h1, h2, h3, h4) = (
            u64::from(h0),
            u64::from(h1),
            u64::from(h2),
            u64::from(h3),
            u64::from(h4),
        );

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        let mask = u64::from(MASK26);
        let mut c = d0 >> 26;
        let mut n0 = d0 & mask;
        d1 += c;
        c = d1 >> 26;
        let mut n1 = d1 & mask;
        d2 += c;
        c = d2 >> 26;
        let n2 = d2 & mask;
        d3 += c;
        c = d3 >> 26;
        let n3 = d3 & mask;
        d4 += c;
        c = d4 >> 26;
        let n4 = d4 & mask;
        n0 += c * 5;
        c = n0 >> 26;
        n0 &= mask;
        n1 += c;

        self.h = [n0 as u32, n1 as u32, n2 as u32, n3 as u32, n4 as u32];
    }

    /// Absorb message bytes
    pub fn update(&mut self, mut input: &[u8]) {
        if self.buf_off > 0 {
            let take = (16 - self.buf_off).min(input.len());
            self.buf[self.buf_off..self.buf_off + take].copy_from_slice(&input[..take]);
            self.buf_off += take;
            input = &input[take..];
            if self.buf_off < 16 {
                return;
            }
            let block = self.buf;
            self.process_block(&block, 1 << 24);
            self.buf_off = 0;
        }

        let mut chunks = input.chunks_exact(16);
        for chunk in &mut chunks {
            let mut block = [0u8; 16];
            block.copy_from_slice(chunk);
            self.process_block(&block, 1 << 24);
        }

        let rest = chunks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.buf_off = rest.len();
    }

    /// Produce the tag and start over under the same key
    #[must_use]
    pub fn finalize(&mut self) -> [u8; POLY1305_TAG_SIZE] {
        if self.buf_off > 0 {
            let mut block = [0u8; 16];
            block[..self.buf_off].copy_from_slice(&self.buf[..self.buf_off]);
            block[self.buf_off] = 1;
            self.process_block(&block, 0);
            block.zeroize();
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        let mut c = h1 >> 26;
        h1 &= MASK26;
        h2 += c;
        c = h2 >> 26;
        h2 &= MASK26;
        h3 += c;
        c = h3 >> 26;
        h3 &= MASK26;
        h4 += c;
        c = h4 >> 26;
        h4 &= MASK26;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= MASK26;
        h1 += c;

        // g = h + 5 - 2^130
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= MASK26;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= MASK26;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= MASK26;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= MASK26;
        let g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        // Select h if g went negative, g otherwise.
        let mask = (g4 >> 31).wrapping_sub(1);
        let not_mask = !mask;
        h0 = (h0 & not_mask) | (g0 & mask);
        h1 = (h1 & not_mask) | (g1 & mask);
        h2 = (h2 & not_mask) | (g2 & mask);
        h3 = (h3 & not_mask) | (g3 & mask);
        h4 = (h4 & not_mask) | (g4 & mask);

        // Pack to 128 bits and add s.
        let w0 = h0 | (h1 << 26);
        let w1 = (h1 >> 6) | (h2 << 20);
        let w2 = (h2 >> 12) | (h3 << 14);
        let w3 = (h3 >> 18) | (h4 << 8);

        let mut tag = [0u8; POLY1305_TAG_SIZE];
        let mut f = u64::from(w0) + u64::from(self.s[0]);
        pack::u32_to_le(f as u32, &mut tag, 0);
        f = u64::from(w1) + u64::from(self.s[1]) + (f >> 32);
        pack::u32_to_le(f as u32, &mut tag, 4);
        f = u64::from(w2) + u64::from(self.s[2]) + (f >> 32);
        pack::u32_to_le(f as u32, &mut tag, 8);
        f = u64::from(w3) + u64::from(self.s[3]) + (f >> 32);
        pack::u32_to_le(f as u32, &mut tag, 12);

        self.reset();
        tag
    }
}

impl Default for Poly1305 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> [u8; 32] {
        let mut k = [0u8; 32];
        hex::decode_to_slice(s, &mut k).unwrap();
        k
    }

    const RFC_KEY: &str = "85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b";

    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}

    #[test]
    fn test_key_state_zeroized() {
        assert_zeroize_on_drop::<Poly1305>();
        assert_zeroize_on_drop::<crate::chacha::chacha20::ChaCha7539>();
        assert_zeroize_on_drop::<crate::ccm::cbc_mac::CbcMac>();
        assert_zeroize_on_drop::<crate::ccm::ctr::CtrMode>();
        assert_zeroize_on_drop::<crate::gcm::BasicGcmMultiplier>();
        assert_zeroize_on_drop::<crate::gcm::exponentiator::Tables1kGcmExponentiator>();

        let mut mac = Poly1305::new();
        mac.init(&key(RFC_KEY)).unwrap();
        mac.update(b"partial");
        mac.zeroize();
        assert!(!mac.is_keyed());
        assert_eq!((mac.r, mac.s, mac.h, mac.buf_off), ([0; 5], [0; 4], [0; 5], 0));
    }

    #[test]
    fn test_rfc8439_tag() {
        let mut mac = Poly1305::new();
        mac.init(&key(RFC_KEY)).unwrap();
        mac.update(b"Cryptographic Forum Research Group");
        assert_eq!(
            hex::encode(mac.finalize()),
            "a8061dc1305136c6c22b8baf0c0127a9"
        );
    }

    #[test]
    fn test_chunked_update() {
        let msg = b"Cryptographic Forum Research Group";
        let mut mac = Poly1305::new();
        mac.init(&key(RFC_KEY)).unwrap();
        for chunk in msg.chunks(3) {
            mac.update(chunk);
        }
        assert_eq!(
            hex::encode(mac.finalize()),
            "a8061dc1305136c6c22b8baf0c0127a9"
        );
    }

    #[test]
    fn test_finalize_resets_accumulator() {
        let mut mac = Poly1305::new();
        mac.init(&key(RFC_KEY)).unwrap();
        mac.update(b"first message");
        let _ = mac.finalize();
        mac.update(b"Cryptographic Forum Research Group");
        assert_eq!(
            hex::encode(mac.finalize()),
            "a8061dc1305136c6c22b8baf0c0127a9"
        );
    }

    #[test]
    fn test_zero_r_gives_s() {
        // With r = 0 the accumulator stays zero and the tag is s.
        let mut k = [0u8; 32];
        k[16..].copy_from_slice(&[0xAB; 16]);
        let mut mac = Poly1305::new();
        mac.init(&k).unwrap();
        mac.update(&[0xFF; 64]);
        assert_eq!(mac.finalize(), [0xAB; 16]);
    }

    #[test]
    fn test_invalid_key() {
        let mut mac = Poly1305::new();
        assert_eq!(mac.init(&[0u8; 16]).err(), Some(CryptoError::InvalidKey));
        assert!(!mac.is_keyed());
    }
}
