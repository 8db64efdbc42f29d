// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! GF(2^128) arithmetic in GCM bit order
//!
//! A field element is held as two big-endian 64-bit halves: `n0` is bytes
//! 0..8 of the block and `n1` bytes 8..16. GCM numbers coefficients from the
//! most significant bit of byte 0, so the coefficient of `x^0` is the top
//! bit of `n0` and multiplying by `x` is a right shift.
//!
//! Reduction polynomial: `x^128 + x^7 + x^2 + x + 1`. Its low terms land in
//! the top byte as `0xE1`.
//!
//! Every operation here is branch-free on element values.

use zeroize::Zeroize;

use crate::pack;

/// Low terms of the reduction polynomial in GCM bit order
const E1: u64 = 0xE100_0000_0000_0000;

/// An element of GF(2^128)
#[derive(Clone, Copy, Default, PartialEq, Eq, Zeroize)]
pub struct FieldElement {
    /// Coefficients of `x^0..x^63` (bytes 0..8)
    pub n0: u64,
    /// Coefficients of `x^64..x^127` (bytes 8..16)
    pub n1: u64,
}

impl core::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FieldElement({:016x}{:016x})", self.n0, self.n1)
    }
}

impl FieldElement {
    /// The additive identity
    pub const ZERO: Self = Self { n0: 0, n1: 0 };

    /// The multiplicative identity (`x^0`)
    pub const ONE: Self = Self {
        n0: 1 << 63,
        n1: 0,
    };

    /// Load a block
    #[inline]
    #[must_use]
    pub fn from_bytes(x: &[u8; 16]) -> Self {
        Self {
            n0: pack::be_to_u64(x, 0),
            n1: pack::be_to_u64(x, 8),
        }
    }

    /// Store as a block
    #[inline]
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        self.write_bytes(&mut out);
        out
    }

    /// Store into an existing block
    #[inline]
    pub fn write_bytes(&self, out: &mut [u8; 16]) {
        pack::u64_to_be(self.n0, out, 0);
        pack::u64_to_be(self.n1, out, 8);
    }

    /// Field addition
    #[inline]
    #[must_use]
    pub const fn xor(&self, other: &Self) -> Self {
        Self {
            n0: self.n0 ^ other.n0,
            n1: self.n1 ^ other.n1,
        }
    }

    /// In-place field addition
    #[inline]
    pub fn xor_assign(&mut self, other: &Self) {
        self.n0 ^= other.n0;
        self.n1 ^= other.n1;
    }

    /// Multiply by `x`
    #[inline]
    #[must_use]
    pub const fn multiply_p(&self) -> Self {
        let m = ((self.n1 << 63) as i64 >> 63) as u64;
        Self {
            n0: (self.n0 >> 1) ^ (m & E1),
            n1: (self.n1 >> 1) | (self.n0 << 63),
        }
    }

    /// Multiply by `x^-1`
    #[inline]
    #[must_use]
    pub const fn divide_p(&self) -> Self {
        let m = (self.n0 as i64 >> 63) as u64;
        let x0 = self.n0 ^ (m & E1);
        Self {
            n0: (x0 << 1) | (self.n1 >> 63),
            n1: (self.n1 << 1) | (m & 1),
        }
    }

    /// Multiply by `x^7`
    #[inline]
    #[must_use]
    pub const fn multiply_p7(&self) -> Self {
        let c = self.n1 << 57;
        Self {
            n0: (self.n0 >> 7) ^ c ^ (c >> 1) ^ (c >> 2) ^ (c >> 7),
            n1: (self.n1 >> 7) | (self.n0 << 57),
        }
    }

    /// Multiply by `x^8`
    #[inline]
    #[must_use]
    pub const fn multiply_p8(&self) -> Self {
        let c = self.n1 << 56;
        Self {
            n0: (self.n0 >> 8) ^ c ^ (c >> 1) ^ (c >> 2) ^ (c >> 7),
            n1: (self.n1 >> 8) | (self.n0 << 56),
        }
    }

    /// General multiplication
    ///
    /// Shift-and-add over the 128 bits of `self` with masks in place of
    /// branches (SP 800-38D, Algorithm 1).
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut z = Self::ZERO;
        let mut v = *other;
        for word in [self.n0, self.n1] {
            for bit in (0..64).rev() {
                let m = 0u64.wrapping_sub((word >> bit) & 1);
                z.n0 ^= v.n0 & m;
                z.n1 ^= v.n1 & m;
                v = v.multiply_p();
            }
        }
        z
    }

    /// `self · self`
    #[inline]
    #[must_use]
    pub fn square(&self) -> Self {
        self.multiply(self)
    }
}

/// Multiply two blocks, writing the product into `x`
pub fn multiply_blocks(x: &mut [u8; 16], y: &[u8; 16]) {
    let product = FieldElement::from_bytes(x).multiply(&FieldElement::from_bytes(y));
    product.write_bytes(x);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(s: &str) -> FieldElement {
        let mut b = [0u8; 16];
        hex::decode_to_slice(s, &mut b).unwrap();
        FieldElement::from_bytes(&b)
    }

    const H: &str = "66e94bd4ef8a2c3b884cfa59ca342b2e";

    #[test]
    fn test_bytes_roundtrip() {
        let x = fe("000102030405060708090a0b0c0d0e0f");
        assert_eq!(x.n0, 0x0001_0203_0405_0607);
        assert_eq!(FieldElement::from_bytes(&x.to_bytes()), x);
    }

    #[test]
    fn test_one_is_identity() {
        let h = fe(H);
        assert_eq!(h.multiply(&FieldElement::ONE), h);
        assert_eq!(FieldElement::ONE.multiply(&h), h);
        assert_eq!(h.multiply(&FieldElement::ZERO), FieldElement::ZERO);
    }

    #[test]
    fn test_multiply_p_matches_multiply_by_x() {
        let x_poly = FieldElement { n0: 1 << 62, n1: 0 };
        let mut a = fe(H);
        for _ in 0..200 {
            assert_eq!(a.multiply_p(), a.multiply(&x_poly));
            a = a.multiply_p().xor(&fe("0123456789abcdeffedcba9876543210"));
        }
    }

    #[test]
    fn test_divide_p_inverts_multiply_p() {
        let mut a = fe("80000000000000000000000000000001");
        for _ in 0..300 {
            assert_eq!(a.multiply_p().divide_p(), a);
            assert_eq!(a.divide_p().multiply_p(), a);
            a = a.multiply_p7().xor(&fe(H));
        }
    }

    #[test]
    fn test_multi_shift_variants() {
        let mut a = fe(H);
        for _ in 0..100 {
            let mut p7 = a;
            for _ in 0..7 {
                p7 = p7.multiply_p();
            }
            assert_eq!(a.multiply_p7(), p7);
            assert_eq!(a.multiply_p8(), p7.multiply_p());
            a = a.multiply_p8().xor(&fe("fffffffffffffffffffffffffffffffe"));
        }
    }

    #[test]
    fn test_multiply_commutes() {
        let a = fe(H);
        let b = fe("0388dace60b6a392f328c2b971b2fe78");
        assert_eq!(a.multiply(&b), b.multiply(&a));
    }

    #[test]
    fn test_ghash_single_block() {
        // GHASH_H(C) for the second McGrew-Viega test case, before the
        // length block: S1 = C · H.
        let h = fe(H);
        let c = fe("0388dace60b6a392f328c2b971b2fe78");
        assert_eq!(c.multiply(&h), fe("5e2ec746917062882c85b0685353deb7"));
    }
}
