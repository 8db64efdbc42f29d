// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! GHASH multipliers
//!
//! Three interchangeable implementations of `x · H`:
//!
//! | Type | Tables | Lookups per block |
//! |------|--------|-------------------|
//! | [`BasicGcmMultiplier`] | none | 128 shift-and-add steps |
//! | [`Tables8kGcmMultiplier`] | 32 × 16 entries | 32 |
//! | [`Tables2x256GcmMultiplier`] | 2 × 256 entries | 16, plus a 16-bit reduction per pair |
//!
//! The basic multiplier defines correctness; both table multipliers are
//! tested against it. [`DynGcmMultiplier`] picks one at runtime from
//! [`GcmMultiplierKind`].

use alloc::boxed::Box;
use zeroize::{Zeroize, ZeroizeOnDrop};

use aead_common::config::GcmMultiplierKind;

use super::field::FieldElement;
use crate::traits::{constant_time_eq, GcmMultiplier};

// ============================================================================
// Reference multiplier
// ============================================================================

/// Bit-serial multiplier with no precomputation
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct BasicGcmMultiplier {
    h: FieldElement,
}

impl BasicGcmMultiplier {
    /// Create an uninitialised multiplier
    #[must_use]
    pub const fn new() -> Self {
        Self {
            h: FieldElement::ZERO,
        }
    }
}

impl GcmMultiplier for BasicGcmMultiplier {
    fn init(&mut self, h: &[u8; 16]) {
        self.h = FieldElement::from_bytes(h);
    }

    fn multiply_h(&self, x: &mut [u8; 16]) {
        let product = FieldElement::from_bytes(x).multiply(&self.h);
        product.write_bytes(x);
    }
}

// ============================================================================
// Nibble tables
// ============================================================================

type NibbleTables = [[FieldElement; 16]; 32];

/// Thirty-two 16-entry tables, one per nibble position of the input
///
/// Table `2i` covers the low nibble of byte `i`, table `2i + 1` the high
/// nibble. Entry `j` holds `H` times the polynomial that nibble value `j`
/// contributes at that position, so a product is the XOR of 32 entries.
pub struct Tables8kGcmMultiplier {
    h: Option<[u8; 16]>,
    m: Box<NibbleTables>,
}

impl Tables8kGcmMultiplier {
    /// Allocate empty tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            h: None,
            m: Box::new([[FieldElement::ZERO; 16]; 32]),
        }
    }
}

impl Default for Tables8kGcmMultiplier {
    fn default() -> Self {
        Self::new()
    }
}

impl GcmMultiplier for Tables8kGcmMultiplier {
    fn init(&mut self, h: &[u8; 16]) {
        if let Some(current) = &self.h {
            if constant_time_eq(current, h) {
                return;
            }
        }
        self.h = Some(*h);

        let m = &mut *self.m;

        // Byte 0: high nibble in table 1, low nibble in table 0. Nibble
        // value 8 is the leading bit, so M[1][8] = H and each halving of the
        // index is one more factor of x.
        m[1][8] = FieldElement::from_bytes(h);
        for j in [4usize, 2, 1] {
            m[1][j] = m[1][j + j].multiply_p();
        }
        m[0][8] = m[1][1].multiply_p();
        for j in [4usize, 2, 1] {
            m[0][j] = m[0][j + j].multiply_p();
        }

        for i in 0..32 {
            if i >= 2 {
                // Two tables further on is one byte later: a factor of x^8.
                for j in [8usize, 4, 2, 1] {
                    m[i][j] = m[i - 2][j].multiply_p8();
                }
            }
            m[i][0] = FieldElement::ZERO;
            for j in [2usize, 4, 8] {
                for k in 1..j {
                    m[i][j + k] = m[i][j].xor(&m[i][k]);
                }
            }
        }
    }

    fn multiply_h(&self, x: &mut [u8; 16]) {
        let m = &*self.m;
        let mut z = FieldElement::ZERO;
        for i in (0..16).rev() {
            let b = x[i] as usize;
            z.xor_assign(&m[i + i][b & 0x0F]);
            z.xor_assign(&m[i + i + 1][b >> 4]);
        }
        z.write_bytes(x);
    }
}

impl Drop for Tables8kGcmMultiplier {
    fn drop(&mut self) {
        let tables: &mut NibbleTables = &mut self.m;
        tables.zeroize();
        if let Some(h) = self.h.as_mut() {
            h.zeroize();
        }
    }
}

// ============================================================================
// Byte-pair tables
// ============================================================================

type ByteTables = [[FieldElement; 256]; 2];

/// Two 256-entry tables consumed a byte pair at a time
///
/// `T0[b]` is `H` times the polynomial of byte `b` in position 0 and `T1`
/// is `T0 · x^8`. The accumulator is shifted by 16 bits per pair with the
/// overflow folded back in directly.
pub struct Tables2x256GcmMultiplier {
    h: Option<[u8; 16]>,
    t: Box<ByteTables>,
}

impl Tables2x256GcmMultiplier {
    /// Allocate empty tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            h: None,
            t: Box::new([[FieldElement::ZERO; 256]; 2]),
        }
    }
}

impl Default for Tables2x256GcmMultiplier {
    fn default() -> Self {
        Self::new()
    }
}

impl GcmMultiplier for Tables2x256GcmMultiplier {
    fn init(&mut self, h: &[u8; 16]) {
        if let Some(current) = &self.h {
            if constant_time_eq(current, h) {
                return;
            }
        }
        self.h = Some(*h);

        let t = &mut *self.t;
        t[0][1] = FieldElement::from_bytes(h).multiply_p7();
        t[1][1] = t[0][1].multiply_p8();

        for table in t.iter_mut() {
            table[0] = FieldElement::ZERO;
            for n in 1..128 {
                table[n << 1] = table[n].divide_p();
                table[(n << 1) + 1] = table[n << 1].xor(&table[1]);
            }
        }
    }

    fn multiply_h(&self, x: &mut [u8; 16]) {
        let [t0, t1] = &*self.t;

        let (u, v) = (x[14] as usize, x[15] as usize);
        let mut z1 = t0[u].n1 ^ t1[v].n1;
        let mut z0 = t0[u].n0 ^ t1[v].n0;

        for i in (0..=12).rev().step_by(2) {
            let (u, v) = (x[i] as usize, x[i + 1] as usize);
            let c = z1 << 48;
            z1 = t0[u].n1 ^ t1[v].n1 ^ ((z1 >> 16) | (z0 << 48));
            z0 = t0[u].n0 ^ t1[v].n0 ^ (z0 >> 16) ^ c ^ (c >> 1) ^ (c >> 2) ^ (c >> 7);
        }

        FieldElement { n0: z0, n1: z1 }.write_bytes(x);
    }
}

impl Drop for Tables2x256GcmMultiplier {
    fn drop(&mut self) {
        let tables: &mut ByteTables = &mut self.t;
        tables.zeroize();
        if let Some(h) = self.h.as_mut() {
            h.zeroize();
        }
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Multiplier chosen from configuration
pub enum DynGcmMultiplier {
    /// Reference implementation
    Basic(BasicGcmMultiplier),
    /// Nibble tables
    Tables8k(Tables8kGcmMultiplier),
    /// Byte-pair tables
    Tables2x256(Tables2x256GcmMultiplier),
}

impl DynGcmMultiplier {
    /// Build the multiplier for `kind`
    #[must_use]
    pub fn new(kind: GcmMultiplierKind) -> Self {
        match kind {
            GcmMultiplierKind::Basic => Self::Basic(BasicGcmMultiplier::new()),
            GcmMultiplierKind::Tables8k => Self::Tables8k(Tables8kGcmMultiplier::new()),
            GcmMultiplierKind::Tables2x256 => Self::Tables2x256(Tables2x256GcmMultiplier::new()),
        }
    }

    /// Which implementation is in use
    #[must_use]
    pub const fn kind(&self) -> GcmMultiplierKind {
        match self {
            Self::Basic(_) => GcmMultiplierKind::Basic,
            Self::Tables8k(_) => GcmMultiplierKind::Tables8k,
            Self::Tables2x256(_) => GcmMultiplierKind::Tables2x256,
        }
    }
}

impl Default for DynGcmMultiplier {
    fn default() -> Self {
        Self::new(GcmMultiplierKind::Tables8k)
    }
}

impl GcmMultiplier for DynGcmMultiplier {
    fn init(&mut self, h: &[u8; 16]) {
        match self {
            Self::Basic(m) => m.init(h),
            Self::Tables8k(m) => m.init(h),
            Self::Tables2x256(m) => m.init(h),
        }
    }

    #[inline]
    fn multiply_h(&self, x: &mut [u8; 16]) {
        match self {
            Self::Basic(m) => m.multiply_h(x),
            Self::Tables8k(m) => m.multiply_h(x),
            Self::Tables2x256(m) => m.multiply_h(x),
        }
    }
}
