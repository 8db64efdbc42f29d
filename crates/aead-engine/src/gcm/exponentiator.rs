// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Powers of the hash subkey
//!
//! GCM needs `H^c` only when associated data arrives after payload has
//! started: the AAD hash that was folded in early must be pushed forward by
//! `c` multiplications. Squares `x^(2^i)` are computed on demand and kept, so
//! repeated use with similar lengths costs a handful of multiplications.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::field::FieldElement;
use crate::traits::{constant_time_eq, GcmExponentiator};

/// Enough squares for any `u64` exponent (64 × 16 bytes = 1 KiB)
const MAX_SQUARES: usize = 64;

/// Square-and-multiply over a lazily filled table of `x^(2^i)`
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Tables1kGcmExponentiator {
    squares: [FieldElement; MAX_SQUARES],
    available: usize,
}

impl Tables1kGcmExponentiator {
    /// Create an exponentiator with no base
    #[must_use]
    pub const fn new() -> Self {
        Self {
            squares: [FieldElement::ZERO; MAX_SQUARES],
            available: 0,
        }
    }

    fn ensure_available(&mut self, bit: usize) {
        while self.available <= bit {
            let next = self.squares[self.available - 1].square();
            self.squares[self.available] = next;
            self.available += 1;
        }
    }
}

impl Default for Tables1kGcmExponentiator {
    fn default() -> Self {
        Self::new()
    }
}

impl GcmExponentiator for Tables1kGcmExponentiator {
    fn init(&mut self, x: &[u8; 16]) {
        if self.available > 0 {
            let mut current = self.squares[0].to_bytes();
            let same = constant_time_eq(&current, x);
            current.zeroize();
            if same {
                return;
            }
        }
        self.squares.zeroize();
        self.squares[0] = FieldElement::from_bytes(x);
        self.available = 1;
    }

    fn exponentiate_x(&mut self, pow: u64, output: &mut [u8; 16]) {
        let mut y = FieldElement::ONE;
        if self.available > 0 {
            let mut pow = pow;
            let mut bit = 0;
            while pow > 0 {
                if pow & 1 != 0 {
                    self.ensure_available(bit);
                    y = y.multiply(&self.squares[bit]);
                }
                bit += 1;
                pow >>= 1;
            }
        }
        y.write_bytes(output);
    }
}
