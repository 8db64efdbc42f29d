// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Fixed-width integer packing
//!
//! Thin wrappers over `from_*_bytes`/`to_*_bytes` that read from and write
//! into offsets of larger buffers. Callers guarantee the ranges are in
//! bounds; all call sites index fixed-size blocks.

/// Read a big-endian `u32` at `off`
#[inline]
#[must_use]
pub fn be_to_u32(bs: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([bs[off], bs[off + 1], bs[off + 2], bs[off + 3]])
}

/// Write a big-endian `u32` at `off`
#[inline]
pub fn u32_to_be(n: u32, bs: &mut [u8], off: usize) {
    bs[off..off + 4].copy_from_slice(&n.to_be_bytes());
}

/// Read a big-endian `u64` at `off`
#[inline]
#[must_use]
pub fn be_to_u64(bs: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bs[off..off + 8]);
    u64::from_be_bytes(b)
}

/// Write a big-endian `u64` at `off`
#[inline]
pub fn u64_to_be(n: u64, bs: &mut [u8], off: usize) {
    bs[off..off + 8].copy_from_slice(&n.to_be_bytes());
}

/// Read a little-endian `u32` at `off`
#[inline]
#[must_use]
pub fn le_to_u32(bs: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([bs[off], bs[off + 1], bs[off + 2], bs[off + 3]])
}

/// Write a little-endian `u32` at `off`
#[inline]
pub fn u32_to_le(n: u32, bs: &mut [u8], off: usize) {
    bs[off..off + 4].copy_from_slice(&n.to_le_bytes());
}

/// Write a little-endian `u64` at `off`
#[inline]
pub fn u64_to_le(n: u64, bs: &mut [u8], off: usize) {
    bs[off..off + 8].copy_from_slice(&n.to_le_bytes());
}

/// XOR `src` into `dst` over their common length
#[inline]
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
