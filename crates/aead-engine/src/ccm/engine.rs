// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Counter with CBC-MAC (NIST SP 800-38C, RFC 3610)
//!
//! CCM is a packet mode: the first MAC block encodes the payload length, so
//! nothing can be produced until the whole packet is known. Associated data
//! and payload are buffered and processed in `do_final`, or in one call with
//! [`CcmEngine::process_packet`].
//!
//! ```text
//! B0  = flags ‖ nonce ‖ len(P)           flags = Adata | (t-2)/2 << 3 | q-1
//! MAC = CBC-MAC(B0 ‖ enc(len A) ‖ A ‖ pad ‖ P ‖ pad)
//! A0  = (q-1) ‖ nonce ‖ 0                S0 = E(A0), S1.. encrypt P
//! tag = MAC[..t] ^ S0[..t]
//! ```

use alloc::vec::Vec;
use zeroize::Zeroize;

use aead_common::config::CcmConfig;
use aead_common::constants::{
    CCM_DEFAULT_TAG_SIZE, CCM_MAX_NONCE_SIZE, CCM_MAX_TAG_SIZE, CCM_MIN_NONCE_SIZE,
    CCM_MIN_TAG_SIZE, CCM_SHORT_AAD_LIMIT, MAX_TAG_SIZE,
};

use super::cbc_mac::CbcMac;
use super::ctr::CtrMode;
use crate::block_cipher::AesCipher;
use crate::error::{CryptoError, CryptoResult};
use crate::traits::{constant_time_eq, AeadCipher, AeadParameters, BlockCipher};
use crate::zeroize_utils::secure_zero;

/// CCM over AES
pub type AesCcm = CcmEngine<AesCipher>;

/// Packet-mode CCM engine
pub struct CcmEngine<C: BlockCipher> {
    cipher: C,
    max_packet_len: usize,

    for_encryption: bool,
    initialised: bool,
    mac_size: usize,
    mac_block: [u8; MAX_TAG_SIZE],
    nonce: Vec<u8>,
    initial_associated_text: Vec<u8>,
    associated_text: Vec<u8>,
    data: Vec<u8>,
}

impl CcmEngine<AesCipher> {
    /// AES-CCM with the given limits
    #[must_use]
    pub fn with_config(config: &CcmConfig) -> Self {
        Self::new(AesCipher::new(), config)
    }
}

impl Default for CcmEngine<AesCipher> {
    fn default() -> Self {
        Self::with_config(&CcmConfig::DEFAULT)
    }
}

impl<C: BlockCipher> CcmEngine<C> {
    /// Create an engine around an (unkeyed) block cipher
    pub fn new(cipher: C, config: &CcmConfig) -> Self {
        Self {
            cipher,
            max_packet_len: config.max_packet_len,
            for_encryption: false,
            initialised: false,
            mac_size: CCM_DEFAULT_TAG_SIZE,
            mac_block: [0u8; MAX_TAG_SIZE],
            nonce: Vec::new(),
            initial_associated_text: Vec::new(),
            associated_text: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Initialise with a nonce only, using the default 8-byte tag
    ///
    /// # Errors
    ///
    /// As [`AeadCipher::init`].
    pub fn init_with_iv(
        &mut self,
        for_encryption: bool,
        key: Option<&[u8]>,
        nonce: &[u8],
    ) -> CryptoResult<()> {
        let bits = CCM_DEFAULT_TAG_SIZE * 8;
        let params = match key {
            Some(key) => AeadParameters::new(key, bits, nonce),
            None => AeadParameters::reuse_key(bits, nonce),
        };
        self.init(for_encryption, &params)
    }

    /// Whether a message is in progress
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Tag length in bytes
    pub const fn mac_size(&self) -> usize {
        self.mac_size
    }

    fn check_status(&self) -> CryptoResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(CryptoError::NotInitialized)
        }
    }

    fn associated_text_len(&self) -> usize {
        self.initial_associated_text.len() + self.associated_text.len()
    }

    fn clear_buffers(&mut self) {
        self.associated_text.zeroize();
        self.associated_text.clear();
        self.data.zeroize();
        self.data.clear();
    }

    fn finish(&mut self) {
        self.clear_buffers();
        self.initialised = false;
    }

    /// Counter block `A0`
    fn counter_iv(&self) -> [u8; 16] {
        let q = 15 - self.nonce.len();
        let mut iv = [0u8; 16];
        iv[0] = ((q - 1) & 0x07) as u8;
        iv[1..=self.nonce.len()].copy_from_slice(&self.nonce);
        iv
    }

    fn check_packet_len(&self, payload_len: usize) -> CryptoResult<()> {
        let q = 15 - self.nonce.len();
        if q < 4 && (payload_len as u64) >= 1u64 << (8 * q) {
            return Err(CryptoError::PacketTooLarge);
        }
        if payload_len > self.max_packet_len {
            return Err(CryptoError::PacketTooLarge);
        }
        Ok(())
    }

    /// CBC-MAC over `B0`, the encoded associated data and `payload`
    fn calculate_mac(&self, payload: &[u8]) -> [u8; 16] {
        let mut mac = CbcMac::new();
        let aad_len = self.associated_text_len();

        let mut b0 = [0u8; 16];
        if aad_len > 0 {
            b0[0] |= 0x40;
        }
        b0[0] |= ((((self.mac_size - 2) / 2) & 0x07) << 3) as u8;
        b0[0] |= ((15 - self.nonce.len() - 1) & 0x07) as u8;
        b0[1..=self.nonce.len()].copy_from_slice(&self.nonce);

        let mut q = payload.len() as u64;
        for byte in b0[self.nonce.len() + 1..].iter_mut().rev() {
            *byte = (q & 0xFF) as u8;
            q >>= 8;
        }
        mac.update(&self.cipher, &b0);

        if aad_len > 0 {
            let len = aad_len as u64;
            let mut prefix = [0u8; 10];
            let extra = if aad_len < CCM_SHORT_AAD_LIMIT {
                prefix[..2].copy_from_slice(&(len as u16).to_be_bytes());
                2
            } else if len <= u64::from(u32::MAX) {
                prefix[..2].copy_from_slice(&[0xFF, 0xFE]);
                prefix[2..6].copy_from_slice(&(len as u32).to_be_bytes());
                6
            } else {
                prefix[..2].copy_from_slice(&[0xFF, 0xFF]);
                prefix[2..10].copy_from_slice(&len.to_be_bytes());
                10
            };
            mac.update(&self.cipher, &prefix[..extra]);
            mac.update(&self.cipher, &self.initial_associated_text);
            mac.update(&self.cipher, &self.associated_text);

            let used = (extra + aad_len) % 16;
            if used != 0 {
                mac.update(&self.cipher, &[0u8; 16][..16 - used]);
            }
        }

        mac.update(&self.cipher, payload);
        mac.finalize(&self.cipher)
    }

    /// Encrypt or decrypt a whole packet in one call
    ///
    /// Uses the associated data supplied so far but ignores any buffered
    /// payload, and leaves the engine initialised.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `PacketTooLarge`, `BufferTooSmall`, or
    /// `AuthenticationFailed` (with `output` zeroed) when decrypting.
    pub fn process_packet(&mut self, input: &[u8], output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;
        let mac_size = self.mac_size;

        if self.for_encryption {
            self.check_packet_len(input.len())?;
            let out_len = input.len() + mac_size;
            if output.len() < out_len {
                return Err(CryptoError::BufferTooSmall);
            }

            let mut mac = self.calculate_mac(input);
            let mut ctr = CtrMode::new(self.counter_iv());
            let s0 = ctr.next_block(&self.cipher);
            for ((t, m), s) in self.mac_block[..mac_size].iter_mut().zip(&mac).zip(&s0) {
                *t = m ^ s;
            }
            mac.zeroize();

            ctr.apply(&self.cipher, input, &mut output[..input.len()]);
            output[input.len()..out_len].copy_from_slice(&self.mac_block[..mac_size]);
            Ok(out_len)
        } else {
            if input.len() < mac_size {
                return Err(CryptoError::AuthenticationFailed);
            }
            let out_len = input.len() - mac_size;
            self.check_packet_len(out_len)?;
            if output.len() < out_len {
                return Err(CryptoError::BufferTooSmall);
            }

            let (ciphertext, tag) = input.split_at(out_len);
            let mut ctr = CtrMode::new(self.counter_iv());
            let s0 = ctr.next_block(&self.cipher);
            ctr.apply(&self.cipher, ciphertext, &mut output[..out_len]);

            let mut mac = self.calculate_mac(&output[..out_len]);
            let mut expected = [0u8; MAX_TAG_SIZE];
            for ((t, m), s) in expected[..mac_size].iter_mut().zip(&mac).zip(&s0) {
                *t = m ^ s;
            }
            mac.zeroize();

            let ok = constant_time_eq(&expected[..mac_size], tag);
            expected.zeroize();
            if !ok {
                secure_zero(&mut output[..out_len]);
                return Err(CryptoError::AuthenticationFailed);
            }
            self.mac_block[..mac_size].copy_from_slice(tag);
            Ok(out_len)
        }
    }
}

impl<C: BlockCipher> AeadCipher for CcmEngine<C> {
    fn algorithm_name(&self) -> &'static str {
        match self.cipher.name() {
            "AES" => "AES/CCM",
            _ => "CCM",
        }
    }

    fn init(&mut self, for_encryption: bool, params: &AeadParameters<'_>) -> CryptoResult<()> {
        self.initialised = false;

        let bits = params.mac_size_bits;
        let tag = bits / 8;
        if bits % 8 != 0
            || !(CCM_MIN_TAG_SIZE..=CCM_MAX_TAG_SIZE).contains(&tag)
            || tag % 2 != 0
        {
            return Err(CryptoError::InvalidTagSize);
        }
        if !(CCM_MIN_NONCE_SIZE..=CCM_MAX_NONCE_SIZE).contains(&params.nonce.len()) {
            return Err(CryptoError::InvalidNonce);
        }

        if let Some(key) = params.key {
            self.cipher.init(key)?;
        } else if !self.cipher.is_keyed() {
            return Err(CryptoError::KeyNotSet);
        }

        self.for_encryption = for_encryption;
        self.mac_size = tag;
        self.mac_block.zeroize();
        self.nonce.clear();
        self.nonce.extend_from_slice(params.nonce);
        self.initial_associated_text.zeroize();
        self.initial_associated_text.clear();
        if let Some(aad) = params.associated_text {
            self.initial_associated_text.extend_from_slice(aad);
        }

        self.clear_buffers();
        self.initialised = true;
        Ok(())
    }

    fn process_aad(&mut self, input: &[u8]) -> CryptoResult<()> {
        self.check_status()?;
        self.associated_text.extend_from_slice(input);
        Ok(())
    }

    fn process_bytes(&mut self, input: &[u8], _output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;
        self.data.extend_from_slice(input);
        Ok(0)
    }

    fn do_final(&mut self, output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;

        if (self.for_encryption || self.data.len() >= self.mac_size)
            && output.len() < self.output_size(0)
        {
            return Err(CryptoError::BufferTooSmall);
        }

        let data = core::mem::take(&mut self.data);
        let result = self.process_packet(&data, output);
        self.data = data;
        self.finish();
        result
    }

    fn mac(&self) -> &[u8] {
        &self.mac_block[..self.mac_size]
    }

    fn update_output_size(&self, _len: usize) -> usize {
        0
    }

    fn output_size(&self, len: usize) -> usize {
        let total = self.data.len() + len;
        if self.for_encryption {
            total + self.mac_size
        } else {
            total.saturating_sub(self.mac_size)
        }
    }

    fn reset(&mut self) {
        self.clear_buffers();
        self.mac_block.zeroize();
        self.initialised =
            !self.for_encryption && !self.nonce.is_empty() && self.cipher.is_keyed();
    }
}

impl<C: BlockCipher> Drop for CcmEngine<C> {
    fn drop(&mut self) {
        self.mac_block.zeroize();
        self.initial_associated_text.zeroize();
        self.associated_text.zeroize();
        self.data.zeroize();
    }
}
