// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Record protection façade
//!
//! [`RecordCipher`] is what the TLS record layer holds per direction. It
//! hides the engine choice behind one call sequence:
//!
//! ```text
//! set_key ─► init_nonce ─► process_associated_data* ─► process_bytes* ─► finalize
//!                 ▲                                                        │
//!                 └──────────────────── next record ───────────────────────┘
//! ```
//!
//! The key passed to `set_key` is held in a zeroizing buffer only until the
//! next `init_nonce` installs it; later records reuse the engine's key
//! schedule.
//!
//! # Security
//!
//! - `finalize` either succeeds completely or zeroes the whole output buffer
//! - Nonce reuse under GCM encryption is rejected and logged
//! - The event log never contains key bytes, nonces or payload

use aead_common::config::{AeadConfig, GcmConfig};
use aead_common::log::EventLog;
use aead_common::types::{AeadAlgorithm, AeadFamily, Direction};
use aead_common::{aead_debug, aead_error, aead_info, aead_trace, aead_warn};

use crate::block_cipher::AesCipher;
use crate::ccm::AesCcm;
use crate::chacha::ChaCha20Poly1305;
use crate::error::{CryptoError, CryptoResult, ErrorKind};
use crate::gcm::{AesGcm, DynGcmMultiplier, GcmEngine};
use crate::traits::{AeadCipher, AeadParameters};
use crate::zeroize_utils::{secure_zero, SecureKey};

const TARGET: &str = "record";

enum Engine {
    Gcm(AesGcm),
    Ccm(AesCcm),
    ChaCha(ChaCha20Poly1305),
}

impl Engine {
    fn new(algorithm: AeadAlgorithm, config: &AeadConfig) -> Self {
        match algorithm.family() {
            AeadFamily::Gcm => Self::Gcm(GcmEngine::new(
                AesCipher::new(),
                DynGcmMultiplier::new(config.gcm.multiplier),
            )),
            AeadFamily::Ccm => Self::Ccm(AesCcm::with_config(&config.ccm)),
            AeadFamily::ChaCha20Poly1305 => {
                Self::ChaCha(ChaCha20Poly1305::new(config.chacha.backend))
            }
        }
    }

    fn aead(&self) -> &dyn AeadCipher {
        match self {
            Self::Gcm(e) => e,
            Self::Ccm(e) => e,
            Self::ChaCha(e) => e,
        }
    }

    fn aead_mut(&mut self) -> &mut dyn AeadCipher {
        match self {
            Self::Gcm(e) => e,
            Self::Ccm(e) => e,
            Self::ChaCha(e) => e,
        }
    }
}

/// One direction of AEAD record protection
pub struct RecordCipher {
    algorithm: AeadAlgorithm,
    direction: Direction,
    gcm_policy: GcmConfig,
    engine: Engine,
    pending_key: Option<SecureKey>,
    key_installed: bool,
    records: u64,
    log: EventLog,
}

impl RecordCipher {
    /// Build a cipher for `algorithm` in one direction
    #[must_use]
    pub fn new(algorithm: AeadAlgorithm, direction: Direction, config: &AeadConfig) -> Self {
        let mut log = EventLog::new(config.log_level);
        aead_info!(log, TARGET, "{} {:?} context created", algorithm, direction);
        Self {
            algorithm,
            direction,
            gcm_policy: config.gcm,
            engine: Engine::new(algorithm, config),
            pending_key: None,
            key_installed: false,
            records: 0,
            log,
        }
    }

    /// Algorithm this context protects records with
    pub const fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }

    /// Direction fixed at construction
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Engine name, e.g. `"AES/GCM"`
    pub fn algorithm_name(&self) -> &'static str {
        self.engine.aead().algorithm_name()
    }

    /// Records successfully finalised
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Events recorded by this context
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// Tag of the last finalised record
    pub fn mac(&self) -> &[u8] {
        self.engine.aead().mac()
    }

    /// Supply a new key, installed at the next [`RecordCipher::init_nonce`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the length does not match the algorithm.
    pub fn set_key(&mut self, key: &[u8]) -> CryptoResult<()> {
        if key.len() != self.algorithm.key_size() {
            aead_warn!(
                self.log,
                TARGET,
                "rejected {}-byte key for {}",
                key.len(),
                self.algorithm
            );
            return Err(CryptoError::InvalidKey);
        }
        self.pending_key = Some(SecureKey::from_slice(key)?);
        aead_info!(self.log, TARGET, "new {}-byte key staged", key.len());
        Ok(())
    }

    /// Start a record
    ///
    /// # Errors
    ///
    /// `InvalidTagSize` if the tag is outside policy, `KeyNotSet` before the
    /// first key, `NonceReuse` when a GCM encrypter sees its last (key,
    /// nonce) pair again, or any engine parameter error.
    pub fn init_nonce(
        &mut self,
        nonce: &[u8],
        tag_size: usize,
        associated_data: Option<&[u8]>,
    ) -> CryptoResult<()> {
        if self.algorithm.family() == AeadFamily::Gcm && !self.gcm_policy.allows_tag_size(tag_size)
        {
            aead_warn!(self.log, TARGET, "tag size {} below policy", tag_size);
            return Err(CryptoError::InvalidTagSize);
        }

        let bits = tag_size * 8;
        let mut params = match &self.pending_key {
            Some(key) => AeadParameters::new(key.as_slice(), bits, nonce),
            None => AeadParameters::reuse_key(bits, nonce),
        };
        if let Some(aad) = associated_data {
            params = params.with_associated_text(aad);
        }

        let result = self.engine.aead_mut().init(self.direction.is_encrypt(), &params);
        match result {
            Ok(()) => {
                if self.pending_key.take().is_some() {
                    self.key_installed = true;
                    aead_info!(self.log, TARGET, "key installed");
                }
                aead_trace!(self.log, TARGET, "record {} started", self.records);
                Ok(())
            }
            Err(e) => {
                if e.kind() == ErrorKind::NonceReuse {
                    aead_error!(self.log, TARGET, "nonce reuse rejected at record {}", self.records);
                } else {
                    aead_warn!(self.log, TARGET, "init failed: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Authenticate additional data for the current record
    ///
    /// # Errors
    ///
    /// `NotInitialized` outside a record, `InvalidState` for ChaCha20-Poly1305
    /// once payload has started.
    pub fn process_associated_data(&mut self, aad: &[u8]) -> CryptoResult<()> {
        self.engine.aead_mut().process_aad(aad)
    }

    /// Process payload, returning bytes written to `out`
    ///
    /// # Errors
    ///
    /// As [`AeadCipher::process_bytes`].
    pub fn process_bytes(&mut self, input: &[u8], out: &mut [u8]) -> CryptoResult<usize> {
        self.engine.aead_mut().process_bytes(input, out)
    }

    fn finalize_inner(&mut self, remaining: &[u8], out: &mut [u8]) -> CryptoResult<usize> {
        let engine = self.engine.aead_mut();
        if out.len() < engine.output_size(remaining.len()) {
            return Err(CryptoError::BufferTooSmall);
        }
        let n = engine.process_bytes(remaining, out)?;
        let m = engine.do_final(&mut out[n..])?;
        Ok(n + m)
    }

    /// Process the rest of the record and finish it
    ///
    /// # Errors
    ///
    /// Any failure zeroes all of `out` before returning the error.
    pub fn finalize(&mut self, remaining: &[u8], out: &mut [u8]) -> CryptoResult<usize> {
        match self.finalize_inner(remaining, out) {
            Ok(len) => {
                aead_debug!(
                    self.log,
                    TARGET,
                    "record {} {}: {} bytes",
                    self.records,
                    if self.direction.is_encrypt() { "sealed" } else { "opened" },
                    len
                );
                self.records += 1;
                Ok(len)
            }
            Err(e) => {
                secure_zero(out);
                if e.kind() == ErrorKind::Authentication {
                    aead_error!(self.log, TARGET, "record {} failed authentication", self.records);
                } else {
                    aead_warn!(self.log, TARGET, "record {} failed: {}", self.records, e);
                }
                Err(e)
            }
        }
    }

    /// Bytes `finalize` would write for `len` more input bytes
    pub fn output_size(&self, len: usize) -> usize {
        self.engine.aead().output_size(len)
    }

    /// Bytes `process_bytes` would write for `len` more input bytes
    pub fn update_output_size(&self, len: usize) -> usize {
        self.engine.aead().update_output_size(len)
    }

    /// Drop the current record
    pub fn reset(&mut self) {
        self.engine.aead_mut().reset();
    }

    /// Seal one record with the algorithm's wire tag size
    ///
    /// # Errors
    ///
    /// `InvalidState` on a decrypting context, otherwise as
    /// [`RecordCipher::init_nonce`] and [`RecordCipher::finalize`].
    pub fn seal(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> CryptoResult<usize> {
        if !self.direction.is_encrypt() {
            return Err(CryptoError::InvalidState);
        }
        self.one_shot(nonce, aad, plaintext, out)
    }

    /// Open one record with the algorithm's wire tag size
    ///
    /// # Errors
    ///
    /// `InvalidState` on an encrypting context, `AuthenticationFailed` for
    /// a forged record, otherwise as [`RecordCipher::init_nonce`].
    pub fn open(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> CryptoResult<usize> {
        if self.direction.is_encrypt() {
            return Err(CryptoError::InvalidState);
        }
        self.one_shot(nonce, aad, ciphertext, out)
    }

    fn one_shot(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        input: &[u8],
        out: &mut [u8],
    ) -> CryptoResult<usize> {
        self.init_nonce(nonce, self.algorithm.tag_size(), None)?;
        self.process_associated_data(aad)?;
        self.finalize(input, out)
    }
}

impl core::fmt::Debug for RecordCipher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordCipher")
            .field("algorithm", &self.algorithm)
            .field("direction", &self.direction)
            .field("key_installed", &self.key_installed)
            .field("key_pending", &self.pending_key.is_some())
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aead_common::log::LogLevel;
    use alloc::format;
    use alloc::vec;

    fn pair(algorithm: AeadAlgorithm) -> (RecordCipher, RecordCipher) {
        let config = AeadConfig::DEFAULT.with_log_level(LogLevel::Trace);
        let key = vec![0x42u8; algorithm.key_size()];
        let mut tx = RecordCipher::new(algorithm, Direction::Encrypt, &config);
        let mut rx = RecordCipher::new(algorithm, Direction::Decrypt, &config);
        tx.set_key(&key).unwrap();
        rx.set_key(&key).unwrap();
        (tx, rx)
    }

    #[test]
    fn test_all_algorithms_roundtrip() {
        for algorithm in AeadAlgorithm::ALL {
            let (mut tx, mut rx) = pair(algorithm);
            for seq in 0u8..3 {
                let nonce = [seq; 12];
                let pt = [seq.wrapping_mul(31); 40];
                let mut ct = vec![0u8; 40 + algorithm.tag_size()];
                let n = tx.seal(&nonce, b"hdr", &pt, &mut ct).unwrap();
                assert_eq!(n, ct.len(), "{algorithm}");
                let mut back = [0u8; 40];
                assert_eq!(rx.open(&nonce, b"hdr", &ct, &mut back).unwrap(), 40);
                assert_eq!(back, pt, "{algorithm}");
            }
            assert_eq!(tx.records(), 3);
            assert_eq!(rx.records(), 3);
        }
    }

    #[test]
    fn test_failed_open_zeroes_output() {
        for algorithm in AeadAlgorithm::ALL {
            let (mut tx, mut rx) = pair(algorithm);
            let mut ct = vec![0u8; 33 + algorithm.tag_size()];
            tx.seal(&[1u8; 12], b"", &[0x11u8; 33], &mut ct).unwrap();
            ct[0] ^= 1;
            let mut out = [0xAAu8; 33];
            assert_eq!(
                rx.open(&[1u8; 12], b"", &ct, &mut out).err(),
                Some(CryptoError::AuthenticationFailed),
                "{algorithm}"
            );
            assert!(out.iter().all(|&b| b == 0), "{algorithm}");
            assert_eq!(rx.log().count_at(LogLevel::Error), 1);
        }
    }

    #[test]
    fn test_gcm_nonce_reuse_logged() {
        let (mut tx, _) = pair(AeadAlgorithm::Aes128Gcm);
        let mut ct = [0u8; 20];
        tx.seal(&[9u8; 12], b"", b"abcd", &mut ct).unwrap();
        assert_eq!(
            tx.seal(&[9u8; 12], b"", b"abcd", &mut ct).err(),
            Some(CryptoError::NonceReuse)
        );
        let last = tx.log().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.contains("nonce reuse"));
    }

    #[test]
    fn test_key_length_checked() {
        let mut tx = RecordCipher::new(
            AeadAlgorithm::Aes256Gcm,
            Direction::Encrypt,
            &AeadConfig::DEFAULT,
        );
        assert_eq!(tx.set_key(&[0u8; 16]).err(), Some(CryptoError::InvalidKey));
        assert_eq!(
            tx.init_nonce(&[0u8; 12], 16, None).err(),
            Some(CryptoError::KeyNotSet)
        );
    }

    #[test]
    fn test_gcm_tag_policy() {
        let (mut tx, _) = pair(AeadAlgorithm::Aes128Gcm);
        assert_eq!(
            tx.init_nonce(&[0u8; 12], 8, None).err(),
            Some(CryptoError::InvalidTagSize)
        );
        assert!(tx.init_nonce(&[0u8; 12], 12, None).is_ok());
    }

    #[test]
    fn test_streaming_through_facade() {
        let (mut tx, mut rx) = pair(AeadAlgorithm::ChaCha20Poly1305);
        let pt: [u8; 70] = core::array::from_fn(|i| i as u8);
        let mut ct = [0u8; 86];
        tx.init_nonce(&[3u8; 12], 16, Some(b"seq")).unwrap();
        tx.process_associated_data(b"type").unwrap();
        let n = tx.process_bytes(&pt[..30], &mut ct).unwrap();
        let n = n + tx.finalize(&pt[30..], &mut ct[n..]).unwrap();
        assert_eq!(n, 86);

        let mut back = [0u8; 70];
        let m = rx.open(&[3u8; 12], b"seqtype", &ct, &mut back).unwrap();
        assert_eq!(m, 70);
        assert_eq!(back, pt);
    }

    #[test]
    fn test_direction_enforced() {
        let (mut tx, mut rx) = pair(AeadAlgorithm::Aes128Ccm);
        let mut out = [0u8; 64];
        assert_eq!(
            tx.open(&[0u8; 12], b"", &[0u8; 20], &mut out).err(),
            Some(CryptoError::InvalidState)
        );
        assert_eq!(
            rx.seal(&[0u8; 12], b"", b"x", &mut out).err(),
            Some(CryptoError::InvalidState)
        );
    }

    #[test]
    fn test_short_output_buffer() {
        let (mut tx, _) = pair(AeadAlgorithm::Aes128Gcm);
        let mut out = [0xFFu8; 10];
        assert_eq!(
            tx.seal(&[0u8; 12], b"", b"abc", &mut out).err(),
            Some(CryptoError::BufferTooSmall)
        );
        assert_eq!(out, [0u8; 10]);
    }

    #[test]
    fn test_debug_hides_key() {
        let (tx, _) = pair(AeadAlgorithm::Aes128Gcm);
        let s = format!("{tx:?}");
        assert!(s.contains("key_pending: true"));
        assert!(!s.contains("42"));
    }

    #[test]
    fn test_log_never_contains_key_bytes() {
        let (mut tx, _) = pair(AeadAlgorithm::Aes256Gcm);
        let mut ct = [0u8; 32];
        tx.seal(&[0u8; 12], b"", b"secret", &mut ct).unwrap();
        for record in tx.log().iter() {
            assert!(!record.message.contains("4242"));
        }
        assert!(tx.log().len() >= 3);
    }
}
