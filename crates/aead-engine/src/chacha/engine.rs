// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! ChaCha20-Poly1305 AEAD (RFC 8439 §2.8)
//!
//! Keystream block 0 keys Poly1305 and is then discarded; the payload uses
//! blocks 1 onward. The authenticated string is
//!
//! ```text
//! AAD ‖ pad16 ‖ C ‖ pad16 ‖ le64(len AAD) ‖ le64(len C)
//! ```
//!
//! Encryption streams. Decryption holds the ciphertext back until the tag
//! has been checked, so no plaintext is ever released for a forged record.

use alloc::vec::Vec;
use zeroize::Zeroize;

use aead_common::config::ChaChaBackend;
use aead_common::constants::{
    CHACHA20_BLOCK_SIZE, CHACHA20_KEY_SIZE, CHACHA20_NONCE_SIZE, POLY1305_KEY_SIZE,
    POLY1305_TAG_SIZE,
};

use super::chacha20::ChaCha7539;
use super::poly1305::Poly1305;
use crate::error::{CryptoError, CryptoResult};
use crate::pack;
use crate::traits::{constant_time_eq, AeadCipher, AeadParameters};

const ZEROES: [u8; 15] = [0u8; 15];

/// Streaming ChaCha20-Poly1305 engine
pub struct ChaCha20Poly1305 {
    cipher: ChaCha7539,
    mac: Poly1305,

    for_encryption: bool,
    initialised: bool,
    nonce: [u8; CHACHA20_NONCE_SIZE],
    nonce_set: bool,
    initial_associated_text: Vec<u8>,

    aad_len: u64,
    data_len: u64,
    data_started: bool,
    // Ciphertext and tag held back while decrypting.
    buf: Vec<u8>,
    mac_block: [u8; POLY1305_TAG_SIZE],
}

impl ChaCha20Poly1305 {
    /// Create an engine using the given keystream backend
    #[must_use]
    pub fn new(backend: ChaChaBackend) -> Self {
        Self {
            cipher: ChaCha7539::new(backend),
            mac: Poly1305::new(),
            for_encryption: false,
            initialised: false,
            nonce: [0u8; CHACHA20_NONCE_SIZE],
            nonce_set: false,
            initial_associated_text: Vec::new(),
            aad_len: 0,
            data_len: 0,
            data_started: false,
            buf: Vec::new(),
            mac_block: [0u8; POLY1305_TAG_SIZE],
        }
    }

    /// Install a key for subsequent nonce-only initialisations
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` unless the key is 32 bytes.
    pub fn set_key(&mut self, key: &[u8]) -> CryptoResult<()> {
        if key.len() != CHACHA20_KEY_SIZE {
            return Err(CryptoError::InvalidKey);
        }
        self.initialised = false;
        self.cipher.init(Some(key), &[0u8; CHACHA20_NONCE_SIZE])
    }

    /// Keystream backend in use
    pub const fn backend(&self) -> ChaChaBackend {
        self.cipher.backend()
    }

    /// Whether a message is in progress
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    fn check_status(&self) -> CryptoResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(CryptoError::NotInitialized)
        }
    }

    /// Rewind the keystream to the stored nonce and key Poly1305
    fn start_message(&mut self) -> CryptoResult<()> {
        self.cipher.init(None, &self.nonce)?;

        let mut first = [0u8; CHACHA20_BLOCK_SIZE];
        self.cipher.keystream_block(&mut first)?;
        let keyed = self.mac.init(&first[..POLY1305_KEY_SIZE]);
        first.zeroize();
        keyed?;

        self.clear_message();
        self.initialised = true;

        let aad = core::mem::take(&mut self.initial_associated_text);
        self.mac.update(&aad);
        self.aad_len = aad.len() as u64;
        self.initial_associated_text = aad;
        Ok(())
    }

    fn clear_message(&mut self) {
        self.aad_len = 0;
        self.data_len = 0;
        self.data_started = false;
        self.buf.zeroize();
        self.buf.clear();
    }

    fn finish(&mut self) {
        self.clear_message();
        self.mac.clear();
        self.cipher.clear_keystream();
        self.initialised = false;
    }

    fn pad_mac(&mut self, len: u64) {
        let partial = (len % 16) as usize;
        if partial != 0 {
            self.mac.update(&ZEROES[..16 - partial]);
        }
    }

    /// Close the AAD section; idempotent
    fn start_data(&mut self) {
        if !self.data_started {
            self.pad_mac(self.aad_len);
            self.data_started = true;
        }
    }

    fn compute_tag(&mut self) -> [u8; POLY1305_TAG_SIZE] {
        self.pad_mac(self.data_len);
        let mut lengths = [0u8; 16];
        pack::u64_to_le(self.aad_len, &mut lengths, 0);
        pack::u64_to_le(self.data_len, &mut lengths, 8);
        self.mac.update(&lengths);
        self.mac.finalize()
    }
}

impl Default for ChaCha20Poly1305 {
    fn default() -> Self {
        Self::new(ChaChaBackend::Scalar)
    }
}

impl AeadCipher for ChaCha20Poly1305 {
    fn algorithm_name(&self) -> &'static str {
        "ChaCha20Poly1305"
    }

    fn init(&mut self, for_encryption: bool, params: &AeadParameters<'_>) -> CryptoResult<()> {
        self.initialised = false;

        if params.mac_size_bits != POLY1305_TAG_SIZE * 8 {
            return Err(CryptoError::InvalidTagSize);
        }
        if params.nonce.len() != CHACHA20_NONCE_SIZE {
            return Err(CryptoError::InvalidNonce);
        }
        match params.key {
            Some(key) => self.set_key(key)?,
            None if !self.cipher.is_keyed() => return Err(CryptoError::KeyNotSet),
            None => {}
        }

        self.for_encryption = for_encryption;
        self.nonce.copy_from_slice(params.nonce);
        self.nonce_set = true;
        self.mac_block.zeroize();
        self.initial_associated_text.zeroize();
        self.initial_associated_text.clear();
        if let Some(aad) = params.associated_text {
            self.initial_associated_text.extend_from_slice(aad);
        }

        self.start_message()
    }

    fn process_aad(&mut self, input: &[u8]) -> CryptoResult<()> {
        self.check_status()?;
        if self.data_started {
            return Err(CryptoError::InvalidState);
        }
        self.mac.update(input);
        self.aad_len += input.len() as u64;
        Ok(())
    }

    fn process_bytes(&mut self, input: &[u8], output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;
        if input.is_empty() {
            return Ok(0);
        }
        if output.len() < self.update_output_size(input.len()) {
            return Err(CryptoError::BufferTooSmall);
        }

        self.start_data();
        if self.for_encryption {
            let out = &mut output[..input.len()];
            self.cipher.process_bytes(input, out)?;
            self.mac.update(out);
            self.data_len += input.len() as u64;
            Ok(input.len())
        } else {
            self.buf.extend_from_slice(input);
            Ok(0)
        }
    }

    fn do_final(&mut self, output: &mut [u8]) -> CryptoResult<usize> {
        self.check_status()?;

        if self.for_encryption {
            if output.len() < POLY1305_TAG_SIZE {
                return Err(CryptoError::BufferTooSmall);
            }
            self.start_data();
            let tag = self.compute_tag();
            output[..POLY1305_TAG_SIZE].copy_from_slice(&tag);
            self.mac_block = tag;
            self.finish();
            return Ok(POLY1305_TAG_SIZE);
        }

        if self.buf.len() < POLY1305_TAG_SIZE {
            self.finish();
            return Err(CryptoError::AuthenticationFailed);
        }
        let ct_len = self.buf.len() - POLY1305_TAG_SIZE;
        if output.len() < ct_len {
            return Err(CryptoError::BufferTooSmall);
        }

        self.start_data();
        let buf = core::mem::take(&mut self.buf);
        let (ciphertext, received) = buf.split_at(ct_len);
        self.mac.update(ciphertext);
        self.data_len = ct_len as u64;
        let mut expected = self.compute_tag();

        let result = if constant_time_eq(&expected, received) {
            self.mac_block.copy_from_slice(received);
            self.cipher
                .process_bytes(ciphertext, output)
                .map(|()| ct_len)
        } else {
            Err(CryptoError::AuthenticationFailed)
        };

        expected.zeroize();
        self.buf = buf;
        self.finish();
        result
    }

    fn mac(&self) -> &[u8] {
        &self.mac_block
    }

    fn update_output_size(&self, len: usize) -> usize {
        if self.for_encryption {
            len
        } else {
            0
        }
    }

    fn output_size(&self, len: usize) -> usize {
        if self.for_encryption {
            len + POLY1305_TAG_SIZE
        } else {
            (self.buf.len() + len).saturating_sub(POLY1305_TAG_SIZE)
        }
    }

    fn reset(&mut self) {
        self.clear_message();
        self.mac_block.zeroize();
        self.initialised = false;
        if !self.for_encryption
            && self.nonce_set
            && self.cipher.is_keyed()
            && self.start_message().is_err()
        {
            self.finish();
        }
    }
}

impl Drop for ChaCha20Poly1305 {
    fn drop(&mut self) {
        self.buf.zeroize();
        self.initial_associated_text.zeroize();
        self.mac_block.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    fn key() -> Vec<u8> {
        (0x80u8..=0x9f).collect()
    }

    const PLAINTEXT: &[u8] = b"Ladies and Gentlemen of the class of '99: If I could offer you \
only one tip for the future, sunscreen would be it.";

    const NONCE: &str = "070000004041424344454647";
    const AAD: &str = "50515253c0c1c2c3c4c5c6c7";

    fn seal(engine: &mut ChaCha20Poly1305, aad: &[u8], pt: &[u8]) -> Vec<u8> {
        let nonce = unhex(NONCE);
        engine.init(true, &AeadParameters::new(&key(), 128, &nonce)).unwrap();
        engine.process_aad(aad).unwrap();
        let mut out = vec![0u8; engine.output_size(pt.len())];
        let n = engine.process_bytes(pt, &mut out).unwrap();
        let m = engine.do_final(&mut out[n..]).unwrap();
        out.truncate(n + m);
        out
    }

    #[test]
    fn test_rfc8439_aead_vector() {
        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let mut engine = ChaCha20Poly1305::new(backend);
            let out = seal(&mut engine, &unhex(AAD), PLAINTEXT);
            let (ct, tag) = out.split_at(PLAINTEXT.len());
            assert_eq!(hex::encode(&ct[..16]), "d31a8d34648e60db7b86afbc53ef7ec2");
            assert_eq!(hex::encode(tag), "1ae10b594f09e26a7e902ecbd0600691");
            assert_eq!(engine.mac(), tag);
        }
    }

    #[test]
    fn test_roundtrip_and_streaming() {
        let aad = unhex(AAD);
        let mut enc = ChaCha20Poly1305::default();
        let expected = seal(&mut enc, &aad, PLAINTEXT);

        let nonce = unhex(NONCE);
        let mut engine = ChaCha20Poly1305::default();
        engine.init(true, &AeadParameters::new(&key(), 128, &nonce)).unwrap();
        for b in &aad {
            engine.process_aad_byte(*b).unwrap();
        }
        let mut out = vec![0u8; PLAINTEXT.len() + 16];
        let mut off = 0;
        for b in PLAINTEXT {
            off += engine.process_byte(*b, &mut out[off..]).unwrap();
        }
        off += engine.do_final(&mut out[off..]).unwrap();
        assert_eq!(&out[..off], &expected[..]);

        let mut dec = ChaCha20Poly1305::default();
        dec.init(false, &AeadParameters::new(&key(), 128, &nonce)).unwrap();
        dec.process_aad(&aad).unwrap();
        let mut plain = vec![0u8; PLAINTEXT.len()];
        assert_eq!(dec.process_bytes(&expected, &mut plain).unwrap(), 0);
        assert_eq!(dec.do_final(&mut plain).unwrap(), PLAINTEXT.len());
        assert_eq!(&plain[..], PLAINTEXT);
    }

    #[test]
    fn test_forgery_releases_nothing() {
        let aad = unhex(AAD);
        let mut enc = ChaCha20Poly1305::default();
        let mut ct = seal(&mut enc, &aad, PLAINTEXT);
        ct[10] ^= 0x20;

        let mut dec = ChaCha20Poly1305::default();
        dec.init(false, &AeadParameters::new(&key(), 128, &unhex(NONCE)))
            .unwrap();
        dec.process_aad(&aad).unwrap();
        let mut plain = vec![0x77u8; PLAINTEXT.len()];
        dec.process_bytes(&ct, &mut plain).unwrap();
        assert_eq!(
            dec.do_final(&mut plain).err(),
            Some(CryptoError::AuthenticationFailed)
        );
        assert!(plain.iter().all(|&b| b == 0x77));
        assert!(!dec.is_initialised());
    }

    #[test]
    fn test_aad_bit_flip_rejected() {
        let aad = unhex(AAD);
        let mut enc = ChaCha20Poly1305::default();
        let ct = seal(&mut enc, &aad, PLAINTEXT);

        for bit in [0usize, 7, 45, aad.len() * 8 - 1] {
            let mut forged = aad.clone();
            forged[bit / 8] ^= 1 << (bit % 8);
            let mut dec = ChaCha20Poly1305::default();
            dec.init(false, &AeadParameters::new(&key(), 128, &unhex(NONCE))).unwrap();
            dec.process_aad(&forged).unwrap();
            let mut plain = vec![0u8; PLAINTEXT.len()];
            dec.process_bytes(&ct, &mut plain).unwrap();
            assert_eq!(
                dec.do_final(&mut plain).err(),
                Some(CryptoError::AuthenticationFailed),
                "bit {bit}"
            );
            assert!(plain.iter().all(|&b| b == 0));
        }
    }

    fn poly1305_key_block(backend: ChaChaBackend) -> [u8; 64] {
        let mut stream = ChaCha7539::new(backend);
        stream.init(Some(&key()), &unhex(NONCE)).unwrap();
        let mut block0 = [0u8; 64];
        stream.keystream_block(&mut block0).unwrap();
        block0
    }

    #[test]
    fn test_one_time_key_not_retained() {
        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let block0 = poly1305_key_block(backend);
            let holds_key = |engine: &ChaCha20Poly1305| {
                engine
                    .cipher
                    .keystream_buffer()
                    .windows(POLY1305_KEY_SIZE)
                    .any(|w| w == &block0[..POLY1305_KEY_SIZE])
            };

            let mut engine = ChaCha20Poly1305::new(backend);
            engine.init(true, &AeadParameters::new(&key(), 128, &unhex(NONCE))).unwrap();
            assert!(!holds_key(&engine), "{backend:?} after init");

            let mut tag = [0u8; 16];
            engine.do_final(&mut tag).unwrap();
            assert!(!holds_key(&engine), "{backend:?} after do_final");
            assert!(engine.cipher.keystream_buffer().iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_reset_without_key_stays_idle() {
        let mut dec = ChaCha20Poly1305::default();
        dec.reset();
        assert!(!dec.is_initialised());
        assert_eq!(dec.process_aad(b"x").err(), Some(CryptoError::NotInitialized));
    }

    #[test]
    fn test_aad_after_payload_rejected() {
        let mut engine = ChaCha20Poly1305::default();
        engine.init(true, &AeadParameters::new(&key(), 128, &[0u8; 12])).unwrap();
        let mut out = [0u8; 8];
        engine.process_bytes(b"data", &mut out).unwrap();
        assert_eq!(engine.process_aad(b"late").err(), Some(CryptoError::InvalidState));
    }

    #[test]
    fn test_parameter_validation() {
        let mut engine = ChaCha20Poly1305::default();
        assert_eq!(
            engine.init(true, &AeadParameters::reuse_key(128, &[0u8; 12])).err(),
            Some(CryptoError::KeyNotSet)
        );
        assert_eq!(
            engine.init(true, &AeadParameters::new(&key(), 128, &[0u8; 8])).err(),
            Some(CryptoError::InvalidNonce)
        );
        assert_eq!(
            engine.init(true, &AeadParameters::new(&key(), 96, &[0u8; 12])).err(),
            Some(CryptoError::InvalidTagSize)
        );
        assert_eq!(
            engine.init(true, &AeadParameters::new(&[0u8; 16], 128, &[0u8; 12])).err(),
            Some(CryptoError::InvalidKey)
        );
    }

    #[test]
    fn test_set_key_then_nonce_only() {
        let mut a = ChaCha20Poly1305::default();
        let expected = seal(&mut a, b"hdr", b"body");

        let mut b = ChaCha20Poly1305::default();
        b.set_key(&key()).unwrap();
        let params = AeadParameters::reuse_key(128, &[0u8; 0]);
        assert_eq!(b.init(true, &params).err(), Some(CryptoError::InvalidNonce));
        let nonce = unhex(NONCE);
        let params = AeadParameters::reuse_key(128, &nonce).with_associated_text(b"hdr");
        b.init(true, &params).unwrap();
        let mut out = vec![0u8; 4 + 16];
        let n = b.process_bytes(b"body", &mut out).unwrap();
        b.do_final(&mut out[n..]).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_post_condition_and_reset() {
        let mut enc = ChaCha20Poly1305::default();
        let ct = seal(&mut enc, b"", b"xyz");
        assert!(!enc.is_initialised());
        assert_eq!(enc.do_final(&mut [0u8; 16]).err(), Some(CryptoError::NotInitialized));
        enc.reset();
        assert!(!enc.is_initialised());

        let mut dec = ChaCha20Poly1305::default();
        dec.init(false, &AeadParameters::new(&key(), 128, &unhex(NONCE))).unwrap();
        let mut plain = [0u8; 3];
        dec.process_bytes(&ct, &mut plain).unwrap();
        dec.do_final(&mut plain).unwrap();
        dec.reset();
        assert!(dec.is_initialised());
        dec.process_bytes(&ct, &mut plain).unwrap();
        assert_eq!(dec.do_final(&mut plain).unwrap(), 3);
        assert_eq!(&plain, b"xyz");
    }

    #[test]
    fn test_short_input_fails() {
        let mut dec = ChaCha20Poly1305::default();
        dec.init(false, &AeadParameters::new(&key(), 128, &[1u8; 12])).unwrap();
        dec.process_bytes(&[0u8; 15], &mut []).unwrap();
        assert_eq!(dec.do_final(&mut []).err(), Some(CryptoError::AuthenticationFailed));
    }
}
