// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cryptographic error types
//!
//! Engine errors fall into four kinds. Only [`ErrorKind::Authentication`]
//! depends on attacker-controlled input, and it carries no detail about
//! which check failed.

use core::fmt;

/// Broad classification of an engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters or calls made in the wrong order
    Configuration,
    /// Tag mismatch or truncated ciphertext
    Authentication,
    /// Encrypting twice under one (key, nonce) pair
    NonceReuse,
    /// Keystream counter would wrap
    CapacityExhausted,
}

/// Error type for AEAD engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Key has an unsupported length
    InvalidKey,
    /// Nonce has an unsupported length
    InvalidNonce,
    /// Tag size outside the engine's permitted set
    InvalidTagSize,
    /// No key supplied and none installed earlier
    KeyNotSet,
    /// Engine not initialised, or finalised and awaiting a new nonce
    NotInitialized,
    /// Call not permitted in the current message phase
    InvalidState,
    /// Payload length does not fit the CCM length field
    PacketTooLarge,
    /// Output buffer is too small for the operation
    BufferTooSmall,
    /// AEAD authentication failed
    AuthenticationFailed,
    /// Same (key, nonce) pair already used for encryption
    NonceReuse,
    /// Block counter exhausted for this message
    CounterExhausted,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0101,
            Self::InvalidNonce => 0x0102,
            Self::InvalidTagSize => 0x0103,
            Self::KeyNotSet => 0x0104,
            Self::NotInitialized => 0x0105,
            Self::InvalidState => 0x0106,
            Self::PacketTooLarge => 0x0107,
            Self::BufferTooSmall => 0x0108,
            Self::AuthenticationFailed => 0x0110,
            Self::NonceReuse => 0x0120,
            Self::CounterExhausted => 0x0130,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid key size",
            Self::InvalidNonce => "invalid nonce size",
            Self::InvalidTagSize => "invalid tag size",
            Self::KeyNotSet => "no key installed",
            Self::NotInitialized => "cipher not initialised with a nonce",
            Self::InvalidState => "operation not permitted in current state",
            Self::PacketTooLarge => "packet too large for nonce size",
            Self::BufferTooSmall => "buffer too small",
            Self::AuthenticationFailed => "authentication failed",
            Self::NonceReuse => "nonce reused for encryption under the same key",
            Self::CounterExhausted => "block counter exhausted",
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed => ErrorKind::Authentication,
            Self::NonceReuse => ErrorKind::NonceReuse,
            Self::CounterExhausted => ErrorKind::CapacityExhausted,
            Self::InvalidKey
            | Self::InvalidNonce
            | Self::InvalidTagSize
            | Self::KeyNotSet
            | Self::NotInitialized
            | Self::InvalidState
            | Self::PacketTooLarge
            | Self::BufferTooSmall => ErrorKind::Configuration,
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}

impl From<CryptoError> for aead_common::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::AuthenticationFailed => Self::BadRecordMac,
            CryptoError::CounterExhausted | CryptoError::PacketTooLarge => Self::RecordOverflow,
            CryptoError::InvalidKey | CryptoError::InvalidNonce | CryptoError::InvalidTagSize => {
                Self::IllegalParameter
            }
            CryptoError::BufferTooSmall => Self::BufferTooSmall,
            CryptoError::KeyNotSet
            | CryptoError::NotInitialized
            | CryptoError::InvalidState
            | CryptoError::NonceReuse => Self::InternalError,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
