// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Record-layer error type
//!
//! Engine failures reach the record layer through this type. Every variant
//! knows which TLS alert the connection must be torn down with, so the
//! record layer never has to inspect engine internals to pick one.

use core::fmt;

/// Result type alias for record-layer operations
pub type Result<T> = core::result::Result<T, Error>;

/// TLS alert descriptions used by the record protection layer (RFC 8446 §6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// A record failed authentication
    BadRecordMac = 20,
    /// A record exceeded the permitted length
    RecordOverflow = 22,
    /// A field was out of range or inconsistent
    IllegalParameter = 47,
    /// Local failure unrelated to the peer
    InternalError = 80,
}

impl AlertDescription {
    /// Wire value of the alert
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Record-layer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Record Protection Errors (0x10xx)
    // =========================================================================
    /// Record authentication failed (tag mismatch or truncated record)
    BadRecordMac,
    /// Record or per-key capacity exceeded
    RecordOverflow,
    /// Key, nonce or tag size rejected
    IllegalParameter,

    // =========================================================================
    // Local Errors (0x11xx)
    // =========================================================================
    /// Cipher misuse detected locally (no key, nonce reuse, bad state)
    InternalError,
    /// Caller-provided output buffer is too small
    BufferTooSmall,
    /// Algorithm identifier not recognised
    UnsupportedAlgorithm,
}

impl Error {
    /// Get the numeric error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRecordMac => 0x1001,
            Self::RecordOverflow => 0x1002,
            Self::IllegalParameter => 0x1003,
            Self::InternalError => 0x1101,
            Self::BufferTooSmall => 0x1102,
            Self::UnsupportedAlgorithm => 0x1103,
        }
    }

    /// TLS alert the record layer must send for this error
    #[must_use]
    pub const fn alert_description(&self) -> AlertDescription {
        match self {
            Self::BadRecordMac => AlertDescription::BadRecordMac,
            Self::RecordOverflow => AlertDescription::RecordOverflow,
            Self::IllegalParameter => AlertDescription::IllegalParameter,
            Self::InternalError | Self::BufferTooSmall | Self::UnsupportedAlgorithm => {
                AlertDescription::InternalError
            }
        }
    }

    /// Whether the connection must be closed
    ///
    /// A short output buffer is the only condition a caller can recover from
    /// by retrying with more space.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::BufferTooSmall)
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::BadRecordMac => "bad record mac",
            Self::RecordOverflow => "record overflow",
            Self::IllegalParameter => "illegal parameter",
            Self::InternalError => "internal error",
            Self::BufferTooSmall => "buffer too small",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
