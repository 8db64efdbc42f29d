// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Engine configuration
//!
//! Configuration is fixed when a cipher instance is built. Changing it means
//! building a new instance; nothing here is consulted per record except the
//! log level.

use crate::log::LogLevel;

/// GF(2^128) multiplication strategy for GHASH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcmMultiplierKind {
    /// Bit-serial reference multiplier, no tables
    Basic,
    /// Thirty-two 16-entry nibble tables (8 KiB)
    Tables8k,
    /// Two 256-entry byte tables processed pairwise (8 KiB)
    Tables2x256,
}

impl GcmMultiplierKind {
    /// Table memory in bytes
    #[must_use]
    pub const fn table_bytes(&self) -> usize {
        match self {
            Self::Basic => 0,
            Self::Tables8k => 32 * 16 * 16,
            Self::Tables2x256 => 2 * 256 * 16,
        }
    }
}

/// ChaCha20 keystream generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChaChaBackend {
    /// One 64-byte block per permutation
    Scalar,
    /// Two interleaved blocks per permutation (128 bytes)
    Wide,
}

/// GCM configuration
#[derive(Debug, Clone, Copy)]
pub struct GcmConfig {
    /// GHASH multiplier
    pub multiplier: GcmMultiplierKind,
    /// Smallest tag the record layer may request, in bytes
    pub min_tag_size: usize,
}

impl GcmConfig {
    /// Default GCM configuration
    pub const DEFAULT: Self = Self {
        multiplier: GcmMultiplierKind::Tables8k,
        min_tag_size: 12,
    };

    /// Check a requested tag size against this configuration
    #[must_use]
    pub const fn allows_tag_size(&self, tag_size: usize) -> bool {
        tag_size >= self.min_tag_size && tag_size <= 16
    }
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// CCM configuration
#[derive(Debug, Clone, Copy)]
pub struct CcmConfig {
    /// Largest payload accepted in one packet, in bytes
    pub max_packet_len: usize,
}

impl CcmConfig {
    /// Default CCM configuration
    pub const DEFAULT: Self = Self {
        max_packet_len: crate::constants::MAX_RECORD_CIPHERTEXT,
    };
}

impl Default for CcmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// ChaCha20-Poly1305 configuration
#[derive(Debug, Clone, Copy)]
pub struct ChaChaConfig {
    /// Keystream generator
    pub backend: ChaChaBackend,
}

impl ChaChaConfig {
    /// Default ChaCha20 configuration
    pub const DEFAULT: Self = Self {
        backend: ChaChaBackend::Scalar,
    };
}

impl Default for ChaChaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration for a record protection context
#[derive(Debug, Clone, Copy)]
pub struct AeadConfig {
    /// GCM settings
    pub gcm: GcmConfig,
    /// CCM settings
    pub ccm: CcmConfig,
    /// ChaCha20-Poly1305 settings
    pub chacha: ChaChaConfig,
    /// Event log verbosity
    pub log_level: LogLevel,
}

impl AeadConfig {
    /// Default configuration: nibble tables, scalar ChaCha20
    pub const DEFAULT: Self = Self {
        gcm: GcmConfig::DEFAULT,
        ccm: CcmConfig::DEFAULT,
        chacha: ChaChaConfig::DEFAULT,
        log_level: LogLevel::Info,
    };

    /// Smallest footprint: no GHASH tables
    pub const COMPACT: Self = Self {
        gcm: GcmConfig {
            multiplier: GcmMultiplierKind::Basic,
            ..GcmConfig::DEFAULT
        },
        ccm: CcmConfig::DEFAULT,
        chacha: ChaChaConfig::DEFAULT,
        log_level: LogLevel::Warn,
    };

    /// Bulk transfer: byte-pair tables, two-block ChaCha20
    pub const THROUGHPUT: Self = Self {
        gcm: GcmConfig {
            multiplier: GcmMultiplierKind::Tables2x256,
            ..GcmConfig::DEFAULT
        },
        ccm: CcmConfig::DEFAULT,
        chacha: ChaChaConfig {
            backend: ChaChaBackend::Wide,
        },
        log_level: LogLevel::Warn,
    };

    /// Same configuration with a different log level
    #[must_use]
    pub const fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for AeadConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        assert_eq!(AeadConfig::DEFAULT.gcm.multiplier, GcmMultiplierKind::Tables8k);
        assert_eq!(AeadConfig::COMPACT.gcm.multiplier.table_bytes(), 0);
        assert_eq!(AeadConfig::THROUGHPUT.chacha.backend, ChaChaBackend::Wide);
        assert_eq!(AeadConfig::THROUGHPUT.gcm.min_tag_size, 12);
    }

    #[test]
    fn test_tag_size_policy() {
        let gcm = GcmConfig::DEFAULT;
        assert!(gcm.allows_tag_size(16));
        assert!(gcm.allows_tag_size(12));
        assert!(!gcm.allows_tag_size(8));
        assert!(!gcm.allows_tag_size(17));
    }
}
