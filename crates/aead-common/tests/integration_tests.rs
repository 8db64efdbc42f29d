// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for aead-common
//!
//! Tests for algorithm identifiers, error mapping, configuration presets and
//! the event log.

mod types_tests {
    use aead_common::constants::{MAX_TAG_SIZE, TLS_AEAD_NONCE_SIZE};
    use aead_common::types::{AeadAlgorithm, AeadFamily, Direction};
    use std::collections::HashSet;

    #[test]
    fn test_algorithm_ids_unique() {
        let ids: HashSet<u8> = AeadAlgorithm::ALL.iter().map(|&a| a as u8).collect();
        assert_eq!(ids.len(), AeadAlgorithm::ALL.len());
        for alg in AeadAlgorithm::ALL {
            assert_eq!(AeadAlgorithm::from_u8(alg as u8), Some(alg));
        }
        assert_eq!(AeadAlgorithm::from_u8(0x00), None);
    }

    #[test]
    fn test_tls13_suites() {
        for alg in AeadAlgorithm::ALL {
            if let Some(suite) = alg.tls13_suite() {
                assert_eq!(AeadAlgorithm::from_tls13_suite(suite), Some(alg));
            }
        }
        assert_eq!(AeadAlgorithm::Aes256Ccm.tls13_suite(), None);
        assert_eq!(AeadAlgorithm::from_tls13_suite(0x1306), None);
    }

    #[test]
    fn test_sizes() {
        for alg in AeadAlgorithm::ALL {
            assert_eq!(alg.nonce_size(), TLS_AEAD_NONCE_SIZE);
            assert!(alg.tag_size() <= MAX_TAG_SIZE);
            match alg.family() {
                AeadFamily::ChaCha20Poly1305 => assert_eq!(alg.key_size(), 32),
                AeadFamily::Gcm | AeadFamily::Ccm => {
                    assert!(alg.key_size() == 16 || alg.key_size() == 32);
                }
            }
        }
        assert_eq!(AeadAlgorithm::Aes128Ccm8.tag_size(), 8);
    }

    #[test]
    fn test_display_matches_name() {
        for alg in AeadAlgorithm::ALL {
            assert_eq!(alg.to_string(), alg.name());
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::from_encrypting(true), Direction::Encrypt);
        assert_eq!(Direction::from_encrypting(false), Direction::Decrypt);
        assert!(Direction::Encrypt.is_encrypt());
        assert!(!Direction::Decrypt.is_encrypt());
    }
}

mod error_tests {
    use aead_common::errors::{AlertDescription, Error};

    const ALL: [Error; 6] = [
        Error::BadRecordMac,
        Error::RecordOverflow,
        Error::IllegalParameter,
        Error::InternalError,
        Error::BufferTooSmall,
        Error::UnsupportedAlgorithm,
    ];

    #[test]
    fn test_codes_unique() {
        let mut codes: Vec<u16> = ALL.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_alert_mapping() {
        assert_eq!(Error::BadRecordMac.alert_description().as_u8(), 20);
        assert_eq!(Error::RecordOverflow.alert_description().as_u8(), 22);
        assert_eq!(Error::IllegalParameter.alert_description().as_u8(), 47);
        assert_eq!(
            Error::UnsupportedAlgorithm.alert_description(),
            AlertDescription::InternalError
        );
    }

    #[test]
    fn test_only_short_buffer_is_recoverable() {
        for e in ALL {
            assert_eq!(e.is_fatal(), e != Error::BufferTooSmall, "{e:?}");
        }
    }

    #[test]
    fn test_display_has_description() {
        for e in ALL {
            assert!(e.to_string().contains(e.description()));
        }
    }
}

mod config_tests {
    use aead_common::config::{AeadConfig, ChaChaBackend, GcmConfig, GcmMultiplierKind};
    use aead_common::log::LogLevel;

    #[test]
    fn test_presets() {
        assert_eq!(AeadConfig::DEFAULT.gcm.multiplier, GcmMultiplierKind::Tables8k);
        assert_eq!(AeadConfig::COMPACT.gcm.multiplier, GcmMultiplierKind::Basic);
        assert_eq!(AeadConfig::COMPACT.gcm.multiplier.table_bytes(), 0);
        assert_eq!(AeadConfig::THROUGHPUT.chacha.backend, ChaChaBackend::Wide);
        assert_eq!(AeadConfig::default().log_level, LogLevel::Info);
    }

    #[test]
    fn test_gcm_tag_policy() {
        let policy = GcmConfig::DEFAULT;
        assert!(!policy.allows_tag_size(8));
        assert!(policy.allows_tag_size(12));
        assert!(policy.allows_tag_size(16));
        assert!(!policy.allows_tag_size(17));

        let lax = GcmConfig {
            min_tag_size: 4,
            ..GcmConfig::DEFAULT
        };
        assert!(lax.allows_tag_size(4));
    }

    #[test]
    fn test_with_log_level() {
        let cfg = AeadConfig::THROUGHPUT.with_log_level(LogLevel::Trace);
        assert_eq!(cfg.log_level, LogLevel::Trace);
        assert_eq!(cfg.gcm.multiplier, GcmMultiplierKind::Tables2x256);
    }
}

mod log_tests {
    use aead_common::log::{EventLog, LogLevel, MAX_MESSAGE_LEN};
    use aead_common::{aead_debug, aead_error, aead_info, aead_warn};

    #[test]
    fn test_level_filtering() {
        let mut log: EventLog = EventLog::new(LogLevel::Warn);
        aead_error!(log, "test", "bad {}", 1);
        aead_warn!(log, "test", "careful");
        aead_info!(log, "test", "hidden");
        aead_debug!(log, "test", "hidden");
        assert_eq!(log.len(), 2);
        assert_eq!(log.count_at(LogLevel::Error), 1);
        assert_eq!(log.last().map(|r| r.message.as_str()), Some("careful"));
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut log: EventLog<4> = EventLog::new(LogLevel::Trace);
        for i in 0..10 {
            aead_info!(log, "ring", "event {}", i);
        }
        assert_eq!(log.len(), 4);
        assert_eq!(log.dropped(), 6);
        let seqs: Vec<u64> = log.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_long_message_truncated() {
        let mut log: EventLog = EventLog::new(LogLevel::Info);
        let long = "x".repeat(MAX_MESSAGE_LEN * 2);
        aead_info!(log, "trunc", "{}", long);
        assert_eq!(log.last().map(|r| r.message.len()), Some(MAX_MESSAGE_LEN));
    }

    #[test]
    fn test_clear_keeps_sequence() {
        let mut log: EventLog = EventLog::new(LogLevel::Info);
        aead_info!(log, "seq", "one");
        log.clear();
        assert!(log.is_empty());
        aead_info!(log, "seq", "two");
        assert_eq!(log.last().map(|r| r.sequence), Some(1));
    }

    #[test]
    fn test_record_display() {
        let mut log: EventLog = EventLog::new(LogLevel::Info);
        aead_warn!(log, "record", "nonce {}", "rejected");
        let line = log.last().map(ToString::to_string).unwrap_or_default();
        assert!(line.contains("[record]"));
        assert!(line.contains("nonce rejected"));
    }
}
