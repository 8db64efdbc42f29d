// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Bounded event log for cipher instances
//!
//! Each record protection context keeps a small log of what happened to it:
//! keys installed, records processed, authentication failures, misuse that
//! was rejected. The log lives inline (no heap) and drops its oldest record
//! when full. Records carry a monotonically increasing sequence number in
//! place of a timestamp.
//!
//! # Security
//!
//! - Key bytes, nonces and plaintext must NEVER be formatted into a record
//! - Messages are truncated to [`MAX_MESSAGE_LEN`] bytes

use core::fmt::{self, Write};
use heapless::{Deque, String};

/// Maximum message length in bytes
pub const MAX_MESSAGE_LEN: usize = 96;

/// Default log capacity (records)
pub const DEFAULT_CAPACITY: usize = 16;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Authentication failures and rejected misuse
    Error = 0,
    /// Conditions the record layer should look at
    Warn = 1,
    /// Key changes and lifecycle events
    Info = 2,
    /// Per-record events
    Debug = 3,
    /// Per-call events
    Trace = 4,
}

impl LogLevel {
    /// Get the log level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single log record
#[derive(Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity
    pub level: LogLevel,
    /// Position in the instance's event stream
    pub sequence: u64,
    /// Component that emitted the record
    pub target: &'static str,
    /// Formatted message, possibly truncated
    pub message: String<MAX_MESSAGE_LEN>,
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:06} {:5} [{}] {}",
            self.sequence, self.level, self.target, self.message
        )
    }
}

/// Writer that silently truncates at capacity instead of failing the whole format
struct TruncatingWriter<'a>(&'a mut String<MAX_MESSAGE_LEN>);

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Bounded in-memory event log
pub struct EventLog<const N: usize = DEFAULT_CAPACITY> {
    records: Deque<LogRecord, N>,
    min_level: LogLevel,
    next_sequence: u64,
    dropped: u64,
}

impl<const N: usize> EventLog<N> {
    /// Create an empty log recording `min_level` and more severe
    #[must_use]
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            records: Deque::new(),
            min_level,
            next_sequence: 0,
            dropped: 0,
        }
    }

    /// Set the minimum level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Get the minimum level
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if a level would be recorded
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Record a formatted message
    pub fn log(&mut self, level: LogLevel, target: &'static str, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let mut message = String::new();
        let _ = TruncatingWriter(&mut message).write_fmt(args);

        if self.records.is_full() {
            self.records.pop_front();
            self.dropped += 1;
        }

        let record = LogRecord {
            level,
            sequence: self.next_sequence,
            target,
            message,
        };
        self.next_sequence += 1;

        // Cannot fail: a slot was freed above when full.
        let _ = self.records.push_back(record);
    }

    /// Records currently held, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> + '_ {
        self.records.iter()
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<&LogRecord> {
        self.records.back()
    }

    /// Number of records held
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records evicted to make room since creation
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Count held records at exactly `level`
    #[must_use]
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.records.iter().filter(|r| r.level == level).count()
    }

    /// Remove all records; sequence numbering continues
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<const N: usize> Default for EventLog<N> {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

/// Record an error
#[macro_export]
macro_rules! aead_error {
    ($log:expr, $target:expr, $($arg:tt)*) => {
        $log.log($crate::log::LogLevel::Error, $target, format_args!($($arg)*))
    };
}

/// Record a warning
#[macro_export]
macro_rules! aead_warn {
    ($log:expr, $target:expr, $($arg:tt)*) => {
        $log.log($crate::log::LogLevel::Warn, $target, format_args!($($arg)*))
    };
}

/// Record an informational message
#[macro_export]
macro_rules! aead_info {
    ($log:expr, $target:expr, $($arg:tt)*) => {
        $log.log($crate::log::LogLevel::Info, $target, format_args!($($arg)*))
    };
}

/// Record a debug message
#[macro_export]
macro_rules! aead_debug {
    ($log:expr, $target:expr, $($arg:tt)*) => {
        $log.log($crate::log::LogLevel::Debug, $target, format_args!($($arg)*))
    };
}

/// Record a trace message
#[macro_export]
macro_rules! aead_trace {
    ($log:expr, $target:expr, $($arg:tt)*) => {
        $log.log($crate::log::LogLevel::Trace, $target, format_args!($($arg)*))
    };
}
