//! Core error types shared across crates.
//!
//! Typed errors let the launcher decide per call site whether a failure is
//! fatal (startup pipeline) or recovered (IP discovery, registration).

use std::fmt;
use thiserror::Error;

/// High-level error classification for logging.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorClass {
    /// I/O or network connectivity errors.
    Io,
    /// Operation timed out.
    Timeout,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Io => "io",
            Self::Timeout => "timeout",
        })
    }
}

/// Transport-level error returned by ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// I/O error (connect, TLS, body read, ...).
    #[error("io error: {message}")]
    Io { message: String },

    /// Operation timed out.
    #[error("timeout after {timeout_secs}s: {operation}")]
    Timeout { operation: String, timeout_secs: u64 },
}

impl CoreError {
    /// Get the error class for categorization.
    #[inline]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io { .. } => ErrorClass::Io,
            Self::Timeout { .. } => ErrorClass::Timeout,
        }
    }

    #[inline]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        self.class() == ErrorClass::Timeout
    }
}
