//! Solo Export Library
//!
//! A Rust library for decoding the proprietary `SOLOII.DAT` binary telemetry
//! file written by the Geo Solo II home energy monitor.
//!
//! This library provides tools for:
//! - Locating and validating the fixed byte sections of a `SOLOII.DAT` file
//! - Decoding fixed-width header and data records into typed structures
//! - Reconstructing per-record timestamps from two truncated on-device
//!   counters via a cached congruence search
//! - Scaling raw fields into semantic readings (temperatures, price, accuracy)
//! - Rendering readings into several textual output formats

pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod decoder;
        pub mod field_transformer;
        pub mod record_codec;
        pub mod solo_file;
        pub mod timestamp_resolver;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Output format renderers
pub mod output;

// Re-export commonly used types
pub use app::models::{DataRecord, HeaderEntry, SemanticRecord, TimeSlot};
pub use app::services::decoder::{DecodeStats, SoloDecoder};
pub use app::services::solo_file::SoloFile;
pub use app::services::timestamp_resolver::TimestampResolver;

/// Result type alias for solo_export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SOLOII.DAT decoding operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with the `SoloII` signature
    #[error("not a SOLOII.DAT file: expected signature \"SoloII\", found {found:?}")]
    InvalidSignature { found: Vec<u8> },

    /// No time slot consistent with both truncated counters within the
    /// search bound
    #[error("date not found: row={row} index={index}")]
    DateNotFound { row: u64, index: u16 },

    /// Writing to the output sink failed
    #[error("output error: {message}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an invalid signature error from the bytes actually read
    pub fn invalid_signature(found: &[u8]) -> Self {
        Self::InvalidSignature {
            found: found.to_vec(),
        }
    }

    /// Create a date resolution error for a data record
    pub fn date_not_found(row: u64, index: u16) -> Self {
        Self::DateNotFound { row, index }
    }

    /// Create an output sink error with context
    pub fn output(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            message: message.into(),
            source,
        }
    }

    /// Whether this error means the downstream consumer closed its end.
    ///
    /// A closed consumer terminates the write phase cleanly; it is not a
    /// decoding failure.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io { source, .. } | Self::Output { source, .. } => {
                source.kind() == std::io::ErrorKind::BrokenPipe
            }
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
