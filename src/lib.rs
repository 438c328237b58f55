//! OIFITS Processor Library
//!
//! A Rust library for loading, validating and analysing optical
//! interferometry data stored in the OIFITS format.
//!
//! This library provides tools for:
//! - Decoding FITS containers into raw binary tables, and writing them back
//! - Loading OIFITS tables against declarative schemas with non-fatal validation
//! - Cross-table reference checks (targets, wavelengths, arrays)
//! - Indexing observations by granule (target, instrument mode, night)
//! - Inferring the station configurations that produced each observation row

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod analyzer;
        pub mod fits_io;
        pub mod table_loader;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Checker, Granule, InstrumentMode, OiFitsFile, Severity, Target};
pub use app::services::analyzer::Analyzer;
pub use app::services::table_loader::{LoadResult, OiFitsLoader, load_oifits};
pub use config::Config;

/// Result type alias for the OIFITS processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for OIFITS processing operations
///
/// Validation findings are not errors; they are recorded in a [`Checker`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Structurally invalid FITS container
    #[error("FITS format corruption in '{file}': {message}")]
    FormatCorruption { file: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Location that cannot be read locally
    #[error("Unsupported location: {location} (only local files and file:// URLs are supported)")]
    UnsupportedLocation { location: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// JSON serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a format corruption error
    pub fn format_corruption(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FormatCorruption {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unsupported location error
    pub fn unsupported_location(location: impl Into<String>) -> Self {
        Self::UnsupportedLocation {
            location: location.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
