//! Error types for geo-isobands

use thiserror::Error;

/// Main error type for the interpolation and isoband pipeline.
///
/// Every variant is fatal for the current run. CPU-time exhaustion has no
/// variant: the kernel terminates the process once the budget is spent.
#[derive(Error, Debug)]
pub enum Error {
    /// Not enough usable observations for the requested work.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A configuration value is out of range or unrecognised.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A ring path violated the RingStart/RingPoint protocol.
    #[error("corrupt geometry: {0}")]
    CorruptGeometry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested output driver does not exist.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// True for failures caused by the file system or an output driver.
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Csv(_) | Error::Json(_) | Error::UnsupportedFormat(_)
        )
    }
}

/// Result type alias for geo-isobands operations
pub type Result<T> = std::result::Result<T, Error>;
