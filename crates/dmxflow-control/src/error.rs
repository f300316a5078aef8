//! Error types for the control system
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// The serial link could not be opened
    #[error("Could not open DMX port {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation needed an open link but none is open
    #[error("No DMX port is connected")]
    NotConnected,

    /// A frame write failed during a refresh tick
    #[error("DMX transmit error: {0}")]
    Transmit(#[source] std::io::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file could not be read or written
    #[error("Config error: {0}")]
    Config(String),

    /// Log file could not be set up
    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<toml::de::Error> for ControlError {
    fn from(e: toml::de::Error) -> Self {
        ControlError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for ControlError {
    fn from(e: toml::ser::Error) -> Self {
        ControlError::Config(e.to_string())
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
