//! Error types for reading WireGuard device state.

use thiserror::Error;

/// Errors that can occur while listing WireGuard devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Invalid base64 encoding.
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(String),

    /// Invalid key length.
    #[error("invalid key length: expected 32, got {0}")]
    InvalidKeyLength(usize),

    /// An external command could not be run or exited unsuccessfully.
    #[error("command `{command}` failed: {reason}")]
    Command {
        /// The command line that was run.
        command: String,
        /// Why it failed.
        reason: String,
    },

    /// The kernel WireGuard API returned an error.
    #[error("kernel interface error on {interface}: {reason}")]
    Kernel {
        /// The interface being read.
        interface: String,
        /// The reason reported by the backend.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
