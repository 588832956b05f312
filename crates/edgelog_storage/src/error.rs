//! Error types for device operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors that can occur during device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of the device.
    #[error("read beyond end of device: offset {offset}, len {len}, capacity {capacity}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The device capacity.
        capacity: u64,
    },

    /// Attempted to write beyond the end of the device.
    #[error("write beyond end of device: offset {offset}, len {len}, capacity {capacity}")]
    WritePastEnd {
        /// The requested write offset.
        offset: u64,
        /// The requested write length.
        len: usize,
        /// The device capacity.
        capacity: u64,
    },

    /// Another process holds the device lock.
    #[error("device locked: {path} is held by another process")]
    Locked {
        /// Path of the locked device.
        path: PathBuf,
    },
}

impl DeviceError {
    /// Returns true if the error reports an access beyond device capacity.
    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::ReadPastEnd { .. } | Self::WritePastEnd { .. })
    }
}

/// Checks that `[offset, offset + len)` fits in `capacity`.
pub(crate) fn fits(offset: u64, len: usize, capacity: u64) -> bool {
    offset
        .checked_add(len as u64)
        .is_some_and(|end| end <= capacity)
}
