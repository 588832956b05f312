//! Error types for edgelog core.

use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in edgelog core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Device read, write, seek, or sync failure.
    #[error("device error: {0}")]
    Device(#[from] edgelog_storage::DeviceError),

    /// The superblock checksum does not match its contents.
    #[error("corrupt superblock: stored checksum {stored:#018x}, computed {computed:#018x}")]
    CorruptSuperblock {
        /// Checksum found on the device.
        stored: u64,
        /// Checksum recomputed from the superblock fields.
        computed: u64,
    },

    /// A log block is not part of the current generation's history.
    #[error("log block {index} rejected: {reason}")]
    StaleOrCorruptBlock {
        /// Absolute block index on the device.
        index: u32,
        /// Why the block was rejected.
        reason: BlockRejection,
    },

    /// A block carries more entries than its layout can hold.
    #[error("log block holds {n_entries} entries, maximum is {max}")]
    Bounds {
        /// Entry count that was requested.
        n_entries: u32,
        /// Maximum entries per block.
        max: u32,
    },

    /// A structure was decoded from fewer bytes than its fixed size.
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    ShortBuffer {
        /// Declared structure size.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Advancing the generation would wrap past `u32::MAX`.
    #[error("generation counter exhausted at {0}")]
    GenerationOverflow(u32),

    /// Operation not permitted on this device layout.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupt superblock error.
    pub fn corrupt_superblock(stored: u64, computed: u64) -> Self {
        Self::CorruptSuperblock { stored, computed }
    }

    /// Creates a stale-or-corrupt block error.
    pub fn rejected_block(index: u32, reason: BlockRejection) -> Self {
        Self::StaleOrCorruptBlock { index, reason }
    }

    /// Creates a bounds error.
    pub fn bounds(n_entries: u32, max: u32) -> Self {
        Self::Bounds { n_entries, max }
    }

    /// Creates a short buffer error.
    pub fn short_buffer(expected: usize, actual: usize) -> Self {
        Self::ShortBuffer { expected, actual }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the underlying device access ran past its capacity.
    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::Device(e) if e.is_out_of_bounds())
    }
}

/// Why a log block was judged not current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockRejection {
    /// The stored checksum does not match the block contents.
    ChecksumMismatch {
        /// Checksum found in the block.
        stored: u64,
        /// Checksum recomputed from the block.
        computed: u64,
    },
    /// The block is intact but was written under another generation.
    StaleGeneration {
        /// Generation of the current superblock.
        expected: u32,
        /// Generation recorded in the block.
        found: u32,
    },
    /// The block claims more entries than fit in its layout.
    EntryCountOutOfRange {
        /// Entry count recorded in the block.
        n_entries: u32,
    },
}

impl fmt::Display for BlockRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch (stored {stored:#018x}, computed {computed:#018x})"
            ),
            Self::StaleGeneration { expected, found } => {
                write!(f, "stale generation {found}, current is {expected}")
            }
            Self::EntryCountOutOfRange { n_entries } => {
                write!(f, "entry count {n_entries} out of range")
            }
        }
    }
}
