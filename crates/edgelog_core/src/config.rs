//! Journal configuration.

use crate::layout::{DEFAULT_LOG_START, LOG_BLOCK_SIZE};

/// How a reset format sizes the log region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSizePolicy {
    /// Use every whole block between `log_start` and the end of the device.
    FillDevice,
    /// Use exactly this many blocks.
    Fixed(u32),
}

/// Configuration for formatting and replaying a journal device.
#[derive(Debug, Clone)]
pub struct Config {
    /// First log block written by a reset format.
    pub log_start: u32,

    /// Log region size written by a reset format.
    pub log_size: LogSizePolicy,

    /// Whether to sync the device after every superblock or block store.
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_start: DEFAULT_LOG_START,
            log_size: LogSizePolicy::FillDevice,
            sync_on_write: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first log block used by a reset format.
    ///
    /// Block 0 holds the superblock; formatting with `0` fails.
    #[must_use]
    pub const fn log_start(mut self, block: u32) -> Self {
        self.log_start = block;
        self
    }

    /// Sets the log region sizing policy.
    #[must_use]
    pub const fn log_size(mut self, policy: LogSizePolicy) -> Self {
        self.log_size = policy;
        self
    }

    /// Sets whether to sync after every store.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Resolves the log region size for a device of `capacity` bytes.
    ///
    /// `FillDevice` counts whole blocks after `log_start`, clamped to
    /// `u32::MAX`; a device too small to hold any log block yields 0.
    #[must_use]
    pub fn resolve_log_size(&self, capacity: u64) -> u32 {
        match self.log_size {
            LogSizePolicy::Fixed(blocks) => blocks,
            LogSizePolicy::FillDevice => {
                let blocks = (capacity / LOG_BLOCK_SIZE as u64)
                    .saturating_sub(u64::from(self.log_start));
                u32::try_from(blocks).unwrap_or(u32::MAX)
            }
        }
    }
}
