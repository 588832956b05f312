//! Log entry block: an owned 4000-byte buffer with typed accessors.

use crate::checksum;
use crate::error::{BlockRejection, CoreError, CoreResult};
use crate::layout::{
    CHECKSUM_SIZE, LOG_BLOCK_HEADER_SIZE, LOG_BLOCK_SIZE, LOG_ENTRY_SIZE, MAX_ENTRIES_PER_BLOCK,
};
use crate::log::entry::LogEntry;
use crate::types::Generation;
use std::fmt;

const GENERATION_AT: usize = CHECKSUM_SIZE;
const N_ENTRIES_AT: usize = CHECKSUM_SIZE + 4;

/// A fixed-size container of up to 199 log entries.
///
/// The block keeps its raw on-disk bytes, so the checksum can be verified
/// over exactly what was read, padding included. Typed accessors decode
/// fields on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct LogEntryBlock {
    bytes: Box<[u8; LOG_BLOCK_SIZE]>,
}

impl LogEntryBlock {
    /// Creates an empty, unsealed block for `generation`.
    #[must_use]
    pub fn new(generation: Generation) -> Self {
        let mut block = Self {
            bytes: Box::new([0u8; LOG_BLOCK_SIZE]),
        };
        block.write_u32(GENERATION_AT, generation.as_u32());
        block
    }

    /// Creates an unsealed block holding `entries`.
    ///
    /// # Errors
    ///
    /// Returns `Bounds` if more than 199 entries are given.
    pub fn with_entries(generation: Generation, entries: &[LogEntry]) -> CoreResult<Self> {
        let mut block = Self::new(generation);
        for entry in entries {
            block.push(*entry)?;
        }
        Ok(block)
    }

    /// Wraps the first 4000 bytes of `data` without judging them.
    ///
    /// # Errors
    ///
    /// Returns `ShortBuffer` if `data` holds fewer than 4000 bytes.
    pub fn from_bytes(data: &[u8]) -> CoreResult<Self> {
        let raw = data
            .get(..LOG_BLOCK_SIZE)
            .ok_or_else(|| CoreError::short_buffer(LOG_BLOCK_SIZE, data.len()))?;
        let mut bytes = Box::new([0u8; LOG_BLOCK_SIZE]);
        bytes.copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Returns the raw on-disk bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; LOG_BLOCK_SIZE] {
        &self.bytes
    }

    /// Returns the stored checksum.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut slot = [0u8; CHECKSUM_SIZE];
        slot.copy_from_slice(&self.bytes[..CHECKSUM_SIZE]);
        u64::from_le_bytes(slot)
    }

    /// Returns the generation the block was written under.
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation::new(self.read_u32(GENERATION_AT))
    }

    /// Returns the raw entry count, which may exceed 199 in a corrupt block.
    #[must_use]
    pub fn n_entries(&self) -> u32 {
        self.read_u32(N_ENTRIES_AT)
    }

    /// Returns true if no more entries fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.n_entries() as usize >= MAX_ENTRIES_PER_BLOCK
    }

    /// Returns the entry at `index`, if it is below `n_entries`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<LogEntry> {
        if index >= self.valid_len() {
            return None;
        }
        let at = LOG_BLOCK_HEADER_SIZE + index * LOG_ENTRY_SIZE;
        LogEntry::decode(&self.bytes[at..at + LOG_ENTRY_SIZE]).ok()
    }

    /// Iterates over entries `0..n_entries`, never past slot 199.
    pub fn entries(&self) -> impl Iterator<Item = LogEntry> + '_ {
        (0..self.valid_len()).filter_map(move |i| self.entry(i))
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns `Bounds` if the block already holds 199 entries.
    pub fn push(&mut self, entry: LogEntry) -> CoreResult<()> {
        let n = self.n_entries();
        if n as usize >= MAX_ENTRIES_PER_BLOCK {
            return Err(CoreError::bounds(n.saturating_add(1), MAX_ENTRIES_PER_BLOCK as u32));
        }
        let at = LOG_BLOCK_HEADER_SIZE + n as usize * LOG_ENTRY_SIZE;
        self.bytes[at..at + LOG_ENTRY_SIZE].copy_from_slice(&entry.encode());
        self.write_u32(N_ENTRIES_AT, n + 1);
        Ok(())
    }

    /// Computes the checksum the current contents should carry.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        // The buffer is exactly LOG_BLOCK_SIZE long.
        checksum::compute(&self.bytes[..], LOG_BLOCK_SIZE).unwrap_or(0)
    }

    /// Recomputes and stores the checksum.
    pub fn seal(&mut self) {
        let sum = self.compute_checksum();
        self.bytes[..CHECKSUM_SIZE].copy_from_slice(&sum.to_le_bytes());
    }

    /// Judges whether the block belongs to `expected`'s history.
    ///
    /// Checks run in order: checksum, entry count, generation.
    ///
    /// # Errors
    ///
    /// Returns the first rule the block breaks.
    pub fn check(&self, expected: Generation) -> Result<(), BlockRejection> {
        let stored = self.checksum();
        let computed = self.compute_checksum();
        if stored != computed {
            return Err(BlockRejection::ChecksumMismatch { stored, computed });
        }

        let n_entries = self.n_entries();
        if n_entries as usize > MAX_ENTRIES_PER_BLOCK {
            return Err(BlockRejection::EntryCountOutOfRange { n_entries });
        }

        let found = self.generation();
        if found != expected {
            return Err(BlockRejection::StaleGeneration {
                expected: expected.as_u32(),
                found: found.as_u32(),
            });
        }

        Ok(())
    }

    /// Returns true if the block is intact and written under `expected`.
    #[must_use]
    pub fn is_current(&self, expected: Generation) -> bool {
        self.check(expected).is_ok()
    }

    fn valid_len(&self) -> usize {
        (self.n_entries() as usize).min(MAX_ENTRIES_PER_BLOCK)
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_le_bytes([
            self.bytes[at],
            self.bytes[at + 1],
            self.bytes[at + 2],
            self.bytes[at + 3],
        ])
    }

    fn write_u32(&mut self, at: usize, value: u32) {
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl fmt::Debug for LogEntryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEntryBlock")
            .field("checksum", &self.checksum())
            .field("generation", &self.generation())
            .field("n_entries", &self.n_entries())
            .finish_non_exhaustive()
    }
}
