//! Log block store: positioned load and store of whole blocks.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::layout::{block_offset, LOG_BLOCK_SIZE, MAX_ENTRIES_PER_BLOCK};
use crate::log::block::LogEntryBlock;
use crate::types::Generation;
use edgelog_storage::Device;
use tracing::debug;

/// Reads and writes individual log blocks by absolute block index.
///
/// Block `i` occupies bytes `[i * 4000, (i + 1) * 4000)` of the device.
/// Block 0 shares its first 20 bytes with the superblock and is never
/// written through this store.
#[derive(Debug, Clone)]
pub struct LogBlockStore {
    sync_on_write: bool,
}

impl Default for LogBlockStore {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl LogBlockStore {
    /// Creates a store following `config`'s sync policy.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            sync_on_write: config.sync_on_write,
        }
    }

    /// Reads the block at `index` without judging it.
    ///
    /// # Errors
    ///
    /// Returns a device error if the block cannot be read in full.
    pub fn load(&self, device: &dyn Device, index: u32) -> CoreResult<LogEntryBlock> {
        let bytes = device.read_at(block_offset(index), LOG_BLOCK_SIZE)?;
        let block = LogEntryBlock::from_bytes(&bytes)?;
        debug!(
            index,
            generation = block.generation().as_u32(),
            n_entries = block.n_entries(),
            "loaded log block"
        );
        Ok(block)
    }

    /// Returns true if `block` is intact and written under `expected`.
    #[must_use]
    pub fn validate(&self, block: &LogEntryBlock, expected: Generation) -> bool {
        block.is_current(expected)
    }

    /// Reads the block at `index` and requires it to be current.
    ///
    /// # Errors
    ///
    /// Returns `StaleOrCorruptBlock` if the block fails its checksum, entry
    /// count, or generation check, or a device error if the read fails.
    pub fn load_current(
        &self,
        device: &dyn Device,
        index: u32,
        expected: Generation,
    ) -> CoreResult<LogEntryBlock> {
        let block = self.load(device, index)?;
        block
            .check(expected)
            .map_err(|reason| CoreError::rejected_block(index, reason))?;
        Ok(block)
    }

    /// Seals `block` and writes it at `index`.
    ///
    /// The entry count is checked before anything is written, so a rejected
    /// block leaves the device untouched. The caller's checksum is updated.
    ///
    /// # Errors
    ///
    /// Returns `Bounds` if the block claims more than 199 entries,
    /// `InvalidOperation` for block 0, or a device error.
    pub fn store(
        &self,
        device: &mut dyn Device,
        index: u32,
        block: &mut LogEntryBlock,
    ) -> CoreResult<()> {
        let n_entries = block.n_entries();
        if n_entries as usize > MAX_ENTRIES_PER_BLOCK {
            return Err(CoreError::bounds(n_entries, MAX_ENTRIES_PER_BLOCK as u32));
        }
        if index == 0 {
            return Err(CoreError::invalid_operation(
                "block 0 holds the superblock",
            ));
        }

        block.seal();
        device.write_at(block_offset(index), block.as_bytes())?;
        if self.sync_on_write {
            device.sync()?;
        }
        debug!(
            index,
            generation = block.generation().as_u32(),
            n_entries,
            "stored log block"
        );
        Ok(())
    }
}
