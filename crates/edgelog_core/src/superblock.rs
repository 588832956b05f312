//! Superblock codec and store.
//!
//! The superblock is the root record of a journal device. It lives at
//! offset 0 and tells replay where the log region is and which generation
//! of log blocks is current.

use crate::checksum;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::layout::{CHECKSUM_SIZE, SUPERBLOCK_OFFSET, SUPERBLOCK_SIZE};
use crate::types::Generation;
use edgelog_storage::Device;
use tracing::{debug, info, warn};

/// The root record describing the log region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Superblock {
    /// Stored checksum over the remaining 12 bytes.
    pub checksum: u64,
    /// Checkpoint epoch.
    pub generation: Generation,
    /// Index of the first log block.
    pub log_start: u32,
    /// Number of blocks in the log region.
    pub log_size: u32,
}

impl Superblock {
    /// Creates an unsealed superblock. Call [`Superblock::seal`] before
    /// relying on its checksum.
    #[must_use]
    pub const fn new(generation: Generation, log_start: u32, log_size: u32) -> Self {
        Self {
            checksum: 0,
            generation,
            log_start,
            log_size,
        }
    }

    /// Encodes the superblock into its 20-byte on-disk form.
    #[must_use]
    pub fn encode(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut buf = [0u8; SUPERBLOCK_SIZE];
        buf[0..8].copy_from_slice(&self.checksum.to_le_bytes());
        buf[8..12].copy_from_slice(&self.generation.as_u32().to_le_bytes());
        buf[12..16].copy_from_slice(&self.log_start.to_le_bytes());
        buf[16..20].copy_from_slice(&self.log_size.to_le_bytes());
        buf
    }

    /// Decodes a superblock from the first 20 bytes of `data`.
    ///
    /// Decoding never checks the checksum; use [`Superblock::is_valid`].
    ///
    /// # Errors
    ///
    /// Returns `ShortBuffer` if `data` holds fewer than 20 bytes.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < SUPERBLOCK_SIZE {
            return Err(CoreError::short_buffer(SUPERBLOCK_SIZE, data.len()));
        }
        let u32_at =
            |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Ok(Self {
            checksum: checksum::stored(data)?,
            generation: Generation::new(u32_at(CHECKSUM_SIZE)),
            log_start: u32_at(12),
            log_size: u32_at(16),
        })
    }

    /// Computes the checksum the current fields should carry.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        let bytes = self.encode();
        // The encoded array is exactly SUPERBLOCK_SIZE long.
        checksum::compute(&bytes, SUPERBLOCK_SIZE).unwrap_or(0)
    }

    /// Returns true if the stored checksum matches the fields.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Recomputes and stores the checksum.
    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Returns the index one past the last log block.
    #[must_use]
    pub fn log_end(&self) -> u64 {
        u64::from(self.log_start) + u64::from(self.log_size)
    }
}

/// Reads, validates, writes, and formats the superblock of a device.
#[derive(Debug, Clone, Default)]
pub struct SuperblockStore {
    config: Config,
}

impl SuperblockStore {
    /// Creates a store using `config` for reset defaults and sync policy.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the superblock at offset 0 without judging it.
    ///
    /// # Errors
    ///
    /// Returns a device error if fewer than 20 bytes can be read.
    pub fn load(&self, device: &dyn Device) -> CoreResult<Superblock> {
        let bytes = device.read_at(SUPERBLOCK_OFFSET, SUPERBLOCK_SIZE)?;
        let superblock = Superblock::decode(&bytes)?;
        debug!(
            generation = superblock.generation.as_u32(),
            log_start = superblock.log_start,
            log_size = superblock.log_size,
            "loaded superblock"
        );
        Ok(superblock)
    }

    /// Returns true if the superblock's checksum matches its contents.
    #[must_use]
    pub fn validate(&self, superblock: &Superblock) -> bool {
        superblock.is_valid()
    }

    /// Reads the superblock and requires it to be valid.
    ///
    /// # Errors
    ///
    /// Returns `CorruptSuperblock` if the checksum does not match, or a
    /// device error if the read fails.
    pub fn load_valid(&self, device: &dyn Device) -> CoreResult<Superblock> {
        let superblock = self.load(device)?;
        let computed = superblock.compute_checksum();
        if superblock.checksum != computed {
            return Err(CoreError::corrupt_superblock(superblock.checksum, computed));
        }
        Ok(superblock)
    }

    /// Seals `superblock` and writes it to offset 0.
    ///
    /// The caller's `checksum` field is overwritten with the fresh value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` without writing if the log region starts
    /// at block 0, or a device error if the write or sync fails.
    pub fn store(&self, device: &mut dyn Device, superblock: &mut Superblock) -> CoreResult<()> {
        if superblock.log_start == 0 {
            return Err(CoreError::invalid_operation(
                "log region cannot start at block 0, which holds the superblock",
            ));
        }
        superblock.seal();
        device.write_at(SUPERBLOCK_OFFSET, &superblock.encode())?;
        if self.config.sync_on_write {
            device.sync()?;
        }
        debug!(
            generation = superblock.generation.as_u32(),
            checksum = superblock.checksum,
            "stored superblock"
        );
        Ok(())
    }

    /// Starts a new checkpoint epoch.
    ///
    /// A valid superblock keeps its log region and advances its generation by
    /// one, which makes every previously written log block stale. Anything
    /// else is treated as uninitialized and reset to generation 0 with the
    /// configured log region. The resulting superblock is always written.
    ///
    /// # Errors
    ///
    /// Returns a device error if the device cannot be read or written,
    /// `GenerationOverflow` if a valid superblock is already at `u32::MAX`,
    /// or `InvalidOperation` if a reset would place the log region at
    /// block 0. In the last two cases nothing is written.
    pub fn format(&self, device: &mut dyn Device) -> CoreResult<Superblock> {
        let current = self.load(device)?;

        // A checksum-valid region overlapping the superblock is not trusted.
        let mut next = if current.is_valid() && current.log_start != 0 {
            let generation = current
                .generation
                .next()
                .ok_or(CoreError::GenerationOverflow(current.generation.as_u32()))?;
            info!(
                from = current.generation.as_u32(),
                to = generation.as_u32(),
                "advancing superblock generation"
            );
            Superblock {
                generation,
                ..current
            }
        } else {
            let log_size = self.config.resolve_log_size(device.capacity()?);
            warn!(
                stored = current.checksum,
                computed = current.compute_checksum(),
                log_start = self.config.log_start,
                log_size,
                "superblock invalid, resetting log region"
            );
            Superblock::new(Generation::INITIAL, self.config.log_start, log_size)
        };

        self.store(device, &mut next)?;
        Ok(next)
    }
}
