//! Checkpoint coordination: format and replay.
//!
//! ## Format
//!
//! [`CheckpointCoordinator::initialize`] starts a new epoch. A trustworthy
//! superblock keeps its log region and advances its generation; anything
//! else is reset to generation 0 with a log region sized from the device.
//!
//! ```text
//! UNINITIALIZED --format (checksum invalid)--> FORMATTED(0)
//! FORMATTED(g)  --format (checksum valid)----> FORMATTED(g + 1)
//! ```
//!
//! ## Replay
//!
//! [`CheckpointCoordinator::replay`] walks the log region linearly from
//! `log_start`, keeping every entry of every current block, and stops at
//! the first block that is not current. That block marks the tail of
//! durable history: either the log writer never reached it in this epoch
//! (stale generation) or a crash tore it (checksum mismatch).
//!
//! ### Tolerated Conditions (end of log)
//!
//! - Checksum mismatch, oversized entry count, or stale generation
//! - A log region that claims blocks beyond the device's capacity
//!
//! ### Fatal Conditions
//!
//! - Superblock checksum mismatch: `CorruptSuperblock`
//! - Log region starting at block 0: `InvalidOperation`
//! - Device read failure
//!
//! Entries are returned in block order, then slot order, which is the order
//! the log writer appended them.

use crate::config::Config;
use crate::error::{BlockRejection, CoreError, CoreResult};
use crate::layout::{block_offset, LOG_BLOCK_SIZE};
use crate::log::{LogBlockStore, LogEntry};
use crate::superblock::{Superblock, SuperblockStore};
use crate::types::Generation;
use edgelog_storage::Device;
use tracing::{info, warn};

/// Why replay stopped scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplayStop {
    /// Every block in the log region was current.
    RegionExhausted,
    /// The block at `index` was not current.
    Rejected {
        /// Absolute block index.
        index: u32,
        /// Why it was rejected.
        reason: BlockRejection,
    },
    /// The log region extends past the device; `index` is the first block
    /// that does not fit.
    DeviceEnd {
        /// Absolute block index.
        index: u64,
    },
}

/// Summary of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayReport {
    /// Generation replay matched blocks against.
    pub generation: Generation,
    /// First block of the log region.
    pub log_start: u32,
    /// Number of blocks in the log region.
    pub log_size: u32,
    /// Blocks loaded, including the one that stopped replay.
    pub blocks_scanned: u64,
    /// Blocks accepted as current.
    pub blocks_valid: u64,
    /// Entries recovered.
    pub entries_recovered: u64,
    /// Why scanning stopped.
    pub stop: ReplayStop,
}

/// Entries recovered by a replay, with its report.
#[derive(Debug, Clone)]
pub struct Replay {
    /// Recovered entries in append order.
    pub entries: Vec<LogEntry>,
    /// What replay saw.
    pub report: ReplayReport,
}

/// Orchestrates format and replay over one device.
///
/// The coordinator holds no device state: every call takes the device
/// explicitly and releases all buffers before returning.
#[derive(Debug, Clone, Default)]
pub struct CheckpointCoordinator {
    superblocks: SuperblockStore,
    blocks: LogBlockStore,
}

impl CheckpointCoordinator {
    /// Creates a coordinator with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            blocks: LogBlockStore::new(&config),
            superblocks: SuperblockStore::new(config),
        }
    }

    /// Returns the superblock store.
    #[must_use]
    pub fn superblock_store(&self) -> &SuperblockStore {
        &self.superblocks
    }

    /// Returns the log block store, for log writers appending blocks.
    #[must_use]
    pub fn block_store(&self) -> &LogBlockStore {
        &self.blocks
    }

    /// Formats the device, starting a new checkpoint epoch.
    ///
    /// # Errors
    ///
    /// See [`SuperblockStore::format`].
    pub fn initialize(&self, device: &mut dyn Device) -> CoreResult<Superblock> {
        self.superblocks.format(device)
    }

    /// Returns the current superblock, which must be valid.
    ///
    /// # Errors
    ///
    /// Returns `CorruptSuperblock` or a device error.
    pub fn superblock(&self, device: &dyn Device) -> CoreResult<Superblock> {
        self.superblocks.load_valid(device)
    }

    /// Recovers the ordered entries of the current epoch.
    ///
    /// # Errors
    ///
    /// Returns `CorruptSuperblock` if the superblock is invalid,
    /// `InvalidOperation` if its log region overlaps the superblock, or a
    /// device error if a block inside the device cannot be read.
    pub fn replay(&self, device: &dyn Device) -> CoreResult<Vec<LogEntry>> {
        Ok(self.replay_with_report(device)?.entries)
    }

    /// Recovers the ordered entries of the current epoch and reports how far
    /// replay got.
    ///
    /// # Errors
    ///
    /// Same as [`CheckpointCoordinator::replay`].
    pub fn replay_with_report(&self, device: &dyn Device) -> CoreResult<Replay> {
        let superblock = self.superblocks.load_valid(device)?;
        if superblock.log_start == 0 {
            return Err(CoreError::invalid_operation(
                "log region starts at block 0, which holds the superblock",
            ));
        }
        let generation = superblock.generation;
        let capacity = device.capacity()?;

        let mut entries = Vec::new();
        let mut blocks_scanned = 0u64;
        let mut blocks_valid = 0u64;
        let mut stop = ReplayStop::RegionExhausted;

        for index in u64::from(superblock.log_start)..superblock.log_end() {
            let Some(block_index) = u32::try_from(index)
                .ok()
                .filter(|&i| block_offset(i) + LOG_BLOCK_SIZE as u64 <= capacity)
            else {
                warn!(index, capacity, "log region extends past end of device");
                stop = ReplayStop::DeviceEnd { index };
                break;
            };

            blocks_scanned += 1;
            match self.blocks.load_current(device, block_index, generation) {
                Ok(block) => {
                    blocks_valid += 1;
                    entries.extend(block.entries());
                }
                Err(CoreError::StaleOrCorruptBlock { index, reason }) => {
                    if matches!(reason, BlockRejection::StaleGeneration { .. }) {
                        info!(index, %reason, "replay reached end of current epoch");
                    } else {
                        warn!(index, %reason, "replay stopped at damaged block");
                    }
                    stop = ReplayStop::Rejected { index, reason };
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let report = ReplayReport {
            generation,
            log_start: superblock.log_start,
            log_size: superblock.log_size,
            blocks_scanned,
            blocks_valid,
            entries_recovered: entries.len() as u64,
            stop,
        };
        info!(
            generation = generation.as_u32(),
            blocks_valid,
            entries = report.entries_recovered,
            "replay complete"
        );

        Ok(Replay { entries, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogSizePolicy;
    use crate::log::LogEntryBlock;
    use crate::types::{NodeId, Opcode};
    use edgelog_storage::InMemoryDevice;

    fn device(blocks: usize) -> InMemoryDevice {
        InMemoryDevice::new(blocks * LOG_BLOCK_SIZE)
    }

    fn entries_for(block: u32, n: u64) -> Vec<LogEntry> {
        (0..n)
            .map(|i| {
                LogEntry::new(
                    NodeId::new(u64::from(block) * 1000 + i),
                    NodeId::new(i),
                    Opcode::new(block),
                )
            })
            .collect()
    }

    /// Writes `count` blocks of `per_block` entries from `log_start`.
    fn write_blocks(
        coordinator: &CheckpointCoordinator,
        dev: &mut InMemoryDevice,
        generation: Generation,
        count: u32,
        per_block: u64,
    ) -> Vec<LogEntry> {
        let start = coordinator.superblock(&*dev).unwrap().log_start;
        let mut written = Vec::new();
        for i in 0..count {
            let entries = entries_for(i, per_block);
            let mut block = LogEntryBlock::with_entries(generation, &entries).unwrap();
            coordinator
                .block_store()
                .store(dev, start + i, &mut block)
                .unwrap();
            written.extend(entries);
        }
        written
    }

    #[test]
    fn initialize_fresh_device() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();

        let sb = coordinator.initialize(&mut dev).unwrap();

        assert_eq!(sb.generation, Generation::INITIAL);
        assert_eq!(coordinator.superblock(&dev).unwrap(), sb);
    }

    #[test]
    fn replay_requires_valid_superblock() {
        let dev = device(11);
        let result = CheckpointCoordinator::default().replay(&dev);
        assert!(matches!(result, Err(CoreError::CorruptSuperblock { .. })));
    }

    #[test]
    fn superblock_is_never_replayed_as_log_block() {
        let mut dev = device(5);
        let coordinator = CheckpointCoordinator::new(Config::new().log_start(0));
        assert!(matches!(
            coordinator.initialize(&mut dev),
            Err(CoreError::InvalidOperation { .. })
        ));

        // A region over block 0 written by another tool still checksums.
        let mut raw = Superblock::new(Generation::INITIAL, 0, 5);
        raw.seal();
        dev.write_at(0, &raw.encode()).unwrap();

        let result = coordinator.replay_with_report(&dev);
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
    }

    #[test]
    fn replay_empty_log() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();
        coordinator.initialize(&mut dev).unwrap();

        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert!(replay.entries.is_empty());
        assert_eq!(replay.report.blocks_scanned, 1);
        assert_eq!(replay.report.blocks_valid, 0);
        assert!(matches!(
            replay.report.stop,
            ReplayStop::Rejected {
                index: 1,
                reason: BlockRejection::ChecksumMismatch { .. }
            }
        ));
    }

    #[test]
    fn replay_full_region_in_order() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();
        let sb = coordinator.initialize(&mut dev).unwrap();
        let written = write_blocks(&coordinator, &mut dev, sb.generation, 10, 199);

        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert_eq!(replay.entries, written);
        assert_eq!(replay.report.blocks_valid, 10);
        assert_eq!(replay.report.entries_recovered, 1990);
        assert_eq!(replay.report.stop, ReplayStop::RegionExhausted);
    }

    #[test]
    fn replay_stops_at_corrupted_block() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();
        let sb = coordinator.initialize(&mut dev).unwrap();
        let written = write_blocks(&coordinator, &mut dev, sb.generation, 10, 7);

        // Corrupt the sixth block of the region (relative index 5).
        let sixth = block_offset(sb.log_start + 5);
        dev.write_at(sixth, &[0xFF; 8]).unwrap();

        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert_eq!(replay.entries, written[..5 * 7].to_vec());
        assert_eq!(replay.report.blocks_valid, 5);
        assert_eq!(replay.report.blocks_scanned, 6);
        assert!(matches!(
            replay.report.stop,
            ReplayStop::Rejected { index: 6, .. }
        ));
    }

    #[test]
    fn replay_skips_padding_entries() {
        let mut dev = device(4);
        let coordinator = CheckpointCoordinator::default();
        let sb = coordinator.initialize(&mut dev).unwrap();
        let written = write_blocks(&coordinator, &mut dev, sb.generation, 3, 2);

        assert_eq!(coordinator.replay(&dev).unwrap(), written);
    }

    #[test]
    fn new_epoch_makes_old_blocks_stale() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();
        let sb = coordinator.initialize(&mut dev).unwrap();
        write_blocks(&coordinator, &mut dev, sb.generation, 4, 3);

        let next = coordinator.initialize(&mut dev).unwrap();
        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert!(replay.entries.is_empty());
        assert_eq!(
            replay.report.stop,
            ReplayStop::Rejected {
                index: 1,
                reason: BlockRejection::StaleGeneration {
                    expected: next.generation.as_u32(),
                    found: sb.generation.as_u32(),
                }
            }
        );
    }

    #[test]
    fn rewritten_slots_shadow_stale_tail() {
        let mut dev = device(11);
        let coordinator = CheckpointCoordinator::default();
        let first = coordinator.initialize(&mut dev).unwrap();
        write_blocks(&coordinator, &mut dev, first.generation, 6, 5);

        let second = coordinator.initialize(&mut dev).unwrap();
        let written = write_blocks(&coordinator, &mut dev, second.generation, 2, 4);

        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert_eq!(replay.entries, written);
        assert!(matches!(
            replay.report.stop,
            ReplayStop::Rejected {
                index: 3,
                reason: BlockRejection::StaleGeneration { .. }
            }
        ));
    }

    #[test]
    fn region_past_device_end_is_end_of_log() {
        let mut dev = device(4);
        let config = Config::new().log_size(LogSizePolicy::Fixed(2_000_000_000));
        let coordinator = CheckpointCoordinator::new(config);
        let sb = coordinator.initialize(&mut dev).unwrap();
        let written = write_blocks(&coordinator, &mut dev, sb.generation, 3, 1);

        let replay = coordinator.replay_with_report(&dev).unwrap();

        assert_eq!(replay.entries, written);
        assert_eq!(replay.report.stop, ReplayStop::DeviceEnd { index: 4 });
    }

    #[test]
    fn zero_sized_region_replays_nothing() {
        let mut dev = device(1);
        let coordinator = CheckpointCoordinator::default();
        let sb = coordinator.initialize(&mut dev).unwrap();

        assert_eq!(sb.log_size, 0);
        let replay = coordinator.replay_with_report(&dev).unwrap();
        assert!(replay.entries.is_empty());
        assert_eq!(replay.report.blocks_scanned, 0);
        assert_eq!(replay.report.stop, ReplayStop::RegionExhausted);
    }
}
