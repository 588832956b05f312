//! Journal fixtures.
//!
//! Provides formatted devices and a minimal block appender so tests can
//! lay down log history without a real log writer.

use edgelog_core::layout::LOG_BLOCK_SIZE;
use edgelog_core::{
    CheckpointCoordinator, Config, LogEntry, LogEntryBlock, NodeId, Opcode, Replay, Superblock,
};
use edgelog_storage::{Device, FileDevice, InMemoryDevice};
use std::path::PathBuf;
use tempfile::TempDir;

/// A formatted journal with an append cursor.
pub struct TestJournal<D: Device = InMemoryDevice> {
    /// The device holding the journal.
    pub device: D,
    /// Coordinator used for format and replay.
    pub coordinator: CheckpointCoordinator,
    /// Superblock written by the most recent checkpoint.
    pub superblock: Superblock,
    next_block: u32,
}

impl TestJournal<InMemoryDevice> {
    /// Creates a formatted in-memory journal spanning `blocks` device blocks.
    ///
    /// Block 0 holds the superblock, so the log region has `blocks - 1` slots.
    pub fn new(blocks: usize) -> Self {
        Self::with_config(blocks, Config::new().sync_on_write(false))
    }

    /// Creates a formatted in-memory journal with a custom configuration.
    pub fn with_config(blocks: usize, config: Config) -> Self {
        Self::format(InMemoryDevice::new(blocks * LOG_BLOCK_SIZE), config)
    }
}

impl<D: Device> TestJournal<D> {
    /// Formats `device` and wraps it.
    pub fn format(mut device: D, config: Config) -> Self {
        let coordinator = CheckpointCoordinator::new(config);
        let superblock = coordinator
            .initialize(&mut device)
            .expect("Failed to format test device");
        Self {
            device,
            next_block: superblock.log_start,
            coordinator,
            superblock,
        }
    }

    /// Index of the block the next append will write.
    pub fn next_block(&self) -> u32 {
        self.next_block
    }

    /// Writes one block holding `entries` under the current generation.
    ///
    /// Returns the entries for comparison with replay output.
    pub fn append_block(&mut self, entries: &[LogEntry]) -> Vec<LogEntry> {
        let mut block = LogEntryBlock::with_entries(self.superblock.generation, entries)
            .expect("Too many entries for one block");
        self.coordinator
            .block_store()
            .store(&mut self.device, self.next_block, &mut block)
            .expect("Failed to store log block");
        self.next_block += 1;
        entries.to_vec()
    }

    /// Writes one block per element of `blocks`, in order.
    pub fn append_blocks(&mut self, blocks: &[Vec<LogEntry>]) -> Vec<LogEntry> {
        blocks
            .iter()
            .flat_map(|entries| self.append_block(entries))
            .collect()
    }

    /// Starts a new epoch and rewinds the append cursor to `log_start`.
    pub fn checkpoint(&mut self) -> Superblock {
        self.superblock = self
            .coordinator
            .initialize(&mut self.device)
            .expect("Failed to checkpoint test device");
        self.next_block = self.superblock.log_start;
        self.superblock
    }

    /// Replays the journal, returning entries only.
    pub fn replay(&self) -> Vec<LogEntry> {
        self.coordinator
            .replay(&self.device)
            .expect("Replay failed")
    }

    /// Replays the journal, returning entries and report.
    pub fn replay_with_report(&self) -> Replay {
        self.coordinator
            .replay_with_report(&self.device)
            .expect("Replay failed")
    }
}

/// A journal on an image file in a temporary directory.
pub struct FileJournal {
    /// Path of the image file.
    pub path: PathBuf,
    _temp_dir: TempDir,
}

impl FileJournal {
    /// Creates a zero-filled image of `blocks` device blocks.
    pub fn new(blocks: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("journal.img");
        FileDevice::create(&path, (blocks * LOG_BLOCK_SIZE) as u64)
            .expect("Failed to create image file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Opens the image for writing.
    pub fn open(&self) -> FileDevice {
        FileDevice::open(&self.path).expect("Failed to open image file")
    }
}

/// Deterministic entries for block `block`, distinct across blocks.
pub fn sample_entries(block: u32, count: usize) -> Vec<LogEntry> {
    (0..count as u64)
        .map(|i| {
            LogEntry::new(
                NodeId::new((u64::from(block) << 32) | i),
                NodeId::new(i + 1),
                Opcode::new(block % 3),
            )
        })
        .collect()
}
