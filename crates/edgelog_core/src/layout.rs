//! Fixed on-disk layout constants.
//!
//! All integers are little-endian. Offsets are absolute device byte offsets.
//!
//! ```text
//! device:  | block 0            | block 1 ... block log_start+log_size-1 |
//!          | superblock (20) .. | log entry blocks (4000 each)           |
//!
//! superblock:      | checksum (8) | generation (4) | log_start (4) | log_size (4) |
//! log entry block: | checksum (8) | generation (4) | n_entries (4) | entries (199 x 20) | pad (4) |
//! log entry:       | node_a_id (8) | node_b_id (8) | opcode (4) |
//! ```

/// Size of the checksum field that leads every checksummed structure.
pub const CHECKSUM_SIZE: usize = 8;

/// Size of the superblock in bytes.
pub const SUPERBLOCK_SIZE: usize = 20;

/// Device offset of the superblock.
pub const SUPERBLOCK_OFFSET: u64 = 0;

/// Size of a log entry block in bytes. Also the unit of block indices.
pub const LOG_BLOCK_SIZE: usize = 4000;

/// Size of the log entry block header (checksum, generation, n_entries).
pub const LOG_BLOCK_HEADER_SIZE: usize = 16;

/// Size of a single log entry in bytes.
pub const LOG_ENTRY_SIZE: usize = 20;

/// Maximum number of entries a log block can hold.
pub const MAX_ENTRIES_PER_BLOCK: usize =
    (LOG_BLOCK_SIZE - LOG_BLOCK_HEADER_SIZE) / LOG_ENTRY_SIZE;

/// Unused trailer bytes at the end of every log block.
pub const LOG_BLOCK_PADDING: usize =
    LOG_BLOCK_SIZE - LOG_BLOCK_HEADER_SIZE - MAX_ENTRIES_PER_BLOCK * LOG_ENTRY_SIZE;

/// Block index a reset format places the log region at.
pub const DEFAULT_LOG_START: u32 = 1;

/// Returns the device byte offset of the log block at `index`.
#[must_use]
pub const fn block_offset(index: u32) -> u64 {
    index as u64 * LOG_BLOCK_SIZE as u64
}

const _: () = assert!(MAX_ENTRIES_PER_BLOCK == 199);
const _: () = assert!(LOG_BLOCK_PADDING == 4);
const _: () = assert!(SUPERBLOCK_SIZE <= LOG_BLOCK_SIZE);
