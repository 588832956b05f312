//! Damage injection for crash and corruption tests.
//!
//! Each [`Damage`] rewrites bytes of one log block in place, the way a
//! failing disk or an interrupted write would.

use edgelog_core::layout::{block_offset, CHECKSUM_SIZE, LOG_BLOCK_SIZE};
use edgelog_core::LogEntryBlock;
use edgelog_storage::Device;

/// Ways a log block can be damaged.
#[derive(Debug, Clone)]
pub enum Damage {
    /// Flip one bit at `offset` within the block.
    FlipBit {
        /// Byte offset within the block.
        offset: usize,
        /// Bit position, 0-7.
        bit: u8,
    },
    /// Overwrite the stored checksum with garbage.
    ClobberChecksum,
    /// Simulate power loss mid-write: only the first `written` bytes of
    /// `replacement` reach the device.
    TornWrite {
        /// Sealed block that was being written.
        replacement: Box<LogEntryBlock>,
        /// Bytes that made it to the medium.
        written: usize,
    },
    /// Zero the whole block.
    Zero,
}

/// Applies `damage` to the log block at `index`.
///
/// # Panics
///
/// Panics if the block is outside the device.
pub fn damage_block(device: &mut dyn Device, index: u32, damage: &Damage) {
    let base = block_offset(index);
    match damage {
        Damage::FlipBit { offset, bit } => {
            let at = base + *offset as u64;
            let mut byte = device.read_at(at, 1).expect("Failed to read block byte");
            byte[0] ^= 1 << *bit;
            device.write_at(at, &byte).expect("Failed to write block byte");
        }
        Damage::ClobberChecksum => {
            let mut slot = device
                .read_at(base, CHECKSUM_SIZE)
                .expect("Failed to read checksum");
            for b in &mut slot {
                *b = !*b;
            }
            device.write_at(base, &slot).expect("Failed to write checksum");
        }
        Damage::TornWrite {
            replacement,
            written,
        } => {
            let len = (*written).min(LOG_BLOCK_SIZE);
            device
                .write_at(base, &replacement.as_bytes()[..len])
                .expect("Failed to write torn block");
        }
        Damage::Zero => {
            device
                .write_at(base, &[0u8; LOG_BLOCK_SIZE])
                .expect("Failed to zero block");
        }
    }
}
