//! Block checksum.
//!
//! Every on-disk structure starts with an 8-byte checksum slot. The checksum
//! covers everything after that slot:
//!
//! 1. Split `bytes[8..len]` into little-endian 4-byte words (a trailing
//!    partial word is zero-padded).
//! 2. XOR all words into a 32-bit accumulator.
//! 3. Widen to 64 bits and add [`CHECKSUM_BIAS`], so an all-zero region
//!    never yields an all-zero (and therefore "valid") checksum.
//!
//! The accumulator is 32 bits wide even though 8 bytes are stored; the upper
//! half of a valid checksum is always zero.
//!
//! ## Limitations
//!
//! This is a corruption detector, not an integrity guarantee:
//!
//! - Any single flipped bit is always detected.
//! - Flipping the same bit position in an even number of words cancels out.
//! - Reordering words is invisible.
//!
//! Callers must not rely on it against deliberate tampering or correlated
//! multi-word damage.

use crate::error::{CoreError, CoreResult};
use crate::layout::CHECKSUM_SIZE;

/// Constant added to the XOR accumulator.
pub const CHECKSUM_BIAS: u64 = 3;

/// Computes the checksum of the structure occupying `bytes[..len]`.
///
/// # Errors
///
/// Returns `ShortBuffer` if `bytes` holds fewer than `len` bytes or `len`
/// cannot hold the checksum slot itself.
pub fn compute(bytes: &[u8], len: usize) -> CoreResult<u64> {
    if len < CHECKSUM_SIZE {
        return Err(CoreError::short_buffer(CHECKSUM_SIZE, len));
    }
    let region = bytes
        .get(CHECKSUM_SIZE..len)
        .ok_or_else(|| CoreError::short_buffer(len, bytes.len()))?;

    let mut words = region.chunks_exact(4);
    let mut acc = words.by_ref().fold(0u32, |acc, word| {
        acc ^ u32::from_le_bytes([word[0], word[1], word[2], word[3]])
    });

    let tail = words.remainder();
    if !tail.is_empty() {
        let mut word = [0u8; 4];
        word[..tail.len()].copy_from_slice(tail);
        acc ^= u32::from_le_bytes(word);
    }

    Ok(u64::from(acc) + CHECKSUM_BIAS)
}

/// Returns true if `claimed` matches the checksum of `bytes[..len]`.
///
/// # Errors
///
/// Returns `ShortBuffer` under the same conditions as [`compute`].
pub fn validate(bytes: &[u8], len: usize, claimed: u64) -> CoreResult<bool> {
    Ok(compute(bytes, len)? == claimed)
}

/// Reads the checksum stored in the leading slot of `bytes`.
///
/// # Errors
///
/// Returns `ShortBuffer` if `bytes` is shorter than the slot.
pub fn stored(bytes: &[u8]) -> CoreResult<u64> {
    let slot: [u8; CHECKSUM_SIZE] = bytes
        .get(..CHECKSUM_SIZE)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| CoreError::short_buffer(CHECKSUM_SIZE, bytes.len()))?;
    Ok(u64::from_le_bytes(slot))
}
