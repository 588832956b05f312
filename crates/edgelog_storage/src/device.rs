//! Device trait definition.

use crate::error::DeviceResult;

/// A raw, fixed-capacity block device.
///
/// Devices are **opaque byte stores** addressed by absolute offset. The
/// journal owns all format interpretation: devices know nothing about
/// superblocks, log blocks, or checksums.
///
/// # Invariants
///
/// - `read_at` returns exactly the bytes most recently written at that range
///   (or zeros for a fresh in-memory device)
/// - `write_at` never changes `capacity`
/// - Accesses are bounds-checked against `capacity` before any I/O
/// - After `sync` returns, previously written bytes survive process exit
///
/// Atomicity of a single `write_at` is whatever the medium provides; a torn
/// write is indistinguishable from corruption.
///
/// # Implementors
///
/// - [`super::InMemoryDevice`] - For testing
/// - [`super::FileDevice`] - For image files and raw block devices
pub trait Device: Send + Sync {
    /// Reads `len` bytes starting at `offset` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The range extends beyond the device capacity
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> DeviceResult<Vec<u8>>;

    /// Overwrites `data.len()` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The range extends beyond the device capacity
    /// - An I/O error occurs
    fn write_at(&mut self, offset: u64, data: &[u8]) -> DeviceResult<()>;

    /// Syncs all written data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> DeviceResult<()>;

    /// Returns the total number of addressable bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity cannot be determined.
    fn capacity(&self) -> DeviceResult<u64>;
}
