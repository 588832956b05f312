//! In-memory device for testing.

use crate::device::Device;
use crate::error::{fits, DeviceError, DeviceResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory device of fixed capacity.
///
/// The device starts zero-filled, which is exactly what a never-initialized
/// disk looks like to the journal. Suitable for:
/// - Unit tests
/// - Recovery tests that corrupt bytes in place
///
/// # Example
///
/// ```rust
/// use edgelog_storage::{Device, InMemoryDevice};
///
/// let device = InMemoryDevice::new(4000);
/// assert_eq!(device.read_at(0, 20).unwrap(), vec![0u8; 20]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDevice {
    data: RwLock<Vec<u8>>,
    syncs: AtomicU64,
}

impl InMemoryDevice {
    /// Creates a zero-filled device of `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_data(vec![0u8; capacity])
    }

    /// Creates a device holding pre-existing bytes.
    ///
    /// The capacity is `data.len()`.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
            syncs: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the device contents.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Returns how many times `sync` has been called.
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }
}

impl Device for InMemoryDevice {
    fn read_at(&self, offset: u64, len: usize) -> DeviceResult<Vec<u8>> {
        let data = self.data.read();
        let capacity = data.len() as u64;

        if !fits(offset, len, capacity) {
            return Err(DeviceError::ReadPastEnd {
                offset,
                len,
                capacity,
            });
        }

        let start = offset as usize;
        Ok(data[start..start + len].to_vec())
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> DeviceResult<()> {
        let mut data = self.data.write();
        let capacity = data.len() as u64;

        if !fits(offset, bytes.len(), capacity) {
            return Err(DeviceError::WritePastEnd {
                offset,
                len: bytes.len(),
                capacity,
            });
        }

        let start = offset as usize;
        data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn sync(&mut self) -> DeviceResult<()> {
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn capacity(&self) -> DeviceResult<u64> {
        Ok(self.data.read().len() as u64)
    }
}
