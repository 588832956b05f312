//! # edgelog storage
//!
//! Device abstraction for the edgelog journal.
//!
//! A device is a **fixed-capacity, positioned byte store**: the journal
//! overwrites regions at known offsets (the superblock at offset 0, log
//! blocks at multiples of the block size) and never appends. Devices do not
//! interpret the bytes they hold.
//!
//! ## Design Principles
//!
//! - Positioned reads return owned buffers of exactly the requested length
//! - Writes never grow the device; a write past capacity is an error
//! - Capacity is queried, never assumed
//! - Must be `Send + Sync`
//!
//! ## Available Devices
//!
//! - [`InMemoryDevice`] - Zero-filled buffer for tests
//! - [`FileDevice`] - Image file or raw block device, exclusively locked
//!
//! ## Example
//!
//! ```rust
//! use edgelog_storage::{Device, InMemoryDevice};
//!
//! let mut device = InMemoryDevice::new(64);
//! device.write_at(8, b"edge").unwrap();
//! assert_eq!(device.read_at(8, 4).unwrap(), b"edge");
//! assert_eq!(device.capacity().unwrap(), 64);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod device;
mod error;
mod file;
mod memory;

pub use device::Device;
pub use error::{DeviceError, DeviceResult};
pub use file::FileDevice;
pub use memory::InMemoryDevice;
