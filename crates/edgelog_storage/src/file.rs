//! File-backed device for image files and raw block devices.

use crate::device::Device;
use crate::error::{fits, DeviceError, DeviceResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A device backed by an OS file handle.
///
/// Works with regular image files and with raw block devices such as
/// `/dev/sdb`. Capacity is measured once at open time by seeking to the end,
/// since block devices report a zero length in their metadata.
///
/// # Locking
///
/// The journal assumes a single writer. `open` takes an exclusive advisory
/// lock and `open_read_only` a shared one; both are released when the
/// device is dropped.
///
/// # Example
///
/// ```no_run
/// use edgelog_storage::{Device, FileDevice};
/// use std::path::Path;
///
/// let mut device = FileDevice::open(Path::new("/dev/sdb")).unwrap();
/// device.write_at(0, &[0u8; 20]).unwrap();
/// device.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileDevice {
    path: PathBuf,
    file: RwLock<File>,
    capacity: u64,
    writable: bool,
}

impl FileDevice {
    /// Opens an existing file or block device for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be opened, its capacity cannot be
    /// measured, or another handle holds the lock.
    pub fn open(path: &Path) -> DeviceResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        if file.try_lock_exclusive().is_err() {
            return Err(DeviceError::Locked {
                path: path.to_path_buf(),
            });
        }
        Self::from_locked(path, file, true)
    }

    /// Opens an existing file or block device for reading only.
    ///
    /// Writes through this handle fail with `PermissionDenied`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be opened or a writer holds the
    /// lock.
    pub fn open_read_only(path: &Path) -> DeviceResult<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        if file.try_lock_shared().is_err() {
            return Err(DeviceError::Locked {
                path: path.to_path_buf(),
            });
        }
        Self::from_locked(path, file, false)
    }

    /// Creates a new zero-filled image file of `capacity` bytes.
    ///
    /// Refuses to overwrite an existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be sized.
    pub fn create(path: &Path, capacity: u64) -> DeviceResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        if file.try_lock_exclusive().is_err() {
            return Err(DeviceError::Locked {
                path: path.to_path_buf(),
            });
        }
        file.set_len(capacity)?;
        Self::from_locked(path, file, true)
    }

    fn from_locked(path: &Path, mut file: File, writable: bool) -> DeviceResult<Self> {
        let capacity = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            capacity,
            writable,
        })
    }

    /// Returns the path of the underlying file or device node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the device was opened for writing.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

impl Device for FileDevice {
    fn read_at(&self, offset: u64, len: usize) -> DeviceResult<Vec<u8>> {
        if !fits(offset, len, self.capacity) {
            return Err(DeviceError::ReadPastEnd {
                offset,
                len,
                capacity: self.capacity,
            });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> DeviceResult<()> {
        if !self.writable {
            return Err(DeviceError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} was opened read-only", self.path.display()),
            )));
        }

        if !fits(offset, data.len(), self.capacity) {
            return Err(DeviceError::WritePastEnd {
                offset,
                len: data.len(),
                capacity: self.capacity,
            });
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        Ok(())
    }

    fn sync(&mut self) -> DeviceResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        if self.writable {
            file.sync_all()?;
        }
        Ok(())
    }

    fn capacity(&self) -> DeviceResult<u64> {
        Ok(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_is_zero_filled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let device = FileDevice::create(&path, 4096).unwrap();
        assert_eq!(device.capacity().unwrap(), 4096);
        assert_eq!(device.read_at(4000, 96).unwrap(), vec![0u8; 96]);
        assert!(path.exists());
    }

    #[test]
    fn file_create_refuses_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");
        std::fs::write(&path, b"keep me").unwrap();

        assert!(FileDevice::create(&path, 64).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let mut device = FileDevice::create(&path, 64).unwrap();
        device.write_at(20, b"hello world").unwrap();

        assert_eq!(device.read_at(20, 11).unwrap(), b"hello world");
        assert_eq!(device.read_at(26, 5).unwrap(), b"world");
    }

    #[test]
    fn file_write_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let mut device = FileDevice::create(&path, 16).unwrap();
        let result = device.write_at(10, b"too long!");

        assert!(matches!(result, Err(DeviceError::WritePastEnd { .. })));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16);
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let device = FileDevice::create(&path, 16).unwrap();
        let result = device.read_at(12, 8);
        assert!(matches!(result, Err(DeviceError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        {
            let mut device = FileDevice::create(&path, 64).unwrap();
            device.write_at(0, b"persistent").unwrap();
            device.sync().unwrap();
        }

        {
            let device = FileDevice::open(&path).unwrap();
            assert_eq!(device.capacity().unwrap(), 64);
            assert_eq!(device.read_at(0, 10).unwrap(), b"persistent");
        }
    }

    #[test]
    fn file_second_writer_is_locked_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let _first = FileDevice::create(&path, 64).unwrap();
        let second = FileDevice::open(&path);
        assert!(matches!(second, Err(DeviceError::Locked { .. })));
    }

    #[test]
    fn file_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");
        drop(FileDevice::create(&path, 64).unwrap());

        let mut device = FileDevice::open_read_only(&path).unwrap();
        assert!(!device.is_writable());
        assert!(device.write_at(0, b"x").is_err());
        assert_eq!(device.read_at(0, 1).unwrap(), vec![0u8]);
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        let device = FileDevice::create(&path, 8).unwrap();
        assert_eq!(device.path(), path);
    }
}
