//! Inspect command implementation.

use edgelog_core::{Superblock, SuperblockStore};
use edgelog_storage::{Device, FileDevice};
use serde::Serialize;
use std::path::Path;

/// Superblock representation for output.
#[derive(Debug, Serialize)]
pub struct SuperblockInfo {
    /// Device capacity in bytes.
    pub capacity: u64,
    /// Whether the stored checksum matches.
    pub valid: bool,
    /// Stored checksum.
    pub checksum: u64,
    /// Checksum recomputed from the fields.
    pub computed_checksum: u64,
    /// The decoded superblock.
    pub superblock: Superblock,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let device = FileDevice::open_read_only(path)?;
    let store = SuperblockStore::default();
    let superblock = store.load(&device)?;

    let info = SuperblockInfo {
        capacity: device.capacity()?,
        valid: store.validate(&superblock),
        checksum: superblock.checksum,
        computed_checksum: superblock.compute_checksum(),
        superblock,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&info)?),
        _ => print_text_output(path, &info),
    }

    Ok(())
}

fn print_text_output(path: &Path, info: &SuperblockInfo) {
    println!("Device: {}", path.display());
    println!("  Capacity:   {} bytes", info.capacity);
    println!("  Generation: {}", info.superblock.generation.as_u32());
    println!("  Log start:  {}", info.superblock.log_start);
    println!("  Log size:   {} blocks", info.superblock.log_size);
    println!("  Checksum:   {:#018x}", info.checksum);
    if info.valid {
        println!("✓ Superblock valid");
    } else {
        println!(
            "✗ Superblock invalid (computed {:#018x}); run `edgelog format` to initialize",
            info.computed_checksum
        );
    }
}
