//! Format command implementation.

use edgelog_core::CheckpointCoordinator;
use edgelog_storage::FileDevice;
use std::path::Path;
use tracing::info;

/// Runs the format command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Formatting {:?}", path);

    let mut device = FileDevice::open(path)?;
    let superblock = CheckpointCoordinator::default().initialize(&mut device)?;

    println!("✓ Device formatted");
    println!("  Generation: {}", superblock.generation.as_u32());
    println!("  Log start:  {}", superblock.log_start);
    println!("  Log size:   {} blocks", superblock.log_size);

    Ok(())
}
