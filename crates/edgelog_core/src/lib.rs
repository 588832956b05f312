//! # edgelog core
//!
//! Crash-recoverable journal of graph-edge operations on a raw device.
//!
//! This crate provides:
//! - The fixed on-disk layout of the superblock and log entry blocks
//! - Block checksums for corruption detection
//! - Superblock format (initialize or advance the checkpoint generation)
//! - Log replay (scan and validate the log region after a restart)
//!
//! Appending entries is the job of a log writer built on
//! [`LogBlockStore`]; the graph engine owns the meaning of opcodes.
//!
//! ## Example
//!
//! ```rust
//! use edgelog_core::{CheckpointCoordinator, Generation, LogEntry, LogEntryBlock, NodeId, Opcode};
//! use edgelog_storage::InMemoryDevice;
//!
//! let mut device = InMemoryDevice::new(10 * 4000);
//! let coordinator = CheckpointCoordinator::default();
//! let superblock = coordinator.initialize(&mut device).unwrap();
//!
//! let entry = LogEntry::new(NodeId::new(1), NodeId::new(2), Opcode::new(0));
//! let mut block = LogEntryBlock::with_entries(superblock.generation, &[entry]).unwrap();
//! coordinator
//!     .block_store()
//!     .store(&mut device, superblock.log_start, &mut block)
//!     .unwrap();
//!
//! assert_eq!(coordinator.replay(&device).unwrap(), vec![entry]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
mod checkpoint;
mod config;
mod error;
pub mod layout;
mod log;
mod superblock;
mod types;

pub use checkpoint::{CheckpointCoordinator, Replay, ReplayReport, ReplayStop};
pub use config::{Config, LogSizePolicy};
pub use error::{BlockRejection, CoreError, CoreResult};
pub use log::{LogBlockStore, LogEntry, LogEntryBlock};
pub use superblock::{Superblock, SuperblockStore};
pub use types::{Generation, NodeId, Opcode};

/// Current version of edgelog core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
