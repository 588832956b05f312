//! Log region: fixed-size blocks of graph-edge operations.
//!
//! The log region is a linear run of `log_size` blocks starting at block
//! index `log_start`. Each block is written whole by the log writer and
//! carries its own checksum and the generation it was written under.
//!
//! ## Block Format
//!
//! ```text
//! | checksum (8) | generation (4) | n_entries (4) | entries (199 x 20) | pad (4) |
//! ```
//!
//! ## Currency Rules
//!
//! A block is **current** only if all of the following hold:
//!
//! - its checksum matches its contents
//! - `n_entries <= 199`
//! - its generation equals the superblock generation
//!
//! A checksum-valid block from an older generation is stale: it occupies a
//! slot that the current epoch has not rewritten yet. Entries beyond
//! `n_entries` are padding and never interpreted.

mod block;
mod entry;
mod store;

pub use block::LogEntryBlock;
pub use entry::LogEntry;
pub use store::LogBlockStore;
