//! CLI command implementations.

pub mod format;
pub mod inspect;
pub mod replay;
