//! # edgelog testkit
//!
//! Test utilities for the edgelog journal.
//!
//! This crate provides:
//! - Formatted journal fixtures on in-memory and file devices
//! - Damage injection for crash and corruption scenarios
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use edgelog_testkit::prelude::*;
//!
//! let mut journal = TestJournal::new(8);
//! let written = journal.append_block(&sample_entries(0, 3));
//! assert_eq!(journal.replay(), written);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod damage;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::damage::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use damage::*;
pub use fixtures::*;
pub use generators::*;
