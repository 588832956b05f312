//! Property-based test generators using proptest.

use edgelog_core::layout::MAX_ENTRIES_PER_BLOCK;
use edgelog_core::{LogEntry, NodeId, Opcode};
use proptest::prelude::*;

/// Strategy for generating node IDs.
pub fn node_id_strategy() -> impl Strategy<Value = NodeId> {
    any::<u64>().prop_map(NodeId::new)
}

/// Strategy for generating log entries.
pub fn log_entry_strategy() -> impl Strategy<Value = LogEntry> {
    (node_id_strategy(), node_id_strategy(), any::<u32>())
        .prop_map(|(a, b, op)| LogEntry::new(a, b, Opcode::new(op)))
}

/// Strategy for the contents of one block: 0 to 199 entries.
pub fn block_entries_strategy() -> impl Strategy<Value = Vec<LogEntry>> {
    prop::collection::vec(log_entry_strategy(), 0..=MAX_ENTRIES_PER_BLOCK)
}

/// Strategy for a log of `1..=max_blocks` blocks with small entry counts.
pub fn log_strategy(max_blocks: usize) -> impl Strategy<Value = Vec<Vec<LogEntry>>> {
    prop::collection::vec(
        prop::collection::vec(log_entry_strategy(), 0..8),
        1..=max_blocks,
    )
}

/// Proptest settings for cheap properties over generated entries.
#[must_use]
pub fn quick_config() -> ProptestConfig {
    ProptestConfig::with_cases(32)
}

/// Proptest settings for recovery properties.
///
/// Every case formats a device and replays it, so shrinking is capped.
#[must_use]
pub fn recovery_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 256,
        ..ProptestConfig::default()
    }
}
