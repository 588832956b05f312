//! Log entry codec.

use crate::error::{CoreError, CoreResult};
use crate::layout::LOG_ENTRY_SIZE;
use crate::types::{NodeId, Opcode};
use std::fmt;

/// One directed, typed relation mutation between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// Source node.
    pub node_a: NodeId,
    /// Target node.
    pub node_b: NodeId,
    /// Mutation kind, interpreted by the graph engine.
    pub opcode: Opcode,
}

impl LogEntry {
    /// Creates a new entry.
    #[must_use]
    pub const fn new(node_a: NodeId, node_b: NodeId, opcode: Opcode) -> Self {
        Self {
            node_a,
            node_b,
            opcode,
        }
    }

    /// Encodes the entry into its 20-byte on-disk form.
    #[must_use]
    pub fn encode(&self) -> [u8; LOG_ENTRY_SIZE] {
        let mut buf = [0u8; LOG_ENTRY_SIZE];
        buf[0..8].copy_from_slice(&self.node_a.as_u64().to_le_bytes());
        buf[8..16].copy_from_slice(&self.node_b.as_u64().to_le_bytes());
        buf[16..20].copy_from_slice(&self.opcode.as_u32().to_le_bytes());
        buf
    }

    /// Decodes an entry from the first 20 bytes of `data`.
    ///
    /// # Errors
    ///
    /// Returns `ShortBuffer` if `data` holds fewer than 20 bytes.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        let raw: &[u8; LOG_ENTRY_SIZE] = data
            .get(..LOG_ENTRY_SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::short_buffer(LOG_ENTRY_SIZE, data.len()))?;

        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut op = [0u8; 4];
        a.copy_from_slice(&raw[0..8]);
        b.copy_from_slice(&raw[8..16]);
        op.copy_from_slice(&raw[16..20]);

        Ok(Self {
            node_a: NodeId::new(u64::from_le_bytes(a)),
            node_b: NodeId::new(u64::from_le_bytes(b)),
            opcode: Opcode::new(u32::from_le_bytes(op)),
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.node_a, self.node_b, self.opcode)
    }
}
