//! Installed filters and their delivery queues.

use ledger_sim_common::{LogRecord, ToLowerHex};
use revm_primitives::B256;
use serde::{ser::SerializeSeq, Serialize, Serializer};

use crate::criteria::LogCriteria;

/// Items matched by a filter, split into those not yet handed out and those already delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeliveryQueue<T> {
    pending: Vec<T>,
    delivered: Vec<T>,
}

impl<T> Default for DeliveryQueue<T> {
    fn default() -> Self {
        Self { pending: Vec::new(), delivered: Vec::new() }
    }
}

impl<T: Clone> DeliveryQueue<T> {
    pub(crate) fn push(&mut self, item: T) {
        self.pending.push(item);
    }

    /// Moves every pending item into the delivered history and returns them.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let drained = std::mem::take(&mut self.pending);
        self.delivered.extend_from_slice(&drained);
        drained
    }

    /// Drains pending items, then returns the full delivered history.
    pub(crate) fn entries(&mut self) -> Vec<T> {
        let _ = self.drain();
        self.delivered.clone()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// The kind of an installed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Matches logs within a block window.
    Log,
    /// Receives the hash of every transaction entering the pending pool.
    PendingTransaction,
    /// Receives the hash of every committed block.
    Block,
}

/// An installed filter. Each kind carries only the state it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActiveFilter {
    Log { criteria: LogCriteria, queue: DeliveryQueue<LogRecord> },
    PendingTransaction(DeliveryQueue<B256>),
    Block(DeliveryQueue<B256>),
}

impl ActiveFilter {
    pub(crate) fn log(criteria: LogCriteria) -> Self {
        Self::Log { criteria, queue: DeliveryQueue::default() }
    }

    pub(crate) const fn kind(&self) -> FilterKind {
        match self {
            Self::Log { .. } => FilterKind::Log,
            Self::PendingTransaction(_) => FilterKind::PendingTransaction,
            Self::Block(_) => FilterKind::Block,
        }
    }

    /// Items matched since the last read.
    pub(crate) fn changes(&mut self) -> FilterChanges {
        match self {
            Self::Log { queue, .. } => FilterChanges::Logs(queue.drain()),
            Self::PendingTransaction(queue) | Self::Block(queue) => {
                FilterChanges::Hashes(queue.drain())
            }
        }
    }

    /// Every item ever matched.
    pub(crate) fn entries(&mut self) -> FilterChanges {
        match self {
            Self::Log { queue, .. } => FilterChanges::Logs(queue.entries()),
            Self::PendingTransaction(queue) | Self::Block(queue) => {
                FilterChanges::Hashes(queue.entries())
            }
        }
    }

    pub(crate) fn pending_len(&self) -> usize {
        match self {
            Self::Log { queue, .. } => queue.pending_len(),
            Self::PendingTransaction(queue) | Self::Block(queue) => queue.pending_len(),
        }
    }
}

impl std::fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActiveFilter {{ kind: {:?}, pending: {} }}", self.kind(), self.pending_len())
    }
}

/// Output of a polled filter: block or transaction hashes, or logs.
///
/// Serializes as a JSON array, hashes as lowercase hex strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterChanges {
    /// No filter with the requested id exists.
    #[default]
    Empty,
    /// Hashes from a block or pending transaction filter.
    Hashes(Vec<B256>),
    /// Logs from a log filter.
    Logs(Vec<LogRecord>),
}

impl FilterChanges {
    /// Number of items.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Hashes(hashes) => hashes.len(),
            Self::Logs(logs) => logs.len(),
        }
    }

    /// True if there are no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The hashes, if this is output of a block or pending transaction filter.
    pub fn as_hashes(&self) -> Option<&[B256]> {
        match self {
            Self::Hashes(hashes) => Some(hashes),
            _ => None,
        }
    }

    /// The logs, if this is output of a log filter.
    pub fn as_logs(&self) -> Option<&[LogRecord]> {
        match self {
            Self::Logs(logs) => Some(logs),
            _ => None,
        }
    }
}

impl Serialize for FilterChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_seq(Some(0))?.end(),
            Self::Hashes(hashes) => serializer.collect_seq(hashes.iter().map(|h| h.to_lower_hex())),
            Self::Logs(logs) => serializer.collect_seq(logs),
        }
    }
}

#[cfg(test)]
mod tests {
    use revm_primitives::b256;

    use super::*;

    const FIRST: B256 = b256!("4131d538cf705c267da7f448ec7460b177f40d28115ad290ba6a1fd734afe280");
    const SECOND: B256 = b256!("3cac643a6a1af584681a6a6dc632cd110a479c9c642e2da92b73fefb45739165");

    #[test]
    fn test_queue_drains_once() {
        let mut queue = DeliveryQueue::default();
        queue.push(FIRST);

        assert_eq!(queue.drain(), vec![FIRST]);
        assert!(queue.drain().is_empty());
        assert_eq!(queue.entries(), vec![FIRST]);
    }

    #[test]
    fn test_entries_include_pending() {
        let mut queue = DeliveryQueue::default();
        queue.push(FIRST);
        assert_eq!(queue.entries(), vec![FIRST]);

        queue.push(SECOND);
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(queue.entries(), vec![FIRST, SECOND]);
        assert_eq!(queue.pending_len(), 0);

        // nothing left for a changes poll after entries drained it
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_serialize_changes() {
        assert_eq!(serde_json::to_string(&FilterChanges::Empty).unwrap(), "[]");
        assert_eq!(serde_json::to_string(&FilterChanges::Logs(vec![])).unwrap(), "[]");
        assert_eq!(
            serde_json::to_value(FilterChanges::Hashes(vec![FIRST, SECOND])).unwrap(),
            serde_json::json!([
                "0x4131d538cf705c267da7f448ec7460b177f40d28115ad290ba6a1fd734afe280",
                "0x3cac643a6a1af584681a6a6dc632cd110a479c9c642e2da92b73fefb45739165"
            ])
        );
    }
}
