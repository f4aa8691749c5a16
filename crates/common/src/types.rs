use num_bigint::BigUint;
use revm_primitives::{Address, Bytes, Log, LogData, B256};
use serde::{Serialize, Serializer};

use crate::ToLowerHex;

/// Height of a block. Heights are unbounded and never narrowed to a machine word.
pub type BlockNumber = BigUint;

/// The parts of a committed block header the engine cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHeader {
    /// Height of the block.
    pub number: BlockNumber,
    /// Unix timestamp of the block.
    pub timestamp: u64,
}

impl BlockHeader {
    /// Creates a header at the given height with a zero timestamp.
    pub fn new(number: impl Into<BlockNumber>) -> Self {
        Self { number: number.into(), timestamp: 0 }
    }
}

/// A log emitted by a `LOG0`..`LOG4` instruction.
///
/// The record is immutable. Provenance (block, transaction and index) is absent when the log is
/// decoded from a trace step and attached once the containing transaction is committed, through
/// [`LogRecord::with_provenance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    inner: Log,
    block_number: Option<BlockNumber>,
    transaction_hash: Option<B256>,
    log_index: Option<u64>,
}

impl LogRecord {
    /// Creates a log without provenance. Returns `None` if more than 4 topics are given.
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Option<Self> {
        let data = LogData::new(topics, data)?;
        Some(Self {
            inner: Log { address, data },
            block_number: None,
            transaction_hash: None,
            log_index: None,
        })
    }

    /// Returns a copy of this log stamped with the position it was committed at.
    pub fn with_provenance(
        self,
        block_number: BlockNumber,
        transaction_hash: B256,
        log_index: u64,
    ) -> Self {
        Self {
            block_number: Some(block_number),
            transaction_hash: Some(transaction_hash),
            log_index: Some(log_index),
            ..self
        }
    }

    /// Returns a copy of this log with its block number replaced, keeping the rest of its
    /// provenance.
    pub fn with_block_number(self, block_number: BlockNumber) -> Self {
        Self { block_number: Some(block_number), ..self }
    }

    /// Contract address from which the log originated.
    pub fn address(&self) -> Address {
        self.inner.address
    }

    /// Indexed topics, in the order the emitting code pushed them.
    pub fn topics(&self) -> &[B256] {
        self.inner.data.topics()
    }

    /// Non-indexed payload.
    pub fn data(&self) -> &Bytes {
        &self.inner.data.data
    }

    /// Block the log was committed in, if committed.
    pub fn block_number(&self) -> Option<&BlockNumber> {
        self.block_number.as_ref()
    }

    /// Hash of the transaction that emitted the log, if committed.
    pub fn transaction_hash(&self) -> Option<B256> {
        self.transaction_hash
    }

    /// Index of the log within its block, if committed.
    pub fn log_index(&self) -> Option<u64> {
        self.log_index
    }

    /// The underlying primitive log.
    pub fn as_log(&self) -> &Log {
        &self.inner
    }
}

/// JSON shape of a [`LogRecord`], with quantities and byte strings as lowercase hex.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedLog {
    address: String,
    topics: Vec<String>,
    data: String,
    block_number: Option<String>,
    transaction_hash: Option<String>,
    log_index: Option<String>,
}

impl From<&LogRecord> for SerializedLog {
    fn from(value: &LogRecord) -> Self {
        Self {
            address: value.address().to_lower_hex(),
            topics: value.topics().iter().map(|t| t.to_lower_hex()).collect(),
            data: value.data().to_lower_hex(),
            block_number: value.block_number().map(|n| n.to_lower_hex()),
            transaction_hash: value.transaction_hash().map(|h| h.to_lower_hex()),
            log_index: value.log_index().map(|i| i.to_lower_hex()),
        }
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerializedLog::from(self).serialize(serializer)
    }
}
