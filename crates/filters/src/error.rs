use ledger_sim_common::BlockNumber;

/// Errors surfaced by the filter registry to its callers.
///
/// Unknown filter ids are not errors: reads return nothing and removals return `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A block selector was neither a tag nor a block number.
    #[error(
        "invalid block selector `{0}`: expected `earliest`, `latest`, `pending` or a block number"
    )]
    InvalidBlockSelector(String),
    /// An address could not be parsed.
    #[error("invalid address `{input}`: {reason}")]
    InvalidAddress {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A topic could not be parsed as a 32-byte value.
    #[error("invalid topic `{input}` at position {position}: {reason}")]
    InvalidTopic {
        /// The rejected input.
        input: String,
        /// Position of the topic in the request.
        position: usize,
        /// Why it was rejected.
        reason: String,
    },
    /// More than four topic positions were requested.
    #[error("only up to four topics are allowed, got {0}")]
    TooManyTopics(usize),
    /// A committed block reported a height below the chain cursor.
    #[error("chain cursor regression: block {reported} reported while the cursor is at {current}")]
    CursorRegression {
        /// Cursor value when the block arrived.
        current: BlockNumber,
        /// Height reported by the block.
        reported: BlockNumber,
    },
}
