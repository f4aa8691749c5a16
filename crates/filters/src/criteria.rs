//! Log subscription predicates.

use ledger_sim_common::{BlockNumber, LogRecord};
use revm_primitives::{Address, B256};

use crate::BlockSelector;

/// A log subscription request, before its block selectors are resolved.
///
/// An empty address list matches every address. A `None` topic position matches any topic, or
/// the absence of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Start of the block window (inclusive).
    pub from_block: BlockSelector,
    /// End of the block window (inclusive).
    pub to_block: BlockSelector,
    /// Addresses logs must originate from (OR logic).
    pub addresses: Vec<Address>,
    /// Positional topic constraints (AND logic across positions).
    pub topics: [Option<B256>; 4],
}

impl LogFilter {
    /// Creates a filter on every address from the chain head onwards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start block.
    pub fn from_block(mut self, block: impl Into<BlockSelector>) -> Self {
        self.from_block = block.into();
        self
    }

    /// Sets the end block.
    pub fn to_block(mut self, block: impl Into<BlockSelector>) -> Self {
        self.to_block = block.into();
        self
    }

    /// Adds an address to match.
    pub fn address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// Sets the topic constraint at `index`. Indices beyond 3 are ignored.
    pub fn topic(mut self, index: usize, topic: B256) -> Self {
        if let Some(slot) = self.topics.get_mut(index) {
            *slot = Some(topic);
        }
        self
    }
}

/// A [`LogFilter`] with its block window resolved against the cursor at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogCriteria {
    from_block: BlockNumber,
    to_block: Option<BlockNumber>,
    addresses: Vec<Address>,
    topics: [Option<B256>; 4],
}

impl LogCriteria {
    pub(crate) fn resolve(filter: LogFilter, cursor: &BlockNumber) -> Self {
        Self {
            from_block: filter.from_block.lower_bound(cursor),
            to_block: filter.to_block.upper_bound(),
            addresses: filter.addresses,
            topics: filter.topics,
        }
    }

    /// True if the block window contains `cursor`. An inverted window never does.
    pub(crate) fn covers(&self, cursor: &BlockNumber) -> bool {
        self.from_block <= *cursor && self.to_block.as_ref().map_or(true, |to| to >= cursor)
    }

    /// True if the log passes the address and topic constraints.
    pub(crate) fn matches(&self, log: &LogRecord) -> bool {
        if !self.addresses.is_empty() && !self.addresses.contains(&log.address()) {
            return false;
        }
        self.topics.iter().enumerate().all(|(idx, wanted)| match wanted {
            Some(topic) => log.topics().get(idx) == Some(topic),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use revm_primitives::{address, b256, Bytes};

    use super::*;

    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const PAIR: Address = address!("0fbc0a9be1e87391ed2c7d2bb275bec02f53241f");
    const DEPOSIT: B256 = b256!("e1fffcc4923d04b559f4d29a8bfc6cda04eb5b0d3c460751c2402c5c5cc9109c");
    const SENDER: B256 = b256!("0000000000000000000000003fc91a3afd70395cd496c647d5a6cc9d4b2b7fad");

    fn resolve(filter: LogFilter, cursor: u64) -> LogCriteria {
        LogCriteria::resolve(filter, &BlockNumber::from(cursor))
    }

    #[test]
    fn test_bounded_window() {
        let criteria = resolve(LogFilter::new().from_block(5u64).to_block(10u64), 0);

        for cursor in 0u64..20 {
            assert_eq!(
                criteria.covers(&BlockNumber::from(cursor)),
                (5..=10).contains(&cursor),
                "cursor {cursor}"
            );
        }
    }

    #[test]
    fn test_open_window() {
        let criteria = resolve(LogFilter::new().from_block(5u64), 0);

        assert!(!criteria.covers(&BlockNumber::from(4u64)));
        assert!(criteria.covers(&BlockNumber::from(5u64)));
        assert!(criteria.covers(&BlockNumber::from(u64::MAX)));
        assert!(criteria.covers(&(BlockNumber::from(u64::MAX) * 1_000_000u32)));
    }

    #[test]
    fn test_latest_freezes_at_creation() {
        let criteria = resolve(LogFilter::new(), 12);

        assert!(!criteria.covers(&BlockNumber::from(11u64)));
        assert!(criteria.covers(&BlockNumber::from(12u64)));
        assert!(criteria.covers(&BlockNumber::from(500u64)));
    }

    #[test]
    fn test_inverted_window_never_matches() {
        let criteria = resolve(LogFilter::new().from_block(10u64).to_block(5u64), 0);
        assert!((0u64..20).all(|cursor| !criteria.covers(&BlockNumber::from(cursor))));
    }

    #[test]
    fn test_address_and_topic_matching() {
        let deposit =
            LogRecord::new(WETH, vec![DEPOSIT, SENDER], Bytes::from_static(&[0u8; 32])).unwrap();
        let anonymous = LogRecord::new(PAIR, vec![], Bytes::new()).unwrap();

        let any = resolve(LogFilter::new(), 0);
        assert!(any.matches(&deposit));
        assert!(any.matches(&anonymous));

        let weth_only = resolve(LogFilter::new().address(WETH), 0);
        assert!(weth_only.matches(&deposit));
        assert!(!weth_only.matches(&anonymous));

        let either = resolve(LogFilter::new().address(WETH).address(PAIR), 0);
        assert!(either.matches(&anonymous));

        let by_sender = resolve(LogFilter::new().topic(1, SENDER), 0);
        assert!(by_sender.matches(&deposit));
        assert!(!by_sender.matches(&anonymous));

        let wrong_position = resolve(LogFilter::new().topic(0, SENDER), 0);
        assert!(!wrong_position.matches(&deposit));

        // out of range topic index is ignored
        assert_eq!(LogFilter::new().topic(4, SENDER), LogFilter::new());
    }
}
