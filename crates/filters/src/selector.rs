use std::{fmt, str::FromStr};

use ledger_sim_common::{parse_quantity, BlockNumber, ToLowerHex};

use crate::FilterError;

/// A block selector as supplied by a filter subscriber.
///
/// Tags are resolved against the chain cursor when the filter is created, never afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockSelector {
    /// The genesis block.
    Earliest,
    /// The chain head.
    #[default]
    Latest,
    /// The block currently being built. The simulation has no separate pending block, so this
    /// resolves like [`BlockSelector::Latest`].
    Pending,
    /// An explicit height.
    Number(BlockNumber),
}

impl BlockSelector {
    /// Resolves the selector as the lower bound of a log filter.
    ///
    /// `latest` and `pending` freeze at the current cursor.
    pub fn lower_bound(&self, cursor: &BlockNumber) -> BlockNumber {
        match self {
            Self::Earliest => BlockNumber::default(),
            Self::Latest | Self::Pending => cursor.clone(),
            Self::Number(number) => number.clone(),
        }
    }

    /// Resolves the selector as the upper bound of a log filter. `None` is open-ended.
    pub fn upper_bound(&self) -> Option<BlockNumber> {
        match self {
            Self::Earliest => Some(BlockNumber::default()),
            Self::Latest | Self::Pending => None,
            Self::Number(number) => Some(number.clone()),
        }
    }
}

impl FromStr for BlockSelector {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earliest" => Ok(Self::Earliest),
            "latest" => Ok(Self::Latest),
            "pending" => Ok(Self::Pending),
            _ => parse_quantity(s)
                .map(Self::Number)
                .ok_or_else(|| FilterError::InvalidBlockSelector(s.to_string())),
        }
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earliest => f.write_str("earliest"),
            Self::Latest => f.write_str("latest"),
            Self::Pending => f.write_str("pending"),
            Self::Number(number) => f.write_str(&number.to_lower_hex()),
        }
    }
}

impl From<u64> for BlockSelector {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<BlockNumber> for BlockSelector {
    fn from(value: BlockNumber) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selectors() {
        assert_eq!("earliest".parse::<BlockSelector>(), Ok(BlockSelector::Earliest));
        assert_eq!("latest".parse::<BlockSelector>(), Ok(BlockSelector::Latest));
        assert_eq!("pending".parse::<BlockSelector>(), Ok(BlockSelector::Pending));
        assert_eq!("0x11feef0".parse::<BlockSelector>(), Ok(BlockSelector::from(18870000u64)));
        assert_eq!("42".parse::<BlockSelector>(), Ok(BlockSelector::from(42u64)));

        assert_eq!(
            "finalised".parse::<BlockSelector>(),
            Err(FilterError::InvalidBlockSelector("finalised".to_string()))
        );
        assert!("0x".parse::<BlockSelector>().is_err());
        assert!("Latest".parse::<BlockSelector>().is_err());
    }

    #[test]
    fn test_resolve_bounds() {
        let cursor = BlockNumber::from(7u64);

        assert_eq!(BlockSelector::Earliest.lower_bound(&cursor), BlockNumber::default());
        assert_eq!(BlockSelector::Latest.lower_bound(&cursor), cursor);
        assert_eq!(BlockSelector::Pending.lower_bound(&cursor), cursor);
        assert_eq!(BlockSelector::from(3u64).lower_bound(&cursor), BlockNumber::from(3u64));

        assert_eq!(BlockSelector::Earliest.upper_bound(), Some(BlockNumber::default()));
        assert_eq!(BlockSelector::Latest.upper_bound(), None);
        assert_eq!(BlockSelector::Pending.upper_bound(), None);
        assert_eq!(BlockSelector::from(3u64).upper_bound(), Some(BlockNumber::from(3u64)));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let selector: BlockSelector = "0x11feef0".parse().unwrap();
        assert_eq!(selector.to_string(), "0x11feef0");
    }
}
