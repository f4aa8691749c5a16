//! Unvalidated filter requests as handed over by an RPC layer.

use std::str::FromStr;

use revm_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{BlockSelector, FilterError, LogFilter};

/// Ways a request may name the addresses a log filter is restricted to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AddressRepresentation {
    /// A list of hex addresses.
    ArrayOfStrings(Vec<String>),
    /// Raw address bytes.
    Bytes([u8; 20]),
    /// A single hex address.
    String(String),
}

/// Unvalidated parameters for a log filter subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewFilterParameters {
    /// Start of the block window. Defaults to `latest`.
    pub from_block: Option<String>,
    /// End of the block window. Defaults to `latest`, which leaves the window open.
    pub to_block: Option<String>,
    /// Contract addresses from which logs should originate.
    pub address: Option<AddressRepresentation>,
    /// Positional 32-byte topics; `null` matches anything.
    pub topics: Option<Vec<Option<String>>>,
}

fn parse_address(input: String) -> Result<Address, FilterError> {
    Address::from_str(&input)
        .map_err(|e| FilterError::InvalidAddress { reason: e.to_string(), input })
}

fn validate_addresses(address: Option<AddressRepresentation>) -> Result<Vec<Address>, FilterError> {
    match address {
        None => Ok(vec![]),
        Some(AddressRepresentation::String(addr)) => Ok(vec![parse_address(addr)?]),
        Some(AddressRepresentation::ArrayOfStrings(array)) => {
            array.into_iter().map(parse_address).collect()
        }
        Some(AddressRepresentation::Bytes(bytes)) => Ok(vec![Address::from(bytes)]),
    }
}

fn validate_topics(topics: Option<Vec<Option<String>>>) -> Result<[Option<B256>; 4], FilterError> {
    let mut validated: [Option<B256>; 4] = Default::default();
    let Some(t_list) = topics else { return Ok(validated) };
    if t_list.len() > validated.len() {
        return Err(FilterError::TooManyTopics(t_list.len()));
    }

    for (position, topic) in t_list.into_iter().enumerate() {
        validated[position] = topic
            .map(|input| {
                B256::from_str(&input).map_err(|e| FilterError::InvalidTopic {
                    reason: e.to_string(),
                    position,
                    input,
                })
            })
            .transpose()?;
    }

    Ok(validated)
}

fn validate_selector(selector: Option<String>) -> Result<BlockSelector, FilterError> {
    selector.map_or(Ok(BlockSelector::default()), |s| s.parse())
}

impl TryFrom<NewFilterParameters> for LogFilter {
    type Error = FilterError;

    fn try_from(params: NewFilterParameters) -> Result<Self, Self::Error> {
        Ok(Self {
            from_block: validate_selector(params.from_block)?,
            to_block: validate_selector(params.to_block)?,
            addresses: validate_addresses(params.address)?,
            topics: validate_topics(params.topics)?,
        })
    }
}
