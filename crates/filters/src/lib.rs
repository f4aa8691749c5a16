//! Polling filters over a simulated chain.
//!
//! The [`FilterRegistry`] owns every filter installed during a simulation session. The VM
//! driver pushes committed blocks, pending transactions and decoded logs into it, and an RPC
//! layer polls it through [`FilterApi`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod criteria;
mod error;
mod filter;
mod params;
mod registry;
mod selector;

pub use criteria::LogFilter;
pub use error::FilterError;
pub use filter::{FilterChanges, FilterKind};
pub use params::{AddressRepresentation, NewFilterParameters};
pub use registry::{FilterId, FilterRegistry};
pub use selector::BlockSelector;

/// Filter operations exposed to an RPC layer.
///
/// Only creation can fail. Reads of unknown ids return [`FilterChanges::Empty`] and uninstalling
/// an unknown id returns `false`, since a poller may race a removal.
pub trait FilterApi {
    /// Installs a log filter from unvalidated request parameters.
    ///
    /// The block window is checked against the chain height when logs are ingested, before the
    /// block containing them commits. A log delivered to a `[n, n]` window was therefore emitted
    /// while the cursor stood at `n`, and a driver that stamps the block being built reports it
    /// as `blockNumber = n + 1`.
    fn new_filter(&self, params: NewFilterParameters) -> Result<FilterId, FilterError>;

    /// Installs a new-block filter.
    fn new_block_filter(&self) -> FilterId;

    /// Installs a pending transaction filter.
    fn new_pending_transaction_filter(&self) -> FilterId;

    /// Uninstalls a filter.
    fn uninstall_filter(&self, id: &str) -> bool;

    /// Returns what the filter matched since it was last polled.
    fn get_filter_changes(&self, id: &str) -> FilterChanges;

    /// Returns everything the filter has matched.
    fn get_filter_logs(&self, id: &str) -> FilterChanges;
}

impl FilterApi for FilterRegistry {
    fn new_filter(&self, params: NewFilterParameters) -> Result<FilterId, FilterError> {
        Ok(self.create_log_filter(LogFilter::try_from(params)?))
    }

    fn new_block_filter(&self) -> FilterId {
        self.create_block_filter()
    }

    fn new_pending_transaction_filter(&self) -> FilterId {
        self.create_pending_transaction_filter()
    }

    fn uninstall_filter(&self, id: &str) -> bool {
        self.remove_filter(id)
    }

    fn get_filter_changes(&self, id: &str) -> FilterChanges {
        self.get_changes(id)
    }

    fn get_filter_logs(&self, id: &str) -> FilterChanges {
        self.get_entries(id)
    }
}
