//! The filter registry: installs filters, routes chain events to them, and drains them on poll.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use ledger_sim_common::{BlockHeader, BlockNumber, LogRecord, ToLowerHex};
use parking_lot::{Mutex, RwLock};
use revm_primitives::B256;
use tracing::{debug, trace, warn};

use crate::{
    criteria::{LogCriteria, LogFilter},
    filter::{ActiveFilter, DeliveryQueue, FilterChanges, FilterKind},
    FilterError,
};

/// Opaque filter identifier, a `0x`-prefixed hex quantity.
pub type FilterId = String;

/// Registry of the filters installed during one simulation session.
///
/// Ingestion ([`Self::on_new_block`], [`Self::on_new_logs`], [`Self::on_new_pending_transaction`])
/// is expected from a single producer. Reads may come from any thread: every filter lives behind
/// one lock, so a poll moves pending items into the delivered history atomically with respect to
/// ingestion, and no item is lost or handed out twice.
///
/// Filter IDs are assigned sequentially, starting from `0x1`.
#[derive(Debug)]
pub struct FilterRegistry {
    current_id: AtomicU64,
    cursor: RwLock<BlockNumber>,
    filters: Mutex<HashMap<FilterId, ActiveFilter>>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    /// Creates a registry with the chain cursor at genesis.
    pub fn new() -> Self {
        Self::with_cursor(BlockNumber::default())
    }

    /// Creates a registry with the chain cursor at `cursor`, for sessions that start from an
    /// existing chain.
    pub fn with_cursor(cursor: BlockNumber) -> Self {
        // Start from 1, as 0 is weird in quantity encoding.
        Self {
            current_id: AtomicU64::new(1),
            cursor: RwLock::new(cursor),
            filters: Mutex::new(HashMap::new()),
        }
    }

    /// The current chain height.
    pub fn cursor(&self) -> BlockNumber {
        self.cursor.read().clone()
    }

    /// Number of installed filters.
    pub fn len(&self) -> usize {
        self.filters.lock().len()
    }

    /// True if no filters are installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of the filter with the given id, if installed.
    pub fn kind(&self, id: &str) -> Option<FilterKind> {
        self.filters.lock().get(id).map(ActiveFilter::kind)
    }

    fn next_id(&self) -> FilterId {
        self.current_id.fetch_add(1, Ordering::Relaxed).to_lower_hex()
    }

    fn install(&self, filter: ActiveFilter) -> FilterId {
        let id = self.next_id();
        debug!(%id, %filter, "installing filter");
        let _ = self.filters.lock().insert(id.clone(), filter);
        id
    }

    /// Installs a log filter. Tag selectors are resolved against the cursor now, so a `latest`
    /// lower bound stays at today's height.
    pub fn create_log_filter(&self, filter: LogFilter) -> FilterId {
        let criteria = LogCriteria::resolve(filter, &self.cursor.read());
        self.install(ActiveFilter::log(criteria))
    }

    /// Installs a filter for transactions entering the pending pool.
    pub fn create_pending_transaction_filter(&self) -> FilterId {
        self.install(ActiveFilter::PendingTransaction(DeliveryQueue::default()))
    }

    /// Installs a filter for committed blocks.
    pub fn create_block_filter(&self) -> FilterId {
        self.install(ActiveFilter::Block(DeliveryQueue::default()))
    }

    /// Uninstalls a filter. Returns `false` if no filter had that id.
    pub fn remove_filter(&self, id: &str) -> bool {
        let removed = self.filters.lock().remove(id);
        if let Some(filter) = &removed {
            debug!(%id, %filter, "uninstalled filter");
        }
        removed.is_some()
    }

    /// Advances the cursor to the committed block and hands its hash to every block filter.
    ///
    /// A block below the cursor is rejected with [`FilterError::CursorRegression`], leaving the
    /// cursor and every filter untouched. A block at the current height is accepted.
    pub fn on_new_block(&self, header: &BlockHeader, block_hash: B256) -> Result<(), FilterError> {
        {
            let mut cursor = self.cursor.write();
            if header.number < *cursor {
                let current = cursor.clone();
                warn!(%current, reported = %header.number, "rejecting block below cursor");
                return Err(FilterError::CursorRegression {
                    current,
                    reported: header.number.clone(),
                });
            }
            *cursor = header.number.clone();
        }

        let mut filters = self.filters.lock();
        let mut notified = 0usize;
        for filter in filters.values_mut() {
            if let ActiveFilter::Block(queue) = filter {
                queue.push(block_hash);
                notified += 1;
            }
        }
        debug!(number = %header.number, hash = %block_hash.to_lower_hex(), notified, "new block");
        Ok(())
    }

    /// Routes a batch of logs to every log filter whose window covers the cursor.
    ///
    /// Matching uses the cursor as it stands, not the `block_number` the logs carry. Logs of the
    /// block under construction are typically stamped one above the cursor, so a filter on
    /// `[n, n]` receives logs numbered `n + 1`.
    pub fn on_new_logs(&self, logs: &[LogRecord]) {
        if logs.is_empty() {
            return;
        }
        let cursor = self.cursor();

        let mut filters = self.filters.lock();
        for (id, filter) in filters.iter_mut() {
            match filter {
                ActiveFilter::Log { criteria, queue } => {
                    if !criteria.covers(&cursor) {
                        continue;
                    }
                    let before = queue.pending_len();
                    for log in logs.iter().filter(|log| criteria.matches(log)) {
                        queue.push(log.clone());
                    }
                    trace!(%id, matched = queue.pending_len() - before, "routed logs");
                }
                ActiveFilter::PendingTransaction(_) | ActiveFilter::Block(_) => {}
            }
        }
        debug!(%cursor, logs = logs.len(), "ingested logs");
    }

    /// Hands a newly pending transaction hash to every pending transaction filter.
    pub fn on_new_pending_transaction(&self, tx_hash: B256) {
        let mut filters = self.filters.lock();
        for filter in filters.values_mut() {
            if let ActiveFilter::PendingTransaction(queue) = filter {
                queue.push(tx_hash);
            }
        }
        trace!(hash = %tx_hash.to_lower_hex(), "new pending transaction");
    }

    /// Returns the items matched since the previous poll of `id`, marking them delivered.
    ///
    /// Unknown ids yield [`FilterChanges::Empty`].
    pub fn get_changes(&self, id: &str) -> FilterChanges {
        self.filters.lock().get_mut(id).map(ActiveFilter::changes).unwrap_or_default()
    }

    /// Returns every item the filter has matched, marking pending items delivered.
    ///
    /// Unknown ids yield [`FilterChanges::Empty`].
    pub fn get_entries(&self, id: &str) -> FilterChanges {
        self.filters.lock().get_mut(id).map(ActiveFilter::entries).unwrap_or_default()
    }
}
