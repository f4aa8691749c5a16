//! Log extraction for the ledger simulation.
//!
//! The VM driver reports every executed instruction to a [`Simulation`], which decodes log
//! instructions into [`LogRecord`]s, stamps them when their transaction commits, and feeds
//! them, along with committed blocks and pending transactions, into a shared
//! [`FilterRegistry`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod contracts;
mod decoder;
mod execution;
mod step;

use std::{path::Path, sync::Arc};

pub use contracts::{AccountCode, DeployedContracts};
pub use decoder::{decode_log, topic_count, LOG0, LOG4};
pub use execution::ExecutedBlock;
pub use step::TraceStep;

use eyre::Result;
use execution::BlockBuilder;
use ledger_sim_common::{BlockHeader, LogRecord, ToLowerHex};
use ledger_sim_filters::{FilterError, FilterRegistry};
use revm_primitives::{Address, Bytecode, B256};
use tracing::{debug, info, trace, warn};

/// Drives the filter engine from the VM's execution events.
///
/// Calls are expected in execution order from the thread running the VM: steps of a
/// transaction, then its commit or discard, and eventually the block commit. Filter reads go
/// straight to the shared [`FilterRegistry`].
#[derive(Debug)]
pub struct Simulation {
    contracts: DeployedContracts,
    registry: Arc<FilterRegistry>,
    block: BlockBuilder,
}

impl Simulation {
    /// Creates a simulation over the given contracts, feeding `registry`.
    pub fn new(contracts: DeployedContracts, registry: Arc<FilterRegistry>) -> Self {
        Self { contracts, registry, block: BlockBuilder::default() }
    }

    /// Creates a simulation whose contracts are loaded from a JSON configuration file.
    pub fn from_config_file(path: impl AsRef<Path>, registry: Arc<FilterRegistry>) -> Result<Self> {
        let contracts = DeployedContracts::from_file(path)?;
        info!(contracts = contracts.len(), "Loaded contract configuration");
        Ok(Self::new(contracts, registry))
    }

    /// The registry this simulation feeds.
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// The contracts deployed so far.
    pub fn contracts(&self) -> &DeployedContracts {
        &self.contracts
    }

    /// Records code deployed at `address`, e.g. after a contract creation.
    pub fn deploy(&mut self, address: Address, bytecode: Bytecode) {
        self.contracts.deploy(address, bytecode);
    }

    /// Handles one executed instruction. Returns `true` if it emitted a log.
    pub fn on_step(&mut self, step: &TraceStep<'_>) -> bool {
        match decode_log(step, &self.contracts) {
            Some(log) => {
                self.block.record(log);
                trace!(
                    pc = step.program_counter,
                    in_flight = self.block.in_flight(),
                    "Recorded log"
                );
                true
            }
            None => false,
        }
    }

    /// Announces a transaction entering the pending pool.
    pub fn submit_transaction(&self, tx_hash: B256) {
        self.registry.on_new_pending_transaction(tx_hash);
    }

    /// Commits the executing transaction and routes its logs to the registry.
    ///
    /// Logs are stamped with the height of the block being built, assumed to be one above the
    /// cursor, and indexed within that block. Returns the stamped logs. The copies routed to
    /// filters keep this provisional height; [`Self::commit_block`] restamps the block's own
    /// logs with the committed header's number.
    pub fn commit_transaction(&mut self, tx_hash: B256) -> Vec<LogRecord> {
        let block_number = self.registry.cursor() + 1u32;
        let logs = self.block.commit_transaction(&block_number, tx_hash);
        debug!(hash = %tx_hash.to_lower_hex(), logs = logs.len(), "Committed transaction");
        self.registry.on_new_logs(&logs);
        logs
    }

    /// Drops the logs of a reverted transaction.
    pub fn discard_transaction(&mut self) {
        let dropped = self.block.discard_transaction();
        debug!(dropped, "Discarded transaction");
    }

    /// Commits the block under construction.
    ///
    /// The returned block's logs carry the header's number. On a cursor regression the block
    /// stays under construction and the error is returned.
    pub fn commit_block(
        &mut self,
        header: BlockHeader,
        block_hash: B256,
    ) -> Result<ExecutedBlock, FilterError> {
        let expected = self.registry.cursor() + 1u32;
        self.registry.on_new_block(&header, block_hash)?;

        let block = self.block.seal(header, block_hash);
        if block.header().number != expected && !block.logs().is_empty() {
            warn!(
                number = %block.header().number,
                %expected,
                "Block height skipped ahead; logs already delivered carry the expected height"
            );
        }
        info!(
            number = %block.header().number,
            transactions = block.transactions().len(),
            logs = block.logs().len(),
            "Committed block"
        );
        Ok(block)
    }
}
