use std::{fmt::Display, fs, path::Path, str::FromStr};

use eyre::{eyre, Result, WrapErr};
use ledger_sim_common::{parse_quantity, BlockHeader};
use ledger_sim_tracer::{Simulation, TraceStep};
use revm_primitives::{Address, Bytecode, Bytes, B256, U256};
use serde::Deserialize;
use tracing::{debug, trace};

/// One recorded execution event. Values are hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub(crate) enum SessionEvent {
    /// Code deployed at an address mid-session.
    Deploy { address: String, code: String },
    /// A transaction entering the pending pool.
    PendingTransaction { hash: String },
    /// One executed instruction. `stack` is listed bottom first.
    Step {
        opcode: u8,
        #[serde(default)]
        pc: usize,
        #[serde(default)]
        stack: Vec<String>,
        #[serde(default)]
        memory: String,
        account: String,
    },
    /// The executing transaction committed.
    CommitTransaction { hash: String },
    /// The executing transaction reverted.
    DiscardTransaction,
    /// A block committed. `number` is a hex or decimal quantity.
    Block {
        number: String,
        #[serde(default)]
        timestamp: u64,
        hash: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) steps: usize,
    pub(crate) logs: usize,
    pub(crate) blocks: usize,
}

/// Reads a session script: a JSON array of events.
pub(crate) fn load(path: &Path) -> Result<Vec<SessionEvent>> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read session file {}", path.display()))?;
    serde_json::from_str(&contents)
        .wrap_err_with(|| format!("failed to parse session file {}", path.display()))
}

/// Feeds every event to `simulation`, in order.
pub(crate) fn replay(simulation: &mut Simulation, events: Vec<SessionEvent>) -> Result<Summary> {
    let mut summary = Summary::default();

    for (index, event) in events.into_iter().enumerate() {
        trace!(index, ?event, "Replaying event");
        match event {
            SessionEvent::Deploy { address, code } => {
                let address = parse::<Address>("address", &address)?;
                let code = parse::<Bytes>("code", &code)?;
                simulation.deploy(address, Bytecode::new_raw(code));
                debug!(%address, "Deployed contract");
            }
            SessionEvent::PendingTransaction { hash } => {
                simulation.submit_transaction(parse("transaction hash", &hash)?);
            }
            SessionEvent::Step { opcode, pc, stack, memory, account } => {
                let stack = stack
                    .iter()
                    .map(|word| parse::<U256>("stack word", word))
                    .collect::<Result<Vec<_>>>()?;
                let memory = parse::<Bytes>("memory", &memory)?;
                let step = TraceStep {
                    opcode,
                    program_counter: pc,
                    stack: &stack,
                    memory: &memory,
                    account: parse("account", &account)?,
                };
                summary.steps += 1;
                if simulation.on_step(&step) {
                    summary.logs += 1;
                }
            }
            SessionEvent::CommitTransaction { hash } => {
                simulation.commit_transaction(parse("transaction hash", &hash)?);
            }
            SessionEvent::DiscardTransaction => simulation.discard_transaction(),
            SessionEvent::Block { number, timestamp, hash } => {
                let number = parse_quantity(&number)
                    .ok_or_else(|| eyre!("invalid block number `{number}` at event {index}"))?;
                let header = BlockHeader { number, timestamp };
                simulation
                    .commit_block(header, parse::<B256>("block hash", &hash)?)
                    .wrap_err_with(|| format!("failed to commit block at event {index}"))?;
                summary.blocks += 1;
            }
        }
    }

    Ok(summary)
}

fn parse<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err| eyre!("invalid {field} `{value}`: {err}"))
}
