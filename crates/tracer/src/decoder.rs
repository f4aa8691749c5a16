//! Decoding of `LOG0`..`LOG4` trace steps into [`LogRecord`]s.

use ledger_sim_common::LogRecord;
use revm_primitives::{Bytes, B256, U256};
use tracing::trace;

use crate::{AccountCode, TraceStep};

/// Opcode of the zero-topic log instruction.
pub const LOG0: u8 = 0xa0;

/// Opcode of the four-topic log instruction.
pub const LOG4: u8 = 0xa4;

/// Upper bound on the data payload of a single log. Regions beyond this cannot be paid for under
/// any practical block gas limit.
const MAX_LOG_DATA_LEN: usize = 4 * 1024 * 1024;

/// Number of topics emitted by `opcode`, or `None` if it is not a log instruction.
pub fn topic_count(opcode: u8) -> Option<usize> {
    opcode.checked_sub(LOG0).map(usize::from).filter(|count| *count <= usize::from(LOG4 - LOG0))
}

/// Decodes the log emitted by `step`, if any.
///
/// Returns `None` for anything other than a well-formed log instruction executed by an account
/// with deployed code. A malformed step (stack underflow, unaddressable memory region) is
/// skipped rather than reported, so one bad step never aborts the surrounding trace.
///
/// Topics are taken in pop order: `topic0` is the word directly below `size`.
pub fn decode_log<C>(step: &TraceStep<'_>, code: &C) -> Option<LogRecord>
where
    C: AccountCode + ?Sized,
{
    let count = topic_count(step.opcode)?;

    if !code.has_code(&step.account) {
        trace!(
            account = %step.account,
            pc = step.program_counter,
            "skipping log from account without code"
        );
        return None;
    }

    let mut operands = step.operands();
    let (Some(offset), Some(size)) = (operands.next(), operands.next()) else {
        trace!(pc = step.program_counter, "stack underflow reading log region");
        return None;
    };

    let Some(data) = read_memory(step.memory, offset, size) else {
        trace!(pc = step.program_counter, %offset, %size, "unaddressable log region");
        return None;
    };

    let topics: Vec<B256> =
        operands.take(count).map(|word| B256::from(word.to_be_bytes::<32>())).collect();
    if topics.len() != count {
        trace!(pc = step.program_counter, count, "stack underflow reading log topics");
        return None;
    }

    LogRecord::new(step.account, topics, data)
}

/// Copies `size` bytes at `offset` out of `memory`.
///
/// The log instruction expands memory itself, so bytes past the end of the snapshot read as zero.
fn read_memory(memory: &[u8], offset: U256, size: U256) -> Option<Bytes> {
    let size = as_usize(size)?;
    if size == 0 {
        return Some(Bytes::new());
    }
    if size > MAX_LOG_DATA_LEN {
        return None;
    }
    let offset = as_usize(offset)?;
    let end = offset.checked_add(size)?;

    let mut data = vec![0u8; size];
    if let Some(available) = memory.get(offset..end.min(memory.len())) {
        data[..available.len()].copy_from_slice(available);
    }
    Some(data.into())
}

fn as_usize(value: U256) -> Option<usize> {
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) {
        return None;
    }
    usize::try_from(limbs[0]).ok()
}
