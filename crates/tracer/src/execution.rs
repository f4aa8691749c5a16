use ledger_sim_common::{BlockHeader, BlockNumber, LogRecord};
use revm_primitives::B256;

/// A committed block, together with the transactions and logs it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedBlock {
    header: BlockHeader,
    hash: B256,
    transactions: Vec<B256>,
    logs: Vec<LogRecord>,
}

impl ExecutedBlock {
    /// Header of the block.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Hash of the block.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Hashes of the committed transactions, in execution order.
    pub fn transactions(&self) -> &[B256] {
        &self.transactions
    }

    /// Logs emitted by the block's transactions, with provenance attached.
    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }
}

/// Accumulates the logs of the transaction currently executing and of the block being built.
#[derive(Debug, Default)]
pub(crate) struct BlockBuilder {
    transactions: Vec<B256>,
    logs: Vec<LogRecord>,
    in_flight: Vec<LogRecord>,
}

impl BlockBuilder {
    /// Records a log decoded during the executing transaction.
    pub(crate) fn record(&mut self, log: LogRecord) {
        self.in_flight.push(log);
    }

    /// Number of logs decoded so far in the executing transaction.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Finalizes the executing transaction, stamping its logs with their position in the block.
    ///
    /// Log indices run across the whole block.
    pub(crate) fn commit_transaction(
        &mut self,
        block_number: &BlockNumber,
        transaction_hash: B256,
    ) -> Vec<LogRecord> {
        let first_index = self.logs.len() as u64;
        let committed: Vec<LogRecord> = std::mem::take(&mut self.in_flight)
            .into_iter()
            .zip(first_index..)
            .map(|(log, log_index)| {
                log.with_provenance(block_number.clone(), transaction_hash, log_index)
            })
            .collect();

        self.transactions.push(transaction_hash);
        self.logs.extend_from_slice(&committed);
        committed
    }

    /// Drops the logs of the executing transaction. Returns how many were dropped.
    pub(crate) fn discard_transaction(&mut self) -> usize {
        std::mem::take(&mut self.in_flight).len()
    }

    /// Closes the block under construction and starts a new one.
    ///
    /// Logs are restamped with the header's number, which replaces the height assumed when their
    /// transactions committed.
    pub(crate) fn seal(&mut self, header: BlockHeader, hash: B256) -> ExecutedBlock {
        let Self { transactions, logs, .. } = std::mem::take(self);
        let logs = logs
            .into_iter()
            .map(|log| log.with_block_number(header.number.clone()))
            .collect();
        ExecutedBlock { header, hash, transactions, logs }
    }
}

#[cfg(test)]
mod tests {
    use revm_primitives::{address, b256, Bytes};

    use super::*;

    const FIRST_TX: B256 = b256!("8bf2361656e0ea6f338ad17ac3cd616f8eea9bb17e1afa1580802e9d3231c203");
    const SECOND_TX: B256 =
        b256!("d02dc650cc9a34def3d7a78808a36a8cb2e292613c2989f4313155e8e4af9b0f");

    fn log() -> LogRecord {
        LogRecord::new(address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), vec![], Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_log_indices_run_across_block() {
        let number = BlockNumber::from(18870001u64);
        let mut builder = BlockBuilder::default();

        builder.record(log());
        builder.record(log());
        let first = builder.commit_transaction(&number, FIRST_TX);

        builder.record(log());
        let second = builder.commit_transaction(&number, SECOND_TX);

        assert_eq!(first.iter().map(|l| l.log_index()).collect::<Vec<_>>(), [Some(0u64), Some(1)]);
        assert_eq!(second[0].log_index(), Some(2));
        assert_eq!(second[0].transaction_hash(), Some(SECOND_TX));
        assert_eq!(second[0].block_number(), Some(&number));

        let block = builder.seal(BlockHeader::new(number), B256::ZERO);
        assert_eq!(block.transactions(), &[FIRST_TX, SECOND_TX]);
        assert_eq!(block.logs().len(), 3);

        // the builder starts over
        assert_eq!(builder.seal(BlockHeader::default(), B256::ZERO).logs().len(), 0);
    }

    #[test]
    fn test_seal_restamps_block_number() {
        let mut builder = BlockBuilder::default();
        builder.record(log());
        builder.record(log());
        builder.commit_transaction(&BlockNumber::from(1u64), FIRST_TX);

        let block = builder.seal(BlockHeader::new(100u64), B256::ZERO);

        for (index, log) in block.logs().iter().enumerate() {
            assert_eq!(log.block_number(), Some(&BlockNumber::from(100u64)));
            assert_eq!(log.transaction_hash(), Some(FIRST_TX));
            assert_eq!(log.log_index(), Some(index as u64));
        }
    }

    #[test]
    fn test_discarded_transaction_leaves_no_trace() {
        let number = BlockNumber::from(1u64);
        let mut builder = BlockBuilder::default();

        builder.record(log());
        assert_eq!(builder.in_flight(), 1);
        assert_eq!(builder.discard_transaction(), 1);
        assert_eq!(builder.in_flight(), 0);

        builder.record(log());
        let committed = builder.commit_transaction(&number, FIRST_TX);
        assert_eq!(committed[0].log_index(), Some(0));
    }
}
