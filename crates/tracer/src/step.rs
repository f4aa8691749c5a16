use revm_primitives::{Address, U256};

/// One executed instruction, as reported by the VM driver before the instruction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep<'a> {
    /// The opcode being executed.
    pub opcode: u8,
    /// Byte offset of the opcode within the executing code.
    pub program_counter: usize,
    /// Operand stack before the instruction consumes its operands, bottom first.
    pub stack: &'a [U256],
    /// Linear memory of the current call frame.
    pub memory: &'a [u8],
    /// Address of the account whose code is executing.
    pub account: Address,
}

impl<'a> TraceStep<'a> {
    /// Operands in pop order, top of the stack first.
    pub fn operands(&self) -> impl Iterator<Item = U256> + 'a {
        self.stack.iter().rev().copied()
    }
}
