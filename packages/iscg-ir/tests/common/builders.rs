//! Test data builders
//!
//! `FunctionBuilder` assigns instruction ids in block-then-instruction order
//! and applies field setters to the most recently added instruction.

use iscg_ir::shared::models::{Block, Function, InstructionRecord, Opcode};

#[derive(Debug)]
pub struct FunctionBuilder {
    function: Function,
    next_id: u32,
}

impl FunctionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            function: Function::new(name),
            next_id: 0,
        }
    }

    pub fn param(mut self, decl: &str) -> Self {
        self.function.params.push(decl.to_string());
        self
    }

    pub fn block(mut self, label: &str) -> Self {
        self.function.blocks.push(Block::new(label));
        self
    }

    /// Add an instruction to the last block (`defined_var` taken from `%x = ...`)
    pub fn inst(mut self, opcode: &str, text: &str) -> Self {
        let mut record = InstructionRecord::new(self.next_id, Opcode::parse(opcode), text);
        record.defined_var = text
            .split_once(" = ")
            .map(|(lhs, _)| lhs.trim().to_string())
            .filter(|lhs| lhs.starts_with('%'));
        self.next_id += 1;
        self.function
            .blocks
            .last_mut()
            .expect("inst() before block()")
            .instructions
            .push(record);
        self
    }

    pub fn operands(self, operands: &[&str]) -> Self {
        self.with_last(|r| r.operands = operands.iter().map(|s| s.to_string()).collect())
    }

    pub fn condition(self, condition: &str) -> Self {
        self.with_last(|r| r.condition = Some(condition.to_string()))
    }

    pub fn targets(self, targets: &[&str]) -> Self {
        self.with_last(|r| r.targets = targets.iter().map(|s| s.to_string()).collect())
    }

    pub fn callee(self, callee: &str) -> Self {
        self.with_last(|r| r.callee = Some(callee.to_string()))
    }

    pub fn returns(self, value: &str) -> Self {
        self.with_last(|r| r.return_value = Some(value.to_string()))
    }

    pub fn build(self) -> Function {
        self.function
    }

    fn with_last(mut self, f: impl FnOnce(&mut InstructionRecord)) -> Self {
        let record = self
            .function
            .blocks
            .last_mut()
            .and_then(|b| b.instructions.last_mut())
            .expect("setter before inst()");
        f(record);
        self
    }
}
