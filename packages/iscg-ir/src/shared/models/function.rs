//! Function and basic block models

use serde::{Deserialize, Serialize};

use super::instruction::InstructionRecord;
use crate::shared::utils::tokens::last_token;

/// Basic block: instructions sharing one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub label: String,
    #[serde(default)]
    pub instructions: Vec<InstructionRecord>,
}

impl Block {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: Vec<InstructionRecord>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Terminator if the block ends with one
    pub fn terminator(&self) -> Option<&InstructionRecord> {
        self.instructions.last().filter(|i| i.is_terminator())
    }
}

/// Function summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Raw `type %name` strings in declaration order
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Derived sets over a function's instruction usage, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSets {
    pub globals_referenced: Vec<String>,
    pub structs_referenced: Vec<String>,
    pub calls_made: Vec<String>,
    pub constants_seen: Vec<String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Parameter names (last token of each declaration)
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| last_token(p))
    }

    pub fn instructions(&self) -> impl Iterator<Item = &InstructionRecord> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Union of every instruction's usage
    pub fn derived_sets(&self) -> FunctionSets {
        let mut sets = FunctionSets::default();
        for inst in self.instructions() {
            extend_unique(&mut sets.globals_referenced, &inst.usage.globals);
            extend_unique(&mut sets.structs_referenced, &inst.usage.structs);
            extend_unique(&mut sets.calls_made, &inst.usage.calls);
            extend_unique(&mut sets.constants_seen, &inst.usage.constants);
        }
        sets
    }
}

fn extend_unique(target: &mut Vec<String>, values: &[String]) {
    for v in values {
        if !target.contains(v) {
            target.push(v.clone());
        }
    }
}

/// Canonical function as written to `<unit>_canonical.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFunction {
    #[serde(flatten)]
    pub function: Function,
    #[serde(flatten)]
    pub sets: FunctionSets,
}

impl From<Function> for CanonicalFunction {
    fn from(function: Function) -> Self {
        let sets = function.derived_sets();
        Self { function, sets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::instruction::Opcode;

    #[test]
    fn test_param_names_use_last_token() {
        let mut f = Function::new("f");
        f.params = vec!["i32 %0".into(), "ptr noundef %buf".into()];
        let names: Vec<_> = f.param_names().collect();
        assert_eq!(names, vec!["%0", "%buf"]);
    }

    #[test]
    fn test_derived_sets_first_seen_order() {
        let mut a = InstructionRecord::new(0, Opcode::Call, "call void @g()");
        a.usage.record_call("@g");
        a.usage.record_constant("42");
        let mut b = InstructionRecord::new(1, Opcode::Call, "call void @h()");
        b.usage.record_call("@h");
        b.usage.record_call("@g");

        let mut f = Function::new("f");
        f.blocks.push(Block::new("%0").with_instructions(vec![a, b]));

        let sets = f.derived_sets();
        assert_eq!(sets.calls_made, vec!["@g", "@h"]);
        assert_eq!(sets.constants_seen, vec!["42"]);
        assert!(sets.globals_referenced.is_empty());
    }

    #[test]
    fn test_block_terminator() {
        let ret = InstructionRecord::new(1, Opcode::Ret, "ret void");
        let add = InstructionRecord::new(0, Opcode::parse("add"), "%1 = add i32 1, 2");
        let block = Block::new("%0").with_instructions(vec![add.clone(), ret]);
        assert_eq!(block.terminator().map(|i| i.id), Some(1));

        let open = Block::new("%0").with_instructions(vec![add]);
        assert!(open.terminator().is_none());
    }
}
