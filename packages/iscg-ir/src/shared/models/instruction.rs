//! Instruction records as produced by the instruction-record extractor

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::utils::tokens::last_token;

/// Instruction opcode
///
/// The terminators the graph builder treats specially are spelled out; every
/// other opcode is carried by name so it can still be emitted as a node attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Opcode {
    Ret,
    Br,
    Switch,
    Unreachable,
    Invoke,
    Call,
    Other(String),
}

impl Opcode {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "ret" => Opcode::Ret,
            "br" => Opcode::Br,
            "switch" => Opcode::Switch,
            "unreachable" => Opcode::Unreachable,
            "invoke" => Opcode::Invoke,
            "call" => Opcode::Call,
            other => Opcode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Opcode::Ret => "ret",
            Opcode::Br => "br",
            Opcode::Switch => "switch",
            Opcode::Unreachable => "unreachable",
            Opcode::Invoke => "invoke",
            Opcode::Call => "call",
            Opcode::Other(name) => name,
        }
    }

    /// ret, br, switch, unreachable and invoke end a block
    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::Ret | Opcode::Br | Opcode::Switch | Opcode::Unreachable | Opcode::Invoke
        )
    }
}

impl From<String> for Opcode {
    fn from(name: String) -> Self {
        Opcode::parse(&name)
    }
}

impl From<Opcode> for String {
    fn from(opcode: Opcode) -> Self {
        opcode.as_str().to_string()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbols and literals an instruction actually used, keyed by their
/// pre-canonicalization names. Filled in by the canonicalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionUsage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
}

impl InstructionUsage {
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
            && self.structs.is_empty()
            && self.calls.is_empty()
            && self.constants.is_empty()
    }

    pub fn record_global(&mut self, name: &str) {
        push_unique(&mut self.globals, name);
    }

    pub fn record_struct(&mut self, name: &str) {
        push_unique(&mut self.structs, name);
    }

    pub fn record_call(&mut self, name: &str) {
        push_unique(&mut self.calls, name);
    }

    pub fn record_constant(&mut self, value: &str) {
        push_unique(&mut self.constants, value);
    }

    /// Append everything from `other` that is not already present
    pub fn merge(&mut self, other: &InstructionUsage) {
        for g in &other.globals {
            self.record_global(g);
        }
        for s in &other.structs {
            self.record_struct(s);
        }
        for c in &other.calls {
            self.record_call(c);
        }
        for c in &other.constants {
            self.record_constant(c);
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// One instruction of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRecord {
    /// Unique within the function, increasing in block-then-instruction order
    pub id: u32,
    pub opcode: Opcode,
    /// Instruction text
    pub text: String,
    /// Raw operand strings in declaration order
    #[serde(default)]
    pub operands: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_var: Option<String>,

    /// br / switch condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// br (1 or 2), switch (N) or invoke (normal + unwind) target labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    /// call / invoke target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// ret operand (`void` for an empty return)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<String>,

    #[serde(default, skip_serializing_if = "InstructionUsage::is_empty")]
    pub usage: InstructionUsage,
}

impl InstructionRecord {
    pub fn new(id: u32, opcode: Opcode, text: impl Into<String>) -> Self {
        Self {
            id,
            opcode,
            text: text.into(),
            operands: Vec::new(),
            defined_var: None,
            condition: None,
            targets: Vec::new(),
            callee: None,
            return_type: None,
            return_value: None,
            usage: InstructionUsage::default(),
        }
    }

    /// Variable this instruction assigns, falling back to the `%x = ...` prefix of its text
    pub fn result_var(&self) -> Option<&str> {
        if let Some(var) = self.defined_var.as_deref() {
            let var = var.trim();
            return (!var.is_empty()).then_some(var);
        }
        let (lhs, _) = self.text.split_once('=')?;
        let lhs = lhs.trim();
        if lhs.starts_with('%') && !lhs.contains(char::is_whitespace) {
            Some(lhs)
        } else {
            None
        }
    }

    /// Callee name without any leading type tokens
    pub fn callee_name(&self) -> Option<&str> {
        self.callee.as_deref().map(last_token).filter(|c| !c.is_empty())
    }

    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }
}
