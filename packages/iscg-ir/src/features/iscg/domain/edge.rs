//! ISCG edge kinds

use serde::{Deserialize, Serialize};

/// Edge kind, serialized by variant name (`"Sequential"`, `"Data"`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// function entry → first block
    Entry,
    /// block entry → instruction, or leaf → terminator
    Sequential,
    /// producer instruction → consumer instruction
    Data,
    /// terminator → target block
    Control,
    /// parameter → consumer instruction
    Parameter,
    /// global → consumer instruction
    Global,
    /// branch condition producer → br/switch (when configured)
    Condition,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Entry => "Entry",
            EdgeKind::Sequential => "Sequential",
            EdgeKind::Data => "Data",
            EdgeKind::Control => "Control",
            EdgeKind::Parameter => "Parameter",
            EdgeKind::Global => "Global",
            EdgeKind::Condition => "Condition",
        }
    }
}
