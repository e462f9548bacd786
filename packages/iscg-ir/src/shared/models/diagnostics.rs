//! Per-function warnings
//!
//! Non-fatal problems found while canonicalizing or building a graph. Fatal
//! problems are `IscgError`s instead.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Operand that could not be classified; no edge was emitted
    UnresolvedReference,
    /// Struct, global or call name missing from metadata; left unrenamed
    MetadataGap,
    /// Block entry with no incoming edge after the walk
    UnreachableBlock,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedReference => "unresolved_reference",
            DiagnosticKind::MetadataGap => "metadata_gap",
            DiagnosticKind::UnreachableBlock => "unreachable_block",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<u32>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instruction_id {
            Some(id) => write!(f, "[{}] #{}: {}", self.kind.as_str(), id, self.message),
            None => write!(f, "[{}] {}", self.kind.as_str(), self.message),
        }
    }
}

/// Ordered warning list for one function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, instruction_id: Option<u32>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            kind,
            instruction_id,
            message: message.into(),
        });
    }

    pub fn unresolved(&mut self, instruction_id: u32, operand: &str) {
        self.push(
            DiagnosticKind::UnresolvedReference,
            Some(instruction_id),
            format!("operand `{}` does not resolve", operand),
        );
    }

    pub fn metadata_gap(&mut self, instruction_id: Option<u32>, what: &str, name: &str) {
        self.push(
            DiagnosticKind::MetadataGap,
            instruction_id,
            format!("{} `{}` not found in metadata", what, name),
        );
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
