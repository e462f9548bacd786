//! Shared models

mod diagnostics;
mod function;
mod instruction;
mod metadata;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use function::{Block, CanonicalFunction, Function, FunctionSets};
pub use instruction::{InstructionRecord, InstructionUsage, Opcode};
pub use metadata::{GlobalInfo, GlobalType, Metadata};
