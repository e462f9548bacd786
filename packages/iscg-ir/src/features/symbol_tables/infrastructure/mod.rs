// Symbol Tables Infrastructure

pub mod collector;
pub mod frequency;

pub use collector::SymbolCollector;
pub use frequency::{FrequencyTables, INTRINSIC_PREFIX};
