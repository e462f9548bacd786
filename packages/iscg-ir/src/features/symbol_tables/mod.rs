// Symbol Tables - per-function rename maps and corpus frequency tables
//
// ## Architecture
// - Domain: RenameMap (insertion-ordered bijection), FunctionSymbols
// - Infrastructure: SymbolCollector (single forward pass), FrequencyTables

pub mod domain;
pub mod infrastructure;

pub use domain::{FunctionSymbols, RenameMap};
pub use infrastructure::{FrequencyTables, SymbolCollector};
