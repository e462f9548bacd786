// Canonicalize Infrastructure

pub mod canonicalizer;
pub mod passes;

pub use canonicalizer::{Canonicalized, Canonicalizer};
pub use passes::{run_passes, Pass, PassContext};
