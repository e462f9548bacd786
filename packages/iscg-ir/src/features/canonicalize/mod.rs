// Canonicalize - position-stable renaming of instruction records
//
// Eight ordered passes (annotations, struct suffixes, globals, structs,
// calls, labels, locals, constants) over every field of every record.
// Idempotent: canonicalizing a canonical function changes nothing.

pub mod infrastructure;

pub use infrastructure::{Canonicalized, Canonicalizer, Pass};
