//! Utility modules shared across features
//!
//! - `tokens`: identifier scanning and token-exact rewriting

pub mod tokens;

pub use tokens::{last_token, normalize_label, rewrite_symbols, symbol_tokens};
