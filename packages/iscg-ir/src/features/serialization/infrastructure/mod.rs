// Serialization Infrastructure

pub mod serializer;

pub use serializer::{to_document, to_json, validate_document};
