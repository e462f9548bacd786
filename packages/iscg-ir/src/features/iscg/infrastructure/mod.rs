// ISCG Infrastructure

pub mod builder;
pub mod operand_resolver;

pub use builder::IscgBuilder;
pub use operand_resolver::{OperandRef, OperandResolver};
