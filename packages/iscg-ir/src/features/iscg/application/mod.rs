// ISCG Application Layer

mod build_iscg;

pub use build_iscg::{IscgBuild, IscgUseCase, IscgUseCaseImpl};
