//! ISCG UseCase

use crate::config::{GraphConfig, PipelineConfig};
use crate::errors::Result;
use crate::features::canonicalize::Canonicalized;
use crate::features::iscg::domain::IscgGraph;
use crate::features::iscg::infrastructure::IscgBuilder;
use crate::shared::models::{Diagnostics, Metadata};

/// ISCG UseCase Trait
pub trait IscgUseCase: Send + Sync {
    /// Build the graph of an already canonicalized function
    fn build_iscg(&self, canonical: &Canonicalized, metadata: &Metadata) -> Result<IscgBuild>;
}

#[derive(Debug, Clone)]
pub struct IscgBuild {
    pub graph: IscgGraph,
    pub diagnostics: Diagnostics,
}

/// ISCG UseCase Implementation
#[derive(Debug, Clone, Default)]
pub struct IscgUseCaseImpl {
    config: GraphConfig,
    constant_placeholder: String,
}

impl IscgUseCaseImpl {
    pub fn new(config: GraphConfig, constant_placeholder: impl Into<String>) -> Self {
        Self {
            config,
            constant_placeholder: constant_placeholder.into(),
        }
    }

    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self::new(
            config.graph.clone(),
            config.canonicalize.constant_placeholder.clone(),
        )
    }
}

impl IscgUseCase for IscgUseCaseImpl {
    fn build_iscg(&self, canonical: &Canonicalized, metadata: &Metadata) -> Result<IscgBuild> {
        let (graph, diagnostics) = IscgBuilder::new(
            &canonical.function,
            &canonical.symbols,
            metadata,
            &self.config,
            &self.constant_placeholder,
        )
        .build()?;
        Ok(IscgBuild { graph, diagnostics })
    }
}
