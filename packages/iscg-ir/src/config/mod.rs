//! Pipeline configuration
//!
//! Two levels:
//! - Defaults / programmatic construction (`PipelineConfig::default()`)
//! - YAML file with a `version: 1` header, partial sections allowed
//!
//! # Examples
//!
//! ```rust,ignore
//! use iscg_ir::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_yaml("iscg.yaml")?;
//! ```
//!
//! ```yaml
//! version: 1
//! canonicalize:
//!   label_style: block
//!   always_literal: [0, 1, 8, -1]
//! frequency:
//!   constants_path: stats/common_constants.json
//!   top_k: 200
//! parallel:
//!   num_workers: 8
//! ```

pub mod error;
pub mod pipeline_config;
pub mod stage_configs;

pub use error::{ConfigError, ConfigResult};
pub use pipeline_config::{PipelineConfig, SUPPORTED_VERSIONS};
pub use stage_configs::{
    CanonicalizeConfig, ConditionEdge, FrequencyConfig, GraphConfig, IoConfig, LabelStyle,
    ParallelConfig,
};
