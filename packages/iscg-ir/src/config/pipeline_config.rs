//! Top-level pipeline configuration and YAML loading

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, ConfigResult};
use super::stage_configs::{
    CanonicalizeConfig, FrequencyConfig, GraphConfig, IoConfig, ParallelConfig,
};

/// Supported YAML schema versions
pub const SUPPORTED_VERSIONS: [u32; 1] = [1];

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub canonicalize: CanonicalizeConfig,
    pub frequency: FrequencyConfig,
    pub graph: GraphConfig,
    pub parallel: ParallelConfig,
    pub io: IoConfig,
}

/// On-disk v1 schema
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFileV1 {
    version: Option<u32>,
    #[serde(default)]
    canonicalize: CanonicalizeConfig,
    #[serde(default)]
    frequency: FrequencyConfig,
    #[serde(default)]
    graph: GraphConfig,
    #[serde(default)]
    parallel: ParallelConfig,
    #[serde(default)]
    io: IoConfig,
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.canonicalize.validate()?;
        self.frequency.validate()?;
        self.graph.validate()?;
        self.parallel.validate()?;
        self.io.validate()?;
        Ok(())
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        // Version check
        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = Self {
            canonicalize: file.canonicalize,
            frequency: file.frequency,
            graph: file.graph,
            parallel: file.parallel,
            io: file.io,
        };
        config.validate()?;
        Ok(config)
    }

    /// Export as a v1 YAML document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(SUPPORTED_VERSIONS[0]),
            canonicalize: self.canonicalize.clone(),
            frequency: self.frequency.clone(),
            graph: self.graph.clone(),
            parallel: self.parallel.clone(),
            io: self.io.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
