//! Per-stage configuration sections
//!
//! Every section is `#[serde(default)]` so a YAML file only needs the fields
//! it changes, and every section validates its own ranges.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::{ConfigError, ConfigResult};

// ============================================================================
// Canonicalization
// ============================================================================

/// Naming scheme for canonical block labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// `%label_N`
    #[default]
    Label,
    /// `%block_N`
    Block,
}

impl LabelStyle {
    pub fn prefix(self) -> &'static str {
        match self {
            LabelStyle::Label => "%label_",
            LabelStyle::Block => "%block_",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonicalizeConfig {
    pub label_style: LabelStyle,

    /// Rename globals to `@global_var_N` (identity when false)
    pub rename_globals: bool,

    /// Integer values never replaced by the placeholder
    pub always_literal: Vec<i64>,

    /// Replacement for uncommon integer immediates
    pub constant_placeholder: String,
}

impl CanonicalizeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let placeholder = self.constant_placeholder.trim();
        if placeholder.is_empty() {
            return Err(ConfigError::invalid(
                "canonicalize.constant_placeholder",
                "must not be empty",
            ));
        }
        // the placeholder must never look like an identifier or a number,
        // otherwise a second canonicalization pass would rewrite it
        if placeholder.starts_with(['%', '@']) || placeholder.parse::<i128>().is_ok() {
            return Err(ConfigError::invalid(
                "canonicalize.constant_placeholder",
                format!("'{}' collides with identifier or integer syntax", placeholder),
            ));
        }
        if self.always_literal.len() > 4096 {
            return Err(ConfigError::range_with_hint(
                "canonicalize.always_literal",
                self.always_literal.len(),
                0,
                4096,
                "Use a frequency table for large constant sets",
            ));
        }
        Ok(())
    }

    pub fn is_always_literal(&self, value: i128) -> bool {
        self.always_literal.iter().any(|v| i128::from(*v) == value)
    }
}

impl Default for CanonicalizeConfig {
    fn default() -> Self {
        Self {
            label_style: LabelStyle::Label,
            rename_globals: false,
            always_literal: vec![0, 1, 8],
            constant_placeholder: "<const>".to_string(),
        }
    }
}

// ============================================================================
// Frequency tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrequencyConfig {
    /// JSON `{value: count}` of constants across the corpus
    pub constants_path: Option<PathBuf>,

    /// JSON `{callee: count}` of called functions across the corpus
    pub calls_path: Option<PathBuf>,

    /// Minimum count for an entry to be common (1..=u32::MAX)
    pub min_count: u64,

    /// Keep only the k most frequent entries
    pub top_k: Option<usize>,
}

impl FrequencyConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_count < 1 {
            return Err(ConfigError::range_with_hint(
                "frequency.min_count",
                self.min_count,
                1,
                u32::MAX,
                "A count of 0 would make every value common",
            ));
        }
        if let Some(k) = self.top_k {
            if k == 0 {
                return Err(ConfigError::range_with_hint(
                    "frequency.top_k",
                    k,
                    1,
                    usize::MAX,
                    "Omit top_k to keep every entry",
                ));
            }
        }
        Ok(())
    }
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            constants_path: None,
            calls_path: None,
            min_count: 1,
            top_k: None,
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Edge kind used for br/switch conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionEdge {
    #[default]
    Data,
    Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub condition_edge: ConditionEdge,

    /// Record a warning for block entries left without an incoming edge
    pub report_unreachable_blocks: bool,
}

impl GraphConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            condition_edge: ConditionEdge::Data,
            report_unreachable_blocks: true,
        }
    }
}

// ============================================================================
// Parallel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Number of workers (0=auto, 1..=256)
    pub num_workers: usize,

    /// Thread stack size in MB (1..=64)
    pub stack_size_mb: usize,
}

impl ParallelConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_workers > 256 {
            return Err(ConfigError::range_with_hint(
                "parallel.num_workers",
                self.num_workers,
                0,
                256,
                "Number of workers must be reasonable (0=auto)",
            ));
        }

        if self.stack_size_mb < 1 || self.stack_size_mb > 64 {
            return Err(ConfigError::range_with_hint(
                "parallel.stack_size_mb",
                self.stack_size_mb,
                1,
                64,
                "Stack size must be reasonable",
            ));
        }

        Ok(())
    }

    /// Worker count with 0 resolved to the number of cores
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: 0,
            stack_size_mb: 8,
        }
    }
}

// ============================================================================
// I/O
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IoConfig {
    /// Suffix identifying summary files during discovery
    pub summary_suffix: String,
    pub globals_suffix: String,
    pub structs_suffix: String,
    /// Suffix of per-function graph files
    pub iscg_suffix: String,

    /// Write `<unit>_canonical.json` next to the graphs
    pub write_canonical: bool,

    /// Skip functions whose outputs already exist
    pub skip_existing: bool,

    pub pretty: bool,
}

impl IoConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("io.summary_suffix", &self.summary_suffix),
            ("io.globals_suffix", &self.globals_suffix),
            ("io.structs_suffix", &self.structs_suffix),
            ("io.iscg_suffix", &self.iscg_suffix),
        ] {
            if value.is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
            if value.contains(['/', '\\']) {
                return Err(ConfigError::invalid(field, "must not contain path separators"));
            }
        }
        if self.globals_suffix == self.summary_suffix || self.structs_suffix == self.summary_suffix {
            return Err(ConfigError::invalid(
                "io.summary_suffix",
                "companion suffixes must differ from the summary suffix",
            ));
        }
        Ok(())
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            summary_suffix: "_info_summary.json".to_string(),
            globals_suffix: "_globals.json".to_string(),
            structs_suffix: "_structs.json".to_string(),
            iscg_suffix: "_iscg.json".to_string(),
            write_canonical: true,
            skip_existing: true,
            pretty: false,
        }
    }
}
