//! Corpus frequency tables
//!
//! Built once per run from `{name: count}` JSON and frozen. A value is
//! *common* when it survives the `min_count` / `top_k` cut.

use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::config::{ConfigError, ConfigResult, FrequencyConfig};
use crate::shared::utils::tokens::last_token;

/// Intrinsics are always common
pub const INTRINSIC_PREFIX: &str = "@llvm.";

/// Accepted on-disk shapes: counts, or an already-ranked list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountsFile {
    Counts(AHashMap<String, u64>),
    Ranked(Vec<String>),
}

impl CountsFile {
    fn into_counts(self) -> Vec<(String, u64)> {
        match self {
            CountsFile::Counts(map) => map.into_iter().collect(),
            // rank order is preserved by giving earlier entries larger counts
            CountsFile::Ranked(list) => {
                let n = list.len() as u64;
                list.into_iter()
                    .enumerate()
                    .map(|(i, name)| (name, n - i as u64))
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyTables {
    constants: AHashSet<String>,
    calls: AHashSet<String>,
}

impl FrequencyTables {
    /// No common values besides intrinsics
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_counts(
        constants: Vec<(String, u64)>,
        calls: Vec<(String, u64)>,
        config: &FrequencyConfig,
    ) -> Self {
        let constants = select_common(constants, config, normalize_constant);
        let calls = select_common(calls, config, normalize_call);
        debug!(
            constants = constants.len(),
            calls = calls.len(),
            "frequency tables frozen"
        );
        Self { constants, calls }
    }

    pub fn from_json_str(
        constants: Option<&str>,
        calls: Option<&str>,
        config: &FrequencyConfig,
    ) -> ConfigResult<Self> {
        let parse = |label: &str, json: Option<&str>| -> ConfigResult<Vec<(String, u64)>> {
            match json {
                Some(json) => serde_json::from_str::<CountsFile>(json)
                    .map(CountsFile::into_counts)
                    .map_err(|source| ConfigError::FrequencyTable {
                        path: label.to_string(),
                        source,
                    }),
                None => Ok(Vec::new()),
            }
        };
        Ok(Self::from_counts(
            parse("<constants>", constants)?,
            parse("<calls>", calls)?,
            config,
        ))
    }

    /// Read the files named in the config (missing paths mean empty tables)
    pub fn load(config: &FrequencyConfig) -> ConfigResult<Self> {
        let constants = read_counts(config.constants_path.as_deref())?;
        let calls = read_counts(config.calls_path.as_deref())?;
        Ok(Self::from_counts(constants, calls, config))
    }

    #[inline]
    pub fn is_common_constant(&self, value: &str) -> bool {
        self.constants.contains(value)
    }

    #[inline]
    pub fn is_common_call(&self, name: &str) -> bool {
        name.starts_with(INTRINSIC_PREFIX) || self.calls.contains(name)
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

fn read_counts(path: Option<&Path>) -> ConfigResult<Vec<(String, u64)>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str::<CountsFile>(&content)
        .map(CountsFile::into_counts)
        .map_err(|source| ConfigError::FrequencyTable {
            path: path.display().to_string(),
            source,
        })
}

/// Rank by count desc then name asc, apply `min_count` and `top_k`
fn select_common(
    counts: Vec<(String, u64)>,
    config: &FrequencyConfig,
    normalize: fn(&str) -> String,
) -> AHashSet<String> {
    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= config.min_count)
        .map(|(name, count)| (normalize(&name), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let limit = config.top_k.unwrap_or(usize::MAX);
    ranked.into_iter().take(limit).map(|(name, _)| name).collect()
}

/// `"i32 42"` and `"42"` are the same constant
fn normalize_constant(raw: &str) -> String {
    last_token(raw).to_string()
}

fn normalize_call(raw: &str) -> String {
    let name = raw.trim();
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_intrinsics_always_common() {
        let tables = FrequencyTables::empty();
        assert!(tables.is_common_call("@llvm.memcpy.p0.p0.i64"));
        assert!(!tables.is_common_call("@helper"));
    }

    #[test]
    fn test_top_k_and_min_count() {
        let config = FrequencyConfig {
            min_count: 2,
            top_k: Some(2),
            ..Default::default()
        };
        let tables = FrequencyTables::from_counts(
            counts(&[("4", 50), ("16", 50), ("255", 10), ("7", 1)]),
            counts(&[("printf", 9), ("@malloc", 3)]),
            &config,
        );
        // tie at 50 broken by name
        assert!(tables.is_common_constant("16"));
        assert!(tables.is_common_constant("4"));
        assert!(!tables.is_common_constant("255"));
        assert!(!tables.is_common_constant("7"));

        assert!(tables.is_common_call("@printf"));
        assert!(tables.is_common_call("@malloc"));
    }

    #[test]
    fn test_ranked_list_and_typed_keys() {
        let config = FrequencyConfig {
            top_k: Some(1),
            ..Default::default()
        };
        let tables = FrequencyTables::from_json_str(
            Some(r#"{"i32 4096": 12, "i64 3": 2}"#),
            Some(r#"["@free", "@strlen"]"#),
            &config,
        )
        .unwrap();
        assert!(tables.is_common_constant("4096"));
        assert!(!tables.is_common_constant("3"));
        assert!(tables.is_common_call("@free"));
        assert!(!tables.is_common_call("@strlen"));
    }

    #[test]
    fn test_bad_json_reports_table() {
        let err = FrequencyTables::from_json_str(Some("[1, 2"), None, &FrequencyConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::FrequencyTable { .. }));
    }
}
