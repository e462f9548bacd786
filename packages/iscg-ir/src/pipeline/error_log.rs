//! Run-wide failure and warning log
//!
//! Workers record into a shared `DashMap`; the log is flattened and sorted
//! once at the end of the run and written to `<out_dir>/errors.json`.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{IscgError, Result};
use crate::pipeline::io::write_json;
use crate::shared::models::Diagnostics;

/// Function name used for failures that concern a whole unit
pub const UNIT_WIDE: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionKey {
    pub unit: String,
    pub function: String,
}

impl FunctionKey {
    pub fn new(unit: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            function: function.into(),
        }
    }

    pub fn unit_wide(unit: impl Into<String>) -> Self {
        Self::new(unit, UNIT_WIDE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub kind: String,
    pub message: String,
}

/// One row of `errors.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(flatten)]
    pub key: FunctionKey,
    #[serde(flatten)]
    pub entry: LogEntry,
}

#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: DashMap<FunctionKey, LogEntry>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&self, key: FunctionKey, error: &IscgError) {
        self.entries.entry(key).or_default().error = Some(FailureRecord {
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }

    pub fn record_warnings(&self, key: FunctionKey, diagnostics: &Diagnostics) {
        if diagnostics.is_empty() {
            return;
        }
        self.entries
            .entry(key)
            .or_default()
            .warnings
            .extend(diagnostics.iter().map(|d| d.to_string()));
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().map(|e| e.warnings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted by (unit, function)
    pub fn rows(&self) -> Vec<LogRow> {
        let mut rows: Vec<LogRow> = self
            .entries
            .iter()
            .map(|e| LogRow {
                key: e.key().clone(),
                entry: e.value().clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    pub fn write(&self, out_dir: &Path) -> Result<()> {
        write_json(&out_dir.join("errors.json"), &self.rows(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::DiagnosticKind;

    #[test]
    fn test_rows_sorted_and_merged() {
        let log = ErrorLog::new();
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::UnresolvedReference, Some(3), "operand `%x`");

        log.record_warnings(FunctionKey::new("b", "g"), &diags);
        log.record_failure(
            FunctionKey::new("a", "f"),
            &IscgError::malformed("f", 1, "br", "br without targets"),
        );
        log.record_warnings(FunctionKey::new("a", "f"), &diags);

        let rows = log.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, FunctionKey::new("a", "f"));
        assert_eq!(
            rows[0].entry.error.as_ref().map(|e| e.kind.as_str()),
            Some("malformed_instruction")
        );
        assert_eq!(rows[0].entry.warnings.len(), 1);
        assert_eq!(log.failure_count(), 1);
        assert_eq!(log.warning_count(), 2);
    }

    #[test]
    fn test_row_json_is_flat() {
        let row = LogRow {
            key: FunctionKey::unit_wide("u"),
            entry: LogEntry {
                error: Some(FailureRecord {
                    kind: "json".into(),
                    message: "bad".into(),
                }),
                warnings: vec![],
            },
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"unit":"u","function":"*","error":{"kind":"json","message":"bad"}}"#
        );
    }
}
