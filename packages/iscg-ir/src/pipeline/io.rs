//! Unit files on disk
//!
//! A *unit* is one `<stem>_info_summary.json` (a JSON array of functions)
//! plus its optional `<stem>_globals.json` / `<stem>_structs.json`
//! companions in sibling directories.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::IoConfig;
use crate::errors::{IscgError, Result};
use crate::shared::models::{Function, Metadata};

/// Where a unit's inputs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPaths {
    pub stem: String,
    pub summary: PathBuf,
    pub globals: Option<PathBuf>,
    pub structs: Option<PathBuf>,
}

impl UnitPaths {
    /// Companion paths are resolved but not required to exist
    pub fn resolve(
        summary: impl Into<PathBuf>,
        globals_dir: Option<&Path>,
        structs_dir: Option<&Path>,
        io: &IoConfig,
    ) -> Option<Self> {
        let summary = summary.into();
        let stem = unit_stem(&summary, &io.summary_suffix)?;
        let globals = globals_dir.map(|dir| dir.join(format!("{}{}", stem, io.globals_suffix)));
        let structs = structs_dir.map(|dir| dir.join(format!("{}{}", stem, io.structs_suffix)));
        Some(Self {
            stem,
            summary,
            globals,
            structs,
        })
    }
}

/// `foo_info_summary.json` → `foo`
pub fn unit_stem(path: &Path, summary_suffix: &str) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(summary_suffix)?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Summary files under `root`, sorted for a stable processing order
pub fn discover_units(root: &Path, summary_suffix: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            IscgError::io(path, source)
        })?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(summary_suffix) && name != summary_suffix)
        {
            found.push(entry.into_path());
        }
    }
    found.sort();
    debug!(root = %root.display(), units = found.len(), "units discovered");
    Ok(found)
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| IscgError::io(path, e))
}

pub fn load_summary(path: &Path) -> Result<Vec<Function>> {
    let content = read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Missing companion files mean empty metadata
pub fn load_metadata(globals: Option<&Path>, structs: Option<&Path>) -> Result<Metadata> {
    let globals = read_optional(globals)?;
    let structs = read_optional(structs)?;
    Ok(Metadata::from_json(
        globals.as_deref().unwrap_or("{}"),
        structs.as_deref().unwrap_or("{}"),
    )?)
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) if path.is_file() => read_to_string(path).map(Some),
        Some(path) => {
            debug!(path = %path.display(), "companion file missing, using empty metadata");
            Ok(None)
        }
        None => Ok(None),
    }
}

pub fn iscg_output_path(out_dir: &Path, stem: &str, function: &str, io: &IoConfig) -> PathBuf {
    out_dir.join(format!(
        "{}_{}{}",
        stem,
        sanitize_file_component(function),
        io.iscg_suffix
    ))
}

pub fn canonical_output_path(out_dir: &Path, stem: &str) -> PathBuf {
    out_dir.join(format!("{}_canonical.json", stem))
}

/// Function names may carry characters that are not valid in file names.
/// A name changed by the replacement gets a short hash of the original so
/// `a:b` and `a/b` do not share an output file.
pub fn sanitize_file_component(name: &str) -> String {
    let bare = name.trim_start_matches('@');
    let cleaned: String = bare
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    };
    if cleaned == bare {
        return cleaned;
    }
    let digest = blake3::hash(bare.as_bytes()).to_hex();
    format!("{}_{}", cleaned, &digest.as_str()[..8])
}

/// Write through a temp file in the same directory, then rename
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IscgError::io(parent, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| IscgError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| IscgError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unit_stem() {
        let io = IoConfig::default();
        assert_eq!(
            unit_stem(Path::new("/a/libfoo_info_summary.json"), &io.summary_suffix),
            Some("libfoo".to_string())
        );
        assert_eq!(unit_stem(Path::new("/a/_info_summary.json"), &io.summary_suffix), None);
        assert_eq!(unit_stem(Path::new("/a/other.json"), &io.summary_suffix), None);
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("@main"), "main");
        assert_eq!(sanitize_file_component("main.cold"), "main.cold");

        let templated = sanitize_file_component("ns::f<int>");
        assert!(templated.starts_with("ns__f_int__"));
        assert_eq!(templated.len(), "ns__f_int__".len() + 8);
        assert!(sanitize_file_component("..").starts_with("__"));
        assert_eq!(sanitize_file_component("ns::f<int>"), templated);
    }

    #[test]
    fn test_sanitized_names_do_not_collide() {
        let io = IoConfig::default();
        let out = Path::new("/out");
        let a = iscg_output_path(out, "u", "a:b", &io);
        let b = iscg_output_path(out, "u", "a/b", &io);
        let c = iscg_output_path(out, "u", "a_b", &io);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert_eq!(c, out.join("u_a_b_iscg.json"));
    }

    #[test]
    fn test_discover_units_recurses_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b_info_summary.json"), "[]").unwrap();
        fs::write(dir.path().join("a_info_summary.json"), "[]").unwrap();
        fs::write(dir.path().join("a_globals.json"), "{}").unwrap();

        let units = discover_units(dir.path(), "_info_summary.json").unwrap();
        assert_eq!(units.len(), 2);
        assert!(units[0].ends_with("a_info_summary.json"));
        assert!(units[1].ends_with("nested/b_info_summary.json"));
    }

    #[test]
    fn test_missing_companions_are_empty() {
        let dir = TempDir::new().unwrap();
        let meta = load_metadata(Some(&dir.path().join("nope_globals.json")), None).unwrap();
        assert!(meta.globals.is_empty());
        assert!(meta.structs.is_empty());
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/x.json");
        write_json(&path, &vec![1, 2, 3], false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2,3]");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
