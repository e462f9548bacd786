// Symbol Tables Domain Models
//
// FunctionSymbols is the function-scoped value handed from the canonicalizer
// to the graph builder.

mod rename_map;

pub use rename_map::RenameMap;

use serde::Serialize;
use std::borrow::Cow;

use crate::config::LabelStyle;

pub const VAR_PREFIX: &str = "%var";
pub const PARAM_PREFIX: &str = "%arg";
pub const STRUCT_PREFIX: &str = "%struct_";
pub const CALL_PREFIX: &str = "@function_";
pub const GLOBAL_PREFIX: &str = "@global_var_";

/// Every rename map of one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSymbols {
    pub vars: RenameMap,
    pub params: RenameMap,
    pub labels: RenameMap,
    pub structs: RenameMap,
    pub calls: RenameMap,
    /// `None` keeps global names unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<RenameMap>,
    /// Common callees seen in the function, never renamed
    pub exempt_calls: Vec<String>,
}

impl FunctionSymbols {
    pub fn new(label_style: LabelStyle, rename_globals: bool) -> Self {
        Self {
            vars: RenameMap::new(VAR_PREFIX, 0),
            params: RenameMap::new(PARAM_PREFIX, 1),
            labels: RenameMap::new(label_style.prefix(), 0),
            structs: RenameMap::new(STRUCT_PREFIX, 0),
            calls: RenameMap::new(CALL_PREFIX, 0),
            globals: rename_globals.then(|| RenameMap::new(GLOBAL_PREFIX, 0)),
            exempt_calls: Vec::new(),
        }
    }

    /// Canonical name of a metadata global
    pub fn canonical_global<'a>(&'a self, name: &'a str) -> Cow<'a, str> {
        match self.globals.as_ref().and_then(|g| g.get(name)) {
            Some(renamed) => Cow::Borrowed(renamed),
            None => Cow::Borrowed(name),
        }
    }

    /// Metadata key of a canonical global name
    pub fn global_key<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.globals
            .as_ref()
            .and_then(|g| g.original_of(canonical))
            .unwrap_or(canonical)
    }

    pub fn is_exempt_call(&self, name: &str) -> bool {
        self.exempt_calls.iter().any(|c| c == name)
    }

    pub fn note_exempt_call(&mut self, name: &str) {
        if !self.is_exempt_call(name) {
            self.exempt_calls.push(name.to_string());
        }
    }
}
