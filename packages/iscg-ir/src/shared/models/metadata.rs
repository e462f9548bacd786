//! External metadata: global variable and struct type tables
//!
//! Both tables are read-only for the lifetime of a run and shared between
//! workers behind an `Arc`.

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Type class of a global variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalType {
    String,
    Int,
    Float,
    Double,
    Struct,
    ArrayPtr,
    PtrArray,
    #[default]
    #[serde(other)]
    Unknown,
}

impl GlobalType {
    /// String- and struct-typed globals never become graph nodes
    #[inline]
    pub fn is_materialized(self) -> bool {
        !matches!(self, GlobalType::String | GlobalType::Struct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GlobalType::String => "string",
            GlobalType::Int => "int",
            GlobalType::Float => "float",
            GlobalType::Double => "double",
            GlobalType::Struct => "struct",
            GlobalType::ArrayPtr => "array_ptr",
            GlobalType::PtrArray => "ptr_array",
            GlobalType::Unknown => "unknown",
        }
    }
}

/// One entry of a globals file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalInfo {
    #[serde(rename = "type", alias = "global_type", default)]
    pub global_type: GlobalType,
    #[serde(default)]
    pub linkage: String,
    /// Full definition line
    #[serde(alias = "define", default)]
    pub raw_definition: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub value_lens: Value,
}

/// Globals and structs of one input unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub globals: AHashMap<String, GlobalInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub structs: AHashMap<String, Value>,
}

impl Metadata {
    pub fn new(globals: AHashMap<String, GlobalInfo>, structs: AHashMap<String, Value>) -> Self {
        Self { globals, structs }
    }

    /// Parse the two companion files; `null` or missing maps are empty
    pub fn from_json(globals: &str, structs: &str) -> serde_json::Result<Self> {
        let globals: Option<AHashMap<String, GlobalInfo>> = serde_json::from_str(globals)?;
        let structs: Option<AHashMap<String, Value>> = serde_json::from_str(structs)?;
        Ok(Self {
            globals: globals.unwrap_or_default(),
            structs: structs.unwrap_or_default(),
        })
    }

    /// Globals files may key entries with or without the `@` sigil
    pub fn global(&self, name: &str) -> Option<&GlobalInfo> {
        self.globals
            .get(name)
            .or_else(|| name.strip_prefix('@').and_then(|bare| self.globals.get(bare)))
    }

    #[inline]
    pub fn has_global(&self, name: &str) -> bool {
        self.global(name).is_some()
    }

    #[inline]
    pub fn has_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
            || name
                .strip_prefix('%')
                .is_some_and(|bare| self.structs.contains_key(bare))
    }
}

fn null_as_empty<'de, D, V>(deserializer: D) -> Result<AHashMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Ok(Option::<AHashMap<String, V>>::deserialize(deserializer)?.unwrap_or_default())
}
