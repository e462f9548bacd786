// Insertion-ordered rename maps
//
// A RenameMap is a bijection original → `<prefix><N>` where N is the
// first-seen index (plus a base offset). Lookups go both ways in O(1).

use ahash::AHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMap {
    prefix: String,
    base: usize,
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
    reverse: AHashMap<String, usize>,
}

impl RenameMap {
    pub fn new(prefix: impl Into<String>, base: usize) -> Self {
        Self {
            prefix: prefix.into(),
            base,
            entries: Vec::new(),
            index: AHashMap::new(),
            reverse: AHashMap::new(),
        }
    }

    /// Insert `original` if unseen; returns its canonical name either way
    pub fn insert(&mut self, original: &str) -> &str {
        let slot = match self.index.get(original) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                let canonical = format!("{}{}", self.prefix, self.base + slot);
                self.index.insert(original.to_string(), slot);
                self.reverse.insert(canonical.clone(), slot);
                self.entries.push((original.to_string(), canonical));
                slot
            }
        };
        &self.entries[slot].1
    }

    #[inline]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.index
            .get(original)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    #[inline]
    pub fn contains(&self, original: &str) -> bool {
        self.index.contains_key(original)
    }

    /// Original name of a canonical one
    pub fn original_of(&self, canonical: &str) -> Option<&str> {
        self.reverse
            .get(canonical)
            .map(|&slot| self.entries[slot].0.as_str())
    }

    /// `(original, canonical)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, c)| (o.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RenameMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (original, canonical) in &self.entries {
            map.serialize_entry(original, canonical)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_numbering() {
        let mut vars = RenameMap::new("%var", 0);
        for name in ["%x", "%y", "%x"] {
            vars.insert(name);
        }
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("%x"), Some("%var0"));
        assert_eq!(vars.get("%y"), Some("%var1"));
        assert_eq!(vars.original_of("%var1"), Some("%y"));
    }

    #[test]
    fn test_base_offset() {
        let mut params = RenameMap::new("%arg", 1);
        assert_eq!(params.insert("%0"), "%arg1");
        assert_eq!(params.insert("%1"), "%arg2");
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut calls = RenameMap::new("@function_", 0);
        calls.insert("@zeta");
        calls.insert("@alpha");
        let json = serde_json::to_string(&calls).unwrap();
        assert_eq!(json, r#"{"@zeta":"@function_0","@alpha":"@function_1"}"#);
    }
}
