// Serialization Domain Models
//
// IscgDocument is the persisted per-function graph:
// {function_name, nodes, links, nodes_info}

use serde::{Deserialize, Serialize};

use crate::features::iscg::domain::{EdgeKind, NodeAttrs};

/// `[source, target, kind]`
pub type Link = (String, String, EdgeKind);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IscgDocument {
    pub function_name: String,
    /// Node ids in insertion order
    pub nodes: Vec<String>,
    /// Deduplicated by (source, target, kind), first occurrence kept
    pub links: Vec<Link>,
    /// Id → attributes, as a JSON object in `nodes` order
    #[serde(with = "ordered_map")]
    pub nodes_info: Vec<(String, NodeAttrs)>,
}

impl IscgDocument {
    pub fn attrs(&self, id: &str) -> Option<&NodeAttrs> {
        self.nodes_info
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, attrs)| attrs)
    }

    pub fn links_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |(_, _, k)| *k == kind)
    }
}

// Helper module: Vec<(String, V)> <-> JSON object preserving order
pub mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of node ids to attributes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
