//! ISCG node identity and attributes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::shared::models::GlobalType;

/// Id of the single function-entry node
pub const FUNCTION_ENTRY_ID: &str = "function_start";

/// Node identity; rendered to the serialized node id by `Display`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    FunctionEntry,
    /// Canonical block label
    Block(String),
    Instruction(u32),
    /// Canonical parameter name
    Parameter(String),
    /// Canonical global name
    Global(String),
}

impl NodeKey {
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::FunctionEntry => f.write_str(FUNCTION_ENTRY_ID),
            NodeKey::Block(label) => f.write_str(label),
            NodeKey::Instruction(id) => write!(f, "{}", id),
            NodeKey::Parameter(name) | NodeKey::Global(name) => f.write_str(name),
        }
    }
}

/// Per-kind node attributes, emitted under `nodes_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeAttrs {
    Function {
        num_params: usize,
        bb_num: usize,
    },
    Block {
        block_inst_count: usize,
    },
    Instruction {
        instruction: String,
        opcode: String,
        uses_param: bool,
    },
    #[serde(rename = "function_param")]
    Parameter {
        define: String,
    },
    Global {
        define: String,
        global_type: GlobalType,
        value: Value,
        linkage: String,
        value_lens: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_ids() {
        assert_eq!(NodeKey::FunctionEntry.id(), "function_start");
        assert_eq!(NodeKey::Instruction(12).id(), "12");
        assert_eq!(NodeKey::Block("%label_0".into()).id(), "%label_0");
    }

    #[test]
    fn test_attrs_are_internally_tagged() {
        let attrs = NodeAttrs::Parameter {
            define: "i32 %arg1".into(),
        };
        assert_eq!(
            serde_json::to_value(&attrs).unwrap(),
            json!({"type": "function_param", "define": "i32 %arg1"})
        );

        let inst = NodeAttrs::Instruction {
            instruction: "ret void".into(),
            opcode: "ret".into(),
            uses_param: false,
        };
        assert_eq!(serde_json::to_value(&inst).unwrap()["type"], "instruction");
    }
}
