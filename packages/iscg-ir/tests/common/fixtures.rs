//! Test fixtures
//!
//! Raw (pre-canonical) functions in the shape the summary extractor emits,
//! plus helpers that lay out a unit directory on disk.

use iscg_ir::shared::models::{Function, Metadata};
use serde_json::json;
use std::fs;
use std::path::Path;

use super::builders::FunctionBuilder;

/// `%2 = add i32 %0, 1` then `ret i32 %2`
pub fn add_then_ret() -> Function {
    FunctionBuilder::new("add_one")
        .param("i32 %0")
        .block("1:")
        .inst("add", "%2 = add i32 %0, 1")
        .operands(&["i32 %0", "i32 1"])
        .inst("ret", "ret i32 %2")
        .returns("i32 %2")
        .build()
}

/// Diamond-free two-way branch with a call, a global load/store and a phi
pub fn branchy() -> Function {
    FunctionBuilder::new("accumulate")
        .param("i32 %0")
        .param("ptr %1")
        .block("2:")
        .inst("load", "%3 = load i32, ptr @counter, align 4")
        .operands(&["ptr @counter"])
        .inst("icmp", "%4 = icmp sgt i32 %0, %3")
        .operands(&["i32 %0", "i32 %3"])
        .inst("br", "br i1 %4, label %5, label %8")
        .condition("i1 %4")
        .targets(&["label %5", "label %8"])
        .block("5:")
        .inst("call", "%6 = call i32 @helper(ptr %1, i32 1048576)")
        .callee("@helper")
        .operands(&["ptr %1", "i32 1048576"])
        .inst("add", "%7 = add nsw i32 %6, %3")
        .operands(&["i32 %6", "i32 %3"])
        .inst("br", "br label %8")
        .targets(&["label %8"])
        .block("8:")
        .inst("phi", "%9 = phi i32 [ %0, %2 ], [ %7, %5 ]")
        .operands(&["[ %0, %2 ]", "[ %7, %5 ]"])
        .inst("store", "store i32 %9, ptr @counter, align 4")
        .operands(&["i32 %9", "ptr @counter"])
        .inst("ret", "ret i32 %9")
        .returns("i32 %9")
        .build()
}

/// `switch` whose default and one case share a target
pub fn switch_with_shared_target() -> Function {
    FunctionBuilder::new("classify")
        .param("i32 %0")
        .block("1:")
        .inst("switch", "switch i32 %0, label %2 [ i32 0, label %3 i32 1, label %2 ]")
        .condition("i32 %0")
        .targets(&["label %2", "label %3", "label %2"])
        .block("2:")
        .inst("ret", "ret i32 0")
        .returns("i32 0")
        .block("3:")
        .inst("ret", "ret i32 1")
        .returns("i32 1")
        .build()
}

pub fn globals_json() -> String {
    json!({
        "@counter": {
            "type": "int",
            "linkage": "internal",
            "define": "@counter = internal global i32 0, align 4",
            "value": 0,
            "value_lens": 1
        },
        "@.str": {
            "type": "string",
            "linkage": "private",
            "define": "@.str = private constant [4 x i8] c\"abc\\00\"",
            "value": "abc",
            "value_lens": 4
        }
    })
    .to_string()
}

pub fn structs_json() -> String {
    json!({ "%struct.node": ["i32", "ptr"] }).to_string()
}

pub fn sample_metadata() -> Metadata {
    Metadata::from_json(&globals_json(), &structs_json()).expect("fixture metadata parses")
}

/// `<root>/summaries/<stem>_info_summary.json` plus companions when given
pub fn write_unit(
    root: &Path,
    stem: &str,
    functions: &[Function],
    globals: Option<&str>,
    structs: Option<&str>,
) {
    for dir in ["summaries", "globals", "structs"] {
        fs::create_dir_all(root.join(dir)).expect("create fixture dirs");
    }
    let summary = serde_json::to_string(functions).expect("serialize functions");
    fs::write(root.join("summaries").join(format!("{stem}_info_summary.json")), summary)
        .expect("write summary");
    if let Some(globals) = globals {
        fs::write(root.join("globals").join(format!("{stem}_globals.json")), globals)
            .expect("write globals");
    }
    if let Some(structs) = structs {
        fs::write(root.join("structs").join(format!("{stem}_structs.json")), structs)
            .expect("write structs");
    }
}
