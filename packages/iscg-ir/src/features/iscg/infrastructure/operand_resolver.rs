//! Syntactic operand classification
//!
//! An operand string is matched against the function's instruction texts,
//! defined variables, parameters, call target and known globals. No type
//! information is used.

use ahash::{AHashMap, AHashSet};

use crate::features::symbol_tables::FunctionSymbols;
use crate::shared::models::{Function, Metadata};
use crate::shared::utils::tokens::{is_literal, last_token, symbol_tokens};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandRef {
    Instruction(u32),
    Parameter(String),
    /// Canonical global name
    Global(String),
    Constant(String),
    CallTarget(String),
    /// Block label (phi incoming block, invoke/br label operands)
    Label(String),
    Unresolved,
}

pub struct OperandResolver<'a> {
    text_ids: AHashMap<&'a str, u32>,
    var_ids: AHashMap<&'a str, u32>,
    params: AHashSet<&'a str>,
    labels: AHashSet<&'a str>,
    globals: AHashSet<String>,
    placeholder: &'a str,
}

impl<'a> OperandResolver<'a> {
    /// `function` must be canonical; `symbols` are the maps that produced it
    pub fn new(
        function: &'a Function,
        symbols: &FunctionSymbols,
        metadata: &Metadata,
        placeholder: &'a str,
    ) -> Self {
        let mut text_ids = AHashMap::new();
        let mut var_ids = AHashMap::new();
        for inst in function.instructions() {
            text_ids.entry(inst.text.as_str()).or_insert(inst.id);
            if let Some(var) = inst.result_var() {
                var_ids.entry(var).or_insert(inst.id);
            }
        }

        let globals = metadata
            .globals
            .keys()
            .map(|key| {
                let key = if key.starts_with('@') {
                    key.clone()
                } else {
                    format!("@{}", key)
                };
                symbols.canonical_global(&key).into_owned()
            })
            .collect();

        Self {
            text_ids,
            var_ids,
            params: function.param_names().collect(),
            labels: function.blocks.iter().map(|b| b.label.as_str()).collect(),
            globals,
            placeholder,
        }
    }

    pub fn classify(&self, operand: &str, callee: Option<&str>) -> OperandRef {
        let operand = operand.trim();
        if let Some(&id) = self.text_ids.get(operand) {
            return OperandRef::Instruction(id);
        }

        let last = last_token(operand);
        if let Some(&id) = self.var_ids.get(last) {
            return OperandRef::Instruction(id);
        }
        if self.params.contains(last) {
            return OperandRef::Parameter(last.to_string());
        }
        if callee.is_some_and(|c| c == last) {
            return OperandRef::CallTarget(last.to_string());
        }

        // constant expressions and phi pairs: first meaningful token wins
        let mut saw_label = None;
        let mut saw_unknown_local = false;
        let mut first_unknown_global = None;
        for token in symbol_tokens(operand) {
            if let Some(&id) = self.var_ids.get(token) {
                return OperandRef::Instruction(id);
            }
            if self.params.contains(token) {
                return OperandRef::Parameter(token.to_string());
            }
            if self.globals.contains(token) {
                return OperandRef::Global(token.to_string());
            }
            if self.labels.contains(token) {
                saw_label.get_or_insert(token);
            } else if token.starts_with('@') {
                first_unknown_global.get_or_insert(token);
            } else if !is_type_token(token) {
                saw_unknown_local = true;
            }
        }

        if last == self.placeholder || is_literal(last) {
            return OperandRef::Constant(last.to_string());
        }
        if let Some(label) = saw_label {
            return OperandRef::Label(label.to_string());
        }
        if let Some(name) = first_unknown_global {
            return OperandRef::CallTarget(name.to_string());
        }
        if saw_unknown_local {
            return OperandRef::Unresolved;
        }
        // bare types and keywords (`void`, `i32`, `label`)
        OperandRef::Constant(last.to_string())
    }

    pub fn is_param(&self, name: &str) -> bool {
        self.params.contains(name)
    }
}

/// Named type tokens carry no value (`%struct_0`, `%struct.foo`, `%class.*`)
fn is_type_token(token: &str) -> bool {
    token.starts_with("%struct") || token.starts_with("%class.") || token.starts_with("%union.")
}
