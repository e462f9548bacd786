//! Single forward pass that fills a function's rename maps
//!
//! Order of first sight: parameter declarations, block labels in block order,
//! then every instruction token left to right.

use ahash::AHashSet;
use tracing::debug;

use super::frequency::FrequencyTables;
use crate::config::CanonicalizeConfig;
use crate::features::symbol_tables::domain::FunctionSymbols;
use crate::shared::models::{Diagnostics, Function, Metadata};
use crate::shared::utils::tokens::{
    is_struct_like, normalize_label, strip_metadata, strip_struct_suffix, symbol_tokens,
};

pub struct SymbolCollector<'a> {
    metadata: &'a Metadata,
    frequency: &'a FrequencyTables,
    config: &'a CanonicalizeConfig,
}

/// Mutable state of one collection pass
struct Pass {
    symbols: FunctionSymbols,
    diagnostics: Diagnostics,
    defined: AHashSet<String>,
    callees: AHashSet<String>,
    reported: AHashSet<String>,
}

impl<'a> SymbolCollector<'a> {
    pub fn new(
        metadata: &'a Metadata,
        frequency: &'a FrequencyTables,
        config: &'a CanonicalizeConfig,
    ) -> Self {
        Self {
            metadata,
            frequency,
            config,
        }
    }

    pub fn collect(&self, function: &Function) -> (FunctionSymbols, Diagnostics) {
        let mut pass = Pass {
            symbols: FunctionSymbols::new(self.config.label_style, self.config.rename_globals),
            diagnostics: Diagnostics::new(),
            defined: function
                .instructions()
                .filter_map(|i| i.result_var())
                .map(|v| strip_metadata(v).into_owned())
                .collect(),
            callees: function
                .instructions()
                .filter_map(|i| i.callee_name())
                .map(|c| strip_metadata(c).into_owned())
                .collect(),
            reported: AHashSet::new(),
        };

        for name in function.param_names() {
            pass.symbols.params.insert(&strip_metadata(name));
        }
        // struct and global tokens inside parameter types
        for decl in &function.params {
            self.scan(&mut pass, &strip_metadata(decl), None);
        }
        for block in &function.blocks {
            pass.symbols.labels.insert(&normalize_label(&block.label));
        }

        for inst in function.instructions() {
            self.scan(&mut pass, &strip_metadata(&inst.text), Some(inst.id));
            if let Some(ret_ty) = inst.return_type.as_deref() {
                self.scan(&mut pass, &strip_metadata(ret_ty), Some(inst.id));
            }
            // a callee the text does not spell out (e.g. after truncation)
            if let Some(callee) = inst.callee_name() {
                self.scan(&mut pass, &strip_metadata(callee), Some(inst.id));
            }
        }

        debug!(
            function = %function.name,
            vars = pass.symbols.vars.len(),
            params = pass.symbols.params.len(),
            labels = pass.symbols.labels.len(),
            structs = pass.symbols.structs.len(),
            calls = pass.symbols.calls.len(),
            "symbol tables collected"
        );

        (pass.symbols, pass.diagnostics)
    }

    fn scan(&self, pass: &mut Pass, text: &str, inst_id: Option<u32>) {
        for token in symbol_tokens(text) {
            if token.starts_with('%') {
                self.local_token(pass, token, inst_id);
            } else {
                self.global_token(pass, token, inst_id);
            }
        }
    }

    fn local_token(&self, pass: &mut Pass, token: &str, inst_id: Option<u32>) {
        let symbols = &mut pass.symbols;
        if symbols.params.contains(token) || symbols.labels.contains(token) {
            return;
        }
        if pass.defined.contains(token) {
            symbols.vars.insert(token);
            return;
        }

        let base = strip_struct_suffix(token);
        if self.metadata.has_struct(base) {
            symbols.structs.insert(base);
        } else if self.metadata.has_struct(token) {
            symbols.structs.insert(token);
        } else if is_struct_like(token) && pass.reported.insert(base.to_string()) {
            pass.diagnostics.metadata_gap(inst_id, "struct", base);
        }
    }

    fn global_token(&self, pass: &mut Pass, token: &str, inst_id: Option<u32>) {
        if self.metadata.has_global(token) {
            if let Some(globals) = pass.symbols.globals.as_mut() {
                globals.insert(token);
            }
            return;
        }
        if pass.callees.contains(token) {
            if self.frequency.is_common_call(token) {
                pass.symbols.note_exempt_call(token);
            } else {
                pass.symbols.calls.insert(token);
            }
            return;
        }
        if self.frequency.is_common_call(token) {
            // intrinsic or common function referenced without being called
            pass.symbols.note_exempt_call(token);
            return;
        }
        if pass.reported.insert(token.to_string()) {
            pass.diagnostics.metadata_gap(inst_id, "global", token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Block, DiagnosticKind, InstructionRecord, Opcode};
    use serde_json::json;

    fn inst(id: u32, opcode: &str, text: &str) -> InstructionRecord {
        InstructionRecord::new(id, Opcode::parse(opcode), text)
    }

    fn metadata() -> Metadata {
        Metadata::from_json(
            r#"{"@counter": {"type": "int"}}"#,
            &json!({"%struct.node": ["i32", "ptr"]}).to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_first_seen_order() {
        let mut f = Function::new("f");
        f.params = vec!["i32 %0".into(), "ptr %1".into()];
        f.blocks.push(Block::new("%2").with_instructions(vec![
            inst(0, "add", "%y = add i32 %0, 1"),
            inst(1, "add", "%x = add i32 %y, %y"),
            inst(2, "add", "%z = add i32 %x, %y"),
            inst(3, "br", "br label %5"),
        ]));
        f.blocks.push(Block::new("5:").with_instructions(vec![inst(4, "ret", "ret void")]));

        let meta = Metadata::default();
        let freq = FrequencyTables::empty();
        let config = CanonicalizeConfig::default();
        let (symbols, diags) = SymbolCollector::new(&meta, &freq, &config).collect(&f);

        let vars: Vec<_> = symbols.vars.iter().collect();
        assert_eq!(vars, vec![("%y", "%var0"), ("%x", "%var1"), ("%z", "%var2")]);
        assert_eq!(symbols.params.get("%1"), Some("%arg2"));
        assert_eq!(symbols.labels.get("%5"), Some("%label_1"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_structs_calls_and_gaps() {
        let mut call = inst(0, "call", "%r = call ptr @make(ptr %struct.node.12* null, ptr @counter)");
        call.callee = Some("@make".into());
        let mut memcpy = inst(1, "call", "call void @llvm.memcpy.p0.p0.i64(ptr %r, ptr @buf, i64 16, i1 false)");
        memcpy.callee = Some("@llvm.memcpy.p0.p0.i64".into());
        let alloca = inst(2, "alloca", "%s = alloca %struct.unknown, align 8");

        let mut f = Function::new("f");
        f.blocks.push(Block::new("%0").with_instructions(vec![call, memcpy, alloca]));

        let meta = metadata();
        let freq = FrequencyTables::empty();
        let config = CanonicalizeConfig {
            rename_globals: true,
            ..Default::default()
        };
        let (symbols, diags) = SymbolCollector::new(&meta, &freq, &config).collect(&f);

        assert_eq!(symbols.structs.get("%struct.node"), Some("%struct_0"));
        assert_eq!(symbols.calls.get("@make"), Some("@function_0"));
        assert!(symbols.calls.get("@llvm.memcpy.p0.p0.i64").is_none());
        assert!(symbols.is_exempt_call("@llvm.memcpy.p0.p0.i64"));
        assert_eq!(
            symbols.globals.as_ref().and_then(|g| g.get("@counter")),
            Some("@global_var_0")
        );

        // @buf is not in metadata, %struct.unknown neither
        assert_eq!(diags.count(DiagnosticKind::MetadataGap), 2);
    }
}
