//! Function-level canonicalization
//!
//! Collects the rename maps, then rewrites every field of every record with
//! the same pass sequence. The maps are returned alongside the canonical
//! function for the graph builder.

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use super::passes::{run_passes, PassContext};
use crate::config::CanonicalizeConfig;
use crate::features::symbol_tables::{FrequencyTables, FunctionSymbols, SymbolCollector};
use crate::shared::models::{
    Block, Diagnostics, Function, InstructionRecord, InstructionUsage, Metadata,
};
use crate::shared::utils::tokens::normalize_label;

/// Canonical function plus the maps that produced it
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub function: Function,
    pub symbols: FunctionSymbols,
    pub diagnostics: Diagnostics,
}

pub struct Canonicalizer<'a> {
    metadata: &'a Metadata,
    frequency: &'a FrequencyTables,
    config: &'a CanonicalizeConfig,
}

impl<'a> Canonicalizer<'a> {
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

    pub fn canonicalize(&self, function: &Function) -> Canonicalized {
        let (symbols, diagnostics) =
            SymbolCollector::new(self.metadata, self.frequency, self.config).collect(function);

        let ctx = PassContext {
            symbols: &symbols,
            metadata: self.metadata,
            frequency: self.frequency,
            config: self.config,
        };
        let mut rewriter = FieldRewriter {
            ctx,
            instruction_texts: function.instructions().map(|i| i.text.as_str()).collect(),
            cache: AHashMap::new(),
        };

        let mut scratch = InstructionUsage::default();
        let params = function
            .params
            .iter()
            .map(|p| run_passes(p, &ctx, &mut scratch))
            .collect();

        let blocks = function
            .blocks
            .iter()
            .map(|block| Block {
                label: run_passes(&normalize_label(&block.label), &ctx, &mut scratch),
                instructions: block
                    .instructions
                    .iter()
                    .map(|inst| rewriter.record(inst))
                    .collect(),
            })
            .collect();

        let canonical = Function {
            name: function.name.clone(),
            params,
            blocks,
        };

        debug!(
            function = %function.name,
            instructions = canonical.instruction_count(),
            cached_texts = rewriter.cache.len(),
            "canonicalized"
        );

        Canonicalized {
            function: canonical,
            symbols,
            diagnostics,
        }
    }
}

/// Rewrites the fields of one record; operand strings that repeat another
/// instruction's full text are attributed to that instruction, not this one
struct FieldRewriter<'f, 'c> {
    ctx: PassContext<'c>,
    instruction_texts: AHashSet<&'f str>,
    cache: AHashMap<&'f str, String>,
}

impl<'f, 'c> FieldRewriter<'f, 'c> {
    fn record(&mut self, inst: &'f InstructionRecord) -> InstructionRecord {
        let mut usage = InstructionUsage::default();

        let text = self.rewrite(&inst.text, &mut usage);
        let cached = text.clone();
        self.cache.entry(inst.text.as_str()).or_insert(cached);

        let operands = inst
            .operands
            .iter()
            .map(|op| self.operand(op, &mut usage))
            .collect();
        let condition = inst.condition.as_deref().map(|c| self.operand(c, &mut usage));
        let return_value = inst
            .return_value
            .as_deref()
            .map(|v| self.operand(v, &mut usage));
        let targets = inst
            .targets
            .iter()
            .map(|t| self.rewrite(&normalize_label(t), &mut usage))
            .collect();
        let callee = inst.callee.as_deref().map(|c| self.rewrite(c, &mut usage));
        let defined_var = inst
            .defined_var
            .as_deref()
            .map(|v| self.rewrite(v, &mut usage));
        let return_type = inst
            .return_type
            .as_deref()
            .map(|t| self.rewrite(t, &mut usage));

        let mut merged = inst.usage.clone();
        merged.merge(&usage);

        InstructionRecord {
            id: inst.id,
            opcode: inst.opcode.clone(),
            text,
            operands,
            defined_var,
            condition,
            targets,
            callee,
            return_type,
            return_value,
            usage: merged,
        }
    }

    fn rewrite(&self, raw: &str, usage: &mut InstructionUsage) -> String {
        run_passes(raw, &self.ctx, usage)
    }

    fn operand(&mut self, raw: &str, usage: &mut InstructionUsage) -> String {
        match self.instruction_texts.get(raw).copied() {
            Some(text) => {
                if let Some(done) = self.cache.get(text) {
                    return done.clone();
                }
                let mut scratch = InstructionUsage::default();
                let canonical = run_passes(text, &self.ctx, &mut scratch);
                self.cache.insert(text, canonical.clone());
                canonical
            }
            None => self.rewrite(raw, usage),
        }
    }
}
