/*
 * ISCG Builder
 *
 * Walks the canonical blocks of one function in order and emits:
 * - Entry: function_start → first block
 * - Sequential: block entry → instructions with no in-block producer,
 *   and every current leaf → ret/br/unreachable/invoke
 * - Data / Parameter / Global: operand flow into an instruction
 * - Control: terminator → target block
 * - Condition: br/switch condition (only when configured, Data otherwise)
 *
 * Shape errors on terminators are fatal for the function; unresolved
 * operands and unreachable blocks are recorded as diagnostics.
 */

use ahash::{AHashMap, AHashSet};
use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use super::operand_resolver::{OperandRef, OperandResolver};
use crate::config::{ConditionEdge, GraphConfig};
use crate::errors::{IscgError, Result};
use crate::features::iscg::domain::{EdgeKind, IscgGraph, NodeAttrs, NodeKey};
use crate::features::symbol_tables::FunctionSymbols;
use crate::shared::models::{
    Block, DiagnosticKind, Diagnostics, Function, InstructionRecord, Metadata, Opcode,
};
use crate::shared::utils::tokens::{last_token, normalize_label};

pub struct IscgBuilder<'a> {
    function: &'a Function,
    symbols: &'a FunctionSymbols,
    metadata: &'a Metadata,
    config: &'a GraphConfig,
    resolver: OperandResolver<'a>,
    /// canonical parameter name → declaration
    param_decls: AHashMap<&'a str, &'a str>,
    graph: IscgGraph,
    diagnostics: Diagnostics,
}

impl<'a> IscgBuilder<'a> {
    /// `function` must already be canonical
    pub fn new(
        function: &'a Function,
        symbols: &'a FunctionSymbols,
        metadata: &'a Metadata,
        config: &'a GraphConfig,
        constant_placeholder: &'a str,
    ) -> Self {
        Self {
            function,
            symbols,
            metadata,
            config,
            resolver: OperandResolver::new(function, symbols, metadata, constant_placeholder),
            param_decls: function
                .params
                .iter()
                .map(|decl| (last_token(decl), decl.as_str()))
                .collect(),
            graph: IscgGraph::new(function.name.clone()),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn build(mut self) -> Result<(IscgGraph, Diagnostics)> {
        let function = self.function;

        let entry = self.graph.ensure_node(
            NodeKey::FunctionEntry,
            NodeAttrs::Function {
                num_params: function.params.len(),
                bb_num: function.blocks.len(),
            },
        );

        // all block entries exist up front so Control edges can target later blocks
        let mut block_nodes = Vec::with_capacity(function.blocks.len());
        for block in &function.blocks {
            let key = NodeKey::Block(normalize_label(&block.label));
            if self.graph.contains(&key) {
                let id = block.instructions.first().map(|i| i.id).unwrap_or(0);
                return Err(IscgError::malformed(
                    &function.name,
                    id,
                    &block.label,
                    "duplicate block label",
                ));
            }
            let idx = self.graph.ensure_node(
                key,
                NodeAttrs::Block {
                    block_inst_count: block.instructions.len(),
                },
            );
            block_nodes.push(idx);
        }
        if let Some(&first) = block_nodes.first() {
            self.graph.add_edge(entry, first, EdgeKind::Entry);
        }

        let mut seen_ids = AHashSet::with_capacity(function.instruction_count());
        for (block, &block_idx) in function.blocks.iter().zip(&block_nodes) {
            self.walk_block(block, block_idx, &mut seen_ids)?;
        }

        if self.config.report_unreachable_blocks {
            for (block, &idx) in function.blocks.iter().zip(&block_nodes) {
                if self.graph.in_degree(idx) == 0 {
                    warn!(function = %function.name, block = %block.label, "unreachable block");
                    self.diagnostics.push(
                        DiagnosticKind::UnreachableBlock,
                        None,
                        format!("block `{}` has no incoming edge", block.label),
                    );
                }
            }
        }

        debug!(
            function = %function.name,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            warnings = self.diagnostics.len(),
            "iscg built"
        );

        Ok((self.graph, self.diagnostics))
    }

    fn walk_block(
        &mut self,
        block: &'a Block,
        block_idx: NodeIndex,
        seen_ids: &mut AHashSet<u32>,
    ) -> Result<()> {
        self.graph.enter_block(block_idx);
        // whole block, so a phi naming a later instruction of the same block counts
        let block_ids: AHashSet<u32> = block.instructions.iter().map(|i| i.id).collect();

        for inst in &block.instructions {
            if !seen_ids.insert(inst.id) {
                return Err(self.malformed(inst, "duplicate instruction id"));
            }

            let operands: Vec<OperandRef> = inst
                .operands
                .iter()
                .map(|op| self.resolver.classify(op, inst.callee_name()))
                .collect();
            let callee_is_param = inst
                .callee_name()
                .is_some_and(|c| self.resolver.is_param(c));
            let uses_param = callee_is_param
                || operands.iter().any(|o| matches!(o, OperandRef::Parameter(_)))
                || [inst.condition.as_deref(), inst.return_value.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|v| matches!(self.resolver.classify(v, None), OperandRef::Parameter(_)));

            let node = self.graph.ensure_node(
                NodeKey::Instruction(inst.id),
                NodeAttrs::Instruction {
                    instruction: inst.text.clone(),
                    opcode: inst.opcode.as_str().to_string(),
                    uses_param,
                },
            );

            match &inst.opcode {
                Opcode::Br => self.branch(inst, node)?,
                Opcode::Switch => self.switch(inst, node)?,
                Opcode::Ret => {
                    if let Some(value) = inst.return_value.as_deref() {
                        self.value_edge(inst, value, node, EdgeKind::Data);
                    }
                    self.connect_leaves(node);
                }
                Opcode::Unreachable => self.connect_leaves(node),
                Opcode::Invoke => {
                    if inst.targets.is_empty() {
                        return Err(self.malformed(inst, "invoke without targets"));
                    }
                    self.operand_flow(inst, node, &operands, callee_is_param);
                    self.connect_leaves(node);
                    self.control_edges(inst, node)?;
                }
                _ => {
                    let depends_in_block = operands.iter().any(|o| match o {
                        OperandRef::Instruction(id) => block_ids.contains(id),
                        _ => false,
                    });
                    if !depends_in_block {
                        self.graph.add_edge(block_idx, node, EdgeKind::Sequential);
                    }
                    self.operand_flow(inst, node, &operands, callee_is_param);
                    self.graph.track_leaf(node);
                }
            }

        }
        Ok(())
    }

    fn branch(&mut self, inst: &InstructionRecord, node: NodeIndex) -> Result<()> {
        match (inst.targets.len(), inst.condition.as_deref()) {
            (0, _) => return Err(self.malformed(inst, "br without targets")),
            (n, _) if n > 2 => return Err(self.malformed(inst, "br with more than two targets")),
            (2, None) => return Err(self.malformed(inst, "conditional br without condition")),
            (_, Some(condition)) => self.value_edge(inst, condition, node, self.condition_kind()),
            (_, None) => {}
        }
        self.connect_leaves(node);
        self.control_edges(inst, node)
    }

    fn switch(&mut self, inst: &InstructionRecord, node: NodeIndex) -> Result<()> {
        let Some(condition) = inst.condition.as_deref() else {
            return Err(self.malformed(inst, "switch without condition"));
        };
        if inst.targets.is_empty() {
            return Err(self.malformed(inst, "switch without targets"));
        }
        self.value_edge(inst, condition, node, self.condition_kind());
        self.control_edges(inst, node)
    }

    fn condition_kind(&self) -> EdgeKind {
        match self.config.condition_edge {
            ConditionEdge::Data => EdgeKind::Data,
            ConditionEdge::Condition => EdgeKind::Condition,
        }
    }

    /// One Control edge per target, in order, duplicates kept
    fn control_edges(&mut self, inst: &InstructionRecord, node: NodeIndex) -> Result<()> {
        for target in &inst.targets {
            let key = NodeKey::Block(normalize_label(target));
            let Some(target_idx) = self.graph.index_of(&key) else {
                return Err(self.malformed(inst, format!("unknown target block `{}`", target)));
            };
            self.graph.add_edge(node, target_idx, EdgeKind::Control);
        }
        Ok(())
    }

    fn connect_leaves(&mut self, node: NodeIndex) {
        for leaf in self.graph.leaves_except(node) {
            self.graph.add_edge(leaf, node, EdgeKind::Sequential);
        }
    }

    /// Condition or return value flowing into a terminator
    fn value_edge(&mut self, inst: &InstructionRecord, value: &str, node: NodeIndex, kind: EdgeKind) {
        match self.resolver.classify(value, None) {
            OperandRef::Instruction(producer) => self.data_edge(inst, producer, node, kind),
            OperandRef::Parameter(name) => self.parameter_edge(&name, node),
            OperandRef::Unresolved => self.unresolved(inst, value),
            _ => {}
        }
    }

    fn operand_flow(
        &mut self,
        inst: &InstructionRecord,
        node: NodeIndex,
        operands: &[OperandRef],
        callee_is_param: bool,
    ) {
        for (operand, raw) in operands.iter().zip(&inst.operands) {
            match operand {
                OperandRef::Instruction(producer) => {
                    self.data_edge(inst, *producer, node, EdgeKind::Data)
                }
                OperandRef::Parameter(name) => self.parameter_edge(name, node),
                OperandRef::Global(name) => self.global_edge(name, node),
                OperandRef::Unresolved => self.unresolved(inst, raw),
                OperandRef::Constant(_) | OperandRef::CallTarget(_) | OperandRef::Label(_) => {}
            }
        }

        for key in &inst.usage.globals {
            let canonical = self.symbols.canonical_global(key).into_owned();
            self.global_edge(&canonical, node);
        }

        // indirect call through a parameter
        if callee_is_param {
            if let Some(callee) = inst.callee_name() {
                self.parameter_edge(callee, node);
            }
        }
    }

    /// Data edges only run forward in instruction order
    fn data_edge(&mut self, inst: &InstructionRecord, producer: u32, node: NodeIndex, kind: EdgeKind) {
        if producer >= inst.id {
            return;
        }
        if let Some(src) = self.graph.index_of(&NodeKey::Instruction(producer)) {
            self.graph.add_edge(src, node, kind);
        }
    }

    fn parameter_edge(&mut self, name: &str, node: NodeIndex) {
        let define = self.param_decls.get(name).copied().unwrap_or(name).to_string();
        let src = self
            .graph
            .ensure_node(NodeKey::Parameter(name.to_string()), NodeAttrs::Parameter { define });
        self.graph.add_edge(src, node, EdgeKind::Parameter);
    }

    /// String- and struct-typed globals get no node
    fn global_edge(&mut self, canonical: &str, node: NodeIndex) {
        let key = self.symbols.global_key(canonical);
        let Some(info) = self.metadata.global(key) else {
            return;
        };
        if !info.global_type.is_materialized() {
            return;
        }
        let attrs = NodeAttrs::Global {
            define: info.raw_definition.clone(),
            global_type: info.global_type,
            value: info.value.clone(),
            linkage: info.linkage.clone(),
            value_lens: info.value_lens.clone(),
        };
        let src = self
            .graph
            .ensure_node(NodeKey::Global(canonical.to_string()), attrs);
        self.graph.add_edge(src, node, EdgeKind::Global);
    }

    fn unresolved(&mut self, inst: &InstructionRecord, operand: &str) {
        debug!(function = %self.function.name, id = inst.id, operand, "unresolved operand");
        self.diagnostics.unresolved(inst.id, operand);
    }

    fn malformed(&self, inst: &InstructionRecord, reason: impl Into<String>) -> IscgError {
        IscgError::malformed(&self.function.name, inst.id, &inst.text, reason)
    }
}
