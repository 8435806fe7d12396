// SPDX-License-Identifier: MIT OR Apache-2.0
//! Exec-chain walk that turns a graph into a script.

use super::context::{EmitContext, DEFAULT_INDENT_WIDTH};
use super::node::EmitBash;
use crate::graph::Graph;
use crate::node::{Node, NodeId};

/// Emit `start` and every node after it along the exec chain.
///
/// Stops at a node already emitted in `ctx`, after emitting `stop_at`, or when
/// the chain has no connected exec output.
pub fn emit_exec_chain(graph: &Graph, start: &Node, ctx: &mut EmitContext, stop_at: Option<NodeId>) {
    let mut current = Some(start);

    while let Some(node) = current {
        if !ctx.mark_emitted(node.id) {
            tracing::debug!("Stopping at already emitted node {}", node.id);
            break;
        }

        let bash = node.emit_bash(graph, ctx);
        if !bash.is_empty() {
            ctx.add_line(bash);
        }

        if stop_at == Some(node.id) {
            break;
        }

        current = graph.next_exec_node(node);
    }
}

/// Generates a POSIX shell script from a graph
#[derive(Debug, Clone, Copy)]
pub struct BashEmitter<'a> {
    graph: &'a Graph,
    indent_width: usize,
}

impl<'a> BashEmitter<'a> {
    /// Create an emitter over `graph`
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }

    /// Use `indent_width` spaces per nesting level
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Generate the script, without a shebang line.
    ///
    /// A graph without a start node yields an empty script.
    pub fn emit(&self) -> String {
        let mut ctx = EmitContext::with_indent_width(self.indent_width);

        match self.graph.get_start_node() {
            Some(start) => {
                tracing::debug!("Emitting script from start node {}", start.id);
                emit_exec_chain(self.graph, start, &mut ctx, None);
            }
            None => tracing::debug!("Graph '{}' has no start node", self.graph.name),
        }

        ctx.finish()
    }
}
