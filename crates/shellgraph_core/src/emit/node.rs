// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-kind shell emission.

use super::context::EmitContext;
use crate::graph::Graph;
use crate::node::{Node, NodeKind};
use crate::port::Port;

/// Shell emission implemented once per node kind
pub trait EmitBash {
    /// Produce this node's own statement, or an empty string.
    ///
    /// Control-flow kinds write their structural lines straight into `ctx`
    /// and return empty.
    fn emit_bash(&self, graph: &Graph, ctx: &mut EmitContext) -> String;

    /// Substitutable expression for data-producing kinds
    fn emit_bash_value(&self, graph: &Graph, ctx: &mut EmitContext) -> Option<String>;
}

impl EmitBash for Node {
    fn emit_bash(&self, graph: &Graph, ctx: &mut EmitContext) -> String {
        match self.kind {
            NodeKind::Start | NodeKind::GetVariable | NodeKind::FileExists => String::new(),
            NodeKind::RunCommand => self.resolve_input(graph, ctx, 1, "command", ""),
            NodeKind::Pipe => {
                let left = self.resolve_input(graph, ctx, 1, "command_1", "ls");
                let right = self.resolve_input(graph, ctx, 2, "command_2", "");
                format!("{left} | {right}")
            }
            NodeKind::Echo => {
                let text = self.resolve_input(graph, ctx, 1, "text", "");
                format!("echo \"{text}\"")
            }
            NodeKind::Exit => format!("exit {}", self.resolve_input(graph, ctx, 1, "code", "0")),
            NodeKind::Sleep => {
                format!("sleep {}", self.resolve_input(graph, ctx, 1, "duration", "1"))
            }
            NodeKind::If => {
                let condition = self.resolve_input(graph, ctx, 1, "condition", "");
                ctx.add_line(format!("if [ {condition} ]; then"));
                ctx.indent();
                self.emit_body(graph, ctx, 0);
                ctx.dedent();

                if self.output(1).is_some_and(Port::is_connected) {
                    ctx.add_line("else");
                    ctx.indent();
                    self.emit_body(graph, ctx, 1);
                    ctx.dedent();
                }

                ctx.add_line("fi");
                String::new()
            }
            NodeKind::For => {
                let variable = self.text_property("variable", "item");
                let list = self.resolve_input(graph, ctx, 1, "list", "*");
                ctx.add_line(format!("for {variable} in {list}; do"));
                ctx.indent();
                self.emit_body(graph, ctx, 0);
                ctx.dedent();
                ctx.add_line("done");
                String::new()
            }
            NodeKind::ToString => {
                format!("\"{}\"", self.resolve_input(graph, ctx, 0, "input", ""))
            }
            NodeKind::ToInt => {
                format!("$(( {} ))", self.resolve_input(graph, ctx, 0, "input", "0"))
            }
            NodeKind::SetVariable => {
                let name = self.text_property("name", "var");
                let value = self.resolve_input(graph, ctx, 1, "value", "");
                format!("{name}=\"{value}\"")
            }
        }
    }

    fn emit_bash_value(&self, graph: &Graph, ctx: &mut EmitContext) -> Option<String> {
        match self.kind {
            NodeKind::RunCommand | NodeKind::Pipe => {
                Some(format!("$({})", self.emit_bash(graph, ctx)))
            }
            NodeKind::ToString | NodeKind::ToInt => Some(self.emit_bash(graph, ctx)),
            NodeKind::For => Some(format!("${{{}}}", self.text_property("variable", "item"))),
            NodeKind::GetVariable => Some(format!("${{{}}}", self.text_property("name", "var"))),
            NodeKind::FileExists => {
                Some(format!("-f {}", self.resolve_input(graph, ctx, 0, "path", "")))
            }
            NodeKind::Start
            | NodeKind::Echo
            | NodeKind::Exit
            | NodeKind::If
            | NodeKind::Sleep
            | NodeKind::SetVariable => None,
        }
    }
}

impl Node {
    fn text_property(&self, key: &str, fallback: &str) -> String {
        self.property(key)
            .map_or_else(|| fallback.to_string(), ToString::to_string)
    }

    /// Effective value of input `index`.
    ///
    /// A connected input asks the upstream node for its value, then falls back
    /// to the upstream port literal or `value` property. An unconnected input
    /// uses its own literal, then this node's `key` property, then `fallback`.
    fn resolve_input(
        &self,
        graph: &Graph,
        ctx: &mut EmitContext,
        index: usize,
        key: &str,
        fallback: &str,
    ) -> String {
        if let Some(port) = self.input(index) {
            if let Some(edge) = graph.first_edge(port) {
                if let Some(upstream) = graph.node(edge.source.node) {
                    if let Some(value) = upstream.emit_bash_value(graph, ctx) {
                        return value;
                    }
                    let stored = upstream
                        .port(edge.source.port)
                        .and_then(|p| p.value.as_ref())
                        .or_else(|| upstream.property("value"));
                    if let Some(value) = stored {
                        return value.to_string();
                    }
                }
            }
            if let Some(value) = &port.value {
                return value.to_string();
            }
        }
        self.text_property(key, fallback)
    }

    /// Emit the single node hanging off exec output `index`, one level deep
    fn emit_body(&self, graph: &Graph, ctx: &mut EmitContext, index: usize) {
        let Some(body) = self.output(index).and_then(|p| graph.peer_node(p)) else {
            return;
        };
        if !ctx.mark_emitted(body.id) {
            return;
        }
        let bash = body.emit_bash(graph, ctx);
        if !bash.is_empty() {
            ctx.add_line(bash);
        }
    }
}
