// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line accumulator threaded through one generation pass.

use crate::node::NodeId;
use std::collections::HashSet;

/// Spaces per indent level unless configured otherwise
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Mutable state for one code generation pass
#[derive(Debug, Clone)]
pub struct EmitContext {
    lines: Vec<String>,
    indent_level: usize,
    indent_width: usize,
    emitted: HashSet<NodeId>,
}

impl EmitContext {
    /// Create an empty context with the default indent width
    pub fn new() -> Self {
        Self::with_indent_width(DEFAULT_INDENT_WIDTH)
    }

    /// Create an empty context indenting by `indent_width` spaces per level
    pub fn with_indent_width(indent_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            indent_level: 0,
            indent_width,
            emitted: HashSet::new(),
        }
    }

    /// Append a line at the current indentation
    pub fn add_line(&mut self, text: impl AsRef<str>) {
        let pad = " ".repeat(self.indent_level * self.indent_width);
        self.lines.push(format!("{pad}{}", text.as_ref()));
    }

    /// Increase indentation by one level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation by one level, never below zero
    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Current indentation level
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Record `node` as emitted. Returns `false` if it already was.
    pub fn mark_emitted(&mut self, node: NodeId) -> bool {
        self.emitted.insert(node)
    }

    /// Whether `node` has been emitted in this pass
    pub fn is_emitted(&self, node: NodeId) -> bool {
        self.emitted.contains(&node)
    }

    /// Lines emitted so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the accumulated lines into the script text
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}
