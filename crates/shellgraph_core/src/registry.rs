// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node factory and palette metadata.

use crate::node::{Node, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node category, used to group the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Start, branches and loops
    Flow,
    /// Statements that run something
    Commands,
    /// Variable reads, writes and tests
    Variables,
    /// Value conversions
    Conversion,
}

/// Palette entry for one node kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Kind created by this entry
    pub kind: NodeKind,
    /// Display label
    pub label: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
}

/// Registry of available node kinds, keyed by type tag
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    types: IndexMap<String, NodeDescriptor>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Create a registry with every built-in shell node
    pub fn shell() -> Self {
        let mut registry = Self::new();
        let entries = [
            (NodeKind::Start, "Start", NodeCategory::Flow, "The starting point of the flow"),
            (NodeKind::If, "If Condition", NodeCategory::Flow, "Evaluates a condition and branches the flow"),
            (NodeKind::For, "For Loop", NodeCategory::Flow, "Iterates over a list"),
            (NodeKind::RunCommand, "Run a command", NodeCategory::Commands, "Executes a shell command"),
            (NodeKind::Pipe, "Pipe", NodeCategory::Commands, "Pipes output from Command 1 into Command 2"),
            (NodeKind::Echo, "Print a text", NodeCategory::Commands, "Prints a text to the console"),
            (NodeKind::Exit, "Exit script", NodeCategory::Commands, "Exits the script with a status code"),
            (NodeKind::Sleep, "Sleep", NodeCategory::Commands, "Pauses for a number of seconds"),
            (NodeKind::SetVariable, "Set Variable", NodeCategory::Variables, "Assigns a value to a shell variable"),
            (NodeKind::GetVariable, "Get Variable", NodeCategory::Variables, "Reads a shell variable"),
            (NodeKind::FileExists, "File Exists", NodeCategory::Variables, "Tests whether a regular file exists"),
            (NodeKind::ToString, "To String", NodeCategory::Conversion, "Quotes a value as a string"),
            (NodeKind::ToInt, "To Int", NodeCategory::Conversion, "Evaluates an arithmetic expression"),
        ];

        for (kind, label, category, description) in entries {
            registry.register(NodeDescriptor {
                kind,
                label: label.to_string(),
                category,
                description: description.to_string(),
            });
        }

        registry
    }

    /// Register a node kind
    pub fn register(&mut self, descriptor: NodeDescriptor) {
        self.types
            .insert(descriptor.kind.type_tag().to_string(), descriptor);
    }

    /// Get a descriptor by type tag
    pub fn get(&self, tag: &str) -> Option<&NodeDescriptor> {
        self.types.get(tag)
    }

    /// Get all registered descriptors
    pub fn descriptors(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.types.values()
    }

    /// Get descriptors by category
    pub fn in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeDescriptor> {
        self.types.values().filter(move |d| d.category == category)
    }

    /// Create a fresh node from a type tag; `None` for unregistered tags
    pub fn create_node(&self, tag: &str) -> Option<Node> {
        self.get(tag).map(|d| Node::new(d.kind))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::shell()
    }
}
