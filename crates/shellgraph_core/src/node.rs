// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::port::{Port, PortDirection, PortId, PortType, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed set of node variants; selects ports, defaults and emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point of the script
    Start,
    /// Runs a literal command
    RunCommand,
    /// `cmd1 | cmd2`
    Pipe,
    /// Prints a line
    Echo,
    /// Exits with a status code
    Exit,
    /// `if [ ... ]; then ... fi`
    If,
    /// `for x in ...; do ... done`
    For,
    /// Sleeps for a number of seconds
    Sleep,
    /// Quotes an expression
    ToString,
    /// Wraps an expression in arithmetic expansion
    ToInt,
    /// Assigns a shell variable
    SetVariable,
    /// Reads a shell variable
    GetVariable,
    /// `-f path` test
    FileExists,
}

impl NodeKind {
    /// Every node kind, in palette order
    pub const ALL: [NodeKind; 13] = [
        Self::Start,
        Self::RunCommand,
        Self::Pipe,
        Self::Echo,
        Self::Exit,
        Self::If,
        Self::For,
        Self::Sleep,
        Self::ToString,
        Self::ToInt,
        Self::SetVariable,
        Self::GetVariable,
        Self::FileExists,
    ];

    /// String discriminator used in saved graphs and by the factory
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::RunCommand => "run_command",
            Self::Pipe => "pipe",
            Self::Echo => "echo",
            Self::Exit => "exit",
            Self::If => "if",
            Self::For => "for",
            Self::Sleep => "sleep",
            Self::ToString => "to_string",
            Self::ToInt => "to_int",
            Self::SetVariable => "set_variable",
            Self::GetVariable => "get_variable",
            Self::FileExists => "file_exists",
        }
    }

    /// Look up a kind by its type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }

    /// Default display title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::RunCommand => "Run Command",
            Self::Pipe => "Pipe",
            Self::Echo => "Echo",
            Self::Exit => "Exit",
            Self::If => "If",
            Self::For => "For Loop",
            Self::Sleep => "Sleep",
            Self::ToString => "To String",
            Self::ToInt => "To Int",
            Self::SetVariable => "Set Variable",
            Self::GetVariable => "Get Variable",
            Self::FileExists => "File Exists",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

/// Port and property template for one kind
struct Shape {
    inputs: &'static [(&'static str, PortType, &'static str)],
    outputs: &'static [(&'static str, PortType, &'static str)],
    properties: &'static [(&'static str, PropertyDefault)],
}

enum PropertyDefault {
    Str(&'static str),
    Int(i64),
}

impl NodeKind {
    fn shape(&self) -> Shape {
        use PortType::{Condition, Exec, Int, Path, String, Variable};

        match self {
            Self::Start => Shape {
                inputs: &[],
                outputs: &[("Exec", Exec, "Start of the flow")],
                properties: &[],
            },
            Self::RunCommand => Shape {
                inputs: &[("Exec", Exec, ""), ("Command", String, "Command to run")],
                outputs: &[("Exec", Exec, ""), ("Output", String, "Command output")],
                properties: &[("command", PropertyDefault::Str("ls"))],
            },
            Self::Pipe => Shape {
                inputs: &[
                    ("Exec", Exec, "Execution input"),
                    ("Command 1", String, "Left command"),
                    ("Command 2", String, "Right command"),
                ],
                outputs: &[
                    ("Exec", Exec, "Execution output"),
                    ("Output", String, "Output of the piped command"),
                ],
                properties: &[
                    ("command_1", PropertyDefault::Str("ls")),
                    ("command_2", PropertyDefault::Str("grep test")),
                ],
            },
            Self::Echo => Shape {
                inputs: &[("Exec", Exec, ""), ("Text", Variable, "Text to print")],
                outputs: &[("Exec", Exec, "")],
                properties: &[("text", PropertyDefault::Str("Hello"))],
            },
            Self::Exit => Shape {
                inputs: &[("Exec", Exec, ""), ("Code", Int, "Exit code")],
                outputs: &[],
                properties: &[("code", PropertyDefault::Int(0))],
            },
            Self::If => Shape {
                inputs: &[("Exec", Exec, ""), ("Condition", Condition, "Test expression")],
                outputs: &[
                    ("True", Exec, "If condition is true"),
                    ("False", Exec, "If condition is false"),
                ],
                properties: &[("condition", PropertyDefault::Str(""))],
            },
            Self::For => Shape {
                inputs: &[("Exec", Exec, ""), ("List", String, "List to iterate over")],
                outputs: &[
                    ("Loop Body", Exec, ""),
                    ("Item", Variable, "Current item in the loop"),
                ],
                properties: &[("variable", PropertyDefault::Str("item")), ("list", PropertyDefault::Str("*"))],
            },
            Self::Sleep => Shape {
                inputs: &[("Exec", Exec, ""), ("Duration", Int, "Seconds to sleep")],
                outputs: &[("Exec", Exec, "")],
                properties: &[("duration", PropertyDefault::Int(1))],
            },
            Self::ToString => Shape {
                inputs: &[("Input", Int, "Value to convert to string")],
                outputs: &[("Output", Variable, "String representation")],
                properties: &[],
            },
            Self::ToInt => Shape {
                inputs: &[("Input", String, "Expression to evaluate")],
                outputs: &[("Output", Int, "Arithmetic result")],
                properties: &[],
            },
            Self::SetVariable => Shape {
                inputs: &[("Exec", Exec, ""), ("Value", String, "Value to assign")],
                outputs: &[("Exec", Exec, "")],
                properties: &[("name", PropertyDefault::Str("var")), ("value", PropertyDefault::Str(""))],
            },
            Self::GetVariable => Shape {
                inputs: &[],
                outputs: &[("Value", Variable, "Variable reference")],
                properties: &[("name", PropertyDefault::Str("var"))],
            },
            Self::FileExists => Shape {
                inputs: &[("Path", Path, "File to test")],
                outputs: &[("Condition", Condition, "True when the file exists")],
                properties: &[("path", PropertyDefault::Str("file.txt"))],
            },
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Variant
    pub kind: NodeKind,
    /// Display title (can be customized)
    pub title: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input ports, order is significant
    pub inputs: Vec<Port>,
    /// Output ports, order is significant
    pub outputs: Vec<Port>,
    /// Per-instance configuration
    pub properties: IndexMap<String, Value>,
}

impl Node {
    /// Create a new node of the given kind with its fixed ports and defaults
    pub fn new(kind: NodeKind) -> Self {
        let id = NodeId::new();
        let shape = kind.shape();

        let make = |direction, specs: &[(&str, PortType, &str)]| {
            specs
                .iter()
                .map(|(name, port_type, tooltip)| {
                    Port::new(id, *name, *port_type, direction).with_tooltip(*tooltip)
                })
                .collect::<Vec<_>>()
        };

        let properties = shape
            .properties
            .iter()
            .map(|(key, default)| {
                let value = match default {
                    PropertyDefault::Str(s) => Value::from(*s),
                    PropertyDefault::Int(i) => Value::Int(*i),
                };
                (key.to_string(), value)
            })
            .collect();

        Self {
            id,
            kind,
            title: kind.title().to_string(),
            position: [0.0, 0.0],
            inputs: make(PortDirection::Input, shape.inputs),
            outputs: make(PortDirection::Output, shape.outputs),
            properties,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set a property, builder style
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Replace the node ID and, when the count matches, the port IDs
    /// (inputs first). Used when rebuilding a saved graph.
    pub(crate) fn restore_ids(&mut self, id: NodeId, port_ids: &[PortId]) -> bool {
        self.id = id;
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.rebind(id);
        }

        if port_ids.len() != self.inputs.len() + self.outputs.len() {
            return false;
        }
        let ports = self.inputs.iter_mut().chain(self.outputs.iter_mut());
        for (port, port_id) in ports.zip(port_ids) {
            port.id = *port_id;
        }
        true
    }

    /// Type tag of this node's kind
    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    /// Get a property
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == port_id)
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: PortId) -> Option<&mut Port> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == port_id)
    }

    /// Get all ports, inputs first
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// First exec-typed input
    pub fn get_exec_input(&self) -> Option<&Port> {
        self.inputs.iter().find(|p| p.port_type.is_exec())
    }

    /// First exec-typed output
    pub fn get_exec_output(&self) -> Option<&Port> {
        self.outputs.iter().find(|p| p.port_type.is_exec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.type_tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag("teleport"), None);
    }

    #[test]
    fn test_ports_are_owned_by_node() {
        let node = Node::new(NodeKind::Pipe);
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.outputs.len(), 2);
        assert!(node.ports().all(|p| p.node() == node.id));
        assert!(node.inputs.iter().all(Port::is_input));
        assert!(node.outputs.iter().all(|p| !p.is_input()));
    }

    #[test]
    fn test_defaults() {
        let exit = Node::new(NodeKind::Exit);
        assert_eq!(exit.property("code"), Some(&Value::Int(0)));

        let for_node = Node::new(NodeKind::For);
        assert_eq!(for_node.property("variable"), Some(&Value::from("item")));
        assert_eq!(for_node.property("list"), Some(&Value::from("*")));
        assert_eq!(for_node.title, "For Loop");
    }

    #[test]
    fn test_exec_port_lookup() {
        let start = Node::new(NodeKind::Start);
        assert!(start.get_exec_input().is_none());
        assert_eq!(start.get_exec_output().map(|p| p.id), Some(start.outputs[0].id));

        let to_string = Node::new(NodeKind::ToString);
        assert!(to_string.get_exec_input().is_none());
        assert!(to_string.get_exec_output().is_none());

        let branch = Node::new(NodeKind::If);
        assert_eq!(branch.get_exec_output().map(|p| p.name.as_str()), Some("True"));
    }

    #[test]
    fn test_port_lookup_by_id() {
        let mut node = Node::new(NodeKind::Echo);
        let text = node.inputs[1].id;
        assert_eq!(node.port(text).map(|p| p.port_type), Some(PortType::Variable));

        if let Some(port) = node.port_mut(text) {
            port.value = Some(Value::from("hi"));
        }
        assert_eq!(node.inputs[1].value, Some(Value::from("hi")));
        assert!(node.port(PortId::new()).is_none());
    }
}
