// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::edge::EdgeId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Kind of value (or control flow) that travels through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// Execution flow, not a value
    Exec,
    /// String value
    String,
    /// Integer value
    Int,
    /// Boolean value
    Bool,
    /// Test expression usable inside `[ ... ]`
    Condition,
    /// Filesystem path
    Path,
    /// Shell variable reference
    Variable,
}

/// Renderer hint for drawing a port and the wires leaving it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortStyle {
    /// RGB color
    pub color: [u8; 3],
    /// Diameter of the port handle
    pub size: u32,
    /// Wire thickness
    pub thickness: f32,
}

impl PortStyle {
    const fn data(color: [u8; 3]) -> Self {
        Self { color, size: 10, thickness: 3.0 }
    }
}

impl PortType {
    /// All port types, in declaration order
    pub const ALL: [PortType; 7] = [
        Self::Exec,
        Self::String,
        Self::Int,
        Self::Bool,
        Self::Condition,
        Self::Path,
        Self::Variable,
    ];

    /// Get the display style for this port type (for UI)
    pub fn style(&self) -> PortStyle {
        match self {
            Self::Exec => PortStyle { color: [255, 255, 255], size: 12, thickness: 4.5 },
            Self::String => PortStyle::data([0xFF, 0x6B, 0x9D]),
            Self::Int => PortStyle::data([0x4E, 0xCD, 0xC4]),
            Self::Bool => PortStyle::data([0x95, 0xE1, 0xD3]),
            Self::Condition => PortStyle::data([0xF7, 0xD0, 0x46]),
            Self::Path => PortStyle::data([0xF3, 0x81, 0x81]),
            Self::Variable => PortStyle::data([0xFF, 0xA0, 0x7A]),
        }
    }

    /// Get the color for this port type (for UI)
    pub fn color(&self) -> [u8; 3] {
        self.style().color
    }

    /// Weight of an edge leaving a port of this type, used by the layout engine.
    ///
    /// Control flow dominates, conditions come next, plain data trails behind.
    pub fn layout_priority(&self) -> i64 {
        match self {
            Self::Exec => 100,
            Self::Condition => 80,
            Self::String | Self::Int => 45,
            Self::Bool | Self::Path | Self::Variable => 30,
        }
    }

    /// Whether this is the control-flow type
    pub fn is_exec(&self) -> bool {
        matches!(self, Self::Exec)
    }
}

/// Scalar stored in a node property or a port literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point, e.g. a fractional `sleep` duration
    Float(f64),
    /// String
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A port on a node
#[derive(Debug, Clone)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Data type
    pub port_type: PortType,
    direction: PortDirection,
    node: NodeId,
    /// Literal value used when nothing is connected
    pub value: Option<Value>,
    /// Incident edges, in the order they were attached
    pub(crate) connected_edges: Vec<EdgeId>,
    /// Hover text
    pub tooltip: String,
}

impl Port {
    /// Create a new port owned by `node`
    pub fn new(
        node: NodeId,
        name: impl Into<String>,
        port_type: PortType,
        direction: PortDirection,
    ) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            port_type,
            direction,
            node,
            value: None,
            connected_edges: Vec::new(),
            tooltip: String::new(),
        }
    }

    /// Set the tooltip
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Port direction, fixed at creation
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Owning node, fixed at creation
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn rebind(&mut self, node: NodeId) {
        self.node = node;
    }

    /// Incident edges
    pub fn connected_edges(&self) -> &[EdgeId] {
        &self.connected_edges
    }

    /// Whether at least one edge is attached
    pub fn is_connected(&self) -> bool {
        !self.connected_edges.is_empty()
    }

    /// Whether this is an input port
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    /// Check if a connection to another port is type- and direction-compatible
    pub fn can_connect_to(&self, other: &Port) -> bool {
        if self.direction == other.direction {
            return false;
        }

        if self.port_type.is_exec() && other.port_type.is_exec() {
            return true;
        }

        self.port_type == other.port_type
    }
}
