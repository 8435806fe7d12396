// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed node graph that compiles to POSIX shell scripts.
//!
//! This crate is the engine behind a visual shell script editor:
//! - Typed input/output ports with exec (control flow) and data kinds
//! - Connection validation that keeps the graph acyclic
//! - Shell code generation along the exec chain
//! - Deterministic automatic layout
//! - A JSON save format
//!
//! ## Architecture
//!
//! A [`Graph`] owns [`Node`]s and [`Edge`]s. Every edge passes through the
//! [`validator`] before it is attached. [`BashEmitter`] walks the exec chain
//! from the start node and asks each node to emit itself via [`EmitBash`].
//! The [`layout`] engine reads a graph and returns positions without
//! touching it.
//!
//! ```
//! use shellgraph_core::{BashEmitter, Graph, Node, NodeKind};
//!
//! let mut graph = Graph::default();
//! let start = Node::new(NodeKind::Start);
//! let echo = Node::new(NodeKind::Echo).with_property("text", "hi");
//! let (out, inp) = (start.outputs[0].id, echo.inputs[0].id);
//! graph.add_node(start);
//! graph.add_node(echo);
//! graph.add_edge(out, inp);
//!
//! assert_eq!(BashEmitter::new(&graph).emit(), "echo \"hi\"");
//! ```

pub mod edge;
pub mod emit;
pub mod graph;
pub mod layout;
pub mod node;
pub mod port;
pub mod registry;
pub mod serialize;
pub mod validator;

pub use edge::{Edge, EdgeId, PortRef};
pub use emit::{BashEmitter, EmitBash, EmitContext};
pub use graph::Graph;
pub use layout::GraphLayoutEngine;
pub use node::{Node, NodeId, NodeKind};
pub use port::{Port, PortDirection, PortId, PortStyle, PortType, Value};
pub use registry::{NodeCategory, NodeDescriptor, NodeRegistry};
pub use validator::{is_valid_connection, ConnectionError};
