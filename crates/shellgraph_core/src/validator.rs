// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection legality checks.
//!
//! Every edge enters the graph through [`check_connection`]. Besides the
//! port-level compatibility rules it keeps the graph acyclic and enforces
//! single fan-in on inputs and single fan-out on exec outputs.

use crate::edge::{Edge, PortRef};
use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::PortId;
use std::collections::HashSet;

/// Reason a prospective edge was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(PortId),

    /// Both ends are the same port
    #[error("Cannot connect a port to itself")]
    SamePort,

    /// Both ends are on the same node
    #[error("Cannot connect a node to itself")]
    SameNode,

    /// Both ends are inputs or both are outputs
    #[error("Ports have the same direction")]
    SameDirection,

    /// Port types differ
    #[error("Incompatible port types")]
    IncompatiblePorts,

    /// The edge would close a directed cycle
    #[error("Connection would create a cycle")]
    WouldCreateCycle,

    /// The input already has an edge
    #[error("Input port already connected: {0}")]
    InputAlreadyConnected(PortId),

    /// The exec output already has an edge
    #[error("Exec output already connected: {0}")]
    ExecOutputAlreadyConnected(PortId),
}

/// Decide whether `a` and `b` may be joined, given the edges already present.
///
/// The ports may be passed in either order. On success the pair is returned
/// normalized as `(source, target)`, source being the output side.
pub fn check_connection<'a, I>(
    graph: &Graph,
    existing_edges: I,
    a: PortId,
    b: PortId,
) -> Result<(PortRef, PortRef), ConnectionError>
where
    I: IntoIterator<Item = &'a Edge>,
{
    if a == b {
        return Err(ConnectionError::SamePort);
    }

    let port_a = graph.port(a).ok_or(ConnectionError::PortNotFound(a))?;
    let port_b = graph.port(b).ok_or(ConnectionError::PortNotFound(b))?;

    if port_a.node() == port_b.node() {
        return Err(ConnectionError::SameNode);
    }

    if port_a.direction() == port_b.direction() {
        return Err(ConnectionError::SameDirection);
    }

    if port_a.port_type != port_b.port_type {
        return Err(ConnectionError::IncompatiblePorts);
    }

    let (src, dst) = if port_a.is_input() {
        (port_b, port_a)
    } else {
        (port_a, port_b)
    };

    let edges: Vec<&Edge> = existing_edges.into_iter().collect();

    if can_reach(&edges, dst.node(), src.node()) {
        return Err(ConnectionError::WouldCreateCycle);
    }

    if edges.iter().any(|e| e.target.port == dst.id) {
        return Err(ConnectionError::InputAlreadyConnected(dst.id));
    }

    if src.port_type.is_exec() && edges.iter().any(|e| e.source.port == src.id) {
        return Err(ConnectionError::ExecOutputAlreadyConnected(src.id));
    }

    Ok((
        PortRef::new(src.node(), src.id),
        PortRef::new(dst.node(), dst.id),
    ))
}

/// Boolean form of [`check_connection`]
pub fn is_valid_connection<'a, I>(graph: &Graph, existing_edges: I, a: PortId, b: PortId) -> bool
where
    I: IntoIterator<Item = &'a Edge>,
{
    check_connection(graph, existing_edges, a, b).is_ok()
}

/// Whether `to` is reachable from `from` following `edges` forward
pub fn can_reach(edges: &[&Edge], from: NodeId, to: NodeId) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![from];

    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        stack.extend(
            edges
                .iter()
                .filter(|e| e.source.node == node)
                .map(|e| e.target.node),
        );
    }

    false
}
