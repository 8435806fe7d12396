// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.

use crate::edge::{Edge, EdgeId, PortRef};
use crate::node::{Node, NodeId, NodeKind};
use crate::port::{Port, PortId};
use crate::validator::{self, ConnectionError};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

/// A node graph
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Edges between ports
    edges: IndexMap<EdgeId, Edge>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.involves_node(node_id))
            .map(|e| e.id)
            .collect();
        for edge_id in incident {
            self.remove_edge(edge_id);
        }
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find a port anywhere in the graph
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.nodes.values().find_map(|n| n.port(port_id))
    }

    fn port_mut(&mut self, port: PortRef) -> Option<&mut Port> {
        self.nodes.get_mut(&port.node)?.port_mut(port.port)
    }

    /// Add an edge between two ports if the validator allows it.
    ///
    /// The ports may be given in either order. Illegal or dangling requests
    /// are declined with `None`.
    pub fn add_edge(&mut self, a: PortId, b: PortId) -> Option<EdgeId> {
        self.connect(a, b).ok()
    }

    /// Add an edge between two ports, reporting why it was refused
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<EdgeId, ConnectionError> {
        let (source, target) = validator::check_connection(self, self.edges.values(), a, b)
            .inspect_err(|reason| tracing::debug!("Rejected connection {a} -> {b}: {reason}"))?;

        let edge = Edge::new(source, target);
        let id = edge.id;
        for end in [source, target] {
            if let Some(port) = self.port_mut(end) {
                port.connected_edges.push(id);
            }
        }
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Remove an edge and detach it from both ports
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(&edge_id)?;
        for end in [edge.source, edge.target] {
            if let Some(port) = self.port_mut(end) {
                port.connected_edges.retain(|id| *id != edge_id);
            }
        }
        Some(edge)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// First edge attached to a port; the only one for inputs and exec outputs
    pub fn first_edge(&self, port: &Port) -> Option<&Edge> {
        port.connected_edges().first().and_then(|id| self.edges.get(id))
    }

    /// Node on the far side of the first edge attached to `port`
    pub fn peer_node(&self, port: &Port) -> Option<&Node> {
        let edge = self.first_edge(port)?;
        let far = if edge.source.port == port.id {
            edge.target.node
        } else {
            edge.source.node
        };
        self.nodes.get(&far)
    }

    /// The node tagged `start`, if any
    pub fn get_start_node(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.kind == NodeKind::Start)
    }

    /// Node reached through the first connected exec output of `node`
    pub fn next_exec_node(&self, node: &Node) -> Option<&Node> {
        node.outputs
            .iter()
            .filter(|p| p.port_type.is_exec())
            .find(|p| p.is_connected())
            .and_then(|p| self.peer_node(p))
    }

    /// Nodes reachable from the start node along exec edges, depth first.
    ///
    /// Each node is visited once. Where two branches reconverge the shared
    /// node is listed under whichever branch reaches it first.
    pub fn get_execution_order(&self) -> Vec<NodeId> {
        let Some(start) = self.get_start_node() else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![start.id];

        while let Some(node_id) = stack.pop() {
            if !visited.insert(node_id) {
                continue;
            }
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            ordered.push(node_id);

            let successors: Vec<NodeId> = node
                .outputs
                .iter()
                .filter(|p| p.port_type.is_exec())
                .flat_map(|p| p.connected_edges())
                .filter_map(|id| self.edges.get(id))
                .map(|e| e.target.node)
                .collect();
            stack.extend(successors.into_iter().rev());
        }

        ordered
    }

    /// Write computed layout positions back onto the nodes
    pub fn apply_layout(&mut self, positions: &BTreeMap<NodeId, (i64, i64)>) {
        for (id, (x, y)) in positions {
            if let Some(node) = self.nodes.get_mut(id) {
                node.position = [*x as f32, *y as f32];
            }
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut Graph, kinds: &[NodeKind]) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for kind in kinds {
            let node = Node::new(*kind);
            let id = graph.add_node(node);
            if let Some(prev) = ids.last().copied() {
                link(graph, prev, id);
            }
            ids.push(id);
        }
        ids
    }

    fn link(graph: &mut Graph, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let out = graph.node(from)?.get_exec_output()?.id;
        let inp = graph.node(to)?.get_exec_input()?.id;
        graph.add_edge(out, inp)
    }

    #[test]
    fn test_add_edge_registers_on_both_ports() {
        let mut graph = Graph::default();
        let ids = chain(&mut graph, &[NodeKind::Start, NodeKind::Echo]);
        assert_eq!(graph.edge_count(), 1);

        let start = graph.node(ids[0]).unwrap();
        let echo = graph.node(ids[1]).unwrap();
        let edge_id = graph.edges().next().unwrap().id;
        assert_eq!(start.outputs[0].connected_edges(), &[edge_id]);
        assert_eq!(echo.inputs[0].connected_edges(), &[edge_id]);
    }

    #[test]
    fn test_remove_edge_detaches() {
        let mut graph = Graph::default();
        let ids = chain(&mut graph, &[NodeKind::Start, NodeKind::Echo]);
        let edge_id = graph.edges().next().unwrap().id;

        assert!(graph.remove_edge(edge_id).is_some());
        assert!(graph.remove_edge(edge_id).is_none());
        assert!(!graph.node(ids[0]).unwrap().outputs[0].is_connected());
        assert!(!graph.node(ids[1]).unwrap().inputs[0].is_connected());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut graph = Graph::default();
        let ids = chain(&mut graph, &[NodeKind::Start, NodeKind::Echo, NodeKind::Exit]);
        assert_eq!(graph.edge_count(), 2);

        graph.remove_node(ids[1]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.node(ids[0]).unwrap().outputs[0].is_connected());
        assert!(!graph.node(ids[2]).unwrap().inputs[0].is_connected());
    }

    #[test]
    fn test_add_edge_declines_unknown_ports() {
        let mut graph = Graph::default();
        let ids = chain(&mut graph, &[NodeKind::Start]);
        let out = graph.node(ids[0]).unwrap().outputs[0].id;
        assert!(graph.add_edge(out, PortId::new()).is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_exec_output_fans_out_once() {
        let mut graph = Graph::default();
        let start = graph.add_node(Node::new(NodeKind::Start));
        let a = graph.add_node(Node::new(NodeKind::Echo));
        let b = graph.add_node(Node::new(NodeKind::Echo));

        assert!(link(&mut graph, start, a).is_some());
        assert!(link(&mut graph, start, b).is_none());
    }

    #[test]
    fn test_branch_outputs_fan_out_independently() {
        let mut graph = Graph::default();
        let branch = Node::new(NodeKind::If);
        let (on_true, on_false) = (branch.outputs[0].id, branch.outputs[1].id);
        graph.add_node(branch);
        let a = Node::new(NodeKind::Echo);
        let b = Node::new(NodeKind::Echo);
        let (a_in, b_in) = (a.inputs[0].id, b.inputs[0].id);
        graph.add_node(a);
        graph.add_node(b);

        assert!(graph.add_edge(on_true, a_in).is_some());
        assert!(graph.add_edge(on_false, b_in).is_some());
        assert_eq!(
            graph.connect(on_true, b_in),
            Err(ConnectionError::InputAlreadyConnected(b_in))
        );
    }

    #[test]
    fn test_data_output_fans_out_freely() {
        let mut graph = Graph::default();
        let var = Node::new(NodeKind::GetVariable);
        let out = var.outputs[0].id;
        graph.add_node(var);

        for _ in 0..3 {
            let echo = Node::new(NodeKind::Echo);
            let text = echo.inputs[1].id;
            graph.add_node(echo);
            assert!(graph.add_edge(out, text).is_some());
        }
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_execution_order_follows_exec_edges() {
        let mut graph = Graph::default();
        let ids = chain(&mut graph, &[NodeKind::Start, NodeKind::RunCommand, NodeKind::Exit]);
        assert_eq!(graph.get_execution_order(), ids);
    }

    #[test]
    fn test_execution_order_without_start_is_empty() {
        let mut graph = Graph::default();
        chain(&mut graph, &[NodeKind::Echo, NodeKind::Exit]);
        assert!(graph.get_execution_order().is_empty());
    }

    #[test]
    fn test_execution_order_reconvergence_visits_once() {
        let mut graph = Graph::default();
        let start = graph.add_node(Node::new(NodeKind::Start));
        let branch = Node::new(NodeKind::If);
        let (on_true, on_false, branch_in) =
            (branch.outputs[0].id, branch.outputs[1].id, branch.inputs[0].id);
        let branch_id = graph.add_node(branch);
        let left = graph.add_node(Node::new(NodeKind::Echo));
        let right = graph.add_node(Node::new(NodeKind::Sleep));
        let join = graph.add_node(Node::new(NodeKind::Exit));

        let start_out = graph.node(start).unwrap().outputs[0].id;
        graph.add_edge(start_out, branch_in);
        let left_in = graph.node(left).unwrap().inputs[0].id;
        let right_in = graph.node(right).unwrap().inputs[0].id;
        graph.add_edge(on_true, left_in);
        graph.add_edge(on_false, right_in);
        link(&mut graph, left, join);
        // The join's single input is taken, so the right branch cannot reach it
        assert!(link(&mut graph, right, join).is_none());

        assert_eq!(
            graph.get_execution_order(),
            vec![start, branch_id, left, join, right]
        );
    }

    #[test]
    fn test_apply_layout_writes_positions() {
        let mut graph = Graph::default();
        let id = graph.add_node(Node::new(NodeKind::Start));
        let mut positions = BTreeMap::new();
        positions.insert(id, (-130, 40));
        graph.apply_layout(&positions);
        assert_eq!(graph.node(id).unwrap().position, [-130.0, 40.0]);
    }
}
