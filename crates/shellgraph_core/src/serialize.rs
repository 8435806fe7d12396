// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved graph format.
//!
//! Graphs are stored as JSON lists of nodes and edges. Loading rebuilds each
//! node through the [`NodeRegistry`] and rewires every edge through the same
//! validator gate used for live edits, so malformed or illegal entries are
//! dropped rather than failing the whole load. Property values are decoded
//! one at a time for the same reason.

use crate::edge::EdgeId;
use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::{PortId, Value};
use crate::registry::NodeRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Error while encoding or decoding a saved graph
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Malformed JSON or unexpected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for serialization
pub type Result<T> = std::result::Result<T, SerializeError>;

/// Saved form of a whole graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Graph name
    #[serde(default = "default_name")]
    pub name: String,
    /// Nodes
    pub nodes: Vec<SerializedNode>,
    /// Edges
    #[serde(default)]
    pub edges: Vec<SerializedEdge>,
}

fn default_name() -> String {
    "Untitled".to_string()
}

/// Saved form of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Node ID
    pub id: NodeId,
    /// Type tag
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display title
    pub title: String,
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
    /// Per-instance configuration, kept as raw JSON until the node is rebuilt
    #[serde(default)]
    pub properties: IndexMap<String, serde_json::Value>,
    /// Port IDs, inputs first, so edges can find their ends again
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortId>,
}

/// Saved form of an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedEdge {
    /// Edge ID
    pub id: EdgeId,
    /// Node owning the output port
    pub source_node_id: NodeId,
    /// Output port
    pub source_port_id: PortId,
    /// Node owning the input port
    pub target_node_id: NodeId,
    /// Input port
    pub target_port_id: PortId,
}

impl SerializedGraph {
    /// Capture the current state of `graph`
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| SerializedNode {
                id: node.id,
                node_type: node.type_tag().to_string(),
                title: node.title.clone(),
                x: node.position[0],
                y: node.position[1],
                properties: node
                    .properties
                    .iter()
                    .filter_map(|(key, value)| {
                        serde_json::to_value(value).ok().map(|raw| (key.clone(), raw))
                    })
                    .collect(),
                ports: node.ports().map(|p| p.id).collect(),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| SerializedEdge {
                id: edge.id,
                source_node_id: edge.source.node,
                source_port_id: edge.source.port,
                target_node_id: edge.target.node,
                target_port_id: edge.target.port,
            })
            .collect();

        Self {
            name: graph.name.clone(),
            nodes,
            edges,
        }
    }

    /// Rebuild a live graph, skipping unknown node types, unreadable
    /// properties and illegal edges
    pub fn into_graph(self, registry: &NodeRegistry) -> Graph {
        let mut graph = Graph::new(self.name);
        let mut seen_ports: HashSet<PortId> = HashSet::new();

        for saved in self.nodes {
            if graph.node(saved.id).is_some() {
                tracing::warn!("Skipping node {} with a duplicate id", saved.id);
                continue;
            }
            let Some(mut node) = registry.create_node(&saved.node_type) else {
                tracing::warn!("Skipping node {} of unknown type '{}'", saved.id, saved.node_type);
                continue;
            };

            let listed: HashSet<PortId> = saved.ports.iter().copied().collect();
            let port_ids: &[PortId] =
                if listed.len() == saved.ports.len() && listed.is_disjoint(&seen_ports) {
                    &saved.ports
                } else {
                    tracing::warn!("Node {} reuses port ids; its edges will be dropped", saved.id);
                    &[]
                };
            if !node.restore_ids(saved.id, port_ids) && !port_ids.is_empty() {
                tracing::warn!(
                    "Node {} lists {} ports, expected {}; its edges will be dropped",
                    saved.id,
                    port_ids.len(),
                    node.inputs.len() + node.outputs.len()
                );
            }
            seen_ports.extend(node.ports().map(|p| p.id));

            node.title = saved.title;
            node.position = [saved.x, saved.y];
            for (key, raw) in saved.properties {
                match serde_json::from_value::<Value>(raw) {
                    Ok(value) => {
                        node.properties.insert(key, value);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping property '{key}' of node {}: {e}", saved.id);
                    }
                }
            }
            graph.add_node(node);
        }

        for saved in self.edges {
            if !port_owned_by(&graph, saved.source_port_id, saved.source_node_id)
                || !port_owned_by(&graph, saved.target_port_id, saved.target_node_id)
            {
                tracing::warn!("Skipping edge {} with a dangling port reference", saved.id);
                continue;
            }

            if let Err(reason) = graph.connect(saved.source_port_id, saved.target_port_id) {
                tracing::warn!("Skipping edge {}: {reason}", saved.id);
            }
        }

        graph
    }
}

/// Whether `port` resolves, graph-wide, to a port of `node`
fn port_owned_by(graph: &Graph, port: PortId, node: NodeId) -> bool {
    graph.port(port).is_some_and(|p| p.node() == node)
}

/// Encode `graph` as pretty-printed JSON
pub fn to_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SerializedGraph::from_graph(graph))?)
}

/// Decode a graph from JSON, building nodes through `registry`
pub fn from_json(json: &str, registry: &NodeRegistry) -> Result<Graph> {
    let saved: SerializedGraph = serde_json::from_str(json)?;
    Ok(saved.into_graph(registry))
}
