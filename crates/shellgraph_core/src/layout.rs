// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic automatic layout.
//!
//! Nodes are placed in columns by a longest-path pass over the edges, stacked
//! within each column by incoming edge weight, then reordered with a
//! barycenter sweep to reduce crossings. Data edges pull their targets
//! toward their sources before a final collision pass guarantees distinct
//! rows. The result is centered on the origin.
//!
//! The engine works on its own copy of the topology; the graph is only read.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::PortType;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Default horizontal distance between columns
pub const DEFAULT_X_SPACING: i64 = 260;
/// Default vertical distance between rows
pub const DEFAULT_Y_SPACING: i64 = 140;
/// Largest accepted spacing on either axis
pub const MAX_SPACING: i64 = 1_000_000;

const DATA_PROXIMITY_PULL: f64 = 0.25;
const MAX_COLLISION_ITER: usize = 2000;
const RELAX_PASSES: usize = 6;
const CROSSING_PASSES: usize = 4;
const PROXIMITY_ITERATIONS: usize = 4;

/// Node positions keyed by node ID
pub type Positions = BTreeMap<NodeId, (i64, i64)>;

/// Lay out `graph` with the given spacing
pub fn compute(graph: &Graph, x_spacing: i64, y_spacing: i64) -> Positions {
    GraphLayoutEngine::new(x_spacing, y_spacing).compute(graph)
}

#[derive(Debug, Clone, Copy)]
struct LayoutEdge {
    src: usize,
    tgt: usize,
    port_type: PortType,
    weight: i64,
}

impl LayoutEdge {
    /// Columns the target must sit to the right of the source
    fn step(&self) -> i64 {
        if self.port_type.is_exec() {
            1
        } else {
            (self.weight / 40).max(1)
        }
    }
}

#[derive(Debug, Clone)]
struct LayoutNode {
    id: NodeId,
    in_edges: Vec<usize>,
    x: i64,
    y: i64,
}

/// Layout engine with fixed spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLayoutEngine {
    x_spacing: i64,
    y_spacing: i64,
}

impl GraphLayoutEngine {
    /// Create an engine. Spacings are clamped to `1..=MAX_SPACING`.
    pub fn new(x_spacing: i64, y_spacing: i64) -> Self {
        Self {
            x_spacing: x_spacing.clamp(1, MAX_SPACING),
            y_spacing: y_spacing.clamp(1, MAX_SPACING),
        }
    }

    /// Compute a position for every node in `graph`
    pub fn compute(&self, graph: &Graph) -> Positions {
        let mut work = Workspace::build(graph, self.x_spacing, self.y_spacing);
        work.compute_x();
        work.compute_y();
        work.minimize_crossings();
        work.refine_data_proximity();
        work.resolve_collisions();
        work.center();

        tracing::debug!(
            "Laid out {} nodes and {} edges",
            work.nodes.len(),
            work.edges.len()
        );

        work.nodes.iter().map(|n| (n.id, (n.x, n.y))).collect()
    }
}

impl Default for GraphLayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_X_SPACING, DEFAULT_Y_SPACING)
    }
}

struct Workspace {
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
    x_spacing: i64,
    y_spacing: i64,
}

impl Workspace {
    fn build(graph: &Graph, x_spacing: i64, y_spacing: i64) -> Self {
        let mut nodes: Vec<LayoutNode> = graph
            .nodes()
            .map(|n| LayoutNode {
                id: n.id,
                in_edges: Vec::new(),
                x: 0,
                y: 0,
            })
            .collect();
        let index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut edges = Vec::new();
        for edge in graph.edges() {
            let (Some(&src), Some(&tgt)) = (index.get(&edge.source.node), index.get(&edge.target.node))
            else {
                continue;
            };
            let Some(port) = graph
                .node(edge.source.node)
                .and_then(|n| n.port(edge.source.port))
            else {
                continue;
            };
            nodes[tgt].in_edges.push(edges.len());
            edges.push(LayoutEdge {
                src,
                tgt,
                port_type: port.port_type,
                weight: port.port_type.layout_priority(),
            });
        }

        Self {
            nodes,
            edges,
            x_spacing,
            y_spacing,
        }
    }

    fn max_in_weight(&self, node: usize) -> i64 {
        self.nodes[node]
            .in_edges
            .iter()
            .map(|&e| self.edges[e].weight)
            .max()
            .unwrap_or(0)
    }

    /// Node indices grouped by x, each column in node order
    fn columns(&self) -> BTreeMap<i64, Vec<usize>> {
        let mut cols: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            cols.entry(node.x).or_default().push(i);
        }
        cols
    }

    fn stack(&mut self, column: &[usize]) {
        for (row, &n) in column.iter().enumerate() {
            self.nodes[n].y = row as i64 * self.y_spacing;
        }
    }

    fn compute_x(&mut self) {
        let mut indegree = vec![0i64; self.nodes.len()];
        let mut out_map: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (i, e) in self.edges.iter().enumerate() {
            indegree[e.tgt] += 1;
            out_map[e.src].push(i);
        }

        let mut queue: VecDeque<usize> = (0..self.nodes.len()).filter(|&n| indegree[n] == 0).collect();
        if queue.is_empty() {
            // Every node sits on a cycle; seed with all of them
            queue = (0..self.nodes.len()).collect();
        }

        while let Some(n) = queue.pop_front() {
            for &e in &out_map[n] {
                let edge = self.edges[e];
                let px = self.nodes[n].x + edge.step() * self.x_spacing;
                if px > self.nodes[edge.tgt].x {
                    self.nodes[edge.tgt].x = px;
                }
                indegree[edge.tgt] -= 1;
                if indegree[edge.tgt] == 0 {
                    queue.push_back(edge.tgt);
                }
            }
        }

        self.relax_x_constraints();
        self.snap_x_to_columns();
    }

    fn relax_x_constraints(&mut self) {
        for _ in 0..RELAX_PASSES {
            let mut changed = false;
            for e in 0..self.edges.len() {
                let edge = self.edges[e];
                let px = self.nodes[edge.src].x + edge.step() * self.x_spacing;
                if px > self.nodes[edge.tgt].x {
                    self.nodes[edge.tgt].x = px;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn snap_x_to_columns(&mut self) {
        let s = self.x_spacing;
        for node in &mut self.nodes {
            node.x = round_div(node.x, s) * s;
        }
        let xs: Vec<i64> = self
            .nodes
            .iter()
            .map(|n| n.x)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let remap: HashMap<i64, i64> = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| (x, i as i64 * s))
            .collect();
        for node in &mut self.nodes {
            node.x = remap[&node.x];
        }
    }

    fn compute_y(&mut self) {
        for (_, mut col) in self.columns() {
            col.sort_by_key(|&n| (-self.max_in_weight(n), self.nodes[n].id));
            self.stack(&col);
        }
    }

    fn minimize_crossings(&mut self) {
        let mut cols: Vec<(i64, Vec<usize>)> = self.columns().into_iter().collect();
        for (_, col) in &mut cols {
            col.sort_by_key(|&n| (self.nodes[n].y, self.nodes[n].id));
        }

        for _ in 0..CROSSING_PASSES {
            for i in 1..cols.len() {
                let left_x = cols[i - 1].0;
                let index: HashMap<usize, usize> = cols[i - 1]
                    .1
                    .iter()
                    .enumerate()
                    .map(|(row, &n)| (n, row))
                    .collect();

                let mut keyed: Vec<(f64, usize)> = cols[i]
                    .1
                    .iter()
                    .map(|&n| (self.barycenter(n, left_x, &index), n))
                    .collect();
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

                let reordered: Vec<usize> = keyed.into_iter().map(|(_, n)| n).collect();
                self.stack(&reordered);
                cols[i].1 = reordered;
            }
        }
    }

    /// Mean row of the predecessors sitting in the column at `left_x`
    fn barycenter(&self, node: usize, left_x: i64, index: &HashMap<usize, usize>) -> f64 {
        let rows: Vec<usize> = self.nodes[node]
            .in_edges
            .iter()
            .map(|&e| self.edges[e].src)
            .filter(|&src| self.nodes[src].x == left_x)
            .map(|src| index.get(&src).copied().unwrap_or(0))
            .collect();
        if rows.is_empty() {
            f64::INFINITY
        } else {
            rows.iter().sum::<usize>() as f64 / rows.len() as f64
        }
    }

    fn refine_data_proximity(&mut self) {
        for _ in 0..PROXIMITY_ITERATIONS {
            for e in 0..self.edges.len() {
                let edge = self.edges[e];
                if edge.port_type.is_exec() {
                    continue;
                }
                let delta = self.nodes[edge.src].y - self.nodes[edge.tgt].y;
                self.nodes[edge.tgt].y += (delta as f64 * DATA_PROXIMITY_PULL) as i64;
            }
        }
        self.restack_columns();
    }

    fn restack_columns(&mut self) {
        for (_, mut col) in self.columns() {
            col.sort_by_key(|&n| (self.nodes[n].y, -self.max_in_weight(n), self.nodes[n].id));
            self.stack(&col);
        }
    }

    fn resolve_collisions(&mut self) {
        let ys = self.y_spacing;
        for (_, mut col) in self.columns() {
            col.sort_by_key(|&n| (self.nodes[n].y, self.nodes[n].id));
            let mut used = HashSet::new();
            let mut iterations = 0;
            for n in col {
                let mut y = round_div(self.nodes[n].y, ys) * ys;
                while used.contains(&y) {
                    y += ys / 2;
                    iterations += 1;
                    if iterations > MAX_COLLISION_ITER {
                        break;
                    }
                }
                used.insert(y);
                self.nodes[n].y = y;
            }
        }

        let min_y = self.nodes.iter().map(|n| n.y).min().unwrap_or(0);
        if min_y < 0 {
            for node in &mut self.nodes {
                node.y -= min_y;
            }
        }
    }

    fn center(&mut self) {
        let (Some(min_x), Some(max_x)) = (
            self.nodes.iter().map(|n| n.x).min(),
            self.nodes.iter().map(|n| n.x).max(),
        ) else {
            return;
        };
        let min_y = self.nodes.iter().map(|n| n.y).min().unwrap_or(0);
        let max_y = self.nodes.iter().map(|n| n.y).max().unwrap_or(0);

        let cx = (min_x + max_x).div_euclid(2);
        let cy = (min_y + max_y).div_euclid(2);
        for node in &mut self.nodes {
            node.x -= cx;
            node.y -= cy;
        }
    }
}

/// `value / divisor` rounded to the nearest integer, ties to even
fn round_div(value: i64, divisor: i64) -> i64 {
    (value as f64 / divisor as f64).round_ties_even() as i64
}
