// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.
//!
//! Each command returns the text it wants on stdout so the binary decides
//! where it goes; logs go through `tracing` to stderr.

use crate::config::{ConfigError, ShellgraphConfig};
use shellgraph_core::serialize::{self, SerializeError};
use shellgraph_core::{BashEmitter, Graph, GraphLayoutEngine, Node, NodeKind, NodeRegistry};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Command failures
#[derive(Debug, Error)]
pub enum CliError {
    /// Could not read or write a graph or script
    #[error("{path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// Config file problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Graph file could not be decoded or encoded
    #[error("{path}: {source}")]
    Graph {
        /// File involved
        path: PathBuf,
        /// Underlying failure
        source: SerializeError,
    },

    /// Refusing to overwrite an existing graph
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

/// Result type for commands
pub type Result<T> = std::result::Result<T, CliError>;

/// Options for `emit`
#[derive(Debug, Default, Clone)]
pub struct EmitOptions {
    /// Overrides the configured indent width
    pub indent: Option<usize>,
    /// Overrides the configured shebang
    pub shebang: Option<String>,
}

/// Options for `layout`
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutOptions {
    /// Overrides the configured column spacing
    pub x_spacing: Option<i64>,
    /// Overrides the configured row spacing
    pub y_spacing: Option<i64>,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path`
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a graph file through the shell registry
pub fn load_graph(path: &Path) -> Result<Graph> {
    let json = read_file(path)?;
    let graph = serialize::from_json(&json, &NodeRegistry::shell()).map_err(|source| {
        CliError::Graph {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(
        "Loaded '{}' from {}: {} nodes, {} edges",
        graph.name,
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Save a graph file
pub fn save_graph(path: &Path, graph: &Graph) -> Result<()> {
    let json = serialize::to_json(graph).map_err(|source| CliError::Graph {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &json)
}

/// Compile a graph file to a script
pub fn run_emit(path: &Path, config: &ShellgraphConfig, options: EmitOptions) -> Result<String> {
    let graph = load_graph(path)?;
    if graph.get_start_node().is_none() {
        tracing::warn!("{} has no start node; the script will be empty", path.display());
    }

    let indent = options.indent.unwrap_or(config.indent_width);
    let body = BashEmitter::new(&graph).with_indent_width(indent).emit();

    let shebang = options.shebang.or_else(|| config.shebang.clone());
    let mut script = String::new();
    if let Some(line) = shebang {
        script.push_str(&line);
        script.push('\n');
    }
    script.push_str(&body);
    if !script.is_empty() {
        script.push('\n');
    }
    Ok(script)
}

/// Compute positions for a graph file.
///
/// With `write` the file is rewritten with the new positions and nothing is
/// returned; otherwise one `node_id x y` line per node.
pub fn run_layout(
    path: &Path,
    config: &ShellgraphConfig,
    options: LayoutOptions,
    write: bool,
) -> Result<String> {
    let mut graph = load_graph(path)?;
    let engine = GraphLayoutEngine::new(
        options.x_spacing.unwrap_or(config.layout.x_spacing),
        options.y_spacing.unwrap_or(config.layout.y_spacing),
    );
    let positions = engine.compute(&graph);

    if write {
        graph.apply_layout(&positions);
        save_graph(path, &graph)?;
        tracing::info!("Laid out {} nodes in {}", positions.len(), path.display());
        return Ok(String::new());
    }

    let mut out = String::new();
    for node_id in graph.node_ids() {
        if let Some((x, y)) = positions.get(&node_id) {
            let _ = writeln!(out, "{node_id} {x} {y}");
        }
    }
    Ok(out)
}

/// Summarize a graph file
pub fn run_validate(path: &Path) -> Result<String> {
    let graph = load_graph(path)?;
    let mut out = String::new();

    let _ = writeln!(out, "graph: {}", graph.name);
    let _ = writeln!(out, "nodes: {}", graph.node_count());
    let _ = writeln!(out, "edges: {}", graph.edge_count());

    match graph.get_start_node() {
        Some(start) => {
            let _ = writeln!(out, "start: {}", start.id);
        }
        None => {
            let _ = writeln!(out, "start: missing");
        }
    }

    let order = graph.get_execution_order();
    let _ = writeln!(out, "execution order ({}):", order.len());
    for (step, node_id) in order.iter().enumerate() {
        let title = graph.node(*node_id).map_or("", |n| n.title.as_str());
        let _ = writeln!(out, "  {}. {title} ({node_id})", step + 1);
    }

    Ok(out)
}

/// Create a graph file holding a single start node
pub fn run_new(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(CliError::AlreadyExists(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map_or_else(|| "Untitled".to_string(), |s| s.to_string_lossy().into_owned());
    let mut graph = Graph::new(name);
    graph.add_node(Node::new(NodeKind::Start).with_position(100.0, 100.0));

    save_graph(path, &graph)?;
    tracing::info!("Created {}", path.display());
    Ok(())
}
