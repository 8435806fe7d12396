// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end scenarios: build a graph the way an editor would, then emit and lay it out.

use shellgraph_core::layout::{self, DEFAULT_X_SPACING, DEFAULT_Y_SPACING};
use shellgraph_core::{is_valid_connection, BashEmitter, Graph, NodeId, NodeRegistry, PortId};

/// Small builder over a graph created from the shell registry
struct Builder {
    graph: Graph,
    registry: NodeRegistry,
}

impl Builder {
    fn new() -> Self {
        Self {
            graph: Graph::default(),
            registry: NodeRegistry::shell(),
        }
    }

    fn node(&mut self, tag: &str, properties: &[(&str, &str)]) -> NodeId {
        let mut node = self.registry.create_node(tag).expect("known tag");
        for (key, value) in properties {
            node.set_property(*key, *value);
        }
        self.graph.add_node(node)
    }

    fn output(&self, node: NodeId, index: usize) -> PortId {
        self.graph.node(node).unwrap().outputs[index].id
    }

    fn input(&self, node: NodeId, index: usize) -> PortId {
        self.graph.node(node).unwrap().inputs[index].id
    }

    fn wire(&mut self, from: NodeId, out: usize, to: NodeId, inp: usize) {
        let (a, b) = (self.output(from, out), self.input(to, inp));
        assert!(self.graph.add_edge(a, b).is_some(), "edge should be legal");
    }

    fn emit(&self) -> String {
        BashEmitter::new(&self.graph).emit()
    }
}

#[test]
fn test_linear_command_chain() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let cmd = b.node("run_command", &[("command", "ls -la")]);
    let exit = b.node("exit", &[]);
    b.wire(start, 0, cmd, 0);
    b.wire(cmd, 0, exit, 0);

    assert_eq!(b.emit(), "ls -la\nexit 0");
}

#[test]
fn test_if_without_else() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let branch = b.node("if", &[("condition", "-f file.txt")]);
    let echo = b.node("echo", &[("text", "hi")]);
    b.wire(start, 0, branch, 0);
    b.wire(branch, 0, echo, 0);

    assert_eq!(b.emit(), "if [ -f file.txt ]; then\n    echo \"hi\"\nfi");
}

#[test]
fn test_if_with_else() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let branch = b.node("if", &[("condition", "-d build")]);
    let yes = b.node("echo", &[("text", "built")]);
    let no = b.node("exit", &[]);
    b.wire(start, 0, branch, 0);
    b.wire(branch, 0, yes, 0);
    b.wire(branch, 1, no, 0);
    b.graph
        .node_mut(no)
        .unwrap()
        .set_property("code", 2_i64);

    assert_eq!(
        b.emit(),
        "if [ -d build ]; then\n    echo \"built\"\nelse\n    exit 2\nfi"
    );
}

#[test]
fn test_for_loop_body() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let each = b.node("for", &[("variable", "i"), ("list", "1 2 3")]);
    let sleep = b.node("sleep", &[]);
    b.graph
        .node_mut(sleep)
        .unwrap()
        .set_property("duration", 2_i64);
    b.wire(start, 0, each, 0);
    b.wire(each, 0, sleep, 0);

    assert_eq!(b.emit(), "for i in 1 2 3; do\n    sleep 2\ndone");
}

#[test]
fn test_loop_item_feeds_body() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let each = b.node("for", &[("variable", "f"), ("list", "*.log")]);
    let echo = b.node("echo", &[]);
    b.wire(start, 0, each, 0);
    b.wire(each, 0, echo, 0);
    b.wire(each, 1, echo, 1);

    assert_eq!(b.emit(), "for f in *.log; do\n    echo \"${f}\"\ndone");
}

#[test]
fn test_nested_control_flow() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let each = b.node("for", &[("variable", "x"), ("list", "a b")]);
    let branch = b.node("if", &[("condition", "-n \"$x\"")]);
    let echo = b.node("echo", &[("text", "ok")]);
    b.wire(start, 0, each, 0);
    b.wire(each, 0, branch, 0);
    b.wire(branch, 0, echo, 0);

    assert_eq!(
        b.emit(),
        "for x in a b; do\n    if [ -n \"$x\" ]; then\n        echo \"ok\"\n    fi\ndone"
    );
}

#[test]
fn test_variables_and_file_test() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let set = b.node("set_variable", &[("name", "TARGET"), ("value", "out.txt")]);
    let test = b.node("file_exists", &[("path", "out.txt")]);
    let branch = b.node("if", &[]);
    let read = b.node("get_variable", &[("name", "TARGET")]);
    let echo = b.node("echo", &[]);
    b.wire(start, 0, set, 0);
    b.wire(set, 0, branch, 0);
    b.wire(test, 0, branch, 1);
    b.wire(branch, 0, echo, 0);
    b.wire(read, 0, echo, 1);

    assert_eq!(
        b.emit(),
        "TARGET=\"out.txt\"\nif [ -f out.txt ]; then\n    echo \"${TARGET}\"\nfi"
    );
}

#[test]
fn test_pipe_from_command_values() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let pipe = b.node("pipe", &[("command_1", "ps aux"), ("command_2", "wc -l")]);
    b.wire(start, 0, pipe, 0);

    assert_eq!(b.emit(), "ps aux | wc -l");
}

// Open question: a loop or branch body only renders the node directly
// attached to it. Statements chained after that node are not emitted.
#[test]
fn test_multi_statement_body_renders_first_statement_only() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let each = b.node("for", &[("variable", "i"), ("list", "1 2")]);
    let first = b.node("echo", &[("text", "first")]);
    let second = b.node("echo", &[("text", "second")]);
    b.wire(start, 0, each, 0);
    b.wire(each, 0, first, 0);
    b.wire(first, 0, second, 0);

    assert_eq!(b.emit(), "for i in 1 2; do\n    echo \"first\"\ndone");
}

#[test]
fn test_no_start_node_emits_empty_script() {
    let mut b = Builder::new();
    let echo = b.node("echo", &[]);
    let exit = b.node("exit", &[]);
    b.wire(echo, 0, exit, 0);

    assert!(b.graph.get_execution_order().is_empty());
    assert_eq!(b.emit(), "");
}

#[test]
fn test_validator_properties() {
    let mut b = Builder::new();
    let first = b.node("run_command", &[]);
    let second = b.node("run_command", &[]);
    let third = b.node("run_command", &[]);
    b.wire(first, 0, second, 0);

    let g = &b.graph;
    // Reverse of an existing edge closes a cycle
    assert!(!is_valid_connection(g, g.edges(), b.output(second, 0), b.input(first, 0)));
    assert!(!is_valid_connection(g, g.edges(), b.output(second, 1), b.input(first, 1)));
    // Input already fed
    assert!(!is_valid_connection(g, g.edges(), b.output(third, 0), b.input(second, 0)));
    // Exec output already used
    assert!(!is_valid_connection(g, g.edges(), b.output(first, 0), b.input(third, 0)));
    // Data output may fan out
    assert!(is_valid_connection(g, g.edges(), b.output(first, 1), b.input(third, 1)));
}

#[test]
fn test_layout_scenarios() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let echo = b.node("echo", &[]);
    b.wire(start, 0, echo, 0);

    let first = layout::compute(&b.graph, DEFAULT_X_SPACING, DEFAULT_Y_SPACING);
    let second = layout::compute(&b.graph, DEFAULT_X_SPACING, DEFAULT_Y_SPACING);
    assert_eq!(first, second);
    assert_eq!(first[&echo].0 - first[&start].0, DEFAULT_X_SPACING);
    assert_eq!(first[&echo].1, first[&start].1);

    b.graph.apply_layout(&first);
    let placed = b.graph.node(echo).unwrap().position;
    assert_eq!(placed, [first[&echo].0 as f32, first[&echo].1 as f32]);
}

#[test]
fn test_layout_larger_graph_is_collision_free() {
    let mut b = Builder::new();
    let start = b.node("start", &[]);
    let branch = b.node("if", &[]);
    let test = b.node("file_exists", &[]);
    let yes = b.node("echo", &[]);
    let no = b.node("exit", &[]);
    let read = b.node("get_variable", &[]);
    b.node("sleep", &[]);
    b.wire(start, 0, branch, 0);
    b.wire(test, 0, branch, 1);
    b.wire(branch, 0, yes, 0);
    b.wire(branch, 1, no, 0);
    b.wire(read, 0, yes, 1);

    let positions = layout::compute(&b.graph, 200, 100);
    assert_eq!(positions.len(), 7);
    let mut seen = std::collections::HashSet::new();
    for pos in positions.values() {
        assert!(seen.insert(*pos), "two nodes share {pos:?}");
    }
    assert!(positions[&yes].0 > positions[&branch].0);
    assert!(positions[&branch].0 > positions[&start].0);
}
