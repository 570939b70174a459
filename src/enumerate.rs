use std::collections::{HashSet, VecDeque};

use crate::automaton::Automaton;
use crate::node_id::NodeId;

/// The role a node plays in the automaton, for diagram rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// The unique start node.
    Initial,
    /// A terminal node (including the sink).
    Final,
    /// Any other node.
    Normal,
}

/// One node, ready to hand to an external diagramming tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    /// A stable, implementation-chosen numeric handle for this vertex,
    /// distinct from `NodeId`'s internal representation so callers never
    /// depend on the latter.
    pub id: usize,
    /// A human-readable tag: the first code-point sequence (in
    /// breadth-first, code-point-sorted exploration order) that reaches
    /// this node from `root`. Because `sink` is reachable by many targets
    /// simultaneously, its label is only one representative prefix, not an
    /// exhaustive list.
    pub label: String,
    pub kind: VertexKind,
}

/// One forward edge, ready to hand to an external diagramming tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub src_id: usize,
    pub code_point: char,
    pub dst_id: usize,
}

/// Produces a deduplicated, stably ordered `(vertices, edges)` listing for
/// external diagramming (C7). Safe to call at any point after C5; never
/// mutates the automaton.
pub(crate) fn enumerate<N: NodeId>(automaton: &Automaton<N>) -> (Vec<Vertex>, Vec<Edge>) {
    let store = &automaton.store;
    let root = automaton.root;

    // Breadth-first from root, following edges in code-point order, gives
    // every node its shortest and lexicographically-first label.
    let mut labels: Vec<(N, String)> = Vec::new();
    let mut seen: HashSet<N> = HashSet::new();
    let mut queue: VecDeque<(N, String)> = VecDeque::new();
    queue.push_back((root, String::new()));
    seen.insert(root);

    while let Some((id, label)) = queue.pop_front() {
        labels.push((id, label.clone()));
        let mut children: Vec<(char, N)> = store.iter_forward(id).collect();
        children.sort_by_key(|&(c, _)| c);
        for (c, child) in children {
            if seen.insert(child) {
                let mut child_label = label.clone();
                child_label.push(c);
                queue.push_back((child, child_label));
            }
        }
    }

    // Assign stable numeric ids by label order, breaking ties by discovery
    // order (which is itself deterministic given the code-point-sorted walk
    // above).
    let mut ordered = labels;
    ordered.sort_by(|a, b| a.1.cmp(&b.1));
    let mut numeric_id: std::collections::HashMap<N, usize> = std::collections::HashMap::new();
    for (i, (id, _)) in ordered.iter().enumerate() {
        numeric_id.insert(*id, i);
    }

    let vertices: Vec<Vertex> = ordered
        .iter()
        .map(|(id, label)| Vertex {
            id: numeric_id[id],
            label: label.clone(),
            kind: if *id == root {
                VertexKind::Initial
            } else if store.is_terminal(*id) {
                VertexKind::Final
            } else {
                VertexKind::Normal
            },
        })
        .collect();

    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_dedup: HashSet<(usize, char, usize)> = HashSet::new();
    for (id, _) in &ordered {
        for (c, child) in store.iter_forward(*id) {
            let src_id = numeric_id[id];
            let dst_id = numeric_id[&child];
            if edge_dedup.insert((src_id, c, dst_id)) {
                edges.push(Edge { src_id, code_point: c, dst_id });
            }
        }
    }
    edges.sort_by(|a, b| (a.src_id, a.code_point, a.dst_id).cmp(&(b.src_id, b.code_point, b.dst_id)));

    (vertices, edges)
}
