use std::collections::HashMap;

use crate::error::{BuildError, Phase};
use crate::node_id::{usize_to_node_id, NodeId};

/// A single node. Transitions are kept as a sorted `Vec` rather than a
/// `HashMap`: most nodes have very few outgoing edges, so a
/// binary-searched vec beats hashing for both memory and lookup speed.
#[derive(Clone)]
pub(crate) struct Node<N> {
    pub(crate) terminal: bool,
    out: Vec<(char, N)>,
}

impl<N: NodeId> Node<N> {
    fn new(terminal: bool) -> Self {
        Node { terminal, out: Vec::new() }
    }

    pub(crate) fn get(&self, c: char) -> Option<N> {
        self.out
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|i| self.out[i].1)
    }

    fn set(&mut self, c: char, child: N) {
        match self.out.binary_search_by_key(&c, |&(k, _)| k) {
            Ok(i) => self.out[i].1 = child,
            Err(i) => self.out.insert(i, (c, child)),
        }
    }

    fn unset(&mut self, c: char) {
        if let Ok(i) = self.out.binary_search_by_key(&c, |&(k, _)| k) {
            self.out.remove(i);
        }
    }

    pub(crate) fn out_degree(&self) -> usize {
        self.out.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (char, N)> + '_ {
        self.out.iter().copied()
    }
}

/// The reverse-edge multimap for a single node: for every code point `c` a
/// node is entered on, the (insertion-ordered, de-duplicated) list of
/// parents that transition on `c` into it. Transient — lives only through
/// C2–C4, discarded at freeze.
type ReverseMap<N> = HashMap<char, Vec<N>>;

/// Owns every node in the automaton under construction, keyed by a dense
/// integer identifier (C1). Identifiers are stable for the lifetime of the
/// store, including across `remove_node` — a removed slot leaves a hole
/// rather than being recycled, so no other node's id ever shifts.
pub(crate) struct NodeStore<N: NodeId> {
    nodes: Vec<Option<Node<N>>>,
    reverse: Option<Vec<ReverseMap<N>>>,
}

impl<N: NodeId> NodeStore<N> {
    pub(crate) fn new() -> Self {
        NodeStore { nodes: Vec::new(), reverse: Some(Vec::new()) }
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.reverse.is_none()
    }

    /// Allocates a node with empty forward and reverse maps.
    pub(crate) fn new_node(&mut self, terminal: bool) -> N {
        let id = usize_to_node_id(self.nodes.len()).expect("node id space exhausted");
        self.nodes.push(Some(Node::new(terminal)));
        if let Some(reverse) = &mut self.reverse {
            reverse.push(ReverseMap::new());
        }
        id
    }

    fn node(&self, id: N) -> &Node<N> {
        self.nodes[id.to_usize()].as_ref().expect("dangling node id")
    }

    fn node_mut(&mut self, id: N) -> &mut Node<N> {
        self.nodes[id.to_usize()].as_mut().expect("dangling node id")
    }

    pub(crate) fn is_terminal(&self, id: N) -> bool {
        self.node(id).terminal
    }

    pub(crate) fn set_terminal(&mut self, id: N, terminal: bool) {
        self.node_mut(id).terminal = terminal;
    }

    pub(crate) fn out_degree(&self, id: N) -> usize {
        self.node(id).out_degree()
    }

    pub(crate) fn transition(&self, id: N, c: char) -> Option<N> {
        self.node(id).get(c)
    }

    /// Sets `parent.out[c] = child`. Fails with [`BuildError::InvariantViolation`]
    /// if `parent` already has a *different* child on `c` — transitions are
    /// deterministic. Setting an identical mapping twice is
    /// a no-op, which is what makes duplicate-target insertion idempotent.
    pub(crate) fn add_forward(
        &mut self,
        parent: N,
        c: char,
        child: N,
        phase: Phase,
    ) -> Result<(), BuildError> {
        if let Some(existing) = self.node(parent).get(c) {
            if existing == child {
                return Ok(());
            }
            return Err(BuildError::InvariantViolation {
                phase,
                detail: format!(
                    "node {:?} already transitions on {:?} to {:?}, refusing to retarget to {:?}",
                    parent, c, existing, child
                ),
            });
        }
        self.node_mut(parent).set(c, child);
        if let Some(reverse) = &mut self.reverse {
            let parents = reverse[child.to_usize()].entry(c).or_default();
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        Ok(())
    }

    /// Changes an existing `(parent, c)` mapping to point at `new_child`,
    /// updating reverse maps on both sides. Returns the prior child. Used
    /// only by the suffix merger (C4), which is the one pass allowed to
    /// rewire an already-populated edge.
    pub(crate) fn replace_forward(&mut self, parent: N, c: char, new_child: N) -> N {
        let prior = self.node(parent).get(c).expect("replace_forward on unset edge");
        self.node_mut(parent).set(c, new_child);
        if let Some(reverse) = &mut self.reverse {
            if let Some(parents) = reverse[prior.to_usize()].get_mut(&c) {
                parents.retain(|&p| p != parent);
            }
            let parents = reverse[new_child.to_usize()].entry(c).or_default();
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        prior
    }

    /// Detaches the `(parent, c)` edge without rewiring it elsewhere, and
    /// drops the reverse-edge bookkeeping for it. Used by the merger when
    /// deleting a now-orphaned chain node's single outgoing edge.
    pub(crate) fn unset_forward(&mut self, parent: N, c: char) {
        let child = self.node(parent).get(c);
        self.node_mut(parent).unset(c);
        if let (Some(reverse), Some(child)) = (&mut self.reverse, child) {
            if let Some(parents) = reverse[child.to_usize()].get_mut(&c) {
                parents.retain(|&p| p != parent);
            }
        }
    }

    /// Removes a node entirely. Callers must ensure it has no remaining
    /// parents.
    pub(crate) fn remove_node(&mut self, id: N) {
        self.nodes[id.to_usize()] = None;
        if let Some(reverse) = &mut self.reverse {
            reverse[id.to_usize()].clear();
        }
    }

    pub(crate) fn iter_forward(&self, id: N) -> impl Iterator<Item = (char, N)> + '_ {
        self.node(id).iter()
    }

    pub(crate) fn iter_reverse(&self, id: N) -> impl Iterator<Item = (char, N)> + '_ {
        let reverse = self.reverse.as_ref().expect("reverse index already dropped");
        reverse[id.to_usize()]
            .iter()
            .flat_map(|(&c, parents)| parents.iter().map(move |&p| (c, p)))
    }

    pub(crate) fn parent_count(&self, id: N) -> usize {
        let reverse = self.reverse.as_ref().expect("reverse index already dropped");
        reverse[id.to_usize()].values().map(Vec::len).sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub(crate) fn live_ids(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|_| N::from_usize(i)))
    }

    /// Drops the reverse-edge storage and transitions the store read-only.
    pub(crate) fn freeze(&mut self) {
        self.reverse = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;

    #[test]
    fn forward_edges_are_deterministic() {
        let mut store: NodeStore<u32> = NodeStore::new();
        let root = store.new_node(false);
        let a = store.new_node(false);
        let b = store.new_node(false);

        store.add_forward(root, 'x', a, Phase::Build).unwrap();
        assert!(store.add_forward(root, 'x', b, Phase::Build).is_err());
        // same mapping twice is fine
        store.add_forward(root, 'x', a, Phase::Build).unwrap();
        assert_eq!(store.transition(root, 'x'), Some(a));
    }

    #[test]
    fn reverse_mirrors_forward_until_freeze() {
        let mut store: NodeStore<u32> = NodeStore::new();
        let root = store.new_node(false);
        let sink = store.new_node(true);
        store.add_forward(root, 'z', sink, Phase::Build).unwrap();

        assert_eq!(store.parent_count(sink), 1);
        store.freeze();
        // after freeze, iter_reverse would panic; we don't call it.
        assert!(store.is_frozen());
    }
}
