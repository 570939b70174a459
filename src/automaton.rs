use crate::error::{BuildError, Phase};
use crate::node_id::NodeId;
use crate::store::NodeStore;

/// Counts surfaced by [`crate::info`]. Optionally `serde`-serializable
/// behind the `serde` feature so embedding applications can emit these as JSON
/// without forcing the dependency on everyone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metrics {
    /// Total live node count, including `root` and `sink`.
    pub nodes: usize,
    /// Total live forward edge count.
    pub edges: usize,
    /// Number of distinct outgoing edges from `root`.
    pub heads: usize,
    /// Number of nodes with `terminal = true`, including `sink`.
    pub terminals: usize,
    /// Number of nodes with more than one outgoing edge.
    pub branches: usize,
    /// Number of nodes with zero outgoing edges. Always exactly 1 (`sink`).
    pub leaves: usize,
    /// Number of nodes with no incoming edges, measured at build time before
    /// the reverse index is discarded. Always exactly 1 (`root`).
    pub roots: usize,
}

/// The immutable, frozen result of C2 → C3 → C4 → C5 (`freeze`). Safe for
/// concurrent matching: nothing under `Automaton` is ever mutated again.
pub struct Automaton<N: NodeId> {
    pub(crate) store: NodeStore<N>,
    pub(crate) root: N,
    pub(crate) sink: N,
    pub(crate) metrics: Metrics,
}

impl<N: NodeId> Automaton<N> {
    pub(crate) fn metrics(&self) -> Metrics {
        self.metrics
    }
}

/// Discards the reverse-edge index, asserts invariants (1)–(5), and returns
/// an immutable [`Automaton`] (C5). Called once, after C2–C4 have completed;
/// any invariant breach here is a bug in an earlier phase, not a caller
/// mistake, so it's reported as [`BuildError::InvariantViolation`] rather
/// than panicking — a library should never crash its caller's process over
/// its own construction bug.
#[tracing::instrument(skip(store))]
pub(crate) fn freeze<N: NodeId>(
    mut store: NodeStore<N>,
    root: N,
    sink: N,
) -> Result<Automaton<N>, BuildError> {
    let metrics = compute_metrics(&store, root, sink)?;
    store.freeze();
    tracing::debug!(nodes = metrics.nodes, edges = metrics.edges, "automaton frozen");
    Ok(Automaton { store, root, sink, metrics })
}

fn compute_metrics<N: NodeId>(store: &NodeStore<N>, root: N, sink: N) -> Result<Metrics, BuildError> {
    let mut edges = 0;
    let mut terminals = 0;
    let mut branches = 0;
    let mut leaves = 0;
    let mut roots = 0;

    let mut saw_sink_as_leaf = false;
    for id in store.live_ids() {
        let out_degree = store.out_degree(id);
        edges += out_degree;

        if store.is_terminal(id) {
            terminals += 1;
        }
        if out_degree > 1 {
            branches += 1;
        }
        if out_degree == 0 {
            leaves += 1;
            if id == sink {
                saw_sink_as_leaf = true;
            } else {
                return Err(BuildError::InvariantViolation {
                    phase: Phase::Merge,
                    detail: format!("node {id:?} has no outgoing edges but is not the sink"),
                });
            }
        }
        if store.parent_count(id) == 0 && id != root {
            return Err(BuildError::InvariantViolation {
                phase: Phase::Merge,
                detail: format!("node {id:?} has no parents but is not the root"),
            });
        }
        if store.parent_count(id) == 0 {
            roots += 1;
        }
    }

    if leaves != 1 || !saw_sink_as_leaf {
        return Err(BuildError::InvariantViolation {
            phase: Phase::Merge,
            detail: format!("expected exactly one leaf (the sink), found {leaves}"),
        });
    }
    if !store.is_terminal(sink) {
        return Err(BuildError::InvariantViolation {
            phase: Phase::Merge,
            detail: "sink is not terminal".to_string(),
        });
    }
    if roots != 1 {
        return Err(BuildError::InvariantViolation {
            phase: Phase::Merge,
            detail: format!("expected exactly one parentless node (the root), found {roots}"),
        });
    }

    let heads = store.out_degree(root);
    let nodes = store.len();

    Ok(Metrics { nodes, edges, heads, terminals, branches, leaves, roots })
}
