use std::time::{Duration, Instant};

use crate::error::{BuildError, Phase};
use crate::node_id::NodeId;
use crate::store::NodeStore;
use crate::suffix_index::{ChainLabel, SuffixIndex};

/// Bottom-up pass that rewires parent edges to the canonical chain found
/// by the suffix indexer, deletes the now-orphaned duplicate chains, and
/// maintains DAG invariants throughout. Sequential — construction carries no
/// parallelism requirement here; a
/// [`BuildError::Timeout`] is raised if the whole pass runs past
/// `fanout_timeout` (checked once per top-level branch out of `sink`,
/// since each branch's own ascent is the natural unit of work).
///
/// At every step we ask one question: is the node currently occupying a
/// child slot (`q`) the canonical representative of the label it spells?
/// That's a lookup keyed by `q`'s own tail, not the tail of the node
/// doing the asking (`p`) — using `p`'s tail instead would rewire the
/// edge one code point too far down the canonical chain and desync the
/// query cursor from the automaton by exactly one character.
///
/// Rewiring `p.out[edge_char]` to the canonical node does not end the
/// ascent: `p` itself now spells the same label the node it replaced used
/// to spell one level further down, so `p` is exactly as likely to be a
/// second duplicate of some other already-canonical node one hop further
/// up. The walk keeps climbing past a rewire using `p`'s own tail, exactly
/// as it would if `p` had already been canonical — a rewire and a
/// confirmed-canonical node hand the ascent upward identically. Only a
/// dead end (root, terminal, or branching) or a miss in the index actually
/// stops a branch.
pub(crate) fn merge_suffixes<N: NodeId>(
    store: &mut NodeStore<N>,
    root: N,
    sink: N,
    index: &SuffixIndex<N>,
    fanout_timeout: Duration,
) -> Result<(), BuildError> {
    let started = Instant::now();
    let branches = sorted_reverse(store, sink);
    for (c, parent) in branches {
        if started.elapsed() > fanout_timeout {
            return Err(BuildError::Timeout { phase: Phase::Merge, elapsed: started.elapsed() });
        }
        ascend(store, root, sink, index, parent, c, sink, ChainLabel::new());
    }
    Ok(())
}

/// `p` is the node currently being evaluated; `p.out[edge_char] == q`;
/// `q_tail` is `q`'s own code-point path down to `sink` (empty when
/// `q == sink`).
fn ascend<N: NodeId>(
    store: &mut NodeStore<N>,
    root: N,
    sink: N,
    index: &SuffixIndex<N>,
    p: N,
    edge_char: char,
    q: N,
    q_tail: ChainLabel,
) {
    if q == sink {
        // First step up from sink: no chain of length 1 is ever a
        // sharable tail (the chain's head must be at least one hop above
        // sink), so there's nothing to look up yet.
        if store.is_terminal(p) {
            return;
        }
        let mut p_tail = ChainLabel::with_capacity(1);
        p_tail.push(edge_char);
        continue_ascent(store, root, sink, index, p, p_tail);
        return;
    }

    // `continue_ascent` only ever hands us a `q` that is itself
    // non-terminal and non-branching (that's exactly its gate), so this
    // lookup key is always well-formed.
    debug_assert!(!store.is_terminal(q) && store.out_degree(q) <= 1);

    match index.get(&q_tail) {
        Some(&canon) => {
            if canon != q {
                store.replace_forward(p, edge_char, canon);
                // `q` had exactly one parent (`p`, just rewired away), so
                // it's orphaned now; its own child may or may not be —
                // e.g. `canon` itself is shared with other chains and must
                // survive.
                delete_if_orphaned(store, q, sink);
            }
            // Whether `p`'s edge was just rewired onto `canon` or was
            // already pointing at it, `p` now spells `q_tail` prefixed by
            // `edge_char` — the same label `canon` spells — and must be
            // checked against its own ancestors the same way.
            let mut p_tail = ChainLabel::with_capacity(q_tail.len() + 1);
            p_tail.push(edge_char);
            p_tail.extend_from_slice(&q_tail);
            continue_ascent(store, root, sink, index, p, p_tail);
        }
        None => {
            // This chain is no longer (or never was) shareable at this
            // length; terminate ascent of this branch.
        }
    }
}

fn continue_ascent<N: NodeId>(
    store: &mut NodeStore<N>,
    root: N,
    sink: N,
    index: &SuffixIndex<N>,
    p: N,
    p_tail: ChainLabel,
) {
    if p == root || store.is_terminal(p) || store.out_degree(p) > 1 {
        return;
    }
    for (c, pp) in sorted_reverse(store, p) {
        ascend(store, root, sink, index, pp, c, p, p_tail.clone());
    }
}

/// Removes `node` if it has no remaining parents, cascading forward only
/// as far as descendants that themselves become orphaned by the removal.
/// Stops at `sink` (never deleted) or at the first descendant still
/// referenced by another parent — which happens exactly when that
/// descendant is itself a canonical node shared with another chain, and
/// must survive untouched.
fn delete_if_orphaned<N: NodeId>(store: &mut NodeStore<N>, node: N, sink: N) {
    if node == sink || store.parent_count(node) > 0 {
        return;
    }
    let (c, child) = store
        .iter_forward(node)
        .next()
        .expect("orphaned chain node must have exactly one outgoing edge");
    store.unset_forward(node, c);
    store.remove_node(node);
    delete_if_orphaned(store, child, sink);
}

fn sorted_reverse<N: NodeId>(store: &NodeStore<N>, id: N) -> Vec<(char, N)> {
    let mut edges: Vec<(char, N)> = store.iter_reverse(id).collect();
    edges.sort_by_key(|&(c, _)| c);
    edges
}
