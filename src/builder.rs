use crate::error::{BuildError, Phase};
use crate::node_id::NodeId;
use crate::store::NodeStore;

/// Inserts every target string into the prefix tree rooted at `root`,
/// terminating every word's last transition at the shared `sink` (C2).
///
/// Targets are sorted by code-point length, longest first, before
/// insertion: this guarantees that when a shorter word is a strict prefix
/// of an already-inserted longer one, its insertion only flips a
/// `terminal` flag on an existing internal node instead of forcing a
/// restructure. Tie-breaks among equal-length targets don't affect
/// correctness, so a stable sort is used purely for determinism of node
/// allocation order, not semantics.
pub(crate) fn insert_all<N: NodeId>(
    store: &mut NodeStore<N>,
    root: N,
    sink: N,
    targets: &[String],
) -> Result<(), BuildError> {
    if targets.is_empty() {
        return Err(BuildError::EmptyInput);
    }
    for (index, t) in targets.iter().enumerate() {
        if t.is_empty() {
            return Err(BuildError::EmptyTarget { index });
        }
    }

    let mut ordered: Vec<&String> = targets.iter().collect();
    ordered.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    for t in ordered {
        insert_one(store, root, sink, t)?;
    }
    Ok(())
}

/// Inserts a single target, assuming nothing about insertion order. Exposed
/// at crate visibility so the longest-first contract that [`insert_all`]
/// relies on can be tested in isolation, including the out-of-order case
/// that is supposed to be unreachable once targets are sorted (see the
/// `rejects_out_of_order_extension_past_sink` test below).
pub(crate) fn insert_one<N: NodeId>(
    store: &mut NodeStore<N>,
    root: N,
    sink: N,
    target: &str,
) -> Result<(), BuildError> {
    let chars: Vec<char> = target.chars().collect();
    let k = chars.len();

    let mut cur = root;
    let mut i = 0;
    while i < k {
        if cur == sink {
            // Only reachable if a shorter target was inserted before a
            // longer one that shares its entire prefix: the sink has
            // already "closed off" this path, and extending through it
            // would give the sink an outgoing edge. Treated as a hard
            // failure rather than silently retargeting the sink's edge.
            return Err(BuildError::InvariantViolation {
                phase: Phase::Build,
                detail: format!(
                    "target {target:?} extends past the sink at code point index {i}; \
                     targets must be inserted longest-first"
                ),
            });
        }
        match store.transition(cur, chars[i]) {
            Some(next) => {
                cur = next;
                i += 1;
            }
            None => break,
        }
    }

    if i == k {
        // The entire path already existed (an extension of this target was
        // inserted earlier); `cur` is the internal node corresponding to
        // this target's last character. Mark it terminal.
        store.set_terminal(cur, true);
        return Ok(());
    }

    for j in i..k - 1 {
        let next = store.new_node(false);
        store.add_forward(cur, chars[j], next, Phase::Build)?;
        cur = next;
    }

    let last = chars[k - 1];
    match store.transition(cur, last) {
        Some(existing) if existing == sink => {}
        Some(_) => unreachable!(
            "a freshly allocated node cannot already have a transition on {last:?}"
        ),
        None => store.add_forward(cur, last, sink, Phase::Build)?,
    }
    Ok(())
}
