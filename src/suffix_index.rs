use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{BuildError, Phase};
use crate::node_id::NodeId;
use crate::store::NodeStore;

/// The code-point sequence labeling a shareable suffix chain, read
/// head-to-sink (i.e. in the same left-to-right order a query would
/// consume it in).
pub(crate) type ChainLabel = Vec<char>;

/// Maps a chain label to the node id that canonically represents it.
pub(crate) type SuffixIndex<N> = HashMap<ChainLabel, N>;

/// Bottom-up pass from `sink` that discovers maximal linear shareable
/// suffix chains and canonicalizes each by its label (C3).
///
/// A shareable suffix chain is a maximal path ending at `sink` along which
/// every intermediate node is non-terminal and has exactly one outgoing
/// edge. Two chains with the same label are semantically interchangeable;
/// whichever is discovered first becomes canonical.
///
/// Bounded by `fanout_timeout`, checked once per top-level branch out of
/// `sink` — the same granularity [`crate::suffix_merge::merge_suffixes`]
/// uses for its own bound, since a pathological dictionary's fan-out cost
/// is dominated by the number and depth of these branches either way.
pub(crate) fn build_suffix_index<N: NodeId>(
    store: &NodeStore<N>,
    root: N,
    sink: N,
    fanout_timeout: Duration,
) -> Result<SuffixIndex<N>, BuildError> {
    let started = Instant::now();
    let mut index = SuffixIndex::new();
    for (c, parent) in sorted_reverse(store, sink) {
        if started.elapsed() > fanout_timeout {
            return Err(BuildError::Timeout { phase: Phase::Index, elapsed: started.elapsed() });
        }
        ascend(store, root, parent, vec![c], &mut index);
    }
    Ok(index)
}

fn ascend<N: NodeId>(
    store: &NodeStore<N>,
    root: N,
    n: N,
    tail: ChainLabel,
    index: &mut SuffixIndex<N>,
) {
    let is_dead_end = n == root || store.is_terminal(n) || store.out_degree(n) != 1;
    if is_dead_end {
        invalidate_suffixes_of(index, &tail);
        return;
    }

    index.entry(tail.clone()).or_insert(n);

    for (c, parent) in sorted_reverse(store, n) {
        let mut extended = Vec::with_capacity(tail.len() + 1);
        extended.push(c);
        extended.extend_from_slice(&tail);
        ascend(store, root, parent, extended, index);
    }
}

/// Removes every key whose length is at least `tail.len()` and whose
/// trailing `tail.len()` code points equal `tail` exactly. This purges
/// chains that were tentatively recorded as shareable but turn out to
/// pass through a branching or terminal node, catching tentative shares
/// that turn out not to be linear after all. The rule is
/// deliberately conservative: it may discard a handful of genuinely
/// shareable labels recorded by an unrelated ascent that happens to end
/// in the same code points, trading a little compression for a simple,
/// always-safe check.
fn invalidate_suffixes_of<N>(index: &mut SuffixIndex<N>, tail: &ChainLabel) {
    index.retain(|key, _| {
        key.len() < tail.len() || key[key.len() - tail.len()..] != tail[..]
    });
}

/// Reverse edges in a stable, sorted-by-code-point order so that
/// exploration order (and therefore which node becomes canonical among
/// duplicate labels) is deterministic across runs.
fn sorted_reverse<N: NodeId>(store: &NodeStore<N>, id: N) -> Vec<(char, N)> {
    let mut edges: Vec<(char, N)> = store.iter_reverse(id).collect();
    edges.sort_by_key(|&(c, _)| c);
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::insert_all;
    use crate::store::NodeStore;

    fn build(targets: &[&str]) -> (NodeStore<u32>, u32, u32) {
        let mut store = NodeStore::new();
        let root = store.new_node(false);
        let sink = store.new_node(true);
        let targets: Vec<String> = targets.iter().map(|s| s.to_string()).collect();
        insert_all(&mut store, root, sink, &targets).unwrap();
        (store, root, sink)
    }

    #[test]
    fn shared_linear_tail_is_indexed_once() {
        let (store, root, sink) = build(&["cats", "hats"]);
        let index = build_suffix_index(&store, root, sink, Duration::from_secs(5)).unwrap();
        // "cats" and "hats" share the non-branching, non-terminal tail
        // "ats"; both instances should canonicalize to the same entry.
        assert!(index.contains_key(&vec!['a', 't', 's']));
        assert!(index.contains_key(&vec!['t', 's']));
        assert!(index.contains_key(&vec!['s']));
    }

    #[test]
    fn branching_ancestor_is_not_indexed() {
        // "page" and "pal" diverge right after 'a', so no chain headed
        // above that divergence point should ever be indexed.
        let (store, root, sink) = build(&["page", "pal"]);
        let index = build_suffix_index(&store, root, sink, Duration::from_secs(5)).unwrap();
        assert!(!index.contains_key(&vec!['g', 'e']));
        assert!(index.contains_key(&vec!['e']));
    }
}
