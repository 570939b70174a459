//! Exact whole-string membership matching over a suffix-compressed DAG
//! automaton.
//!
//! Build an automaton from a fixed dictionary of target strings, then ask
//! whether a query string is exactly equal to one of them — singly, via
//! [`is_match`], or in bulk with per-query location refs via [`match_many`].
//! The interesting part isn't matching (that's a simple walk); it's
//! construction: a prefix trie is compressed into a DAG by sharing common
//! non-branching, non-terminal suffix chains that lead into a single sink
//! node, without disturbing which strings the automaton accepts.
//!
//! This crate does not do substring search, fuzzy matching, or full DFA
//! minimization; see the module-level docs on [`builder`], [`suffix_index`]
//! and [`suffix_merge`] for what it does do.

mod automaton;
mod builder;
mod enumerate;
mod error;
mod matcher;
mod node_id;
mod store;
mod suffix_index;
mod suffix_merge;

use std::time::Duration;

pub use automaton::{Automaton, Metrics};
pub use enumerate::{Edge, Vertex, VertexKind};
pub use error::{BuildError, Phase};
pub use node_id::NodeId;

/// Tuning knobs for [`build_with_config`]. The zero-config [`build`] entry
/// point uses `BuildConfig::default()`.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    /// Upper bound on the whole indexing (C3) and merge (C4) pass, checked
    /// between top-level branches out of `sink`. A pathological dictionary — one whose suffix structure
    /// forces pathologically many branches — cannot hang a build past this
    /// bound; it fails with [`BuildError::Timeout`] instead.
    pub fanout_timeout: Duration,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig { fanout_timeout: Duration::from_secs(5) }
    }
}

/// Builds an automaton from `targets` using `u32` node identifiers (good for
/// dictionaries up to ~4 billion nodes) and the default [`BuildConfig`].
///
/// Fails with [`BuildError::EmptyInput`] if `targets` is empty,
/// [`BuildError::EmptyTarget`] if any target is the empty string, or
/// [`BuildError::Timeout`] / [`BuildError::InvariantViolation`] if
/// construction cannot complete. A failed build returns no automaton at all.
#[tracing::instrument(skip(targets))]
pub fn build(targets: &[String]) -> Result<Automaton<u32>, BuildError> {
    build_with_config(targets, BuildConfig::default())
}

/// Like [`build`], but with an explicit node identifier width and
/// [`BuildConfig`]. Runs C2 (insert) → C3 (index) → C4 (merge) → C5 (freeze)
/// in sequence.
#[tracing::instrument(skip(targets))]
pub fn build_with_config<N: NodeId>(
    targets: &[String],
    config: BuildConfig,
) -> Result<Automaton<N>, BuildError> {
    let mut store = store::NodeStore::new();
    let root = store.new_node(false);
    let sink = store.new_node(true);

    builder::insert_all(&mut store, root, sink, targets)?;
    tracing::debug!(nodes = store.len(), "prefix tree built");

    let index = suffix_index::build_suffix_index(&store, root, sink, config.fanout_timeout)?;
    tracing::debug!(chains = index.len(), "suffix index built");

    suffix_merge::merge_suffixes(&mut store, root, sink, &index, config.fanout_timeout)?;
    tracing::debug!(nodes = store.len(), "suffix chains merged");

    automaton::freeze(store, root, sink)
}

/// Whether `query` is exactly equal to one of the targets `automaton` was
/// built from. The empty query always returns `false`.
pub fn is_match<N: NodeId>(automaton: &Automaton<N>, query: &str) -> bool {
    matcher::match_one(automaton, query)
}

/// Evaluates every `(query, ref)` pair against `automaton` and groups refs of
/// matching queries by query string, preserving each key's input order.
/// Pairs whose query does not match are omitted. Safe to call concurrently
/// with other reads of the same automaton; internally parallelized.
pub fn match_many<N, R>(
    automaton: &Automaton<N>,
    pairs: &[(String, R)],
) -> std::collections::HashMap<String, Vec<R>>
where
    N: NodeId + Sync,
    R: Clone + Send + Sync,
{
    matcher::match_many(automaton, pairs)
}

/// Structural counts over a frozen automaton.
pub fn info<N: NodeId>(automaton: &Automaton<N>) -> Metrics {
    automaton.metrics()
}

/// Produces a deduplicated, stably ordered `(vertices, edges)` listing for
/// external diagramming. May be called any number of times after
/// [`build`]; never mutates the automaton.
pub fn enumerate<N: NodeId>(automaton: &Automaton<N>) -> (Vec<Vertex>, Vec<Edge>) {
    enumerate::enumerate(automaton)
}

/// Releases the automaton's node storage. Equivalent to dropping it; exposed
/// as an explicit call so callers porting code from systems where teardown
/// is a distinct lifecycle step have a direct analogue.
pub fn teardown<N: NodeId>(automaton: Automaton<N>) {
    drop(automaton);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn e1_mixed_prefix_dictionary() {
        let t = targets(&["abc", "a", "xyz", "abcdef", "abcpqr"]);
        let a = build(&t).unwrap();
        for (q, expect) in [
            ("a", true),
            ("abc", true),
            ("abcdef", true),
            ("abcpqr", true),
            ("xyz", true),
            ("", false),
            ("x", false),
            ("b", false),
            ("ab", false),
            ("abcd", false),
            ("abcdxyz", false),
            ("xyzabc", false),
        ] {
            assert_eq!(is_match(&a, q), expect, "query {q:?}");
        }
    }

    #[test]
    fn e2_multibyte_dictionary() {
        let t = targets(&["好久不见", "龙年"]);
        let a = build(&t).unwrap();
        assert!(is_match(&a, "好久不见"));
        assert!(is_match(&a, "龙年"));
        assert!(!is_match(&a, "好久"));
        assert!(!is_match(&a, "龙"));
        assert!(!is_match(&a, "黑龙江"));
        assert!(!is_match(&a, ""));
    }

    #[test]
    fn e4_prefix_target_survives_as_distinct_terminal() {
        let t = targets(&["page", "pages"]);
        let a = build(&t).unwrap();
        assert!(is_match(&a, "page"));
        assert!(is_match(&a, "pages"));
        assert!(!is_match(&a, "pag"));
        assert!(!is_match(&a, "pagess"));
    }

    #[test]
    fn e5_disjoint_targets_never_share_a_tail() {
        let t = targets(&["ab", "cd"]);
        let a = build(&t).unwrap();
        let m = info(&a);
        assert!(m.nodes >= 5);
        assert!(is_match(&a, "ab"));
        assert!(is_match(&a, "cd"));
        assert!(!is_match(&a, "ac"));
    }

    #[test]
    fn e3_twelve_word_dictionary_metrics() {
        let t = targets(&[
            "walk", "talk", "walking", "talking", "wall", "king", "page", "pages", "paging",
            "wag", "wage", "wages",
        ]);
        let a = build(&t).unwrap();
        let m = info(&a);
        assert_eq!(m.nodes, 19);
        assert_eq!(m.edges, 24);
        assert_eq!(m.heads, 4);
        assert_eq!(m.terminals, 6);
        assert_eq!(m.branches, 4);
        assert_eq!(m.leaves, 1);
        assert_eq!(m.roots, 1);
        for q in &t {
            assert!(is_match(&a, q), "query {q:?}");
        }
        assert!(!is_match(&a, "wa"));
        assert!(!is_match(&a, "kin"));
    }

    #[test]
    fn e6_match_many_groups_by_query_preserving_order() {
        let t = targets(&["nunc", "nulla", "magna", "ipsum"]);
        let a = build(&t).unwrap();
        let pairs = vec![
            ("nunc".to_string(), (0usize, 0usize)),
            ("lorem".to_string(), (0, 5)),
            ("magna".to_string(), (0, 11)),
            ("nunc".to_string(), (1, 0)),
        ];
        let result = match_many(&a, &pairs);
        assert_eq!(result.get("nunc"), Some(&vec![(0, 0), (1, 0)]));
        assert_eq!(result.get("magna"), Some(&vec![(0, 11)]));
        assert!(!result.contains_key("lorem"));
        assert!(!result.contains_key("ipsum"));
    }

    #[test]
    fn rejects_empty_input() {
        let err = build(&[]).unwrap_err();
        assert!(matches!(err, BuildError::EmptyInput));
    }

    #[test]
    fn rejects_empty_target() {
        let t = targets(&["ok", ""]);
        let err = build(&t).unwrap_err();
        assert!(matches!(err, BuildError::EmptyTarget { index: 1 }));
    }

    #[test]
    fn duplicate_targets_are_idempotent() {
        let once = build(&targets(&["walk", "talk"])).unwrap();
        let twice = build(&targets(&["walk", "talk", "walk"])).unwrap();
        for q in ["walk", "talk", "wal", "talking"] {
            assert_eq!(is_match(&once, q), is_match(&twice, q));
        }
    }

    #[test]
    fn insertion_order_does_not_affect_matches() {
        let forward = build(&targets(&["walk", "talk", "walking", "talking", "wall"])).unwrap();
        let reversed = build(&targets(&["wall", "talking", "walking", "talk", "walk"])).unwrap();
        for q in ["walk", "talk", "walking", "talking", "wall", "wa", "walks"] {
            assert_eq!(is_match(&forward, q), is_match(&reversed, q));
        }
    }

    #[test]
    fn enumerate_and_info_agree_on_leaves_and_roots() {
        let a = build(&targets(&["walk", "talk", "walking", "talking", "wall"])).unwrap();
        let m = info(&a);
        let (vertices, edges) = enumerate(&a);
        assert_eq!(m.nodes, vertices.len());
        assert_eq!(m.edges, edges.len());
        assert_eq!(m.leaves, 1);
        assert_eq!(m.roots, 1);
    }
}
