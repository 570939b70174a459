use std::collections::HashMap;

use rayon::prelude::*;

use crate::automaton::Automaton;
use crate::node_id::NodeId;

/// Walks `root`, consuming one code point of `query` at a time, returning
/// whether `query` is exactly equal to one of the targets the automaton was
/// built from. The empty query always returns `false`: `root` is
/// never terminal.
pub(crate) fn match_one<N: NodeId>(automaton: &Automaton<N>, query: &str) -> bool {
    let mut cur = automaton.root;
    for c in query.chars() {
        match automaton.store.transition(cur, c) {
            Some(next) => cur = next,
            None => return false,
        }
    }
    automaton.store.is_terminal(cur)
}

/// Evaluates every `(query, ref)` pair independently and groups the refs of
/// matching queries by query string, preserving the input order of refs
/// within each key. Pairs whose query does not match are
/// omitted entirely.
///
/// Each pair is pure read-only traversal over the frozen automaton, so the
/// whole batch is evaluated with `rayon`'s `par_iter` (grounded in `matchy`'s
/// use of rayon for its own bulk lookups) rather than a single-threaded
/// fold. Order is recovered afterwards by tagging every hit with its
/// original index and sorting each key's bucket by that index, rather than
/// serializing the fold itself behind a lock.
pub(crate) fn match_many<N, R>(
    automaton: &Automaton<N>,
    pairs: &[(String, R)],
) -> HashMap<String, Vec<R>>
where
    N: NodeId + Sync,
    R: Clone + Send + Sync,
{
    let mut hits: Vec<(usize, &str, R)> = pairs
        .par_iter()
        .enumerate()
        .filter_map(|(i, (query, r))| {
            if match_one(automaton, query) {
                Some((i, query.as_str(), r.clone()))
            } else {
                None
            }
        })
        .collect();

    hits.sort_by_key(|&(i, _, _)| i);

    let mut result: HashMap<String, Vec<R>> = HashMap::new();
    for (_, query, r) in hits {
        result.entry(query.to_string()).or_default().push(r);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::insert_all;
    use crate::store::NodeStore;
    use crate::suffix_index::build_suffix_index;
    use crate::suffix_merge::merge_suffixes;
    use std::time::Duration;

    fn automaton(targets: &[&str]) -> Automaton<u32> {
        let mut store = NodeStore::new();
        let root = store.new_node(false);
        let sink = store.new_node(true);
        let targets: Vec<String> = targets.iter().map(|s| s.to_string()).collect();
        insert_all(&mut store, root, sink, &targets).unwrap();
        let index = build_suffix_index(&store, root, sink, Duration::from_secs(5)).unwrap();
        merge_suffixes(&mut store, root, sink, &index, Duration::from_secs(5)).unwrap();
        crate::automaton::freeze(store, root, sink).unwrap()
    }

    #[test]
    fn match_one_rejects_unknown_and_empty() {
        let a = automaton(&["abc", "a", "xyz", "abcdef", "abcpqr"]);
        assert!(match_one(&a, "a"));
        assert!(match_one(&a, "abc"));
        assert!(match_one(&a, "abcdef"));
        assert!(match_one(&a, "abcpqr"));
        assert!(match_one(&a, "xyz"));
        assert!(!match_one(&a, ""));
        assert!(!match_one(&a, "x"));
        assert!(!match_one(&a, "b"));
        assert!(!match_one(&a, "ab"));
        assert!(!match_one(&a, "abcd"));
        assert!(!match_one(&a, "abcdxyz"));
        assert!(!match_one(&a, "xyzabc"));
    }

    #[test]
    fn match_one_handles_multibyte_code_points() {
        let a = automaton(&["好久不见", "龙年"]);
        assert!(match_one(&a, "好久不见"));
        assert!(match_one(&a, "龙年"));
        assert!(!match_one(&a, "好久"));
        assert!(!match_one(&a, "龙"));
        assert!(!match_one(&a, "黑龙江"));
        assert!(!match_one(&a, ""));
    }

    #[test]
    fn match_many_preserves_per_key_order_and_drops_misses() {
        let a = automaton(&["nunc", "nulla", "magna", "ipsum"]);
        let pairs = vec![
            ("nunc".to_string(), 0usize),
            ("dolor".to_string(), 1),
            ("nulla".to_string(), 2),
            ("nunc".to_string(), 3),
            ("magna".to_string(), 4),
        ];
        let result = match_many(&a, &pairs);
        assert_eq!(result.get("nunc"), Some(&vec![0, 3]));
        assert_eq!(result.get("nulla"), Some(&vec![2]));
        assert_eq!(result.get("magna"), Some(&vec![4]));
        assert!(!result.contains_key("dolor"));
        assert!(!result.contains_key("ipsum"));
    }
}
