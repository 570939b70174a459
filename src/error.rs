use std::time::Duration;

/// Failure modes of [`crate::build`] / [`crate::build_with_config`].
///
/// A failed build leaves no user-visible automaton: callers either get a
/// frozen [`crate::Automaton`] or one of these variants, never a partial
/// structure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// `build` was called with zero targets.
    #[error("no targets were provided")]
    EmptyInput,

    /// One of the targets was the empty string.
    #[error("target at index {index} is the empty string")]
    EmptyTarget {
        /// Position of the offending target in the input sequence.
        index: usize,
    },

    /// A build-phase fan-out ascent did not complete within its bound.
    #[error("build phase {phase:?} did not complete within {elapsed:?}")]
    Timeout {
        /// The phase that was in flight when the bound was exceeded.
        phase: Phase,
        /// The configured bound that was exceeded.
        elapsed: Duration,
    },

    /// A detected inconsistency during insert/index/merge.
    #[error("invariant violated during {phase:?}: {detail}")]
    InvariantViolation {
        /// The phase in which the inconsistency was detected.
        phase: Phase,
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

/// The construction phase a build was in when a [`BuildError`] was raised.
///
/// Phases are strictly ordered: `Build -> Index -> Merge`. Every later
/// phase observes all effects of every earlier one. There is no `Frozen`
/// variant here and no matching `MatchError`: [`crate::Automaton`] is only
/// ever produced by a successful `freeze`, so a match operation can never
/// run against anything but a fully built automaton — the type system
/// rules out the "match before freeze" case a runtime phase check would
/// otherwise need to guard against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// C2: prefix-tree insertion is in progress or has just completed.
    Build,
    /// C3: the suffix index is being computed.
    Index,
    /// C4: suffix chains are being merged.
    Merge,
}
