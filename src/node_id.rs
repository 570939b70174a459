use std::hash::Hash;

// pretty much copied from the state-id abstraction used by
// https://github.com/BurntSushi/aho-corasick, adapted from "state identifier"
// to "node identifier" since this automaton has no failure-transition states.

/// Convert the given `usize` to the chosen node identifier representation.
/// Returns `None` if the value cannot fit in the chosen representation.
pub(crate) fn usize_to_node_id<N: NodeId>(value: usize) -> Option<N> {
    if value > N::max_id() {
        None
    } else {
        Some(N::from_usize(value))
    }
}

mod private {
    pub(crate) trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}

/// The representation used for node identifiers in a [`crate::store::NodeStore`].
///
/// Typically this is `u32` (the default, good for dictionaries up to ~4
/// billion nodes) or `usize` for callers who don't care about the memory
/// overhead of a wider id.
pub trait NodeId:
    private::Sealed + Clone + Copy + Eq + Hash + PartialEq + PartialOrd + Ord + std::fmt::Debug
{
    /// Construct an id from a dense `usize` index.
    fn from_usize(n: usize) -> Self;

    /// Recover the dense `usize` index this id refers to.
    fn to_usize(self) -> usize;

    /// The largest index representable by this id type.
    fn max_id() -> usize;
}

impl NodeId for usize {
    #[inline]
    fn from_usize(n: usize) -> usize {
        n
    }

    #[inline]
    fn to_usize(self) -> usize {
        self
    }

    #[inline]
    fn max_id() -> usize {
        usize::MAX
    }
}

impl NodeId for u32 {
    #[inline]
    fn from_usize(n: usize) -> u32 {
        n as u32
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }

    #[inline]
    fn max_id() -> usize {
        u32::MAX as usize
    }
}

#[cfg(target_pointer_width = "64")]
impl NodeId for u64 {
    #[inline]
    fn from_usize(n: usize) -> u64 {
        n as u64
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }

    #[inline]
    fn max_id() -> usize {
        u64::MAX as usize
    }
}
