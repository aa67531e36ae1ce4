//! This module provides the binary prefix trie a forwarding table is loaded into. Every inserted
//! prefix ends at its own node, so the longest-prefix-match of an address is the deepest matching
//! node on its bit path.
mod trie;

pub use crate::trie::{PrefixTrie, TrieNode};

#[cfg(feature = "graphviz")]
pub use crate::trie::GraphvizDebug;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::trie::{PrefixTrie, TrieNode};
}
