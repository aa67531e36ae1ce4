use std::{fmt::Write, net::Ipv4Addr};

use fibeq_core::{NextHop, Prefix, PrefixError, ADDR_BITS, NO_ENTRY};
#[cfg(feature = "graphviz")]
use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec, parse,
    printer::PrinterContext,
};
use tracing::debug;

/// One bit boundary of the address space. A node at depth `d` stands for the block of all
/// addresses sharing its `d`-bit path.
#[derive(Debug, Default)]
pub struct TrieNode {
    hop: Option<NextHop>,
    lch: Option<Box<TrieNode>>,
    rch: Option<Box<TrieNode>>,
}

impl TrieNode {
    /// The next hop of the entry ending exactly here, if any.
    #[inline]
    pub fn next_hop(&self) -> Option<NextHop> {
        self.hop
    }

    #[inline]
    pub fn has_match(&self) -> bool {
        self.hop.is_some()
    }

    /// Left child for a 0 bit, right child for a 1 bit.
    #[inline]
    pub fn child(&self, bit: bool) -> Option<&TrieNode> {
        if bit {
            self.rch.as_deref()
        } else {
            self.lch.as_deref()
        }
    }

    #[inline]
    pub fn children(&self) -> (Option<&TrieNode>, Option<&TrieNode>) {
        (self.lch.as_deref(), self.rch.as_deref())
    }

    /// No more specific entry exists below this node.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.lch.is_none() && self.rch.is_none()
    }

    fn collect_entries(&self, path: Prefix, entries: &mut Vec<(Prefix, NextHop)>) {
        if let Some(hop) = self.hop {
            entries.push((path, hop));
        }
        if let Some(lch) = &self.lch {
            lch.collect_entries(path.child(false), entries);
        }
        if let Some(rch) = &self.rch {
            rch.collect_entries(path.child(true), entries);
        }
    }

    fn recursive_dump(&self, path: Prefix, out: &mut String) {
        let hop_str = match self.hop {
            Some(hop) => format!(" -- NextHop: {hop}"),
            None => String::from(" -- NextHop: None"),
        };
        // writing into a String cannot fail
        let _ = writeln!(out, "{}{:b}{hop_str}", "-".repeat(path.len()), path);
        if let Some(lch) = &self.lch {
            lch.recursive_dump(path.child(false), out);
        }
        if let Some(rch) = &self.rch {
            rch.recursive_dump(path.child(true), out);
        }
    }
}

/// A forwarding table as a binary trie over the 32-bit address space.
///
/// The trie is built by a sequence of insertions and then only read. Children are owned boxes,
/// dropping the trie releases every subtree.
#[derive(Debug, Default)]
pub struct PrefixTrie {
    root: TrieNode,
    entries: usize,
    nodes: usize,
}

impl PrefixTrie {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Number of distinct prefixes holding a next hop.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of nodes below the root.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Inserts `addr/len -> hop`. Host bits of `addr` are ignored.
    ///
    /// A length above 32 is rejected before the trie is touched. Inserting a prefix that is
    /// already present replaces its next hop (last write wins) and returns the old one.
    pub fn insert(
        &mut self,
        addr: impl Into<u32>,
        len: u32,
        hop: NextHop,
    ) -> Result<Option<NextHop>, PrefixError> {
        let prefix = Prefix::new(addr.into(), len)?;
        Ok(self.insert_prefix(prefix, hop))
    }

    /// Inserts an already validated prefix, see [PrefixTrie::insert].
    pub fn insert_prefix(&mut self, prefix: Prefix, hop: NextHop) -> Option<NextHop> {
        let mut created = 0;
        let mut node = &mut self.root;
        for bit in prefix.bits() {
            let slot = if bit { &mut node.rch } else { &mut node.lch };
            node = &mut **slot.get_or_insert_with(|| {
                created += 1;
                Box::default()
            });
        }
        self.nodes += created;
        let old = node.hop.replace(hop);
        match old {
            Some(old) => debug!(%prefix, old, new = hop, "next hop overwritten"),
            None => self.entries += 1,
        }
        old
    }

    /// Longest-prefix-match of `addr`: the deepest matching prefix on its path and its next hop.
    pub fn lookup_match(&self, addr: impl Into<u32>) -> Option<(Prefix, NextHop)> {
        let target = Prefix::from(Ipv4Addr::from(addr.into()));
        let mut best = None;
        let mut path = Prefix::root();
        let mut node = &self.root;
        loop {
            if let Some(hop) = node.hop {
                best = Some((path, hop));
            }
            if path.len() == ADDR_BITS {
                break;
            }
            let bit = target.bit(path.len());
            match node.child(bit) {
                Some(next) => {
                    node = next;
                    path = path.child(bit);
                }
                None => break,
            }
        }
        best
    }

    /// Next hop `addr` resolves to, [NO_ENTRY] when no prefix covers it.
    #[inline]
    pub fn lookup(&self, addr: impl Into<u32>) -> NextHop {
        self.lookup_match(addr).map_or(NO_ENTRY, |(_, hop)| hop)
    }

    /// Every stored entry, ordered by base address and then by length.
    pub fn entries(&self) -> Vec<(Prefix, NextHop)> {
        let mut entries = Vec::with_capacity(self.entries);
        self.root.collect_entries(Prefix::root(), &mut entries);
        entries
    }

    /// Indented rendering of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.root.recursive_dump(Prefix::root(), &mut out);
        out
    }
}

impl FromIterator<(Prefix, NextHop)> for PrefixTrie {
    fn from_iter<T: IntoIterator<Item = (Prefix, NextHop)>>(iter: T) -> Self {
        let mut trie = PrefixTrie::new();
        trie.extend(iter);
        trie
    }
}

impl Extend<(Prefix, NextHop)> for PrefixTrie {
    fn extend<T: IntoIterator<Item = (Prefix, NextHop)>>(&mut self, iter: T) {
        for (prefix, hop) in iter {
            self.insert_prefix(prefix, hop);
        }
    }
}

#[cfg(feature = "graphviz")]
#[allow(dead_code)]
pub trait GraphvizDebug {
    fn visualize(&self, filename: &str);
}

#[cfg(feature = "graphviz")]
impl GraphvizDebug for PrefixTrie {
    fn visualize(&self, filename: &str) {
        fn inner_rec(node: &TrieNode, path: Prefix) -> (String, String) {
            let path_str = format!("{:b}", path);
            let node_id = format!("node_{}", path_str.replace('/', "_"));
            let hop = node
                .hop
                .map_or_else(|| String::from("-"), |hop| hop.to_string());
            let mut graph = format!(
                r#"{node_id} [label="{{prefix: {path} | hop: {hop}}}"];
                "#,
            );
            for (bit, child) in [(false, &node.lch), (true, &node.rch)] {
                if let Some(child) = child {
                    let (c_id, c_graph) = inner_rec(child, path.child(bit));
                    let edge = format!(
                        r#"{node_id} -> {c_id} [label="{label}"];
                        "#,
                        label = u8::from(bit),
                    );
                    graph.push_str(&edge);
                    graph.push_str(&c_graph);
                }
            }
            (node_id, graph)
        }

        let (_, graph) = inner_rec(&self.root, Prefix::root());
        let graph_str = format!(
            r#"digraph PrefixTrie {{
            node [shape=record];
            {}
        }}"#,
            graph
        );
        let g = parse(&graph_str).expect("Wrong graphviz format");
        let _ = exec(
            g,
            &mut PrinterContext::default(),
            vec![
                Format::Pdf.into(),
                CommandArg::Output(String::from(filename)),
            ],
        );
    }
}
