use fibeq_core::{NextHop, Prefix, NO_ENTRY};
use fibeq_trie::{PrefixTrie, TrieNode};
use tracing::{debug, trace};

use crate::report::{DiffReport, DivergenceRecord};

/// Knobs of the paired traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Merge sibling blocks carrying identical hop pairs into their parent block. When off, the
    /// report holds the raw boundaries where both tries end.
    pub coalesce: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions { coalesce: true }
    }
}

/// Where one table stands on the current path.
#[derive(Debug, Clone, Copy)]
enum Side<'a> {
    Present(&'a TrieNode),
    /// The table has no more specific entry below this point.
    Absent,
}

impl<'a> From<Option<&'a TrieNode>> for Side<'a> {
    #[inline]
    fn from(node: Option<&'a TrieNode>) -> Self {
        node.map_or(Side::Absent, Side::Present)
    }
}

impl<'a> Side<'a> {
    /// The effective next hop below this point, given the one inherited from above.
    #[inline]
    fn resolve(&self, inherited: NextHop) -> NextHop {
        match self {
            Side::Present(node) => node.next_hop().unwrap_or(inherited),
            Side::Absent => inherited,
        }
    }

    /// Left and right continuation, `None` when nothing more specific exists.
    #[inline]
    fn split(&self) -> Option<(Side<'a>, Side<'a>)> {
        match self {
            Side::Present(node) if !node.is_leaf() => {
                let (lch, rch) = node.children();
                Some((lch.into(), rch.into()))
            }
            _ => None,
        }
    }
}

struct DiffWalker {
    options: DiffOptions,
    report: DiffReport,
}

impl DiffWalker {
    fn walk(&mut self, a: Side, b: Side, hop_a: NextHop, hop_b: NextHop, path: Prefix) {
        let hop_a = a.resolve(hop_a);
        let hop_b = b.resolve(hop_b);
        match (a.split(), b.split()) {
            (None, None) => self.emit(path, hop_a, hop_b),
            (Some((al, ar)), None) => {
                self.walk(al, Side::Absent, hop_a, hop_b, path.child(false));
                self.walk(ar, Side::Absent, hop_a, hop_b, path.child(true));
            }
            (None, Some((bl, br))) => {
                self.walk(Side::Absent, bl, hop_a, hop_b, path.child(false));
                self.walk(Side::Absent, br, hop_a, hop_b, path.child(true));
            }
            (Some((al, ar)), Some((bl, br))) => {
                self.walk(al, bl, hop_a, hop_b, path.child(false));
                self.walk(ar, br, hop_a, hop_b, path.child(true));
            }
        }
    }

    fn emit(&mut self, prefix: Prefix, hop_a: NextHop, hop_b: NextHop) {
        if hop_a == hop_b {
            return;
        }
        trace!(%prefix, hop_a, hop_b, "divergence");
        let record = DivergenceRecord {
            prefix,
            hop_a,
            hop_b,
        };
        if self.options.coalesce {
            self.report.push_coalesced(record);
        } else {
            self.report.push(record);
        }
    }
}

/// Compare two tables with the default options.
#[inline]
pub fn diff(a: &PrefixTrie, b: &PrefixTrie) -> DiffReport {
    diff_with(a, b, DiffOptions::default())
}

/// Every block where `a` and `b` resolve addresses to different next hops, in ascending address
/// order. Addresses no entry covers resolve to [NO_ENTRY].
pub fn diff_with(a: &PrefixTrie, b: &PrefixTrie, options: DiffOptions) -> DiffReport {
    let mut walker = DiffWalker {
        options,
        report: DiffReport::default(),
    };
    walker.walk(
        Side::Present(a.root()),
        Side::Present(b.root()),
        NO_ENTRY,
        NO_ENTRY,
        Prefix::root(),
    );
    debug!(
        records = walker.report.len(),
        addresses = walker.report.divergent_addresses(),
        "diff finished"
    );
    walker.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibeq_core::ipv4_prefix;

    fn table(entries: &[(&str, NextHop)]) -> PrefixTrie {
        entries
            .iter()
            .map(|(p, h)| (ipv4_prefix!(p), *h))
            .collect()
    }

    fn rendered(report: &DiffReport) -> Vec<String> {
        report
            .iter()
            .map(|r| format!("{} {} {}", r.prefix, r.hop_a, r.hop_b))
            .collect()
    }

    const RAW: DiffOptions = DiffOptions { coalesce: false };

    #[test]
    fn test_diff_changed_hop() {
        let a = table(&[("10.0.0.0/8", 1)]);
        let b = table(&[("10.0.0.0/8", 2)]);
        assert_eq!(rendered(&diff(&a, &b)), ["10.0.0.0/8 1 2"]);
        assert_eq!(rendered(&diff_with(&a, &b, RAW)), ["10.0.0.0/8 1 2"]);
    }

    #[test]
    fn test_diff_identical_tables() {
        let a = table(&[("10.0.0.0/8", 1)]);
        let b = table(&[("10.0.0.0/8", 1)]);
        assert!(diff(&a, &b).is_equivalent());
    }

    #[test]
    fn test_diff_split_only_where_hop_changes() {
        let a = table(&[("10.0.0.0/8", 1)]);
        let b = table(&[("10.0.0.0/9", 1), ("10.128.0.0/9", 2)]);
        assert_eq!(rendered(&diff(&a, &b)), ["10.128.0.0/9 1 2"]);
        assert_eq!(rendered(&diff_with(&a, &b, RAW)), ["10.128.0.0/9 1 2"]);
    }

    #[test]
    fn test_diff_against_empty_table() {
        let a = PrefixTrie::new();
        let b = table(&[("10.0.0.0/8", 1)]);
        assert_eq!(rendered(&diff(&a, &b)), ["10.0.0.0/8 0 1"]);
        assert!(diff(&a, &PrefixTrie::new()).is_equivalent());
    }

    #[test]
    fn test_diff_default_route() {
        let a = table(&[("0.0.0.0/0", 1)]);
        let b = table(&[("0.0.0.0/0", 2)]);
        assert_eq!(rendered(&diff(&a, &b)), ["0.0.0.0/0 1 2"]);
        // a default route equal to the only more specific one is still a divergence elsewhere
        let b = table(&[("10.0.0.0/8", 1)]);
        let report = diff(&a, &b);
        assert_eq!(report.len(), 8);
        assert_eq!(report.divergent_addresses(), (1 << 32) - (1 << 24));
        assert!(report.iter().all(|r| r.hops() == (1, 0)));
    }

    #[test]
    fn test_diff_redundant_entries_are_equivalent() {
        // a more specific entry repeating its parent hop changes nothing
        let a = table(&[("10.0.0.0/8", 1), ("10.1.0.0/16", 1)]);
        let b = table(&[("10.0.0.0/8", 1)]);
        assert!(diff(&a, &b).is_equivalent());
        assert!(diff_with(&a, &b, RAW).is_equivalent());
    }

    #[test]
    fn test_diff_asymmetric_depth_coalesced() {
        let a = table(&[("10.0.0.0/8", 1), ("10.1.0.0/16", 1)]);
        let b = table(&[("10.0.0.0/8", 2)]);
        // the raw walk ends at every side branch of the /16 path
        let raw = diff_with(&a, &b, RAW);
        assert_eq!(raw.len(), 9);
        assert_eq!(raw.divergent_addresses(), 1 << 24);
        assert_eq!(rendered(&diff(&a, &b)), ["10.0.0.0/8 1 2"]);
    }

    #[test]
    fn test_diff_nested_override() {
        let a = table(&[("10.0.0.0/8", 1), ("10.1.0.0/16", 2)]);
        let b = table(&[("10.0.0.0/8", 1), ("10.1.0.0/16", 3), ("10.1.1.0/24", 1)]);
        let report = diff(&a, &b);
        assert_eq!(report.divergent_addresses(), 1 << 16);
        assert_eq!(report.len(), 9);
        assert_eq!(report[0].prefix, ipv4_prefix!("10.1.0.0/24"));
        assert_eq!(report[1].prefix, ipv4_prefix!("10.1.1.0/24"));
        assert_eq!(report[1].hops(), (2, 1));
        assert!(report
            .iter()
            .enumerate()
            .all(|(i, r)| i == 1 || r.hops() == (2, 3)));
        assert_eq!(report.last().unwrap().prefix, ipv4_prefix!("10.1.128.0/17"));
    }

    #[test]
    fn test_diff_host_routes() {
        let a = table(&[("0.0.0.0/0", 1), ("255.255.255.255/32", 2)]);
        let b = table(&[("0.0.0.0/0", 1)]);
        for options in [DiffOptions::default(), RAW] {
            let report = diff_with(&a, &b, options);
            assert_eq!(rendered(&report), ["255.255.255.255/32 2 1"]);
            assert_eq!(report.divergent_addresses(), 1);
        }

        // adjacent hosts with different hop pairs stay apart
        let a = table(&[("10.0.0.1/32", 2)]);
        let b = table(&[("10.0.0.1/32", 3), ("10.0.0.0/32", 3)]);
        assert_eq!(
            rendered(&diff(&a, &b)),
            ["10.0.0.0/32 0 3", "10.0.0.1/32 2 3"]
        );

        // and fold into their /31 when the pairs match
        let b = table(&[("10.0.0.1/32", 3), ("10.0.0.0/32", 3)]);
        assert_eq!(rendered(&diff(&PrefixTrie::new(), &b)), ["10.0.0.0/31 0 3"]);
        assert_eq!(
            rendered(&diff_with(&PrefixTrie::new(), &b, RAW)),
            ["10.0.0.0/32 0 3", "10.0.0.1/32 0 3"]
        );
    }

    #[test]
    fn test_side_split() {
        let t = table(&[("128.0.0.0/1", 5)]);
        let root = Side::Present(t.root());
        let (l, r) = root.split().unwrap();
        assert!(matches!(l, Side::Absent));
        assert_eq!(r.resolve(9), 5);
        assert!(r.split().is_none());
        assert!(Side::Absent.split().is_none());
        assert_eq!(Side::Absent.resolve(9), 9);
        assert_eq!(root.resolve(9), 9);
    }
}
