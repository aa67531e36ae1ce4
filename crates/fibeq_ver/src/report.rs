use std::ops::Deref;

use fibeq_core::{NextHop, Prefix};

/// A block where the two tables resolve every address differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DivergenceRecord {
    pub prefix: Prefix,
    pub hop_a: NextHop,
    pub hop_b: NextHop,
}

impl DivergenceRecord {
    #[inline]
    pub fn hops(&self) -> (NextHop, NextHop) {
        (self.hop_a, self.hop_b)
    }

    /// The same divergence seen from the other table.
    #[inline]
    pub fn swapped(&self) -> Self {
        DivergenceRecord {
            prefix: self.prefix,
            hop_a: self.hop_b,
            hop_b: self.hop_a,
        }
    }
}

/// Divergence records in ascending address order. Empty means the tables are equivalent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub vec: Vec<DivergenceRecord>,
}

impl DiffReport {
    #[inline]
    pub fn is_equivalent(&self) -> bool {
        self.vec.is_empty()
    }

    /// Number of addresses covered by the records.
    pub fn divergent_addresses(&self) -> u64 {
        self.vec.iter().map(|r| r.prefix.size()).sum()
    }

    #[inline]
    pub(crate) fn push(&mut self, record: DivergenceRecord) {
        debug_assert!(self.vec.last().map_or(true, |last| last.prefix < record.prefix));
        self.vec.push(record);
    }

    /// Appends `record`, folding it into its left sibling while both carry the same hops.
    pub(crate) fn push_coalesced(&mut self, mut record: DivergenceRecord) {
        loop {
            let merged = match self.vec.last() {
                Some(last)
                    if last.hops() == record.hops() && last.prefix.is_sibling_of(&record.prefix) =>
                {
                    record.prefix.parent()
                }
                _ => None,
            };
            match merged {
                Some(parent) => {
                    self.vec.pop();
                    record.prefix = parent;
                }
                None => break,
            }
        }
        self.push(record);
    }
}

impl FromIterator<DivergenceRecord> for DiffReport {
    fn from_iter<T: IntoIterator<Item = DivergenceRecord>>(iter: T) -> Self {
        DiffReport {
            vec: iter.into_iter().collect(),
        }
    }
}

impl Deref for DiffReport {
    type Target = Vec<DivergenceRecord>;
    fn deref(&self) -> &Self::Target {
        &self.vec
    }
}

impl AsRef<[DivergenceRecord]> for DiffReport {
    fn as_ref(&self) -> &[DivergenceRecord] {
        &self.vec
    }
}

impl IntoIterator for DiffReport {
    type Item = DivergenceRecord;
    type IntoIter = std::vec::IntoIter<DivergenceRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.vec.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffReport {
    type Item = &'a DivergenceRecord;
    type IntoIter = std::slice::Iter<'a, DivergenceRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.vec.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibeq_core::ipv4_prefix;

    fn record(prefix: &str, hop_a: NextHop, hop_b: NextHop) -> DivergenceRecord {
        DivergenceRecord {
            prefix: ipv4_prefix!(prefix),
            hop_a,
            hop_b,
        }
    }

    #[test]
    fn test_coalesce_cascades() {
        let mut report = DiffReport::default();
        report.push_coalesced(record("10.0.0.0/10", 1, 2));
        report.push_coalesced(record("10.64.0.0/10", 1, 2));
        assert_eq!(report.vec, vec![record("10.0.0.0/9", 1, 2)]);
        report.push_coalesced(record("10.128.0.0/10", 1, 2));
        report.push_coalesced(record("10.192.0.0/10", 1, 2));
        assert_eq!(report.vec, vec![record("10.0.0.0/8", 1, 2)]);
        assert_eq!(report.divergent_addresses(), 1 << 24);
    }

    #[test]
    fn test_coalesce_needs_equal_hops_and_siblings() {
        let mut report = DiffReport::default();
        report.push_coalesced(record("10.0.0.0/9", 1, 2));
        report.push_coalesced(record("10.128.0.0/9", 1, 3));
        report.push_coalesced(record("11.0.0.0/9", 1, 3));
        assert_eq!(report.len(), 3);
        assert!(!report.is_equivalent());
    }

    #[test]
    fn test_swapped() {
        let r = record("10.0.0.0/8", 1, 2);
        assert_eq!(r.swapped().hops(), (2, 1));
        assert_eq!(r.swapped().swapped(), r);
    }
}
