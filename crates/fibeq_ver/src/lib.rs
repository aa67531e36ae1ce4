//! Defines the equivalence check between two forwarding tables.
//!
//! Both tries are walked side by side while the longest-prefix-match of each table is carried
//! down the shared path. Wherever both tables run out of more specific entries the block below
//! the path resolves to a single next hop per table, and a [DivergenceRecord] is emitted when the
//! two hops differ.
//!
//! ```
//! use fibeq_core::ipv4_prefix;
//! use fibeq_trie::PrefixTrie;
//! use fibeq_ver::TableDiff;
//!
//! let a: PrefixTrie = [(ipv4_prefix!("10.0.0.0/8"), 1)].into_iter().collect();
//! let b: PrefixTrie = [
//!     (ipv4_prefix!("10.0.0.0/9"), 1),
//!     (ipv4_prefix!("10.128.0.0/9"), 2),
//! ]
//! .into_iter()
//! .collect();
//! let report = a.diff(&b);
//! assert_eq!(report.len(), 1);
//! assert_eq!(report[0].prefix, ipv4_prefix!("10.128.0.0/9"));
//! assert_eq!((report[0].hop_a, report[0].hop_b), (1, 2));
//! ```
mod report;
mod traversal;

use fibeq_trie::PrefixTrie;

pub use crate::{
    report::{DiffReport, DivergenceRecord},
    traversal::{diff, diff_with, DiffOptions},
};

/// Comparison of one table against another.
pub trait TableDiff {
    fn diff_with(&self, other: &Self, options: DiffOptions) -> DiffReport;

    fn diff(&self, other: &Self) -> DiffReport {
        self.diff_with(other, DiffOptions::default())
    }

    fn equivalent_to(&self, other: &Self) -> bool {
        self.diff(other).is_equivalent()
    }
}

impl TableDiff for PrefixTrie {
    fn diff_with(&self, other: &Self, options: DiffOptions) -> DiffReport {
        diff_with(self, other, options)
    }
}

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{DiffOptions, DiffReport, DivergenceRecord, TableDiff};
}
