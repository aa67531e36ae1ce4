//! Equivalence checking of IPv4 forwarding tables.
//!
//! Two tables are equivalent when every address resolves, by longest prefix match, to the same
//! next hop in both. [ver::diff] reports every block where they do not.
//!
//! ```
//! use fibeq::prelude::*;
//!
//! let loader = DefaultTableLoader::default();
//! let a = loader.load("10.0.0.0/8 1").unwrap();
//! let b = loader.load("10.0.0.0/9 1\n10.128.0.0/9 2").unwrap();
//! let report = a.diff(&b);
//! assert_eq!(ReportLine(&report[0]).to_string(), "10.128.0.0/9, 1, 2");
//! ```
pub use fibeq_core as core;
pub use fibeq_io as io;
pub use fibeq_trie as trie;
pub use fibeq_ver as ver;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use fibeq_core::prelude::*;
    #[doc(hidden)]
    pub use fibeq_io::prelude::*;
    #[doc(hidden)]
    pub use fibeq_trie::prelude::*;
    #[doc(hidden)]
    pub use fibeq_ver::prelude::*;
}
