//! This module provides loading of forwarding tables from text and rendering of diff reports.
//!
//! The default table format is a whitespace separated sequence of `<address>/<length> <hop>`
//! pairs, one per line by convention. `#` starts a comment running to the end of the line.
//! The address is a dotted quad or a single unsigned integer. The next hop is an unsigned
//! integer that fits in 32 bits, so a signed or negative hop is rejected as malformed.
//! ```text
//! # core router
//! 10.0.0.0/8     1
//! 10.128.0.0/9   2
//! 3232235776/24  3
//! ```
mod default;
mod error;
mod output;

use std::{fs, path::Path};

use nom::{error::ParseError, Finish, IResult};
use tracing::debug;

use fibeq_core::NextHop;
use fibeq_trie::PrefixTrie;

pub use crate::{
    default::DefaultTableLoader,
    error::LoadError,
    output::{write_report, ReportLine, EQUIVALENT},
};

/// One parsed table entry, before its prefix length is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibEntry {
    /// Byte offset of the entry in the loaded content.
    pub offset: usize,
    pub addr: u32,
    pub len: u32,
    pub hop: NextHop,
}

/// TableLoader parses the textual form of a forwarding table into a [PrefixTrie].
///
/// ***The trait is format-specific, implement [TableLoader::_load] for another format.***
pub trait TableLoader {
    // Required method
    fn _load<'x, E: ParseError<&'x str>>(&self, content: &'x str) -> IResult<(), Vec<FibEntry>, E>;

    // Provided methods

    /// Parses `content` and inserts every entry. Nothing is returned unless the whole table
    /// was accepted.
    fn load(&self, content: &str) -> Result<PrefixTrie, LoadError> {
        let res: Result<((), Vec<FibEntry>), nom::error::Error<&str>> =
            self._load(content).finish();
        match res {
            Ok((_, entries)) => default::build_trie(content, entries),
            Err(e) => Err(LoadError::malformed(content, e.input)),
        }
    }

    fn load_file(&self, path: impl AsRef<Path>) -> Result<PrefixTrie, LoadError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|source| LoadError::SourceUnavailable {
                path: path.to_owned(),
                source,
            })?;
        let trie = self.load(&content)?;
        debug!(
            path = %path.display(),
            entries = trie.len(),
            nodes = trie.node_count(),
            "table loaded"
        );
        Ok(trie)
    }
}

/// Basics for io
pub mod basic {
    /// Basic helper functions for parsing
    pub mod parser {
        use nom::branch::alt;
        use nom::character::complete::{char, multispace1, not_line_ending};
        use nom::combinator::recognize;
        use nom::error::ParseError;
        use nom::multi::{many0_count, many1_count};
        use nom::sequence::pair;
        use nom::IResult;

        pub use fibeq_core::parser::{
            parse_ipv4_dotted, parse_ipv4_num, parse_prefix_parts, parse_u32,
        };

        /// r"#[^\n]*"
        pub fn parse_comment<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            recognize(pair(char('#'), not_line_ending))(input)
        }

        /// Any run of whitespace and comments, possibly empty.
        pub fn parse_gap0<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            recognize(many0_count(alt((multispace1, parse_comment))))(input)
        }

        /// A non-empty run of whitespace and comments.
        pub fn parse_gap1<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            recognize(many1_count(alt((multispace1, parse_comment))))(input)
        }
    }
}

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        write_report, DefaultTableLoader, FibEntry, LoadError, ReportLine, TableLoader,
    };
}
