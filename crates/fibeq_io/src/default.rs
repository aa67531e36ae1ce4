use fibeq_core::Prefix;
use fibeq_trie::PrefixTrie;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use nom::{
    character::complete::multispace1,
    combinator::all_consuming,
    error::ParseError,
    multi::separated_list0,
    sequence::tuple,
    IResult,
};
use tracing::debug;

use crate::{
    basic::parser::{parse_gap0, parse_gap1, parse_prefix_parts, parse_u32},
    error::{line_of, LoadError},
    FibEntry, TableLoader,
};

/// Loader of the `<address>/<length> <hop>` format.
#[derive(Default)]
pub struct DefaultTableLoader {}

impl TableLoader for DefaultTableLoader {
    fn _load<'x, E: ParseError<&'x str>>(&self, content: &'x str) -> IResult<(), Vec<FibEntry>, E> {
        let (rest, _) = parse_gap0(content)?;
        let (rest, entries) = separated_list0(parse_gap1, parse_entry(content))(rest)?;
        let (_, _) = all_consuming(parse_gap0)(rest)?;
        Ok(((), entries))
    }
}

/// Returns a closure that parses one `<address>/<length> <hop>` entry, remembering where in
/// `content` it starts.
fn parse_entry<'x, E>(content: &'x str) -> impl Fn(&'x str) -> IResult<&'x str, FibEntry, E>
where
    E: ParseError<&'x str>,
{
    move |input| {
        let offset = content.len() - input.len();
        let (rest, ((addr, len), _, hop)) =
            tuple((parse_prefix_parts, multispace1, parse_u32))(input)?;
        Ok((
            rest,
            FibEntry {
                offset,
                addr,
                len,
                hop,
            },
        ))
    }
}

/// Validates every entry and inserts it, a prefix listed twice keeps its last next hop. The
/// line index maps each prefix to the line that last set it, so an overwrite can name both lines.
pub(crate) fn build_trie(content: &str, entries: Vec<FibEntry>) -> Result<PrefixTrie, LoadError> {
    let mut trie = PrefixTrie::new();
    let mut defined_at: IndexMap<Prefix, usize, FxBuildHasher> =
        IndexMap::with_capacity_and_hasher(entries.len(), FxBuildHasher::default());
    let mut duplicates = 0usize;
    for entry in entries {
        let line = line_of(content, entry.offset);
        let prefix = Prefix::new(entry.addr, entry.len)
            .map_err(|source| LoadError::InvalidPrefix { line, source })?;
        let previous_line = defined_at.insert(prefix, line);
        if let Some(old) = trie.insert_prefix(prefix, entry.hop) {
            duplicates += 1;
            debug!(
                %prefix,
                old,
                new = entry.hop,
                line,
                previous_line,
                "duplicate prefix, keeping the last next hop"
            );
        }
    }
    if duplicates > 0 {
        debug!(
            duplicates,
            distinct = defined_at.len(),
            "table lists some prefixes more than once"
        );
    }
    Ok(trie)
}
