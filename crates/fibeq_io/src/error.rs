use std::path::PathBuf;

use fibeq_core::PrefixError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: malformed entry near `{near}`")]
    Malformed { line: usize, near: String },
    #[error("line {line}: {source}")]
    InvalidPrefix {
        line: usize,
        #[source]
        source: PrefixError,
    },
}

impl LoadError {
    /// Builds a [LoadError::Malformed] pointing at `rest`, the unparsed tail of `content`.
    pub(crate) fn malformed(content: &str, rest: &str) -> Self {
        let rest = rest.trim_start();
        let near = rest
            .split_whitespace()
            .next()
            .unwrap_or("<end of input>")
            .to_owned();
        LoadError::Malformed {
            line: line_of(content, content.len() - rest.len()),
            near,
        }
    }

    /// 1-based line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::SourceUnavailable { .. } => None,
            LoadError::Malformed { line, .. } | LoadError::InvalidPrefix { line, .. } => {
                Some(*line)
            }
        }
    }
}

/// 1-based line number of the byte at `offset`.
pub(crate) fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}
