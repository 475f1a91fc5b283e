use std::path::PathBuf;
use thiserror::Error;

use crate::DocId;

/// Failure raised by a [`crate::normalize::Normalizer`] for a single
/// document. Recovered during a build: the document is skipped with a
/// warning and the build continues.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("normalization failed: {0}")]
pub struct NormalizationError(pub String);

/// Malformed boolean query. Carries the byte offset of the offending
/// token in the original query string.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{reason} at byte {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self { offset, reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A persisted index or vector file did not match the expected
    /// line format. Aborts the load; malformed lines are never skipped.
    #[error("{path}:{line}: {reason}")]
    Format {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A stored document vector references a term the current
    /// vocabulary does not know. Indicates a stale store; fatal to the
    /// query that hit it.
    #[error("term {term:?} is outside the current vocabulary (stale store?)")]
    DimensionMismatch { term: String },

    /// A candidate document has no stored vector. Same stale-store
    /// family as `DimensionMismatch`.
    #[error("no document vector stored for doc {0} (stale store?)")]
    MissingVector(DocId),

    #[error("corpus is empty: nothing to index")]
    EmptyCorpus,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn format(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Format {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
