//! Indexing and query-evaluation engine for a small document search
//! system: inverted-index construction, boolean query evaluation,
//! TF-IDF vectorization and cosine-ranked retrieval, plus a plain-text
//! on-disk dump format. Text reaches the engine as already-normalized
//! token streams through the [`Normalizer`] trait; fetching, markup
//! stripping and morphology live outside.

pub mod boolean;
pub mod error;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod rank;
pub mod store;
pub mod vector;

/// Stable within a corpus snapshot: 0-based, contiguous, assigned at
/// ingestion time and never reused within a session.
pub type DocId = u32;

pub use boolean::QueryExpr;
pub use error::{EngineError, NormalizationError, ParseError};
pub use index::InvertedIndex;
pub use normalize::{Normalizer, SimpleNormalizer};
pub use persist::StorePaths;
pub use rank::{RankedHit, DEFAULT_TOP_N};
pub use store::{CorpusBuilder, SearchStore};
pub use vector::{DocumentVector, IdfTable, TfIdfModel, Vocabulary};
