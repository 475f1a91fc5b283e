//! Corpus lifecycle: `Empty -> Indexed -> Queryable`.
//!
//! [`CorpusBuilder`] is the `Empty` state: it accepts raw document
//! texts, normalizes them and assigns ids. [`CorpusBuilder::build`]
//! produces a [`SearchStore`] (both the inverted index and the TF-IDF
//! model built, immediately queryable); [`SearchStore::load`] reaches
//! the same state from an on-disk dump. There is no incremental update:
//! a corpus change means a fresh builder and a full rebuild. All
//! corpus-scoped state lives in the store — queries share it read-only
//! and need no locking.

use rayon::prelude::*;
use std::collections::BTreeSet;

use crate::boolean;
use crate::error::{EngineError, ParseError};
use crate::index::InvertedIndex;
use crate::normalize::Normalizer;
use crate::persist::{self, StorePaths};
use crate::rank::{self, RankedHit};
use crate::vector::TfIdfModel;
use crate::DocId;

pub struct CorpusBuilder<N> {
    normalizer: N,
    docs: Vec<Vec<String>>,
}

impl<N: Normalizer> CorpusBuilder<N> {
    pub fn new(normalizer: N) -> Self {
        Self {
            normalizer,
            docs: Vec::new(),
        }
    }

    /// Normalize and ingest one document. Ids are assigned in call
    /// order, 0-based and contiguous; a document whose normalization
    /// fails is skipped with a warning and consumes no id.
    pub fn add_document(&mut self, text: &str) -> Option<DocId> {
        match self.normalizer.tokens(text) {
            Ok(tokens) => {
                let doc_id = self.docs.len() as DocId;
                self.docs.push(tokens);
                Some(doc_id)
            }
            Err(err) => {
                tracing::warn!(%err, "skipping document");
                None
            }
        }
    }

    /// Batch ingestion: normalization fans out across worker threads,
    /// id assignment stays sequential in input order so the result is
    /// identical to calling [`add_document`] per text.
    ///
    /// [`add_document`]: CorpusBuilder::add_document
    pub fn add_documents<'a, I>(&mut self, texts: I) -> Vec<Option<DocId>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let texts: Vec<&str> = texts.into_iter().collect();
        let normalized: Vec<_> = texts
            .par_iter()
            .map(|text| self.normalizer.tokens(text))
            .collect();
        normalized
            .into_iter()
            .map(|result| match result {
                Ok(tokens) => {
                    let doc_id = self.docs.len() as DocId;
                    self.docs.push(tokens);
                    Some(doc_id)
                }
                Err(err) => {
                    tracing::warn!(%err, "skipping document");
                    None
                }
            })
            .collect()
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Index and vectorize the ingested corpus. Fails on an empty
    /// corpus; on any failure nothing is published.
    pub fn build(self) -> Result<SearchStore<N>, EngineError> {
        if self.docs.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        let index = InvertedIndex::build(&self.docs);
        let model = TfIdfModel::build(&self.docs)?;
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            "corpus indexed"
        );
        Ok(SearchStore {
            normalizer: self.normalizer,
            index,
            model,
        })
    }
}

/// The `Queryable` state: immutable corpus-scoped structures plus the
/// normalizer that produced them. Queries borrow it; parsed expressions
/// and query vectors are request-scoped and dropped after each call.
pub struct SearchStore<N> {
    normalizer: N,
    index: InvertedIndex,
    model: TfIdfModel,
}

impl<N: Normalizer> SearchStore<N> {
    /// Persist the index and the per-document TF-IDF tables.
    pub fn save(&self, paths: &StorePaths) -> Result<(), EngineError> {
        persist::save_index(paths, &self.index)?;
        persist::save_model(paths, &self.model)?;
        Ok(())
    }

    /// Reload a dump written by [`save`]. The per-document vector files
    /// supply the document count; the normalizer must be the one the
    /// dump was built with.
    ///
    /// [`save`]: SearchStore::save
    pub fn load(normalizer: N, paths: &StorePaths) -> Result<Self, EngineError> {
        let num_docs = persist::count_doc_vectors(paths);
        if num_docs == 0 {
            return Err(EngineError::EmptyCorpus);
        }
        let index = persist::load_index(paths, num_docs)?;
        let model = persist::load_model(paths, num_docs)?;
        Ok(Self {
            normalizer,
            index,
            model,
        })
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn model(&self) -> &TfIdfModel {
        &self.model
    }

    /// Exact boolean retrieval.
    pub fn boolean_search(&self, query: &str) -> Result<BTreeSet<DocId>, ParseError> {
        boolean::search(query, &self.index, &self.normalizer)
    }

    /// Ranked retrieval. A query that normalizes to nothing matches
    /// nothing; that is an empty result, not an error.
    pub fn ranked_search(&self, query: &str, top_n: usize) -> Result<Vec<RankedHit>, EngineError> {
        let Ok(tokens) = self.normalizer.tokens(query) else {
            return Ok(Vec::new());
        };
        rank::rank(&tokens, &self.index, &self.model, top_n)
    }
}
