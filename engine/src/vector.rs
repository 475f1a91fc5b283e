//! TF-IDF weighting: `tf(t, d) = count(t in d) / total_tokens(d)`,
//! `idf(t) = ln(N / df(t))`, `tfidf = tf * idf`. One-shot batch over the
//! whole corpus: IDF needs the global document-frequency counts, so no
//! vector is emitted before every document has been counted.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::error::EngineError;
use crate::DocId;

/// Sparse TF-IDF weights for one document. An absent term has implicit
/// weight 0. Sorted by term for stable serialization.
pub type DocumentVector = BTreeMap<String, f64>;

/// Term -> dense slot, assigned in first-seen order scanning documents
/// in ascending id order (terms within a document in sorted order).
/// Defines the dimensionality of every vector; slots are never
/// reassigned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Vocabulary {
    slots: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn slot(&self, term: &str) -> Option<usize> {
        self.slots.get(term).copied()
    }

    /// Existing slot for a term, or the next free one.
    pub fn intern(&mut self, term: &str) -> usize {
        let next = self.slots.len();
        *self.slots.entry(term.to_string()).or_insert(next)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Corpus-wide inverse document frequencies. Terms never seen in the
/// corpus are absent, not stored as 0: a document frequency of 0 must
/// never reach the logarithm.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IdfTable {
    values: BTreeMap<String, f64>,
}

impl IdfTable {
    pub fn get(&self, term: &str) -> Option<f64> {
        self.values.get(term).copied()
    }

    pub(crate) fn insert(&mut self, term: &str, idf: f64) {
        self.values.insert(term.to_string(), idf);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The corpus-scoped output of vectorization: vocabulary, IDF table and
/// one TF-IDF vector per document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TfIdfModel {
    vocabulary: Vocabulary,
    idf: IdfTable,
    doc_vectors: Vec<DocumentVector>,
}

impl TfIdfModel {
    /// Batch-vectorize the corpus; the slice position is the `DocId`.
    /// Term counting runs per document in parallel; document-frequency
    /// aggregation and vocabulary assignment are sequential so both are
    /// deterministic.
    pub fn build(docs: &[Vec<String>]) -> Result<Self, EngineError> {
        if docs.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        let counts: Vec<(BTreeMap<&str, usize>, usize)> = docs
            .par_iter()
            .map(|tokens| {
                let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
                for t in tokens {
                    *tf.entry(t.as_str()).or_insert(0) += 1;
                }
                (tf, tokens.len())
            })
            .collect();

        let total_docs = docs.len() as f64;
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for (tf, _) in &counts {
            for term in tf.keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        let mut idf = IdfTable::default();
        for (term, d) in &df {
            idf.insert(term, (total_docs / f64::from(*d)).ln());
        }

        let mut vocabulary = Vocabulary::default();
        let mut doc_vectors = Vec::with_capacity(docs.len());
        for (tf, total) in &counts {
            let mut vector = DocumentVector::new();
            for (term, count) in tf {
                // df >= 1 for every counted term, so the idf exists.
                let weight = (*count as f64 / *total as f64) * idf.get(term).unwrap_or(0.0);
                vector.insert((*term).to_string(), weight);
                vocabulary.intern(term);
            }
            doc_vectors.push(vector);
        }

        Ok(Self {
            vocabulary,
            idf,
            doc_vectors,
        })
    }

    /// Reassemble from loaded parts (store loader).
    pub(crate) fn from_parts(
        vocabulary: Vocabulary,
        idf: IdfTable,
        doc_vectors: Vec<DocumentVector>,
    ) -> Self {
        Self {
            vocabulary,
            idf,
            doc_vectors,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IdfTable {
        &self.idf
    }

    pub fn num_docs(&self) -> usize {
        self.doc_vectors.len()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocumentVector> {
        self.doc_vectors.get(doc_id as usize)
    }

    /// Vectorize an ad-hoc query with query-local term frequency and
    /// the stored corpus IDF. Terms outside the corpus vocabulary get
    /// zero weight and never expand it.
    pub fn query_vector(&self, tokens: &[String]) -> Vec<f64> {
        let mut vec = vec![0.0; self.vocabulary.len()];
        if tokens.is_empty() {
            return vec;
        }
        let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
        for t in tokens {
            *tf.entry(t.as_str()).or_insert(0) += 1;
        }
        let total = tokens.len() as f64;
        for (term, count) in tf {
            if let (Some(slot), Some(idf)) = (self.vocabulary.slot(term), self.idf.get(term)) {
                vec[slot] = (count as f64 / total) * idf;
            }
        }
        vec
    }

    /// Embed a stored document vector into the shared vocabulary space.
    /// A term outside the vocabulary means the store is stale; that is
    /// fatal to the query, not silently dropped.
    pub fn document_vector(&self, doc_id: DocId) -> Result<Vec<f64>, EngineError> {
        let sparse = self
            .doc_vectors
            .get(doc_id as usize)
            .ok_or(EngineError::MissingVector(doc_id))?;
        let mut vec = vec![0.0; self.vocabulary.len()];
        for (term, weight) in sparse {
            let slot = self
                .vocabulary
                .slot(term)
                .ok_or_else(|| EngineError::DimensionMismatch { term: term.clone() })?;
            vec[slot] = *weight;
        }
        Ok(vec)
    }
}
