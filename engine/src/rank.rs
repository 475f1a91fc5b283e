//! Ranked retrieval: cosine similarity between the query's TF-IDF
//! vector and each candidate document's vector. Candidates are bounded
//! by the inverted index to documents sharing at least one query term;
//! the rest of the corpus is never scored.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::index::InvertedIndex;
use crate::vector::TfIdfModel;
use crate::DocId;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    pub doc_id: DocId,
    pub score: f64,
}

/// 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Up to `top_n` hits sorted by descending score, ties broken by
/// ascending document id. Zero-score documents are dropped before
/// truncation. Pure: no side effects beyond the returned list.
pub fn rank(
    query_tokens: &[String],
    index: &InvertedIndex,
    model: &TfIdfModel,
    top_n: usize,
) -> Result<Vec<RankedHit>, EngineError> {
    let query_vec = model.query_vector(query_tokens);
    let distinct: BTreeSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let candidates = index.candidates(distinct);

    let mut hits = Vec::with_capacity(candidates.len());
    for doc_id in candidates {
        let doc_vec = model.document_vector(doc_id)?;
        let score = cosine_similarity(&query_vec, &doc_vec);
        if score > 0.0 {
            hits.push(RankedHit { doc_id, score });
        }
    }
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    hits.truncate(top_n);
    Ok(hits)
}
