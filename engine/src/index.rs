use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::DocId;

/// Term -> sorted postings list. Stores occurrence only, not frequency:
/// a document posts to a term at most once. Immutable after
/// construction; a corpus change means a full rebuild.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Vec<DocId>>,
    num_docs: u32,
}

impl InvertedIndex {
    /// Build from token streams, one entry per document; the slice
    /// position is the `DocId`. Distinct-term extraction runs per
    /// document in parallel; the postings merge is sequential so lists
    /// come out ascending without a sort.
    pub fn build(docs: &[Vec<String>]) -> Self {
        let per_doc: Vec<BTreeSet<&str>> = docs
            .par_iter()
            .map(|tokens| tokens.iter().map(String::as_str).collect())
            .collect();

        let mut postings: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
        for (doc_id, terms) in per_doc.iter().enumerate() {
            for term in terms {
                postings
                    .entry((*term).to_string())
                    .or_default()
                    .push(doc_id as DocId);
            }
        }
        Self {
            postings,
            num_docs: docs.len() as u32,
        }
    }

    /// Reassemble from already-validated parts (used by the store
    /// loader). Postings must be unique and ascending per term.
    pub(crate) fn from_parts(postings: BTreeMap<String, Vec<DocId>>, num_docs: u32) -> Self {
        debug_assert!(postings
            .values()
            .all(|ids| ids.windows(2).all(|w| w[0] < w[1])));
        Self { postings, num_docs }
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn postings(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Terms with their postings, in sorted term order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        self.postings
            .iter()
            .map(|(term, ids)| (term.as_str(), ids.as_slice()))
    }

    /// The universal document set, for `NOT` complements.
    pub fn universe(&self) -> BTreeSet<DocId> {
        (0..self.num_docs).collect()
    }

    /// Union of the postings lists of the given terms: every document
    /// sharing at least one term with the query.
    pub fn candidates<'a>(&self, terms: impl IntoIterator<Item = &'a str>) -> BTreeSet<DocId> {
        let mut out = BTreeSet::new();
        for term in terms {
            if let Some(ids) = self.postings.get(term) {
                out.extend(ids.iter().copied());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn postings_are_unique_and_ascending() {
        let docs = vec![
            toks(&["cat", "dog", "cat", "cat"]),
            toks(&["dog", "fish"]),
            toks(&["cat", "fish"]),
        ];
        let index = InvertedIndex::build(&docs);
        assert_eq!(index.num_docs(), 3);
        assert_eq!(index.postings("cat"), Some(&[0, 2][..]));
        assert_eq!(index.postings("dog"), Some(&[0, 1][..]));
        assert_eq!(index.postings("fish"), Some(&[1, 2][..]));
        assert_eq!(index.postings("bird"), None);
    }

    #[test]
    fn build_is_deterministic() {
        let docs = vec![toks(&["b", "a"]), toks(&["a", "c"])];
        assert_eq!(InvertedIndex::build(&docs), InvertedIndex::build(&docs));
    }

    #[test]
    fn candidates_union_postings() {
        let docs = vec![toks(&["cat"]), toks(&["dog"]), toks(&["fish"])];
        let index = InvertedIndex::build(&docs);
        let cands = index.candidates(["cat", "fish", "unknown"]);
        assert_eq!(cands.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }
}
