//! End-to-end: ingest raw texts, build, dump to disk, reload, query
//! both ways.

use engine::{CorpusBuilder, SearchStore, SimpleNormalizer, StorePaths, DEFAULT_TOP_N};
use tempfile::tempdir;

const TEXTS: &[&str] = &[
    "The cat chased the dog around the garden.",
    "A dog and a fish can never be friends.",
    "Cats love fish more than anything else.",
];

fn build_store() -> SearchStore<SimpleNormalizer> {
    let mut builder = CorpusBuilder::new(SimpleNormalizer);
    let ids = builder.add_documents(TEXTS.iter().copied());
    assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
    builder.build().unwrap()
}

#[test]
fn boolean_queries_over_a_built_corpus() {
    let store = build_store();
    let ids: Vec<u32> = store.boolean_search("cat AND dog").unwrap().into_iter().collect();
    assert_eq!(ids, vec![0]);
    let ids: Vec<u32> = store.boolean_search("cats OR fish").unwrap().into_iter().collect();
    assert_eq!(ids, vec![1, 2]);
    let ids: Vec<u32> = store.boolean_search("NOT dog").unwrap().into_iter().collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn ranked_queries_prefer_heavier_overlap() {
    let store = build_store();
    let hits = store.ranked_search("fish friends", DEFAULT_TOP_N).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].doc_id, 1);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn dump_and_reload_preserve_semantics() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    let store = build_store();
    store.save(&paths).unwrap();

    let reloaded = SearchStore::load(SimpleNormalizer, &paths).unwrap();
    assert_eq!(store.index(), reloaded.index());
    assert_eq!(store.model(), reloaded.model());

    let before = store.ranked_search("cat fish", DEFAULT_TOP_N).unwrap();
    let after = reloaded.ranked_search("cat fish", DEFAULT_TOP_N).unwrap();
    assert_eq!(before, after);
}

#[test]
fn failed_documents_are_skipped_without_gaps() {
    let mut builder = CorpusBuilder::new(SimpleNormalizer);
    let ids = builder.add_documents(["cat dog", "12345 !!!", "dog fish"]);
    assert_eq!(ids, vec![Some(0), None, Some(1)]);
    let store = builder.build().unwrap();
    assert_eq!(store.index().num_docs(), 2);
    let ids: Vec<u32> = store.boolean_search("dog").unwrap().into_iter().collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn empty_corpus_refuses_to_build() {
    let builder = CorpusBuilder::new(SimpleNormalizer);
    assert!(builder.build().is_err());
}

#[test]
fn malformed_query_is_an_error_not_a_crash() {
    let store = build_store();
    let err = store.boolean_search("cat AND (dog OR").unwrap_err();
    assert!(err.reason.contains("term"));
}
