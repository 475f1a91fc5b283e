//! On-disk store for the built structures. Plain line-oriented text:
//!
//! - `inverted_index.txt` — one line per term, `term: [id1, id2, ...]`,
//!   ids ascending, terms sorted.
//! - `tfidf_doc_{id}.txt` — one file per document, one line per term:
//!   `term idf tfidf`, space-separated, sorted by term.
//! - `docs.tsv` — `doc_id<TAB>title`, the external-id/title table.
//!
//! Reloading reconstructs structures semantically identical to what was
//! serialized. A malformed line fails the whole load with a
//! `FormatError`; nothing is silently skipped.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::index::InvertedIndex;
use crate::vector::{DocumentVector, IdfTable, TfIdfModel, Vocabulary};
use crate::DocId;

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn inverted_index(&self) -> PathBuf {
        self.root.join("inverted_index.txt")
    }

    fn doc_vector(&self, doc_id: DocId) -> PathBuf {
        self.root.join(format!("tfidf_doc_{doc_id}.txt"))
    }

    fn titles(&self) -> PathBuf {
        self.root.join("docs.tsv")
    }
}

pub fn save_index(paths: &StorePaths, index: &InvertedIndex) -> Result<(), EngineError> {
    fs::create_dir_all(&paths.root)?;
    let mut w = BufWriter::new(File::create(paths.inverted_index())?);
    for (term, ids) in index.iter() {
        let list = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(w, "{term}: [{list}]")?;
    }
    w.flush()?;
    Ok(())
}

/// `num_docs` comes from the title table; postings must stay inside it.
pub fn load_index(paths: &StorePaths, num_docs: u32) -> Result<InvertedIndex, EngineError> {
    let path = paths.inverted_index();
    let reader = BufReader::new(File::open(&path)?);
    let mut postings: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (term, rest) = line
            .split_once(": ")
            .ok_or_else(|| EngineError::format(&path, lineno, "expected `term: [ids]`"))?;
        let body = rest
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| EngineError::format(&path, lineno, "postings list not bracketed"))?;
        if body.is_empty() {
            return Err(EngineError::format(&path, lineno, "empty postings list"));
        }
        let mut ids = Vec::new();
        for part in body.split(", ") {
            let id: DocId = part.parse().map_err(|_| {
                EngineError::format(&path, lineno, format!("bad document id {part:?}"))
            })?;
            if id >= num_docs {
                return Err(EngineError::format(
                    &path,
                    lineno,
                    format!("document id {id} out of range (corpus has {num_docs})"),
                ));
            }
            if ids.last().is_some_and(|&prev| prev >= id) {
                return Err(EngineError::format(
                    &path,
                    lineno,
                    "postings not strictly ascending",
                ));
            }
            ids.push(id);
        }
        if postings.insert(term.to_string(), ids).is_some() {
            return Err(EngineError::format(
                &path,
                lineno,
                format!("duplicate term {term:?}"),
            ));
        }
    }
    if postings.is_empty() {
        return Err(EngineError::format(&path, 0, "index file is empty"));
    }
    Ok(InvertedIndex::from_parts(postings, num_docs))
}

pub fn save_model(paths: &StorePaths, model: &TfIdfModel) -> Result<(), EngineError> {
    fs::create_dir_all(&paths.root)?;
    for doc_id in 0..model.num_docs() as DocId {
        // doc_id ranges over the model itself, so document() cannot miss
        let Some(vector) = model.document(doc_id) else {
            continue;
        };
        let mut w = BufWriter::new(File::create(paths.doc_vector(doc_id))?);
        for (term, tfidf) in vector {
            let idf = model.idf().get(term).unwrap_or(0.0);
            writeln!(w, "{term} {idf} {tfidf}")?;
        }
        w.flush()?;
    }
    Ok(())
}

/// Rebuild vocabulary, IDF table and per-document vectors by scanning
/// the per-document files in ascending id order, assigning vocabulary
/// slots in first-seen order exactly as the original serialization did.
pub fn load_model(paths: &StorePaths, num_docs: u32) -> Result<TfIdfModel, EngineError> {
    let mut vocabulary = Vocabulary::default();
    let mut idf = IdfTable::default();
    let mut doc_vectors = Vec::with_capacity(num_docs as usize);
    for doc_id in 0..num_docs {
        let path = paths.doc_vector(doc_id);
        let reader = BufReader::new(File::open(&path)?);
        let mut vector = DocumentVector::new();
        for (lineno, line) in reader.lines().enumerate() {
            let lineno = lineno + 1;
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(' ').collect();
            let &[term, idf_s, tfidf_s] = fields.as_slice() else {
                return Err(EngineError::format(
                    &path,
                    lineno,
                    "expected `term idf tfidf`",
                ));
            };
            let idf_v: f64 = idf_s.parse().map_err(|_| {
                EngineError::format(&path, lineno, format!("bad idf value {idf_s:?}"))
            })?;
            let tfidf_v: f64 = tfidf_s.parse().map_err(|_| {
                EngineError::format(&path, lineno, format!("bad tfidf value {tfidf_s:?}"))
            })?;
            if vector.insert(term.to_string(), tfidf_v).is_some() {
                return Err(EngineError::format(
                    &path,
                    lineno,
                    format!("duplicate term {term:?}"),
                ));
            }
            idf.insert(term, idf_v);
            vocabulary.intern(term);
        }
        doc_vectors.push(vector);
    }
    Ok(TfIdfModel::from_parts(vocabulary, idf, doc_vectors))
}

/// Number of documents in a dump: the per-document vector files are
/// named by contiguous ids, so count them from 0 upward.
pub fn count_doc_vectors(paths: &StorePaths) -> u32 {
    let mut n = 0;
    while paths.doc_vector(n).exists() {
        n += 1;
    }
    n
}

pub fn save_titles(paths: &StorePaths, titles: &[String]) -> Result<(), EngineError> {
    fs::create_dir_all(&paths.root)?;
    let mut w = BufWriter::new(File::create(paths.titles())?);
    for (doc_id, title) in titles.iter().enumerate() {
        writeln!(w, "{doc_id}\t{title}")?;
    }
    w.flush()?;
    Ok(())
}

pub fn load_titles(paths: &StorePaths) -> Result<Vec<String>, EngineError> {
    let path = paths.titles();
    let reader = BufReader::new(File::open(&path)?);
    let mut titles = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (id_s, title) = line
            .split_once('\t')
            .ok_or_else(|| EngineError::format(&path, lineno, "expected `doc_id<TAB>title`"))?;
        let id: usize = id_s.parse().map_err(|_| {
            EngineError::format(&path, lineno, format!("bad document id {id_s:?}"))
        })?;
        if id != titles.len() {
            return Err(EngineError::format(
                &path,
                lineno,
                format!("document ids not contiguous: expected {}, found {id}", titles.len()),
            ));
        }
        titles.push(title.to_string());
    }
    if titles.is_empty() {
        return Err(EngineError::format(&path, 0, "title table is empty"));
    }
    Ok(titles)
}
