use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::persist::{load_titles, save_titles};
use engine::{
    CorpusBuilder, EngineError, SearchStore, SimpleNormalizer, StorePaths, DEFAULT_TOP_N,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    title: String,
    body: String,
}

#[derive(Parser)]
#[command(name = "searchctl")]
#[command(about = "Build and query a boolean / TF-IDF document index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and TF-IDF tables from JSON/JSONL documents
    Build {
        /// Input path (file or directory of .json/.jsonl files)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Evaluate a boolean query (AND/OR/NOT, parentheses)
    Boolean {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Query string, e.g. "cat AND (dog OR fish)"
        #[arg(long)]
        query: String,
    },
    /// Ranked retrieval by cosine similarity over TF-IDF vectors
    Rank {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Free-text query
        #[arg(long)]
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        /// Emit results as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build(&input, &output),
        Commands::Boolean { index, query } => boolean(&index, &query),
        Commands::Rank {
            index,
            query,
            top,
            json,
        } => rank(&index, &query, top, json),
    }
}

fn build(input: &str, output: &str) -> Result<()> {
    let docs = read_documents(Path::new(input))?;
    if docs.is_empty() {
        bail!("no documents found under {input}");
    }
    tracing::info!(num_docs = docs.len(), "read documents");

    let mut builder = CorpusBuilder::new(SimpleNormalizer);
    let assigned = builder.add_documents(docs.iter().map(|d| d.body.as_str()));
    let mut titles = Vec::with_capacity(builder.num_docs());
    for (doc, id) in docs.iter().zip(&assigned) {
        match id {
            Some(_) => titles.push(doc.title.clone()),
            None => tracing::warn!(id = %doc.id, "document excluded from this build"),
        }
    }

    let store = builder.build().context("index build failed")?;
    let paths = StorePaths::new(output);
    store.save(&paths)?;
    save_titles(&paths, &titles)?;
    tracing::info!(output, "index build complete");
    Ok(())
}

fn boolean(index_dir: &str, query: &str) -> Result<()> {
    let paths = StorePaths::new(index_dir);
    let store = SearchStore::load(SimpleNormalizer, &paths).context("failed to load index")?;
    let titles = load_titles(&paths)?;

    match store.boolean_search(query) {
        Ok(ids) => {
            for doc_id in ids {
                println!("{doc_id}\t{}", title(&titles, doc_id));
            }
        }
        Err(err) => eprintln!("query error: {err}"),
    }
    Ok(())
}

fn rank(index_dir: &str, query: &str, top: usize, json: bool) -> Result<()> {
    let paths = StorePaths::new(index_dir);
    let store = SearchStore::load(SimpleNormalizer, &paths).context("failed to load index")?;
    let titles = load_titles(&paths)?;

    let hits = match store.ranked_search(query, top) {
        Ok(hits) => hits,
        Err(err @ EngineError::DimensionMismatch { .. })
        | Err(err @ EngineError::MissingVector(_)) => {
            eprintln!("query error: {err}");
            Vec::new()
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        let out: Vec<serde_json::Value> = hits
            .iter()
            .map(|h| {
                serde_json::json!({
                    "doc_id": h.doc_id,
                    "title": title(&titles, h.doc_id),
                    "score": format!("{:.4}", h.score).parse::<f64>().unwrap_or(h.score),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for h in &hits {
            println!("{}\t{}\t{:.4}", h.doc_id, title(&titles, h.doc_id), h.score);
        }
    }
    Ok(())
}

fn title(titles: &[String], doc_id: u32) -> &str {
    titles
        .get(doc_id as usize)
        .map(String::as_str)
        .unwrap_or("(untitled)")
}

fn read_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("malformed document in {}", file.display()))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("malformed JSON in {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        other => docs.push(serde_json::from_value(other)?),
    }
    Ok(())
}
