use anyhow::Result;
use clap::{Parser, Subcommand};
use murmur_core::corpus::Message;
use murmur_core::index::Bm25Params;
use murmur_core::service;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, Read};
use std::path::PathBuf;

/// Payload accepted on stdin by `add`.
#[derive(Debug, Deserialize)]
struct AddPayload {
    #[serde(default)]
    docs: Vec<Message>,
}

#[derive(Parser)]
#[command(name = "murmur")]
#[command(about = "BM25 search over chat message archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus JSON file ({"docs": [...]})
    Build {
        /// Corpus JSON path
        #[arg(long)]
        corpus: PathBuf,
        /// Index blob path
        #[arg(long)]
        index: PathBuf,
        #[arg(long, env = "BM25_K1", default_value_t = 1.2)]
        k1: f64,
        #[arg(long, env = "BM25_B", default_value_t = 0.75)]
        b: f64,
    },
    /// Rank indexed messages against a query
    Search {
        /// Index blob path
        #[arg(long)]
        index: PathBuf,
        /// Query text
        #[arg(long)]
        query: String,
        /// Maximum number of results
        #[arg(long = "top_k", default_value_t = 50)]
        top_k: usize,
    },
    /// Append documents from a JSON payload on stdin and rebuild
    Add {
        /// Index blob path
        #[arg(long)]
        index: PathBuf,
        #[arg(long, env = "BM25_K1", default_value_t = 1.2)]
        k1: f64,
        #[arg(long, env = "BM25_B", default_value_t = 0.75)]
        b: f64,
    },
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            println!("{}", json!({"ok": false, "error": e.to_string()}));
            std::process::exit(1);
        }
    }
}

fn run(command: Commands) -> Result<serde_json::Value> {
    match command {
        Commands::Build { corpus, index, k1, b } => {
            let summary = service::build(&corpus, &index, Bm25Params { k1, b })?;
            Ok(json!({"ok": true, "docs": summary.docs, "ids": summary.ids}))
        }
        Commands::Search { index, query, top_k } => {
            let results = service::search(&index, &query, top_k)?;
            Ok(json!({"ok": true, "results": results}))
        }
        Commands::Add { index, k1, b } => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            let payload: AddPayload = serde_json::from_str(&raw)?;
            let added = service::add_documents(&index, &payload.docs, Bm25Params { k1, b })?;
            Ok(json!({"ok": true, "added": added}))
        }
    }
}
