use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docrank_core::loader::{load_corpus_dir, read_query_file};
use docrank_core::{Index, SearchConfig, SearchHit, DEFAULT_SIMILARITY_THRESHOLD};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Rank or match a directory of .txt documents against a query", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Directory holding the .txt documents
    #[arg(long)]
    corpus: PathBuf,
    /// Lowercase documents and queries before matching
    #[arg(long, default_value_t = false)]
    case_fold: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Query text
    #[arg(long, conflicts_with = "query_file", required_unless_present = "query_file")]
    query: Option<String>,
    /// File whose contents are the query
    #[arg(long)]
    query_file: Option<PathBuf>,
    /// Print JSON instead of plain text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Rank,
    Match,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents by TF-IDF cosine similarity
    Rank {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        query: QueryArgs,
        /// Minimum similarity for a document to be listed
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
    /// Boolean match: each query line is an AND-clause, lines are ORed
    Match {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Index once, then answer queries read from files named on stdin
    Shell {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// How each query file is answered
        #[arg(long, value_enum, default_value_t = Mode::Rank)]
        mode: Mode,
        /// Minimum similarity in rank mode
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
    /// Print corpus statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Serialize)]
struct RankOutput<'a> {
    query: &'a str,
    results: &'a [SearchHit],
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    query: &'a str,
    ids: &'a [String],
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank { corpus, query, threshold } => {
            let index = build_index(&corpus, threshold)?;
            let text = query_text(&query)?;
            print_rank(&index, &text, query.json)
        }
        Commands::Match { corpus, query } => {
            let index = build_index(&corpus, DEFAULT_SIMILARITY_THRESHOLD)?;
            let text = query_text(&query)?;
            print_match(&index, &text, query.json)
        }
        Commands::Shell { corpus, mode, threshold } => {
            let index = build_index(&corpus, threshold)?;
            shell(&index, mode)
        }
        Commands::Stats { corpus } => {
            let index = build_index(&corpus, DEFAULT_SIMILARITY_THRESHOLD)?;
            println!("documents: {}", index.num_docs());
            println!("terms:     {}", index.num_terms());
            Ok(())
        }
    }
}

fn build_index(args: &CorpusArgs, threshold: f64) -> Result<Index> {
    let config = SearchConfig { similarity_threshold: threshold, case_fold: args.case_fold };
    let docs = load_corpus_dir(&args.corpus)?;
    let index = Index::build_with_config(docs, config)?;
    tracing::info!(corpus = %args.corpus.display(), num_docs = index.num_docs(), "corpus indexed");
    Ok(index)
}

fn query_text(args: &QueryArgs) -> Result<String> {
    match (&args.query, &args.query_file) {
        (Some(q), _) => Ok(q.clone()),
        (None, Some(path)) => read_query_file(path),
        (None, None) => anyhow::bail!("either --query or --query-file is required"),
    }
}

fn print_rank(index: &Index, text: &str, json: bool) -> Result<()> {
    let query = index.try_query_vector(text).unwrap_or_else(|err| {
        tracing::warn!(%err, "query has no terms");
        vec![0.0; index.num_terms()]
    });
    let hits = index.search_vector(&query, index.config().similarity_threshold);
    if json {
        println!("{}", serde_json::to_string_pretty(&RankOutput { query: text, results: &hits })?);
    } else if hits.is_empty() {
        println!("no document is more similar than {}", index.config().similarity_threshold);
    } else {
        for hit in &hits {
            println!("{:.6}\t{}", hit.score, hit.id);
        }
    }
    Ok(())
}

fn print_match(index: &Index, text: &str, json: bool) -> Result<()> {
    let ids = index.boolean_match_text(text).context("invalid boolean query")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&MatchOutput { query: text, ids: &ids })?);
    } else if ids.is_empty() {
        println!("no document matches the query");
    } else {
        for id in &ids {
            println!("{id}");
        }
    }
    Ok(())
}

fn shell(index: &Index, mode: Mode) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("query file> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let path = line.trim();
        if path.is_empty() { break; }

        let result = read_query_file(path).and_then(|text| match mode {
            Mode::Rank => print_rank(index, &text, false),
            Mode::Match => print_match(index, &text, false),
        });
        if let Err(err) = result {
            eprintln!("error: {err:#}");
        }
    }
    Ok(())
}
