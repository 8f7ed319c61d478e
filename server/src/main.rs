use anyhow::Result;
use axum::Router;
use clap::Parser;
use docrank_core::{SearchConfig, DEFAULT_SIMILARITY_THRESHOLD};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Directory of .txt documents to serve
    #[arg(long, default_value = "./corpus")]
    corpus: String,
    /// Default minimum similarity for /search
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f64,
    /// Lowercase documents and queries
    #[arg(long, default_value_t = false)]
    case_fold: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = SearchConfig { similarity_threshold: args.threshold, case_fold: args.case_fold };
    let app: Router = build_app(args.corpus.clone(), config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
