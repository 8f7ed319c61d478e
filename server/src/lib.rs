use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use docrank_core::loader::load_corpus_dir;
use docrank_core::{BooleanQuery, Index, SearchConfig, SearchHit};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Overrides the configured similarity threshold for this request.
    pub threshold: Option<f64>,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    /// Clauses separated by newlines or `|`; terms within a clause are ANDed.
    pub q: String,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub query: String,
    pub ids: Vec<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub id: String,
    pub num_tokens: usize,
    pub num_terms: usize,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_docs: usize,
    pub num_terms: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub corpus_dir: PathBuf,
    pub config: SearchConfig,
    /// Swapped whole on rebuild; handlers work on the snapshot they cloned.
    pub index: Arc<RwLock<Arc<Index>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    fn snapshot(&self) -> Arc<Index> { self.index.read().clone() }
}

pub fn load_index(corpus_dir: &FsPath, config: SearchConfig) -> Result<Index> {
    let docs = load_corpus_dir(corpus_dir)?;
    Ok(Index::build_with_config(docs, config)?)
}

pub fn build_app(corpus_dir: impl Into<PathBuf>, config: SearchConfig) -> Result<Router> {
    let corpus_dir = corpus_dir.into();
    let index = load_index(&corpus_dir, config)?;
    tracing::info!(corpus = %corpus_dir.display(), num_docs = index.num_docs(), num_terms = index.num_terms(), "index loaded");
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { corpus_dir, config, index: Arc::new(RwLock::new(Arc::new(index))), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/doc/:id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let index = state.snapshot();
    let threshold = params.threshold.unwrap_or(state.config.similarity_threshold);
    let mut hits = index
        .search_with_threshold(&params.q, threshold)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let total_hits = hits.len();
    hits.truncate(params.k.clamp(1, 100));

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, "search");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results: hits }))
}

pub async fn match_handler(State(state): State<AppState>, Query(params): Query<MatchParams>) -> Result<Json<MatchResponse>, ApiError> {
    let index = state.snapshot();
    // split before normalizing, `|` is punctuation
    let query = BooleanQuery::from_lines(params.q.split(['\n', '|']), index.config().case_fold)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let ids = index.boolean_match(&query);
    Ok(Json(MatchResponse { query: params.q, ids }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DocResponse>, ApiError> {
    let index = state.snapshot();
    match index.document(&id) {
        Some(doc) => Ok(Json(DocResponse { id: doc.id.clone(), num_tokens: doc.tokens.len(), num_terms: doc.terms.len() })),
        None => Err((StatusCode::NOT_FOUND, format!("no document {id}"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let index = state.snapshot();
    Json(StatsResponse { num_docs: index.num_docs(), num_terms: index.num_terms() })
}

/// Re-reads the corpus directory and replaces the index in one swap.
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<StatsResponse>, ApiError> {
    authorize(&state, &headers)?;
    let dir = state.corpus_dir.clone();
    let config = state.config;
    let index = tokio::task::spawn_blocking(move || load_index(&dir, config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let stats = StatsResponse { num_docs: index.num_docs(), num_terms: index.num_terms() };
    *state.index.write() = Arc::new(index);
    tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "index rebuilt");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
