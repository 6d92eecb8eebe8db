use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use search_core::{SearchConfig, SearchEngine, SearchHit};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

pub fn build_app<P: AsRef<Path>>(index_dir: P, config: SearchConfig) -> Result<Router> {
    let index_dir = index_dir.as_ref();
    let engine = SearchEngine::open(index_dir, config)
        .with_context(|| format!("loading index from {}", index_dir.display()))?;
    Ok(router(Arc::new(engine)))
}

/// Routes over an already opened engine.
pub fn router(engine: Arc<SearchEngine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search_body", get(search_body_handler))
        .route("/search_title", get(search_title_handler))
        .route("/search_anchor", get(search_anchor_handler))
        .route("/get_pagerank", post(pagerank_handler))
        .route("/get_pageview", post(pageview_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// Posting reads are blocking file I/O, so every query leaves the async workers.
async fn blocking<T, F>(state: AppState, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SearchEngine) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state.engine))
        .await
        .map(Json)
        .map_err(|err| {
            tracing::error!(%err, "query worker failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Vec<SearchHit>> {
    blocking(state, move |engine| engine.search(&params.query)).await
}

pub async fn search_body_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Vec<SearchHit>> {
    blocking(state, move |engine| engine.search_body(&params.query)).await
}

pub async fn search_title_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Vec<SearchHit>> {
    blocking(state, move |engine| engine.search_title(&params.query)).await
}

pub async fn search_anchor_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Vec<SearchHit>> {
    blocking(state, move |engine| engine.search_anchor(&params.query)).await
}

pub async fn pagerank_handler(State(state): State<AppState>, Json(ids): Json<Vec<Value>>) -> ApiResult<Vec<f64>> {
    let ids = id_strings(ids);
    blocking(state, move |engine| engine.get_authority(&ids[..])).await
}

pub async fn pageview_handler(State(state): State<AppState>, Json(ids): Json<Vec<Value>>) -> ApiResult<Vec<u64>> {
    let ids = id_strings(ids);
    blocking(state, move |engine| engine.get_views(&ids[..])).await
}

// Ids may arrive as JSON numbers or strings; anything else never matches.
fn id_strings(ids: Vec<Value>) -> Vec<String> {
    ids.into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_stringified() {
        let ids = id_strings(vec![json!(12), json!("34"), json!(null), json!(-1), json!(1.5)]);
        assert_eq!(ids, vec!["12", "34", "", "-1", "1.5"]);
    }
}
