use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use search_node::federation::FanoutOptions;
use search_node::models::SearchResult;
use search_node::utils::{sanitize_method, sanitize_query};

use super::types::*;
use crate::api::{error_response, json_body, ApiError};
use crate::state::AppState;

/// POST /search - 本地搜索
///
/// Provider failures still answer 200 with `error` set.
pub async fn search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    let req = json_body(payload)?;
    let query = req.query.unwrap_or_default();
    let method = sanitize_method(req.method.as_deref()).map_err(error_response)?;
    let prefs = req.ranking_preferences.unwrap_or_default();

    let result = state
        .dispatcher
        .dispatch(&method, &query, &prefs)
        .await
        .map_err(error_response)?;
    Ok(Json(result))
}

/// POST /federated-search - 供其他节点调用的联邦搜索
pub async fn federated_search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FederatedSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    let req = json_body(payload)?;
    let query = req.query.unwrap_or_default();
    let method = sanitize_method(req.method.as_deref()).map_err(error_response)?;
    let prefs = req.ranking_preferences.unwrap_or_default();

    let result = state
        .coordinator
        .handle(&method, &query, &prefs, req.timeout_ms)
        .await
        .map_err(error_response)?;
    Ok(Json(result))
}

/// POST /peers/search - 向所有已配置节点分发查询
pub async fn peer_search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PeerSearchRequest>, JsonRejection>,
) -> Result<Json<PeerSearchResponse>, ApiError> {
    let req = json_body(payload)?;
    let query = sanitize_query(req.query.as_deref().unwrap_or_default()).map_err(error_response)?;

    let mut options = FanoutOptions {
        timeout: req
            .timeout_ms
            .map(|ms| Duration::from_millis(ms).min(state.config.max_timeout())),
        ranking_preferences: req.ranking_preferences.unwrap_or_default(),
        ..Default::default()
    };
    if let Some(method) = req.method {
        options.extra.insert("method".to_string(), json!(method));
    }

    let peers = state.config.peer_urls();
    let outcomes = state.fanout.fanout(&peers, &query, &options).await;
    Ok(Json(PeerSearchResponse { query, outcomes }))
}
