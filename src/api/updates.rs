use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use search_node::federation::build_index_updates;
use search_node::models::IndexUpdatesFeed;

use crate::api::ApiError;
use crate::state::AppState;

/// GET /index-updates - 索引更新列表（需开启索引共享）
pub async fn index_updates(State(state): State<Arc<AppState>>) -> Result<Json<IndexUpdatesFeed>, ApiError> {
    let sharing = &state.config.index_sharing;
    if !sharing.enabled {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Index sharing is disabled", "kind": "index_sharing_disabled"})),
        ));
    }

    let feed = build_index_updates(
        &state.config.get_static_docs_dir(),
        &state.config.node.name,
        sharing.max_updates,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to build index updates: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string(), "kind": "internal_error"})),
        )
    })?;
    Ok(Json(feed))
}
