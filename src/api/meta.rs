use axum::{extract::State, Json};
use std::sync::Arc;

use search_node::method::NodeMetadata;

use crate::state::AppState;

/// GET /metadata - 节点元数据，每次请求从注册表重新生成
pub async fn get_metadata(State(state): State<Arc<AppState>>) -> Json<NodeMetadata> {
    let node = &state.config.node;
    Json(state.registry.metadata(&node.name, &node.description))
}
