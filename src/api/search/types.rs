use serde::{Deserialize, Serialize};

use search_node::models::{FederatedSearchOutcome, RankingPreferences};

/// POST /search body / 搜索请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub ranking_preferences: Option<RankingPreferences>,
}

/// POST /federated-search body / 联邦搜索请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedSearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub ranking_preferences: Option<RankingPreferences>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// POST /peers/search body / 节点分发请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Forwarded to peers as-is / 透传给节点
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub ranking_preferences: Option<RankingPreferences>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PeerSearchResponse {
    pub query: String,
    pub outcomes: Vec<FederatedSearchOutcome>,
}
