use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};

use crate::error::SearchError;
use crate::models::{FederatedSearchOutcome, RankingPreferences, SearchResult};

/// Per-call fan-out options / 联邦分发选项
#[derive(Debug, Clone, Default)]
pub struct FanoutOptions {
    /// Per-peer timeout; the client default applies when unset / 单节点超时
    pub timeout: Option<Duration>,
    pub ranking_preferences: RankingPreferences,
    /// Extra fields merged into each peer request body / 附加请求字段
    pub extra: Map<String, Value>,
}

/// Issues one federated-search call per peer / 联邦搜索分发客户端
#[derive(Clone)]
pub struct PeerFanoutClient {
    http: reqwest::Client,
    default_timeout: Duration,
}

impl PeerFanoutClient {
    pub fn new(http: reqwest::Client, default_timeout: Duration) -> Self {
        Self { http, default_timeout }
    }

    /// Query every peer concurrently and wait for all to settle / 并发查询所有节点
    ///
    /// One outcome per input peer, in input order. Total latency is bounded by
    /// the per-peer timeout, not the sum of peer latencies.
    pub async fn fanout(
        &self,
        peers: &[String],
        query: &str,
        options: &FanoutOptions,
    ) -> Vec<FederatedSearchOutcome> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let body = request_body(query, options);

        let calls = peers.iter().map(|peer| {
            let body = &body;
            async move {
                match self.call_peer(peer, body, timeout).await {
                    Ok(result) => FederatedSearchOutcome::success(peer, result),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        FederatedSearchOutcome::failure(peer, e.to_string())
                    }
                }
            }
        });
        let outcomes = join_all(calls).await;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!("Fan-out for {:?}: {}/{} peers answered", query, succeeded, outcomes.len());
        outcomes
    }

    async fn call_peer(&self, peer: &str, body: &Value, timeout: Duration) -> Result<SearchResult, SearchError> {
        let url = format!("{}/federated-search", peer.trim_end_matches('/'));
        let unreachable = |reason: String| SearchError::PeerUnreachable {
            peer: peer.to_string(),
            reason,
        };

        let request = async {
            let resp = self
                .http
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| unreachable(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(unreachable(format!("status {}", resp.status().as_u16())));
            }
            resp.json::<SearchResult>()
                .await
                .map_err(|e| unreachable(format!("invalid response: {}", e)))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(unreachable("Timeout".to_string())),
        }
    }
}

/// `{...extra, query, rankingPreferences}`; the query always wins / 构造请求体
fn request_body(query: &str, options: &FanoutOptions) -> Value {
    let mut body = options.extra.clone();
    body.insert("query".to_string(), Value::String(query.to_string()));
    body.insert(
        "rankingPreferences".to_string(),
        Value::Object(options.ranking_preferences.clone()),
    );
    Value::Object(body)
}
