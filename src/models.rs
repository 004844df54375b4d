use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form ranking/paging preferences passed through to providers / 排序偏好
pub type RankingPreferences = Map<String, Value>;

/// Single result entry / 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub name: String,
    #[serde(default)]
    pub domain: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub favicon: String,
}

/// Rendered supplementary block / 渲染后的补充内容块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedIsland {
    pub id: String,
    pub name: String,
    pub column: String,
    pub html: String,
}

/// Value returned per query, never mutated after return / 搜索结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub islands: Vec<RenderedIsland>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers, ..Default::default() }
    }

    /// Failed search: no answers, only an error message / 搜索失败
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: String) -> Self {
        self.html = Some(html);
        self
    }

    pub fn with_islands(mut self, islands: Vec<RenderedIsland>) -> Self {
        self.islands = islands;
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Filter definition advertised by a provider / 过滤器定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
}

/// Provider capability record / 搜索方法能力声明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supports {
    pub pagination: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
}

impl Supports {
    pub fn paginated(page_param: &str, page_size: u32) -> Self {
        Self {
            pagination: true,
            page_param: Some(page_param.to_string()),
            page_size: Some(page_size),
            filters: Vec::new(),
        }
    }
}

/// One entry of a peer's index-updates feed / 索引更新条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexUpdate {
    #[serde(rename = "type")]
    pub update_type: String,
    pub name: String,
    /// Modification time, milliseconds since epoch / 修改时间（毫秒）
    pub mtime: i64,
    pub size: u64,
}

/// Index-updates feed body / 索引更新响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexUpdatesFeed {
    pub node: String,
    pub updates: Vec<IndexUpdate>,
    pub timestamp: String,
}

/// Per-peer fan-out outcome; exactly one of `result`/`error` is set / 单个节点的联邦搜索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedSearchOutcome {
    pub peer: String,
    pub result: Option<SearchResult>,
    pub error: Option<String>,
}

impl FederatedSearchOutcome {
    pub fn success(peer: &str, result: SearchResult) -> Self {
        Self {
            peer: peer.to_string(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(peer: &str, error: String) -> Self {
        Self {
            peer: peer.to_string(),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supports_serialization() {
        let supports = Supports::paginated("p", 10);
        assert_eq!(
            serde_json::to_value(&supports).unwrap(),
            json!({"pagination": true, "pageParam": "p", "pageSize": 10, "filters": []})
        );
        assert_eq!(
            serde_json::to_value(Supports::default()).unwrap(),
            json!({"pagination": false, "filters": []})
        );
    }

    #[test]
    fn test_failed_result_shape() {
        let value = serde_json::to_value(SearchResult::failed("Music directory not found.")).unwrap();
        assert_eq!(value, json!({"answers": [], "islands": [], "error": "Music directory not found."}));
    }

    #[test]
    fn test_peer_result_is_lenient() {
        // Peers may omit optional fields
        let result: SearchResult = serde_json::from_value(json!({
            "answers": [{"name": "a", "url": "https://a.example"}]
        }))
        .unwrap();
        assert_eq!(result.answers[0].domain, "");
        assert!(result.islands.is_empty());
    }
}
