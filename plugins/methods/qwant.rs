use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::island::IslandComposer;
use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{Answer, RankingPreferences, SearchResult};

const SEARCH_API: &str = "https://api.qwant.com/v3/search/web";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Qwant web search / Qwant网页搜索
pub struct QwantSearch {
    http: reqwest::Client,
    api_url: String,
    composer: IslandComposer,
}

impl QwantSearch {
    pub fn new(http: reqwest::Client, composer: IslandComposer) -> Self {
        Self::with_api_url(http, SEARCH_API, composer)
    }

    pub fn with_api_url(http: reqwest::Client, api_url: &str, composer: IslandComposer) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            composer,
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Answer>> {
        let resp = self
            .http
            .get(&self.api_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("count", "10"),
                ("q", query),
                ("t", "web"),
                ("uiv", "4"),
                ("tgp", "3"),
                ("locale", "en_US"),
            ])
            .send()
            .await?;
        let data: Value = resp.json().await?;
        Ok(parse_answers(&data))
    }
}

/// Flatten every `web` block of `data.result.items.mainline` / 解析网页结果
fn parse_answers(data: &Value) -> Vec<Answer> {
    let Some(mainline) = data
        .pointer("/data/result/items/mainline")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    mainline
        .iter()
        .filter(|block| block["type"] == "web")
        .filter_map(|block| block["items"].as_array())
        .flatten()
        .map(|item| {
            let text = |key: &str| item[key].as_str().unwrap_or_default().to_string();
            let url = text("url");
            let domain = url::Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            Answer {
                name: text("title"),
                domain,
                url,
                snippet: text("desc"),
                favicon: text("favicon"),
            }
        })
        .collect()
}

#[async_trait]
impl SearchMethod for QwantSearch {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new("qwant", "Qwant Search", "Performs a search using the Qwant API.")
            .allowed_islands(&["expose"])
    }

    async fn search(&self, query: &str, _prefs: &RankingPreferences) -> Result<SearchResult> {
        let answers = match self.fetch(query).await {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!("Qwant search failed: {}", e);
                return Ok(SearchResult::failed(e.to_string()));
            }
        };
        let allowed = self.descriptor().allowed_islands;
        let islands = self.composer.compose_islands(query, &allowed).await;
        Ok(SearchResult::new(answers).with_islands(islands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::IslandRegistry;
    use crate::test_utils::{dead_peer, spawn_server};
    use axum::{routing::get, Json, Router};
    use serde_json::json;
    use std::sync::Arc;

    fn qwant_body() -> Value {
        json!({
            "data": {"result": {"items": {"mainline": [
                {"type": "ads", "items": [{"title": "Ad", "url": "https://ad.example"}]},
                {"type": "web", "items": [
                    {"title": "Rust", "url": "https://www.rust-lang.org/learn", "desc": "A language", "favicon": "https://f.example/r.ico"},
                    {"title": "No url"}
                ]},
                {"type": "web", "items": [{"title": "Docs", "url": "https://doc.rust-lang.org", "desc": "Docs"}]}
            ]}}}
        })
    }

    #[test]
    fn test_parse_flattens_web_blocks() {
        let answers = parse_answers(&qwant_body());
        let names: Vec<_> = answers.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "No url", "Docs"]);
        assert_eq!(answers[0].domain, "www.rust-lang.org");
        assert_eq!(answers[1].domain, "");
        assert_eq!(answers[2].favicon, "");

        assert!(parse_answers(&json!({"status": "error"})).is_empty());
    }

    #[tokio::test]
    async fn test_search_against_api() {
        let base = spawn_server(Router::new().route("/search", get(|| async { Json(qwant_body()) }))).await;
        let composer = IslandComposer::new(Arc::new(IslandRegistry::new()));
        let qwant = QwantSearch::with_api_url(reqwest::Client::new(), &format!("{}/search", base), composer);

        let result = qwant.search("rust", &RankingPreferences::new()).await.unwrap();
        assert_eq!(result.answers.len(), 3);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_is_a_result_error() {
        let composer = IslandComposer::new(Arc::new(IslandRegistry::new()));
        let qwant = QwantSearch::with_api_url(reqwest::Client::new(), &dead_peer().await, composer);

        let result = qwant.search("rust", &RankingPreferences::new()).await.unwrap();
        assert!(result.answers.is_empty());
        assert!(result.error.is_some());
    }
}
