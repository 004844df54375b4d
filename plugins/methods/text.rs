use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::island::IslandComposer;
use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{Answer, RankingPreferences, SearchResult};

const EXAMPLE_DOMAINS: [&str; 4] = ["example.com", "example.com", "example.ru", "example.ru"];

/// Example provider returning fixed answers / 示例文本搜索
pub struct TextSearch {
    composer: IslandComposer,
}

impl TextSearch {
    pub fn new(composer: IslandComposer) -> Self {
        Self { composer }
    }

    fn answers(query: &str) -> Vec<Answer> {
        EXAMPLE_DOMAINS
            .iter()
            .map(|domain| Answer {
                name: "Example Result".to_string(),
                domain: domain.to_string(),
                url: format!("https://{}", domain),
                snippet: format!("Result for query: {}", query),
                favicon: "https://example.com/favicon.ico".to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchMethod for TextSearch {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new("text", "Text Search", "Performs a simple text search.")
            .allowed_islands(&["test", "expose", "music-expose"])
    }

    async fn search(&self, query: &str, _prefs: &RankingPreferences) -> Result<SearchResult> {
        let allowed = self.descriptor().allowed_islands;
        let islands = self.composer.compose_islands(query, &allowed).await;
        Ok(SearchResult::new(Self::answers(query)).with_islands(islands))
    }

    fn supports_federation(&self) -> bool {
        true
    }

    /// Peers only get answers; islands are a local presentation concern / 联邦搜索仅返回结果
    async fn federated_search(
        &self,
        query: &str,
        _prefs: &RankingPreferences,
        _timeout: Duration,
    ) -> Result<SearchResult> {
        Ok(SearchResult::new(Self::answers(query)))
    }
}
