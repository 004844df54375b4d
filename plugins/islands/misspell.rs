use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::island::{Island, IslandDescriptor, IslandTrigger, TriggerType};
use crate::models::RenderedIsland;
use crate::utils::escape_html;

const SUGGEST_API: &str = "https://api.datamuse.com/sug";
const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Deserialize)]
struct Suggestion {
    word: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MisspellContext {
    suggestion: String,
    suggestions: Vec<String>,
}

/// "Did you mean" island backed by Datamuse / 拼写建议块
pub struct MisspellIsland {
    http: reqwest::Client,
    api_url: String,
}

impl MisspellIsland {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_api_url(http, SUGGEST_API)
    }

    pub fn with_api_url(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
        }
    }
}

#[async_trait]
impl Island for MisspellIsland {
    fn descriptor(&self) -> IslandDescriptor {
        IslandDescriptor::new("misspell", "Misspell", TriggerType::SelfTriggered)
    }

    async fn should_render(&self, query: &str) -> Result<IslandTrigger> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(IslandTrigger::Skip);
        }

        let resp = self
            .http
            .get(&self.api_url)
            .query(&[("s", query)])
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::debug!("[misspell] Datamuse returned status {}", resp.status());
            return Ok(IslandTrigger::Skip);
        }

        let suggestions: Vec<Suggestion> = resp.json().await?;
        match suggestions.first() {
            Some(first) if first.word.to_lowercase() != query.to_lowercase() => {
                let context = MisspellContext {
                    suggestion: first.word.clone(),
                    suggestions: suggestions.into_iter().map(|s| s.word).collect(),
                };
                Ok(IslandTrigger::render(serde_json::to_value(context)?))
            }
            _ => Ok(IslandTrigger::Skip),
        }
    }

    fn render_island(&self, _query: &str, context: &Value) -> Result<RenderedIsland> {
        let ctx: MisspellContext = serde_json::from_value(context.clone())?;

        let others = if ctx.suggestions.len() > 1 {
            let words: Vec<String> = ctx
                .suggestions
                .iter()
                .skip(1)
                .take(3)
                .map(|w| format!("<span class=\"misspell-alt\">{}</span>", escape_html(w)))
                .collect();
            format!("<div class=\"misspell-others\">Other suggestions: {}</div>", words.join(", "))
        } else {
            String::new()
        };

        let html = format!(
            "<div class=\"serp-item__wrap misspell-island\"><span>Did you mean <b>{}</b>?</span>{}</div>",
            escape_html(&ctx.suggestion),
            others
        );
        Ok(self.descriptor().rendered(html))
    }
}
