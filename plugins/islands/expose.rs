use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::island::{Island, IslandDescriptor, IslandTrigger, TriggerType};
use crate::models::RenderedIsland;
use crate::utils::escape_html;

const SUMMARY_API: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const USER_AGENT: &str = "SearchNode/1.0";

/// Wikipedia page summary response (subset) / 维基百科摘要响应
#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(rename = "type", default)]
    page_type: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

/// Predicate context / 渲染上下文
#[derive(Debug, Serialize, Deserialize)]
struct ExposeContext {
    summary: String,
    image: Option<String>,
    title: String,
}

/// Wikipedia summary island / 维基百科摘要块
pub struct ExposeIsland {
    http: reqwest::Client,
    api_base: String,
}

impl ExposeIsland {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_api_base(http, SUMMARY_API)
    }

    pub fn with_api_base(http: reqwest::Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Island for ExposeIsland {
    fn descriptor(&self) -> IslandDescriptor {
        IslandDescriptor::new("expose", "Exposé", TriggerType::SelfTriggered)
    }

    async fn should_render(&self, query: &str) -> Result<IslandTrigger> {
        let title = query.trim();
        if title.is_empty() {
            return Ok(IslandTrigger::Skip);
        }

        // Wikipedia expects underscores for spaces
        let page = title.split_whitespace().collect::<Vec<_>>().join("_");
        let url = format!("{}/{}", self.api_base, urlencoding::encode(&page));
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::debug!("[Exposé] No summary for {:?} (status {})", title, resp.status());
            return Ok(IslandTrigger::Skip);
        }

        let summary: PageSummary = resp.json().await?;
        let suitable = matches!(summary.page_type.as_str(), "standard" | "disambiguation");
        match summary.extract {
            Some(extract) if suitable && !extract.is_empty() => {
                let context = ExposeContext {
                    summary: extract,
                    image: summary.thumbnail.map(|t| t.source),
                    title: summary.title.unwrap_or_else(|| title.to_string()),
                };
                Ok(IslandTrigger::render(serde_json::to_value(context)?))
            }
            _ => Ok(IslandTrigger::Skip),
        }
    }

    fn render_island(&self, _query: &str, context: &Value) -> Result<RenderedIsland> {
        let ctx: ExposeContext = serde_json::from_value(context.clone())?;
        let title = escape_html(&ctx.title);
        let image = ctx
            .image
            .map(|src| format!(r#"<img src="{}" alt="{}" class="expose-image">"#, escape_html(&src), title))
            .unwrap_or_default();

        let html = format!(
            r#"<div class="expose-island"><div class="image-container">{}</div><div class="content"><h1>{}</h1><p>{}</p></div></div>"#,
            image,
            title,
            escape_html(&ctx.summary)
        );
        Ok(self.descriptor().rendered(html))
    }
}
