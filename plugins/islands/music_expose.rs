use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::island::{Island, IslandDescriptor, IslandTrigger, TriggerType};
use crate::method::SearchMethod;
use crate::models::{RankingPreferences, RenderedIsland};
use crate::utils::escape_html;

use crate::plugins::methods::music::MusicSearch;

#[derive(Debug, Serialize, Deserialize)]
struct TrackContext {
    name: String,
    url: String,
    domain: String,
    snippet: String,
    favicon: String,
}

/// Shows the top local music match / 本地音乐推荐块
pub struct MusicExposeIsland {
    music: Arc<MusicSearch>,
}

impl MusicExposeIsland {
    pub fn new(music: Arc<MusicSearch>) -> Self {
        Self { music }
    }
}

#[async_trait]
impl Island for MusicExposeIsland {
    fn descriptor(&self) -> IslandDescriptor {
        IslandDescriptor::new("music-expose", "Music Exposé", TriggerType::SelfTriggered)
    }

    async fn should_render(&self, query: &str) -> Result<IslandTrigger> {
        let title = query.trim();
        if title.is_empty() {
            return Ok(IslandTrigger::Skip);
        }

        let result = self.music.search(title, &RankingPreferences::new()).await?;
        let Some(top) = result.answers.into_iter().next() else {
            return Ok(IslandTrigger::Skip);
        };
        let context = TrackContext {
            name: top.name,
            url: top.url,
            domain: top.domain,
            snippet: top.snippet,
            favicon: top.favicon,
        };
        Ok(IslandTrigger::render(serde_json::to_value(context)?))
    }

    fn render_island(&self, _query: &str, context: &Value) -> Result<RenderedIsland> {
        let ctx: TrackContext = serde_json::from_value(context.clone())?;
        let name = escape_html(&ctx.name);
        let favicon = if ctx.favicon.is_empty() {
            String::new()
        } else {
            format!(
                r#"<img src="{}" alt="favicon" class="music-expose-favicon">"#,
                escape_html(&ctx.favicon)
            )
        };

        let html = format!(
            concat!(
                r#"<div class="music-expose-island">"#,
                r#"<div class="music-expose-header">Music Exposé: {name}</div>"#,
                r#"<div class="music-expose-content">{favicon}"#,
                r#"<div class="music-expose-info"><a href="{url}" target="_blank">{name}</a>"#,
                r#"<div class="music-expose-artist">{domain}</div><div>{snippet}</div></div>"#,
                r#"</div></div>"#
            ),
            name = name,
            favicon = favicon,
            url = escape_html(&ctx.url),
            domain = escape_html(&ctx.domain),
            snippet = escape_html(&ctx.snippet),
        );
        Ok(self.descriptor().rendered(html))
    }
}
