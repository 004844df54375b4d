use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::island::{Island, IslandDescriptor, IslandTrigger, TriggerType};
use crate::models::RenderedIsland;
use crate::utils::escape_html;

const KEYWORDS: [&str; 1] = ["test island block"];

/// Demo island fired by a fixed keyword / 关键词触发的示例块
pub struct TestIsland;

#[async_trait]
impl Island for TestIsland {
    fn descriptor(&self) -> IslandDescriptor {
        IslandDescriptor::new("test", "Test", TriggerType::Query).manually_curated()
    }

    async fn should_render(&self, query: &str) -> Result<IslandTrigger> {
        if KEYWORDS.iter().any(|k| query.contains(k)) {
            Ok(IslandTrigger::render(json!({})))
        } else {
            Ok(IslandTrigger::Skip)
        }
    }

    fn render_island(&self, query: &str, _context: &Value) -> Result<RenderedIsland> {
        let html = format!("<div>Island for: {}</div>", escape_html(query));
        Ok(self.descriptor().rendered(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_trigger() {
        assert!(TestIsland.should_render("show the test island block").await.unwrap().should_render());
        assert!(!TestIsland.should_render("test island").await.unwrap().should_render());
    }

    #[test]
    fn test_render_escapes_query() {
        let island = TestIsland.render_island("<test island block>", &json!({})).unwrap();
        assert_eq!(island.id, "test");
        assert_eq!(island.column, "supporting");
        assert_eq!(island.html, "<div>Island for: &lt;test island block&gt;</div>");
    }
}
