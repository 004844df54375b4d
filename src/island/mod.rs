//! Island module - supplementary content blocks / 补充内容块模块
//!
//! Architecture principles / 架构原则：
//! - An island only exposes two primitives: a predicate and a pure renderer
//! - Core decides which islands are evaluated (allow-list) and in what order
//! - Islands never see each other and never see provider answers

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::RenderedIsland;

pub mod composer;
pub mod registry;

pub use composer::IslandComposer;
pub use registry::{IslandRegistry, RegisteredIsland};

/// How an island is triggered / 触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Always evaluated for a query with no contextual trigger / 自触发
    #[serde(rename = "self")]
    SelfTriggered,
    /// Fires only on keyword match / 关键词触发
    Query,
}

/// Island descriptor, immutable after registration / 补充内容块描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandDescriptor {
    pub id: String,
    pub name: String,
    pub trigger_type: TriggerType,
    /// Placement hint, opaque to the core / 布局提示
    pub column: String,
    pub require_context: bool,
    pub manually_curated: bool,
}

impl IslandDescriptor {
    pub fn new(id: &str, name: &str, trigger_type: TriggerType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            trigger_type,
            column: "supporting".to_string(),
            require_context: false,
            manually_curated: false,
        }
    }

    pub fn column(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    pub fn manually_curated(mut self) -> Self {
        self.manually_curated = true;
        self
    }

    /// Build the rendered block carrying this island's identity / 生成渲染结果
    pub fn rendered(&self, html: String) -> RenderedIsland {
        RenderedIsland {
            id: self.id.clone(),
            name: self.name.clone(),
            column: self.column.clone(),
            html,
        }
    }
}

/// Predicate outcome / 判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum IslandTrigger {
    Skip,
    Render { context: Value },
}

impl IslandTrigger {
    pub fn render(context: Value) -> Self {
        IslandTrigger::Render { context }
    }

    pub fn should_render(&self) -> bool {
        matches!(self, IslandTrigger::Render { .. })
    }
}

/// Island plugin interface / 补充内容块接口
#[async_trait]
pub trait Island: Send + Sync {
    fn descriptor(&self) -> IslandDescriptor;

    /// Decide whether to render for this query; may call external services / 判定是否渲染
    async fn should_render(&self, query: &str) -> Result<IslandTrigger>;

    /// Turn predicate context into a presentational fragment / 渲染
    fn render_island(&self, query: &str, context: &Value) -> Result<RenderedIsland>;
}
