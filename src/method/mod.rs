//! Search method module - pluggable search providers / 搜索方法模块
//!
//! Follow architecture principles / 遵循架构原则：
//! - Core only calls SearchMethod, providers only provide capabilities / Core只调用SearchMethod
//! - Routing, validation and failure conversion live in Core / 路由、校验与错误转换在Core层
//! - Federated search is an optional capability declared by the provider / 联邦搜索为可选能力

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{RankingPreferences, SearchResult, Supports};

pub mod dispatcher;
pub mod registry;

pub use dispatcher::SearchDispatcher;
pub use registry::{NodeMetadata, SearchMethodRegistry};

/// Search method descriptor / 搜索方法描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    /// Unique registry key / 唯一标识
    pub key: String,
    pub name: String,
    pub description: String,
    pub supports: Supports,
    /// Islands this provider may ever attach; empty means none / 允许附加的补充内容块
    #[serde(default)]
    pub allowed_islands: Vec<String>,
}

impl MethodDescriptor {
    pub fn new(key: &str, name: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            supports: Supports::default(),
            allowed_islands: Vec::new(),
        }
    }

    pub fn supports(mut self, supports: Supports) -> Self {
        self.supports = supports;
        self
    }

    pub fn allowed_islands(mut self, islands: &[&str]) -> Self {
        self.allowed_islands = islands.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Search provider interface / 搜索方法接口
///
/// `search` should surface ordinary network/provider failures as
/// `SearchResult::failed`; an `Err` is still converted by the dispatcher.
#[async_trait]
pub trait SearchMethod: Send + Sync {
    fn descriptor(&self) -> MethodDescriptor;

    async fn search(&self, query: &str, prefs: &RankingPreferences) -> Result<SearchResult>;

    /// Whether `federated_search` is implemented / 是否支持联邦搜索
    fn supports_federation(&self) -> bool {
        false
    }

    /// Federated variant called on behalf of a peer node / 联邦搜索
    async fn federated_search(
        &self,
        query: &str,
        prefs: &RankingPreferences,
        timeout: Duration,
    ) -> Result<SearchResult> {
        let _ = (query, prefs, timeout);
        Err(anyhow!("Federated search not supported"))
    }
}
