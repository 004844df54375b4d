// Built-in plugin package / 内置插件包
pub mod islands;
pub mod methods;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::island::IslandRegistry;
use crate::method::SearchMethodRegistry;

/// Shared resources handed to built-in plugins / 插件共享资源
#[derive(Clone)]
pub struct PluginContext {
    pub http: reqwest::Client,
    pub music_dir: PathBuf,
    pub static_docs_dir: PathBuf,
    /// Base URL prefixed to media links in rendered html / 对外访问地址
    pub public_address: String,
}

impl PluginContext {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            music_dir: config.get_music_dir(),
            static_docs_dir: config.get_static_docs_dir(),
            public_address: config.get_public_address(),
        }
    }
}

/// Register all islands, then all search methods / 注册所有插件
///
/// Islands go first so that allow-lists can be checked against them.
pub async fn register_all(ctx: &PluginContext) -> anyhow::Result<Arc<SearchMethodRegistry>> {
    let music = Arc::new(methods::music::MusicSearch::new(
        ctx.music_dir.clone(),
        &ctx.public_address,
    ));

    let mut island_registry = IslandRegistry::new();
    islands::register_all(&mut island_registry, ctx, music.clone())?;

    let mut registry = SearchMethodRegistry::new(Arc::new(island_registry));
    methods::register_all(&mut registry, ctx, music).await?;

    tracing::info!(
        "Registered {} search methods and {} islands",
        registry.len(),
        registry.islands().len()
    );
    Ok(Arc::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_registration_order() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = PluginContext {
            http: reqwest::Client::new(),
            music_dir: dir.path().join("music"),
            static_docs_dir: dir.path().join("docs"),
            public_address: "http://localhost:4000".to_string(),
        };

        let registry = register_all(&ctx).await.unwrap();
        assert_eq!(registry.keys(), vec!["text", "qwant", "music", "archive", "staticdocs"]);

        let island_ids: Vec<_> = registry.islands().iter().map(|i| i.id().to_string()).collect();
        assert_eq!(island_ids, vec!["test", "expose", "misspell", "music-expose"]);

        assert!(registry.get("text").unwrap().supports_federation());
        assert!(registry.get("staticdocs").unwrap().supports_federation());
        assert!(!registry.get("music").unwrap().supports_federation());
        assert!(registry.descriptor("archive").unwrap().allowed_islands.is_empty());
    }
}
