// Built-in search methods / 内置搜索方法
pub mod archive;
pub mod music;
pub mod qwant;
pub mod staticdocs;
pub mod text;

use std::sync::Arc;

use crate::error::RegistryError;
use crate::island::IslandComposer;
use crate::method::SearchMethodRegistry;

use super::PluginContext;

/// Register all built-in search methods / 注册所有搜索方法
pub async fn register_all(
    registry: &mut SearchMethodRegistry,
    ctx: &PluginContext,
    music: Arc<music::MusicSearch>,
) -> Result<(), RegistryError> {
    let composer = IslandComposer::new(registry.islands().clone());

    // Example answers / 示例文本搜索
    registry.register(Arc::new(text::TextSearch::new(composer.clone())))?;
    // Qwant web search / Qwant网页搜索
    registry.register(Arc::new(qwant::QwantSearch::new(ctx.http.clone(), composer.clone())))?;
    // Local music files / 本地音乐
    registry.register(music)?;
    // Wayback Machine timeline / 网页时光机
    registry.register(Arc::new(archive::ArchiveTimeline::new(ctx.http.clone(), composer)))?;
    // Static documents, loaded once / 静态文档
    let docs = staticdocs::StaticDocSearch::load(&ctx.static_docs_dir).await;
    registry.register(Arc::new(docs))?;
    Ok(())
}
