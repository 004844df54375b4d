// Built-in islands / 内置补充内容块
pub mod expose;
pub mod misspell;
pub mod music_expose;
pub mod test_island;

use std::sync::Arc;

use crate::error::RegistryError;
use crate::island::IslandRegistry;

use super::methods::music::MusicSearch;
use super::PluginContext;

/// Register all built-in islands; order here is display order / 注册所有补充内容块
pub fn register_all(
    registry: &mut IslandRegistry,
    ctx: &PluginContext,
    music: Arc<MusicSearch>,
) -> Result<(), RegistryError> {
    // Keyword-triggered demo block / 示例补充内容块
    registry.register(Arc::new(test_island::TestIsland))?;
    // Wikipedia summary / 维基百科摘要
    registry.register(Arc::new(expose::ExposeIsland::new(ctx.http.clone())))?;
    // Spelling suggestions / 拼写建议
    registry.register(Arc::new(misspell::MisspellIsland::new(ctx.http.clone())))?;
    // Top local music match / 本地音乐
    registry.register(Arc::new(music_expose::MusicExposeIsland::new(music)))?;
    Ok(())
}
