pub mod config;
pub mod error;
pub mod federation;
pub mod island;
pub mod method;
pub mod models;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Built-in plugins (point to project root plugins via path attribute) / 内置插件
#[path = "../plugins/mod.rs"]
pub mod plugins;

// Register all built-in islands and search methods / 注册所有内置插件
pub async fn register_plugins(
    ctx: &plugins::PluginContext,
) -> anyhow::Result<std::sync::Arc<method::SearchMethodRegistry>> {
    plugins::register_all(ctx).await
}
