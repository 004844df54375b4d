use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use search_node::config;
use search_node::federation::{LoggingUpdateHandler, PeerDescriptor, PeerUpdatePoller};
use search_node::plugins::PluginContext;
use state::AppState;

/// Upper bound for any outbound plugin request / 插件外部请求超时
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn build_router(state: Arc<AppState>) -> Router {
    let music_dir = state.config.get_music_dir();
    let static_docs_dir = state.config.get_static_docs_dir();

    Router::new()
        .route("/health", get(api::server::health_check))
        .route("/metadata", get(api::meta::get_metadata))
        .route("/search", post(api::search::search))
        .route("/federated-search", post(api::search::federated_search))
        .route("/peers/search", post(api::search::peer_search))
        .route("/index-updates", get(api::updates::index_updates))
        // Static media / 静态资源
        .nest_service("/music", ServeDir::new(music_dir))
        .nest_service("/demo/staticdocs", ServeDir::new(static_docs_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "search_node=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Node {:?} will listen on {}", app_config.node.name, app_config.get_bind_address());

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    // Register all islands and search methods / 注册所有插件
    let ctx = PluginContext::from_config(&app_config, http.clone());
    let registry = search_node::register_plugins(&ctx).await?;

    // Poll configured peers for index updates / 轮询节点索引更新
    let peers: Vec<PeerDescriptor> = app_config
        .federation
        .peers
        .iter()
        .map(|p| PeerDescriptor::from_config(p, app_config.default_poll_interval()))
        .collect();
    let poller = PeerUpdatePoller::new(http.clone(), app_config.peer_timeout())
        .start(peers, Arc::new(LoggingUpdateHandler));
    tracing::info!("Polling {} peers for index updates", poller.len());

    let bind_addr = app_config.get_bind_address();
    let state = Arc::new(AppState::new(app_config, registry, http));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Search node running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.shutdown().await;
    Ok(())
}
