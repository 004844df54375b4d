use std::sync::Arc;
use std::time::Instant;

use search_node::config::AppConfig;
use search_node::federation::{FederatedSearchCoordinator, PeerFanoutClient, RateLimiter};
use search_node::method::{SearchDispatcher, SearchMethodRegistry};

/// Shared application state / 应用共享状态
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<SearchMethodRegistry>,
    pub dispatcher: SearchDispatcher,
    pub coordinator: FederatedSearchCoordinator,
    pub fanout: PeerFanoutClient,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, registry: Arc<SearchMethodRegistry>, http: reqwest::Client) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.min_interval()));
        let coordinator = FederatedSearchCoordinator::new(
            registry.clone(),
            limiter,
            config.default_timeout(),
            config.max_timeout(),
        );
        let fanout = PeerFanoutClient::new(http, config.peer_timeout());

        Self {
            dispatcher: SearchDispatcher::new(registry.clone()),
            registry,
            coordinator,
            fanout,
            config,
            started_at: Instant::now(),
        }
    }
}
