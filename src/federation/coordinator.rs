use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;
use crate::method::{SearchMethod, SearchMethodRegistry};
use crate::models::{RankingPreferences, SearchResult};
use crate::utils::{isolated, sanitize_query};

use super::RateLimiter;

/// Lifecycle of one federated request / 联邦搜索请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedPhase {
    Accepted,
    Dispatched,
    Completed,
    TimedOut,
    Failed,
}

impl fmt::Display for FederatedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FederatedPhase::Accepted => "accepted",
            FederatedPhase::Dispatched => "dispatched",
            FederatedPhase::Completed => "completed",
            FederatedPhase::TimedOut => "timed_out",
            FederatedPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs a provider's federated search under a hard deadline / 联邦搜索协调器
pub struct FederatedSearchCoordinator {
    registry: Arc<SearchMethodRegistry>,
    limiter: Arc<RateLimiter>,
    default_timeout: Duration,
    max_timeout: Duration,
}

impl FederatedSearchCoordinator {
    pub fn new(
        registry: Arc<SearchMethodRegistry>,
        limiter: Arc<RateLimiter>,
        default_timeout: Duration,
        max_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            limiter,
            default_timeout,
            max_timeout,
        }
    }

    /// Caller override, else the default; clamped to the maximum / 计算超时时间
    pub fn resolve_timeout(&self, timeout_ms: Option<u64>) -> Duration {
        timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
            .min(self.max_timeout)
    }

    /// Federated endpoint entry: validate, rate limit, look up, race / 联邦搜索入口
    pub async fn handle(
        &self,
        method_key: &str,
        query: &str,
        prefs: &RankingPreferences,
        timeout_ms: Option<u64>,
    ) -> Result<SearchResult, SearchError> {
        let query = sanitize_query(query)?;
        self.limiter.try_accept()?;
        tracing::debug!("Federated search {}: {} {:?}", FederatedPhase::Accepted, method_key, query);

        let method = self
            .registry
            .get(method_key)
            .ok_or_else(|| SearchError::UnknownMethod(method_key.to_string()))?;

        let timeout = self.resolve_timeout(timeout_ms);
        self.run_federated(method_key, method, query, prefs.clone(), timeout).await
    }

    /// Race the provider's federated operation against `timeout` / 与超时计时器竞争
    ///
    /// If the deadline wins, the provider task is left detached and its
    /// eventual result is discarded.
    pub async fn run_federated(
        &self,
        method_key: &str,
        method: Arc<dyn SearchMethod>,
        query: String,
        prefs: RankingPreferences,
        timeout: Duration,
    ) -> Result<SearchResult, SearchError> {
        if !method.supports_federation() {
            return Err(SearchError::UnsupportedMethod(method_key.to_string()));
        }

        let task = tokio::spawn(async move {
            isolated(method.federated_search(&query, &prefs, timeout)).await
        });
        tracing::debug!("Federated search {}: {} (deadline {:?})", FederatedPhase::Dispatched, method_key, timeout);

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(result))) => {
                tracing::debug!("Federated search {}: {}", FederatedPhase::Completed, method_key);
                Ok(result)
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!("Federated search {}: {} - {}", FederatedPhase::Failed, method_key, e);
                Err(SearchError::ProviderFailure(e.to_string()))
            }
            Ok(Err(join_error)) => {
                tracing::warn!("Federated search {}: {} - {}", FederatedPhase::Failed, method_key, join_error);
                Err(SearchError::ProviderFailure(join_error.to_string()))
            }
            Err(_) => {
                tracing::warn!("Federated search {}: {} after {:?}", FederatedPhase::TimedOut, method_key, timeout);
                Err(SearchError::TimedOut {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::IslandRegistry;
    use crate::test_utils::{Script, ScriptedMethod};
    use std::sync::atomic::Ordering;
    use tokio::time::Instant;

    fn coordinator(methods: Vec<Arc<ScriptedMethod>>, min_interval: Duration) -> FederatedSearchCoordinator {
        let mut registry = SearchMethodRegistry::new(Arc::new(IslandRegistry::new()));
        for method in methods {
            registry.register(method).unwrap();
        }
        FederatedSearchCoordinator::new(
            Arc::new(registry),
            Arc::new(RateLimiter::new(min_interval)),
            Duration::from_millis(3000),
            Duration::from_millis(30000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out() {
        let coordinator = coordinator(
            vec![ScriptedMethod::federated("hang", Script::Hang, Duration::ZERO)],
            Duration::ZERO,
        );

        let start = Instant::now();
        let err = coordinator
            .handle("hang", "rust", &RankingPreferences::new(), Some(1000))
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(err, SearchError::TimedOut { timeout_ms: 1000 });
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1050));
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_failure_is_not_a_timeout() {
        let coordinator = coordinator(
            vec![ScriptedMethod::federated("flaky", Script::Fail("index offline"), Duration::from_millis(500))],
            Duration::ZERO,
        );

        let err = coordinator
            .handle("flaky", "rust", &RankingPreferences::new(), Some(1000))
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::ProviderFailure("index offline".into()));
        assert_eq!(err.kind(), "provider_failure");
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_before_deadline() {
        let coordinator = coordinator(
            vec![ScriptedMethod::federated("docs", Script::Succeed, Duration::from_millis(100))],
            Duration::ZERO,
        );

        let result = coordinator
            .handle("docs", "rust", &RankingPreferences::new(), None)
            .await
            .unwrap();
        assert_eq!(result.answers, vec![ScriptedMethod::answer("rust")]);
    }

    #[tokio::test]
    async fn test_unsupported_and_unknown_methods() {
        let basic = ScriptedMethod::basic("music");
        let coordinator = coordinator(vec![basic.clone()], Duration::ZERO);

        let err = coordinator.handle("music", "rust", &RankingPreferences::new(), None).await.unwrap_err();
        assert_eq!(err, SearchError::UnsupportedMethod("music".into()));
        assert_eq!(basic.federated_calls.load(Ordering::SeqCst), 0);

        let err = coordinator.handle("ghost", "rust", &RankingPreferences::new(), None).await.unwrap_err();
        assert_eq!(err.kind(), "unknown_method");

        let err = coordinator.handle("music", " ", &RankingPreferences::new(), None).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_back_to_back() {
        let coordinator = coordinator(
            vec![ScriptedMethod::federated("docs", Script::Succeed, Duration::ZERO)],
            Duration::from_millis(2000),
        );
        let prefs = RankingPreferences::new();

        assert!(coordinator.handle("docs", "a", &prefs, None).await.is_ok());
        let err = coordinator.handle("docs", "b", &prefs, None).await.unwrap_err();
        assert!(matches!(err, SearchError::RateLimited { .. }));

        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(coordinator.handle("docs", "c", &prefs, None).await.is_ok());
    }

    #[test]
    fn test_resolve_timeout() {
        let coordinator = coordinator(vec![], Duration::ZERO);
        assert_eq!(coordinator.resolve_timeout(None), Duration::from_millis(3000));
        assert_eq!(coordinator.resolve_timeout(Some(250)), Duration::from_millis(250));
        assert_eq!(coordinator.resolve_timeout(Some(120_000)), Duration::from_millis(30000));
    }
}
