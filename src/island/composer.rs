use std::sync::Arc;

use futures::future::join_all;

use crate::models::RenderedIsland;
use crate::utils::isolated;

use super::{IslandRegistry, IslandTrigger, RegisteredIsland};

/// Per-island evaluation outcome / 单个补充内容块的执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum IslandOutcome {
    Rendered(RenderedIsland),
    Skipped,
    Failed(String),
}

/// Selects and renders islands for a query / 补充内容块组装器
#[derive(Clone)]
pub struct IslandComposer {
    registry: Arc<IslandRegistry>,
}

impl IslandComposer {
    pub fn new(registry: Arc<IslandRegistry>) -> Self {
        Self { registry }
    }

    /// Evaluate every allowed island, isolating failures / 逐个执行允许的补充内容块
    ///
    /// Predicates run concurrently; the returned sequence is in registry
    /// order filtered by `allow_list`, whatever order they settle in.
    /// An empty allow-list evaluates nothing.
    pub async fn evaluate<S: AsRef<str>>(
        &self,
        query: &str,
        allow_list: &[S],
    ) -> Vec<(String, IslandOutcome)> {
        let eligible: Vec<&RegisteredIsland> = self
            .registry
            .iter()
            .filter(|entry| allow_list.iter().any(|id| id.as_ref() == entry.id()))
            .collect();

        if eligible.is_empty() {
            return Vec::new();
        }

        let runs = eligible.into_iter().map(|entry| async move {
            let island = entry.island();
            let outcome = isolated(async {
                match island.should_render(query).await? {
                    IslandTrigger::Skip => Ok(None),
                    IslandTrigger::Render { context } => {
                        island.render_island(query, &context).map(Some)
                    }
                }
            })
            .await;

            let outcome = match outcome {
                Ok(Some(rendered)) => IslandOutcome::Rendered(rendered),
                Ok(None) => IslandOutcome::Skipped,
                Err(e) => {
                    tracing::warn!("Island {} failed for query {:?}: {}", entry.id(), query, e);
                    IslandOutcome::Failed(e.to_string())
                }
            };
            (entry.id().to_string(), outcome)
        });

        join_all(runs).await
    }

    /// Rendered fragments in display order, never an error / 组装补充内容块
    pub async fn compose_islands<S: AsRef<str>>(
        &self,
        query: &str,
        allow_list: &[S],
    ) -> Vec<RenderedIsland> {
        let outcomes = self.evaluate(query, allow_list).await;
        let rendered: Vec<RenderedIsland> = outcomes
            .into_iter()
            .filter_map(|(_, outcome)| match outcome {
                IslandOutcome::Rendered(island) => Some(island),
                _ => None,
            })
            .collect();
        tracing::debug!("Composed {} islands for query {:?}", rendered.len(), query);
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::{Island, IslandDescriptor, TriggerType};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behaviour {
        Fire,
        Skip,
        Fail,
        Panic,
    }

    struct FakeIsland {
        id: &'static str,
        delay: Duration,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeIsland {
        fn new(id: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Self::delayed(id, behaviour, Duration::ZERO)
        }

        fn delayed(id: &'static str, behaviour: Behaviour, delay: Duration) -> Arc<Self> {
            Arc::new(Self { id, delay, behaviour, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl Island for FakeIsland {
        fn descriptor(&self) -> IslandDescriptor {
            IslandDescriptor::new(self.id, self.id, TriggerType::SelfTriggered)
        }

        async fn should_render(&self, query: &str) -> Result<IslandTrigger> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.behaviour {
                Behaviour::Fire => Ok(IslandTrigger::render(json!({ "q": query }))),
                Behaviour::Skip => Ok(IslandTrigger::Skip),
                Behaviour::Fail => Err(anyhow!("upstream down")),
                Behaviour::Panic => panic!("island bug"),
            }
        }

        fn render_island(&self, _query: &str, context: &Value) -> Result<RenderedIsland> {
            Ok(self.descriptor().rendered(format!("{}:{}", self.id, context["q"].as_str().unwrap_or(""))))
        }
    }

    fn composer(islands: Vec<Arc<FakeIsland>>) -> IslandComposer {
        let mut registry = IslandRegistry::new();
        for island in islands {
            registry.register(island).unwrap();
        }
        IslandComposer::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_empty_allow_list_denies_all() {
        let a = FakeIsland::new("a", Behaviour::Fire);
        let b = FakeIsland::new("b", Behaviour::Fire);
        let composer = composer(vec![a.clone(), b.clone()]);

        let none: [&str; 0] = [];
        assert!(composer.compose_islands("q", &none).await.is_empty());
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_only_allowed_islands_are_evaluated() {
        let a = FakeIsland::new("a", Behaviour::Fire);
        let b = FakeIsland::new("b", Behaviour::Fire);
        let composer = composer(vec![a.clone(), b.clone()]);

        let rendered = composer.compose_islands("q", &["b", "unknown"]).await;
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].id, "b");
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_follows_registry_not_latency() {
        let slow = FakeIsland::delayed("slow", Behaviour::Fire, Duration::from_millis(500));
        let fast = FakeIsland::delayed("fast", Behaviour::Fire, Duration::from_millis(5));
        let composer = composer(vec![slow, fast]);

        // allow-list order does not matter either
        let rendered = composer.compose_islands("rust", &["fast", "slow"]).await;
        let ids: Vec<&str> = rendered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["slow", "fast"]);
        assert_eq!(rendered[0].html, "slow:rust");
    }

    #[tokio::test]
    async fn test_failing_island_is_isolated() {
        let broken = FakeIsland::new("broken", Behaviour::Fail);
        let crashing = FakeIsland::new("crashing", Behaviour::Panic);
        let quiet = FakeIsland::new("quiet", Behaviour::Skip);
        let good = FakeIsland::new("good", Behaviour::Fire);
        let composer = composer(vec![broken, crashing, quiet, good]);

        let allow = ["broken", "crashing", "quiet", "good"];
        let rendered = composer.compose_islands("q", &allow).await;
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].id, "good");

        let outcomes = composer.evaluate("q", &allow).await;
        assert!(matches!(outcomes[0].1, IslandOutcome::Failed(ref m) if m.contains("upstream down")));
        assert!(matches!(outcomes[1].1, IslandOutcome::Failed(ref m) if m.contains("island bug")));
        assert_eq!(outcomes[2].1, IslandOutcome::Skipped);
        assert!(matches!(outcomes[3].1, IslandOutcome::Rendered(_)));
    }
}
