use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PeerConfig;
use crate::models::IndexUpdate;

/// A configured federation peer / 联邦节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDescriptor {
    pub url: String,
    pub poll_interval: Duration,
}

impl PeerDescriptor {
    pub fn new(url: &str, poll_interval: Duration) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            poll_interval,
        }
    }

    pub fn from_config(config: &PeerConfig, default_interval: Duration) -> Self {
        let interval = config
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(default_interval);
        Self::new(&config.url, interval)
    }
}

/// Receives update batches; every tick re-delivers the peer's full list,
/// so implementations must be idempotent / 节点更新处理器
#[async_trait]
pub trait PeerUpdateHandler: Send + Sync {
    async fn on_updates(&self, peer: &PeerDescriptor, updates: Vec<IndexUpdate>);
}

/// Logs static document updates received from peers / 记录节点更新
pub struct LoggingUpdateHandler;

#[async_trait]
impl PeerUpdateHandler for LoggingUpdateHandler {
    async fn on_updates(&self, peer: &PeerDescriptor, updates: Vec<IndexUpdate>) {
        for update in updates.iter().filter(|u| u.update_type == "staticdoc") {
            tracing::info!(
                "[Peer Update] From {}: {} ({} bytes, mtime {})",
                peer.url,
                update.name,
                update.size,
                update.mtime
            );
        }
    }
}

/// Periodically pulls each peer's index-updates feed / 节点更新轮询器
#[derive(Clone)]
pub struct PeerUpdatePoller {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl PeerUpdatePoller {
    pub fn new(http: reqwest::Client, request_timeout: Duration) -> Self {
        Self { http, request_timeout }
    }

    /// Start one background task per peer with a URL / 为每个节点启动轮询任务
    pub fn start(&self, peers: Vec<PeerDescriptor>, handler: Arc<dyn PeerUpdateHandler>) -> PollerHandle {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for peer in peers {
            if peer.url.is_empty() {
                continue;
            }
            if peer.poll_interval.is_zero() {
                tracing::warn!("Peer {} has a zero poll interval, skipped", peer.url);
                continue;
            }
            tracing::info!("Polling peer {} every {:?}", peer.url, peer.poll_interval);
            tasks.spawn(self.clone().run(peer, handler.clone(), cancel.clone()));
        }

        PollerHandle { cancel, tasks }
    }

    async fn run(self, peer: PeerDescriptor, handler: Arc<dyn PeerUpdateHandler>, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + peer.poll_interval, peer.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.poll_once(&peer).await {
                Ok(Some(updates)) => handler.on_updates(&peer, updates).await,
                Ok(None) => tracing::debug!("Peer {} returned a malformed update feed", peer.url),
                // Peer may be offline
                Err(e) => tracing::debug!("Peer {} poll failed: {}", peer.url, e),
            }
        }
        tracing::debug!("Stopped polling peer {}", peer.url);
    }

    /// Fetch one snapshot; `None` when `updates` is not a list / 拉取一次更新
    pub async fn poll_once(&self, peer: &PeerDescriptor) -> Result<Option<Vec<IndexUpdate>>> {
        let url = format!("{}/index-updates", peer.url);
        let resp = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("status {}", resp.status().as_u16()));
        }

        let data: Value = resp.json().await?;
        let Some(entries) = data.get("updates").and_then(Value::as_array) else {
            return Ok(None);
        };

        let updates: Vec<IndexUpdate> = entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect();
        if updates.len() < entries.len() {
            tracing::debug!(
                "Peer {}: skipped {} malformed update entries",
                peer.url,
                entries.len() - updates.len()
            );
        }
        Ok(Some(updates))
    }
}

/// Owns the polling tasks; dropping it aborts them / 轮询任务句柄
pub struct PollerHandle {
    cancel: CancellationToken,
    tasks: JoinSet<()>,
}

impl PollerHandle {
    /// Number of running peer tasks / 正在运行的任务数
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stop every peer task and wait for them to exit / 停止所有轮询
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Peer poll task ended abnormally: {}", e);
            }
        }
        tracing::info!("Peer update poller stopped");
    }
}
