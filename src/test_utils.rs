//! Test utilities shared by unit tests / 测试工具
//!
//! Only compiled when running tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::Router;

use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{Answer, RankingPreferences, SearchResult};

/// How a scripted provider's federated operation settles / 脚本化行为
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail(&'static str),
    Hang,
}

/// Provider spy with configurable federated behaviour / 可编程的测试搜索方法
pub struct ScriptedMethod {
    key: &'static str,
    federated: Option<Script>,
    delay: Duration,
    pub search_calls: AtomicUsize,
    pub federated_calls: AtomicUsize,
}

impl ScriptedMethod {
    pub fn basic(key: &'static str) -> Arc<Self> {
        Arc::new(Self {
            key,
            federated: None,
            delay: Duration::ZERO,
            search_calls: AtomicUsize::new(0),
            federated_calls: AtomicUsize::new(0),
        })
    }

    pub fn federated(key: &'static str, script: Script, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            key,
            federated: Some(script),
            delay,
            search_calls: AtomicUsize::new(0),
            federated_calls: AtomicUsize::new(0),
        })
    }

    pub fn answer(query: &str) -> Answer {
        Answer {
            name: "Scripted".to_string(),
            domain: "scripted.test".to_string(),
            url: "https://scripted.test".to_string(),
            snippet: format!("Result for query: {}", query),
            favicon: String::new(),
        }
    }
}

#[async_trait]
impl SearchMethod for ScriptedMethod {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(self.key, self.key, &format!("{} scripted search", self.key))
    }

    async fn search(&self, query: &str, _prefs: &RankingPreferences) -> Result<SearchResult> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if query == "explode" {
            return Err(anyhow!("provider exploded"));
        }
        Ok(SearchResult::new(vec![Self::answer(query)]))
    }

    fn supports_federation(&self) -> bool {
        self.federated.is_some()
    }

    async fn federated_search(
        &self,
        query: &str,
        _prefs: &RankingPreferences,
        _timeout: Duration,
    ) -> Result<SearchResult> {
        self.federated_calls.fetch_add(1, Ordering::SeqCst);
        match &self.federated {
            None => Err(anyhow!("Federated search not supported")),
            Some(Script::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            Some(Script::Succeed) => {
                tokio::time::sleep(self.delay).await;
                Ok(SearchResult::new(vec![Self::answer(query)]))
            }
            Some(Script::Fail(message)) => {
                tokio::time::sleep(self.delay).await;
                Err(anyhow!(*message))
            }
        }
    }
}

/// Serve `router` on an ephemeral local port, returning its base URL / 启动测试服务器
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}

/// Base URL of a port with nothing listening / 不可达地址
pub async fn dead_peer() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}
