//! Error taxonomy / 错误分类
//!
//! Every failure that can reach the HTTP boundary has a stable kind string
//! and a status code, so callers never have to parse messages.

use thiserror::Error;

/// Search node errors / 搜索节点错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Missing/empty query or method, rejected before dispatch / 请求参数无效
    #[error("{0}")]
    Validation(String),

    #[error("Unknown search method: {0}")]
    UnknownMethod(String),

    #[error("Search method does not support federated search: {0}")]
    UnsupportedMethod(String),

    /// Federated endpoint called before the minimum interval elapsed / 请求过于频繁
    #[error("Rate limited, retry in {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("{0}")]
    ProviderFailure(String),

    /// Federated deadline elapsed before the provider settled / 联邦搜索超时
    #[error("Federated search timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u64 },

    #[error("Peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },
}

impl SearchError {
    pub fn validation(message: &str) -> Self {
        SearchError::Validation(message.to_string())
    }

    /// Stable machine-readable identifier / 稳定的错误标识
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Validation(_) => "validation_error",
            SearchError::UnknownMethod(_) => "unknown_method",
            SearchError::UnsupportedMethod(_) => "unsupported_method",
            SearchError::RateLimited { .. } => "rate_limited",
            SearchError::ProviderFailure(_) => "provider_failure",
            SearchError::TimedOut { .. } => "timed_out",
            SearchError::PeerUnreachable { .. } => "peer_unreachable",
        }
    }

    /// HTTP status code for the boundary response / 对应的HTTP状态码
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::Validation(_) => 400,
            SearchError::UnknownMethod(_) => 400,
            SearchError::UnsupportedMethod(_) => 501,
            SearchError::RateLimited { .. } => 429,
            SearchError::ProviderFailure(_) => 502,
            SearchError::TimedOut { .. } => 504,
            SearchError::PeerUnreachable { .. } => 502,
        }
    }
}

/// Plugin registration errors / 插件注册错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Plugin id must not be empty")]
    EmptyId,

    #[error("Plugin already registered: {0}")]
    Duplicate(String),

    #[error("Search method {method} allows unknown island: {island}")]
    UnknownIsland { method: String, island: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_federated_kinds_are_distinct() {
        let errors = [
            SearchError::RateLimited { retry_after_ms: 10 },
            SearchError::UnsupportedMethod("music".into()),
            SearchError::TimedOut { timeout_ms: 3000 },
            SearchError::ProviderFailure("boom".into()),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        let statuses: std::collections::HashSet<_> = errors.iter().map(|e| e.status_code()).collect();
        assert_eq!(kinds.len(), 4);
        assert_eq!(statuses.len(), 4);
    }

    #[test]
    fn test_messages() {
        assert_eq!(SearchError::validation("Missing query").to_string(), "Missing query");
        assert_eq!(
            SearchError::UnknownMethod("nope".into()).to_string(),
            "Unknown search method: nope"
        );
    }
}
