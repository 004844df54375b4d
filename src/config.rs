//! Application configuration module / 应用配置模块
//!
//! Manages node configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::federation::DEFAULT_MIN_INTERVAL_MS;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Node identity / 节点信息
    pub node: NodeConfig,
    /// Federation configuration / 联邦配置
    pub federation: FederationConfig,
    /// Index sharing configuration / 索引共享配置
    pub index_sharing: IndexSharingConfig,
    /// Content directories / 内容目录
    pub content: ContentConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
    /// Public base URL used for absolute media links / 对外访问地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    pub description: String,
}

/// Federation configuration / 联邦配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationConfig {
    /// Minimum interval between accepted federated requests / 联邦请求最小间隔
    pub min_interval_ms: u64,
    pub default_timeout_ms: u64,
    /// Upper bound for caller-supplied timeouts / 超时上限
    pub max_timeout_ms: u64,
    /// Per-peer timeout for outbound fan-out / 单节点超时
    pub peer_timeout_ms: u64,
    pub default_poll_interval_ms: u64,
    pub peers: Vec<PeerConfig>,
}

/// Peer entry / 节点配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSharingConfig {
    pub enabled: bool,
    pub max_updates: usize,
}

/// Content directories / 内容目录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub music_dir: String,
    pub static_docs_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            public_address: None,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "Example Search Node".to_string(),
            description: "A node that provides search capabilities.".to_string(),
        }
    }
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            default_timeout_ms: 3000,
            max_timeout_ms: 30000,
            peer_timeout_ms: 3000,
            default_poll_interval_ms: 60000,
            peers: Vec::new(),
        }
    }
}

impl Default for IndexSharingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_updates: 100,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            music_dir: "music".to_string(),
            static_docs_dir: "demo/staticdocs".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Public base URL, without trailing slash / 获取对外访问地址
    pub fn get_public_address(&self) -> String {
        match &self.server.public_address {
            Some(addr) if !addr.trim().is_empty() => addr.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.server.port),
        }
    }

    pub fn get_music_dir(&self) -> PathBuf {
        PathBuf::from(&self.content.music_dir)
    }

    pub fn get_static_docs_dir(&self) -> PathBuf {
        PathBuf::from(&self.content.static_docs_dir)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.federation.min_interval_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.federation.default_timeout_ms)
    }

    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.federation.max_timeout_ms)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.federation.peer_timeout_ms)
    }

    pub fn default_poll_interval(&self) -> Duration {
        Duration::from_millis(self.federation.default_poll_interval_ms)
    }

    /// Peer base URLs in configuration order / 节点地址列表
    pub fn peer_urls(&self) -> Vec<String> {
        self.federation
            .peers
            .iter()
            .map(|p| p.url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect()
    }

    /// Apply environment overrides / 应用环境变量覆盖
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("SEARCH_NODE_CONFIG") {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env();
    Ok(config)
}

/// Load from an explicit path / 从指定路径加载配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.federation.min_interval_ms, 2000);
        assert!(!config.index_sharing.enabled);
        assert_eq!(config.get_public_address(), "http://localhost:4000");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "server": {"port": 5001, "public_address": "https://node.example/"},
                "federation": {"peers": [{"url": "http://peer-a:4000"}, {"url": " "}, {"url": "http://peer-b", "poll_interval_ms": 5000}]}
            }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.get_public_address(), "https://node.example");
        assert_eq!(config.federation.default_timeout_ms, 3000);
        assert_eq!(config.peer_urls(), vec!["http://peer-a:4000", "http://peer-b"]);
        assert_eq!(config.federation.peers[2].poll_interval_ms, Some(5000));
        assert_eq!(config.node.name, "Example Search Node");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_config_from(&path).unwrap_err().starts_with("Failed to parse"));
    }
}
