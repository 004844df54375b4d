//! Query and text helper functions / 查询与文本工具函数

use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::{anyhow, Result};
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::SearchError;
use crate::models::RankingPreferences;

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^.!?\n]+[.!?\n]+").expect("sentence regex is valid")
});

/// Sanitize an inbound query / 清理查询字符串
/// 1. Strip null bytes / 去除空字节
/// 2. Trim surrounding whitespace / 去除首尾空白
/// 3. Reject empty result / 空查询报错
pub fn sanitize_query(raw: &str) -> Result<String, SearchError> {
    let cleaned: String = raw.chars().filter(|c| *c != '\0').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(SearchError::validation("Missing query"));
    }
    Ok(trimmed.to_string())
}

/// Validate a method key / 校验搜索方法名
pub fn sanitize_method(raw: Option<&str>) -> Result<String, SearchError> {
    match raw.map(str::trim) {
        Some(method) if !method.is_empty() => Ok(method.to_string()),
        _ => Err(SearchError::validation("Missing method")),
    }
}

/// First sentence containing the query (case-insensitive), else the first sentence / 提取相关句子
pub fn find_relevant_sentence(content: &str, query: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let sentences: Vec<&str> = SENTENCE_RE.find_iter(content).map(|m| m.as_str()).collect();
    let sentences = if sentences.is_empty() { vec![content] } else { sentences };

    let needle = query.trim().to_lowercase();
    for sentence in &sentences {
        if sentence.to_lowercase().contains(&needle) {
            return sentence.trim().to_string();
        }
    }
    sentences[0].trim().to_string()
}

/// Escape text for interpolation into an HTML fragment / HTML转义
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Get file extension (lowercase) / 获取文件扩展名
pub fn get_ext(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a positive integer preference, accepting numbers or numeric strings / 读取整数偏好
pub fn pref_usize(prefs: &RankingPreferences, key: &str, default: usize) -> usize {
    let parsed = match prefs.get(key) {
        Some(Value::Number(n)) => n.as_u64().map(|v| v as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v > 0 => v,
        _ => default,
    }
}

/// Run a plugin future, turning a panic into an ordinary error / 隔离插件故障
pub async fn isolated<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(anyhow!("plugin panicked: {}", message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("  rust \0lang ").unwrap(), "rust lang");
        assert_eq!(sanitize_query("\0\0 ").unwrap_err(), SearchError::validation("Missing query"));
        assert!(sanitize_query("").is_err());
    }

    #[test]
    fn test_sanitize_method() {
        assert_eq!(sanitize_method(Some(" text ")).unwrap(), "text");
        assert!(sanitize_method(Some("  ")).is_err());
        assert!(sanitize_method(None).is_err());
    }

    #[test]
    fn test_find_relevant_sentence() {
        let content = "Intro line. Rust is fast! Nothing else?";
        assert_eq!(find_relevant_sentence(content, "RUST"), "Rust is fast!");
        assert_eq!(find_relevant_sentence(content, "missing"), "Intro line.");
        assert_eq!(find_relevant_sentence("no terminator", "x"), "no terminator");
        assert_eq!(find_relevant_sentence("", "x"), "");
    }

    #[test]
    fn test_pref_usize() {
        let prefs: RankingPreferences = serde_json::from_str(r#"{"p": 3, "count": "5", "bad": "x", "zero": 0}"#).unwrap();
        assert_eq!(pref_usize(&prefs, "p", 1), 3);
        assert_eq!(pref_usize(&prefs, "count", 10), 5);
        assert_eq!(pref_usize(&prefs, "bad", 10), 10);
        assert_eq!(pref_usize(&prefs, "zero", 1), 1);
        assert_eq!(pref_usize(&prefs, "missing", 7), 7);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[tokio::test]
    async fn test_isolated_catches_panic() {
        let err = isolated(async {
            if true {
                panic!("bad island");
            }
            Ok::<_, anyhow::Error>(1)
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("bad island"));

        assert_eq!(isolated(async { Ok::<_, anyhow::Error>(7) }).await.unwrap(), 7);
    }
}
