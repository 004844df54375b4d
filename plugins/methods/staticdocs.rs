use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde_json::json;

use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{Answer, RankingPreferences, SearchResult, Supports};
use crate::utils::{find_relevant_sentence, get_ext, pref_usize};

const PAGE_PARAM: &str = "p";
const PAGE_SIZE: usize = 10;

/// Elements whose text is never indexed / 不参与索引的元素
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];
static MARKDOWN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*_`>\-]").expect("markdown regex is valid"));

/// A loaded document / 已加载的文档
#[derive(Debug, Clone)]
struct StaticDoc {
    name: String,
    content: String,
}

/// Plain text of a document by extension; `None` for unsupported files / 提取文本
fn extract_text(name: &str, raw: &str) -> Option<String> {
    match get_ext(name).as_str() {
        "md" => Some(MARKDOWN_RE.replace_all(raw, "").into_owned()),
        "html" => Some(html_body_text(raw)),
        "txt" => Some(raw.to_string()),
        _ => None,
    }
}

/// Visible body text of an HTML document, entities decoded / 提取HTML正文
fn html_body_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let root = document.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body");

    let mut parts = Vec::new();
    collect_text(body.unwrap_or(root), &mut parts);
    parts.join("\n")
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, parts);
                }
            }
            _ => {}
        }
    }
}

/// Search over markdown, HTML and text files / 静态文档搜索
pub struct StaticDocSearch {
    docs: Vec<StaticDoc>,
}

impl StaticDocSearch {
    /// Read every supported file once; unreadable files are skipped / 加载文档目录
    pub async fn load(dir: &Path) -> Self {
        let mut docs = Vec::new();
        match tokio::fs::read_dir(dir).await {
            Ok(mut entries) => {
                while let Ok(Some(entry)) = entries.next_entry().await {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if !matches!(get_ext(&name).as_str(), "md" | "html" | "txt") {
                        continue;
                    }
                    match tokio::fs::read_to_string(entry.path()).await {
                        Ok(raw) => {
                            if let Some(content) = extract_text(&name, &raw) {
                                docs.push(StaticDoc { name, content });
                            }
                        }
                        Err(e) => tracing::warn!("Skipping static document {}: {}", name, e),
                    }
                }
            }
            Err(e) => tracing::info!("Static document directory {:?} unavailable: {}", dir, e),
        }
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::info!("Loaded {} static documents", docs.len());
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn run(&self, query: &str, prefs: &RankingPreferences) -> SearchResult {
        let page = pref_usize(prefs, PAGE_PARAM, 1);
        let query = query.trim();
        if query.is_empty() {
            return SearchResult::default().with_meta(json!({"page": 1, "total": 0}));
        }
        let count = pref_usize(prefs, "count", PAGE_SIZE);

        let needle = query.to_lowercase();
        let matches: Vec<&StaticDoc> = self
            .docs
            .iter()
            .filter(|doc| {
                doc.name.to_lowercase().contains(&needle) || doc.content.to_lowercase().contains(&needle)
            })
            .collect();
        let total = matches.len();

        let answers = matches
            .into_iter()
            .skip((page - 1).saturating_mul(count))
            .take(count)
            .map(|doc| Answer {
                name: doc.name.clone(),
                domain: "static".to_string(),
                url: format!("/demo/staticdocs/{}", urlencoding::encode(&doc.name)),
                snippet: find_relevant_sentence(&doc.content, query),
                favicon: String::new(),
            })
            .collect();

        tracing::debug!("Static document search {:?}: page {} of {} matches", query, page, total);
        SearchResult::new(answers).with_meta(json!({"page": page, "total": total}))
    }
}

#[async_trait]
impl SearchMethod for StaticDocSearch {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "staticdocs",
            "Static Document Search",
            "Searches markdown, HTML, and text files.",
        )
        .supports(Supports::paginated(PAGE_PARAM, PAGE_SIZE as u32))
    }

    async fn search(&self, query: &str, prefs: &RankingPreferences) -> Result<SearchResult> {
        Ok(self.run(query, prefs))
    }

    fn supports_federation(&self) -> bool {
        true
    }

    async fn federated_search(
        &self,
        query: &str,
        prefs: &RankingPreferences,
        _timeout: Duration,
    ) -> Result<SearchResult> {
        Ok(self.run(query, prefs))
    }
}
