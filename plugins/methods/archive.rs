use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::island::IslandComposer;
use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{RankingPreferences, SearchResult};
use crate::utils::escape_html;

const CDX_API: &str = "https://web.archive.org/cdx/search/cdx";
const AVAILABILITY_API: &str = "https://archive.org/wayback/available";
const INVALID_TARGET: &str = "Please enter a valid domain name or website URL.";

static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").expect("scheme regex is valid"));
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[\w.-]+\.[a-z]{2,}$").expect("domain regex is valid"));

/// One year on the timeline / 时间线上的快照
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    year: String,
    timestamp: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Availability {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
struct ClosestSnapshot {
    #[serde(default)]
    available: bool,
    url: String,
    timestamp: String,
}

/// Internet Archive snapshot timeline / 网页时光机时间线
pub struct ArchiveTimeline {
    http: reqwest::Client,
    cdx_url: String,
    availability_url: String,
    composer: IslandComposer,
}

/// Accept an http(s) URL or a bare domain, returning the host / 解析目标域名
fn parse_target(query: &str) -> Option<String> {
    let query = query.trim();
    if SCHEME_RE.is_match(query) {
        let url = url::Url::parse(query).ok()?;
        url.host_str().map(str::to_string)
    } else if DOMAIN_RE.is_match(query) {
        Some(query.to_string())
    } else {
        None
    }
}

/// CDX rows are `[timestamp, original]` after a header row / 解析CDX结果
fn parse_snapshots(rows: Vec<Vec<String>>) -> Vec<Snapshot> {
    rows.into_iter()
        .skip(1)
        .filter_map(|row| {
            let timestamp = row.first()?.clone();
            let original = row.get(1)?;
            Some(Snapshot {
                year: timestamp.chars().take(4).collect(),
                url: format!("https://web.archive.org/web/{}/{}", timestamp, original),
                timestamp,
            })
        })
        .collect()
}

impl ArchiveTimeline {
    pub fn new(http: reqwest::Client, composer: IslandComposer) -> Self {
        Self::with_endpoints(http, CDX_API, AVAILABILITY_API, composer)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        cdx_url: &str,
        availability_url: &str,
        composer: IslandComposer,
    ) -> Self {
        Self {
            http,
            cdx_url: cdx_url.to_string(),
            availability_url: availability_url.to_string(),
            composer,
        }
    }

    async fn snapshots(&self, domain: &str) -> Result<Vec<Snapshot>> {
        let resp = self
            .http
            .get(&self.cdx_url)
            .query(&[
                ("url", domain),
                ("output", "json"),
                ("fl", "timestamp,original"),
                ("collapse", "year"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("Archive.org API error"));
        }
        let rows: Vec<Vec<String>> = resp.json().await?;
        Ok(parse_snapshots(rows))
    }

    async fn closest(&self, domain: &str) -> Result<Option<ClosestSnapshot>> {
        let resp = self
            .http
            .get(&self.availability_url)
            .query(&[("url", domain)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("Archive.org API error"));
        }
        let data: Availability = resp.json().await?;
        Ok(data.archived_snapshots.closest.filter(|c| c.available))
    }

    fn render(domain: &str, closest: Option<&ClosestSnapshot>, snapshots: &[Snapshot]) -> String {
        let closest = closest
            .map(|c| {
                format!(
                    r#"<div class="archive-closest">Closest snapshot: <a href="{}" target="_blank">{}</a></div>"#,
                    escape_html(&c.url),
                    escape_html(&c.timestamp)
                )
            })
            .unwrap_or_default();
        let years: String = snapshots
            .iter()
            .map(|s| {
                format!(
                    r#"<a href="{}" target="_blank" class="archive-year">{}</a>"#,
                    escape_html(&s.url),
                    escape_html(&s.year)
                )
            })
            .collect();

        format!(
            concat!(
                r#"<div class="archive-timeline">"#,
                r#"<div class="archive-title">Archive.org Timeline for <span>{}</span></div>"#,
                r#"{}<div class="archive-years">{}</div>"#,
                r#"<div class="archive-hint">Click a year to view a snapshot in the Wayback Machine.</div>"#,
                r#"</div>"#
            ),
            escape_html(domain),
            closest,
            years
        )
    }
}

#[async_trait]
impl SearchMethod for ArchiveTimeline {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "archive",
            "Archive.org Timeline",
            "Shows a timeline of snapshots for a given domain or URL using the Internet Archive.",
        )
    }

    async fn search(&self, query: &str, _prefs: &RankingPreferences) -> Result<SearchResult> {
        let Some(domain) = parse_target(query) else {
            return Ok(SearchResult::failed(INVALID_TARGET));
        };

        let snapshots = match self.snapshots(&domain).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::warn!("Archive.org CDX lookup failed for {}: {}", domain, e);
                return Ok(SearchResult::failed(e.to_string()));
            }
        };
        // The closest snapshot is optional decoration
        let closest = self.closest(&domain).await.unwrap_or_else(|e| {
            tracing::debug!("Archive.org availability lookup failed for {}: {}", domain, e);
            None
        });

        let html = Self::render(&domain, closest.as_ref(), &snapshots);
        let allowed = self.descriptor().allowed_islands;
        let islands = self.composer.compose_islands(query, &allowed).await;
        Ok(SearchResult::default()
            .with_html(html)
            .with_islands(islands)
            .with_meta(json!({"special": true})))
    }
}
