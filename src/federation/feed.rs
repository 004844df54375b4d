use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::Result;

use crate::models::{IndexUpdate, IndexUpdatesFeed};
use crate::utils::get_ext;

const SHARED_EXTENSIONS: [&str; 4] = ["md", "html", "pdf", "txt"];

/// Build the index-updates feed for the static document directory / 生成索引更新列表
///
/// Newest first, truncated to `max_updates`. A missing directory yields an
/// empty feed.
pub async fn build_index_updates(dir: &Path, node_name: &str, max_updates: usize) -> Result<IndexUpdatesFeed> {
    let mut updates = Vec::new();

    if tokio::fs::try_exists(dir).await.unwrap_or(false) {
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !SHARED_EXTENSIONS.contains(&get_ext(&name).as_str()) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            updates.push(IndexUpdate {
                update_type: "staticdoc".to_string(),
                name,
                mtime,
                size: metadata.len(),
            });
        }
    } else {
        tracing::debug!("Static document directory {:?} not found, sharing no updates", dir);
    }

    updates.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.name.cmp(&b.name)));
    updates.truncate(max_updates);

    Ok(IndexUpdatesFeed {
        node: node_name.to_string(),
        updates,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
