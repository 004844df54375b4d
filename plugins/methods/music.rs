use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::method::{MethodDescriptor, SearchMethod};
use crate::models::{Answer, RankingPreferences, SearchResult};
use crate::utils::{escape_html, get_ext};

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "flac"];
const PLACEHOLDER_THUMBNAIL: &str = "/favicon.ico";

/// Local music file search / 本地音乐搜索
pub struct MusicSearch {
    dir: PathBuf,
    public_address: String,
}

/// `Artist - Track.ext` → (artist, track) / 解析文件名
fn parse_track(file_name: &str) -> (String, String) {
    let base = match file_name.rfind('.') {
        Some(i) => &file_name[..i],
        None => file_name,
    };
    match base.split_once(" - ") {
        Some((artist, track)) if !artist.trim().is_empty() => {
            (artist.trim().to_string(), track.trim().to_string())
        }
        _ => ("Unknown Artist".to_string(), base.trim().to_string()),
    }
}

impl MusicSearch {
    pub fn new(dir: PathBuf, public_address: &str) -> Self {
        Self {
            dir,
            public_address: public_address.trim_end_matches('/').to_string(),
        }
    }

    /// Audio file names in the music directory, sorted / 列出音频文件
    async fn list_tracks(&self) -> std::io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if AUDIO_EXTENSIONS.contains(&get_ext(&name).as_str()) {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    fn player(&self, answer: &Answer) -> String {
        format!(
            concat!(
                r#"<div class="music-player">"#,
                r#"<img src="{thumb}" alt="thumb" class="music-thumb">"#,
                r#"<div class="music-info"><div class="music-track">{name}</div>"#,
                r#"<div class="music-artist">{artist}</div>"#,
                r#"<audio controls><source src="{base}{url}" type="audio/mpeg">"#,
                r#"Your browser does not support the audio element.</audio></div></div>"#
            ),
            thumb = escape_html(&answer.favicon),
            name = escape_html(&answer.name),
            artist = escape_html(&answer.domain),
            base = escape_html(&self.public_address),
            url = escape_html(&answer.url),
        )
    }

    /// Two columns of mini players / 两列音频播放器
    fn render(&self, answers: &[Answer]) -> String {
        let mid = (answers.len() + 1) / 2;
        let (left, right) = answers.split_at(mid);
        let column = |items: &[Answer]| {
            let players: String = items.iter().map(|a| self.player(a)).collect();
            format!(r#"<div class="results-col">{}</div>"#, players)
        };
        format!(r#"<div class="music-results">{}{}</div>"#, column(left), column(right))
    }
}

#[async_trait]
impl SearchMethod for MusicSearch {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            "music",
            "Music Search",
            "Searches local music files and returns playable results.",
        )
    }

    async fn search(&self, query: &str, _prefs: &RankingPreferences) -> Result<SearchResult> {
        let files = match self.list_tracks().await {
            Ok(files) => files,
            Err(e) => {
                tracing::debug!("Music directory {:?} unavailable: {}", self.dir, e);
                return Ok(SearchResult::failed("Music directory not found."));
            }
        };

        let needle = query.to_lowercase();
        let answers: Vec<Answer> = files
            .iter()
            .filter(|f| f.to_lowercase().contains(&needle))
            .map(|file| {
                let (artist, track) = parse_track(file);
                Answer {
                    name: track,
                    domain: artist,
                    url: format!("/music/{}", urlencoding::encode(file)),
                    snippet: String::new(),
                    favicon: PLACEHOLDER_THUMBNAIL.to_string(),
                }
            })
            .collect();

        let html = self.render(&answers);
        Ok(SearchResult::new(answers).with_html(html))
    }
}
