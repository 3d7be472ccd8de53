// src/config/contents.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rank::DEFAULT_CAP;

const ENV_PATH: &str = "CONTENTS_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/contents.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchSource {
    pub name: String,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistSource {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteSource {
    pub name: String,
    pub url: String,
}

/// Sources and limits of the aggregation job. Bucket order in the snapshot
/// follows the order of the lists here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContentsConfig {
    pub channel_id: String,
    pub max_contents: usize,
    pub search_max_results: u32,
    pub playlist_max_results: u32,
    pub thumbnail_width: u32,
    pub object_key: String,
    pub api_key_secret: String,
    pub excluded_title_markers: Vec<String>,
    pub searches: Vec<SearchSource>,
    pub playlists: Vec<PlaylistSource>,
    pub notes: Vec<NoteSource>,
}

impl Default for ContentsConfig {
    fn default() -> Self {
        let search = |name: &str, query: Option<&str>| SearchSource {
            name: name.into(),
            query: query.map(Into::into),
        };
        let playlist = |name: &str, id: &str| PlaylistSource {
            name: name.into(),
            id: id.into(),
        };
        Self {
            channel_id: "UCxUgvwrVfqVpyak4cuKcevQ".into(),
            max_contents: DEFAULT_CAP,
            search_max_results: 20,
            playlist_max_results: 10,
            thumbnail_width: 200,
            object_key: "hasu/contents.json".into(),
            api_key_secret: "/youtube/api-key".into(),
            excluded_title_markers: vec![
                "English Subtitles".into(),
                "简体字幕".into(),
                "繁體字幕".into(),
            ],
            searches: vec![
                search("all", None),
                search("mirapaRadio", Some("みらぱ！の部屋ラジオ")),
                search("seeHasu", Some("せーので！はすのそら！")),
                search("story", Some("3Dアニメ 活動記録")),
            ],
            playlists: vec![
                playlist("membership", "UUMOxUgvwrVfqVpyak4cuKcevQ"),
                playlist("withMeets", "PLu7E7HFun3xB33SP01_NZzJpV-TiRyx0K"),
                playlist("fesLive", "PLu7E7HFun3xBqgsTabwfrJkHc0FYE5RmI"),
                playlist("linkNama", "PLu7E7HFun3xA0HJsKiJVyG-9U_Lxk8BMk"),
                playlist("lyricVideo", "PLu7E7HFun3xCfBwgq2wYRNJXN9U6Q5Zyi"),
            ],
            notes: vec![NoteSource {
                name: "all".into(),
                url: "https://note.com/lovelive_hasu/rss".into(),
            }],
        }
    }
}

impl ContentsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ContentsConfig = toml::from_str(s).context("parsing contents config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading contents config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolution order:
    /// 1) $CONTENTS_CONFIG_PATH (must exist)
    /// 2) config/contents.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        tracing::debug!("no contents config file, using built-in defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.channel_id.trim().is_empty() && !self.searches.is_empty() {
            return Err(anyhow!("channel_id is required when searches are configured"));
        }
        if self.object_key.trim().is_empty() {
            return Err(anyhow!("object_key must not be empty"));
        }
        let names = self
            .searches
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.playlists.iter().map(|p| p.name.as_str()));
        let mut seen = std::collections::HashSet::new();
        for n in names {
            if !seen.insert(n) {
                return Err(anyhow!("duplicate video bucket name: {n}"));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for n in self.notes.iter().map(|n| n.name.as_str()) {
            if !seen.insert(n) {
                return Err(anyhow!("duplicate note bucket name: {n}"));
            }
        }
        Ok(())
    }
}
