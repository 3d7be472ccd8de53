// src/config/mod.rs
//! Job configuration, resolved once at startup.

pub mod contents;
pub mod posts;

pub use contents::{ContentsConfig, NoteSource, PlaylistSource, SearchSource};
pub use posts::PostsConfig;

/// `OBJECT_STORE_ROOT`, defaulting to `out`.
pub fn object_store_root() -> std::path::PathBuf {
    std::env::var("OBJECT_STORE_ROOT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "out".to_string())
        .into()
}
