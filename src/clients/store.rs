// src/clients/store.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (or replace) the object at `key`.
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    /// Human-readable location of `key`, for logs and notifications.
    fn uri(&self, key: &str) -> String;
}

/// Objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid object key: {key}");
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let len = body.len();
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(key, content_type, bytes = len, "object stored");
        Ok(())
    }

    fn uri(&self, key: &str) -> String {
        format!("file://{}", self.root.join(key.trim_start_matches('/')).display())
    }
}

/// In-memory store that records every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<(String, Vec<u8>, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .iter()
            .rev()
            .find(|(k, _, _)| k == key)
            .map(|(_, body, _)| body.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .iter()
            .map(|(k, _, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects
            .lock()
            .expect("memory store mutex poisoned")
            .push((key.to_string(), body, content_type.to_string()));
        Ok(())
    }

    fn uri(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
