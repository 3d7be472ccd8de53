// src/clients/mod.rs
//! External collaborators: HTTP fetch, secrets, object storage.
//! Every call is a single attempt with transport defaults.

pub mod secrets;
pub mod store;
pub mod youtube;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait Fetch: Send + Sync {
    /// Body of a successful response, `None` for a non-success status.
    /// Transport failures are errors.
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {}", redact_key(url)))?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %redact_key(url), "non-success response");
            return Ok(None);
        }
        let body = resp.bytes().await.context("reading response body")?;
        tracing::debug!(bytes = body.len(), url = %redact_key(url), "fetched");
        Ok(Some(body.to_vec()))
    }
}

/// Hide the `key=` query value so API keys never reach the logs.
pub fn redact_key(url: &str) -> String {
    let param = url
        .match_indices("key=")
        .map(|(i, _)| i)
        .find(|&i| i > 0 && matches!(url.as_bytes()[i - 1], b'?' | b'&'));
    match param {
        Some(i) => {
            let rest = &url[i + 4..];
            let tail = rest.find('&').map(|j| &rest[j..]).unwrap_or("");
            format!("{}key=***{}", &url[..i], tail)
        }
        None => url.to_string(),
    }
}
