// src/clients/secrets.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Resolve a parameter by name. Missing secrets are errors.
    async fn get_secret(&self, name: &str) -> Result<String>;
}

/// Secrets from environment variables.
///
/// Parameter names such as `/youtube/api-key` map to `YOUTUBE_API_KEY`
/// (leading slash dropped, `/`, `-` and `.` become `_`, upper-cased).
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

pub fn env_var_name(parameter: &str) -> String {
    parameter
        .trim_start_matches('/')
        .chars()
        .map(|c| match c {
            '/' | '-' | '.' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String> {
        let var = env_var_name(name);
        std::env::var(&var)
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("secret {name} not found (expected env var {var})"))
    }
}

/// Fixed secrets, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets(pub HashMap<String, String>);

impl StaticSecrets {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecrets {
    async fn get_secret(&self, name: &str) -> Result<String> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("secret {name} not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_names_map_to_env_vars() {
        assert_eq!(env_var_name("/youtube/api-key"), "YOUTUBE_API_KEY");
        assert_eq!(env_var_name("bucket.token"), "BUCKET_TOKEN");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn env_store_reads_and_reports_missing() {
        std::env::set_var("DC_TEST_SECRET", " s3cr3t \n");
        let store = EnvSecretStore;
        assert_eq!(store.get_secret("/dc-test-secret").await.unwrap(), "s3cr3t");

        std::env::remove_var("DC_TEST_SECRET");
        let err = store.get_secret("/dc-test-secret").await.unwrap_err();
        assert!(err.to_string().contains("DC_TEST_SECRET"));
    }
}
