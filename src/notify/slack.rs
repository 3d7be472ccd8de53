use anyhow::{Context, Result};
use reqwest::Client;

use super::{NotificationEvent, Notifier};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env() -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
        }
    }
}

pub fn slack_text(ev: &NotificationEvent) -> String {
    let body = ev.body();
    if body.is_empty() {
        format!("*{}*", ev.title())
    } else {
        format!("*{}*\n{}", ev.title(), body)
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let body = serde_json::json!({ "text": slack_text(ev) });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}
