use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;

use super::{JobStatus, NotificationEvent, Notifier};

const COLOR_OK: u32 = 0x2e_cc_71;
const COLOR_ERROR: u32 = 0xe7_4c_3c;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Self::new)
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let payload = DiscordWebhookPayload::from_event(ev);
        let rsp = self
            .client
            .post(&self.webhook)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Discord webhook request failed: {e}"))?;
        rsp.error_for_status_ref()
            .map_err(|e| anyhow!("Discord webhook HTTP error: {e}"))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    fields: Vec<DiscordField>,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_event(ev: &NotificationEvent) -> Self {
        let color = match ev.status {
            JobStatus::Ok => COLOR_OK,
            JobStatus::Error => COLOR_ERROR,
        };
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: ev.title(),
                description: ev.message.clone(),
                color,
                fields: ev
                    .fields
                    .iter()
                    .map(|f| DiscordField {
                        name: f.name.clone(),
                        value: f.value.clone(),
                        inline: f.inline,
                    })
                    .collect(),
            }],
        }
    }
}
