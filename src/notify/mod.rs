// src/notify/mod.rs
//! Job outcome notifications. Delivery is best effort: a failed send is
//! logged and never changes the job's own result.

pub mod discord;
pub mod slack;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ok,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Ok => "OK",
            JobStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub service: String,
    pub status: JobStatus,
    pub fields: Vec<Field>,
    /// Error text for failed runs.
    pub message: Option<String>,
}

impl NotificationEvent {
    pub fn ok(service: &str, fields: Vec<Field>) -> Self {
        Self {
            service: service.to_string(),
            status: JobStatus::Ok,
            fields,
            message: None,
        }
    }

    pub fn error(service: &str, message: impl Into<String>) -> Self {
        Self {
            service: service.to_string(),
            status: JobStatus::Error,
            fields: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn title(&self) -> String {
        format!("[{}] {}", self.status.as_str(), self.service)
    }

    /// Plain-text body: one `name: value` line per field, then the message.
    pub fn body(&self) -> String {
        let mut lines: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect();
        if let Some(m) = &self.message {
            lines.push(m.clone());
        }
        lines.join("\n")
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> Result<()>;
}

/// Fans one event out to every configured channel.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, n: impl Notifier + 'static) -> Self {
        self.channels.push(Box::new(n));
        self
    }

    /// Discord and Slack, each enabled by its webhook env var.
    pub fn from_env() -> Self {
        let mut mux = Self::new();
        if let Some(d) = discord::DiscordNotifier::from_env() {
            mux = mux.with(d);
        }
        if let Some(s) = slack::SlackNotifier::from_env() {
            mux = mux.with(s);
        }
        if mux.is_empty() {
            tracing::debug!("no notification channel configured");
        }
        mux
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send to all channels; failures are warned about and swallowed.
    pub async fn notify(&self, ev: &NotificationEvent) {
        for ch in &self.channels {
            if let Err(e) = ch.send(ev).await {
                tracing::warn!(error = %e, service = %ev.service, "notification failed");
            }
        }
    }
}

#[async_trait]
impl Notifier for NotifierMux {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        self.notify(ev).await;
        Ok(())
    }
}

/// Records events instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub sent: Mutex<Vec<NotificationEvent>>,
}

impl MemoryNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(ev.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn send(&self, _ev: &NotificationEvent) -> Result<()> {
            anyhow::bail!("webhook down")
        }
    }

    #[test]
    fn body_lists_fields_then_message() {
        let ev = NotificationEvent::ok(
            "posts-save",
            vec![Field::new("Date", "2025-04-01"), Field::new("Posts count", "3")],
        );
        assert_eq!(ev.title(), "[OK] posts-save");
        assert_eq!(ev.body(), "Date: 2025-04-01\nPosts count: 3");

        let err = NotificationEvent::error("posts-save", "feed unavailable");
        assert_eq!(err.title(), "[ERROR] posts-save");
        assert_eq!(err.body(), "feed unavailable");
    }

    #[tokio::test]
    async fn mux_swallows_channel_failures() {
        let mux = NotifierMux::new().with(Failing).with(MemoryNotifier::default());
        let ev = NotificationEvent::ok("contents", Vec::new());
        mux.notify(&ev).await;
        assert!(mux.send(&ev).await.is_ok());
    }
}
