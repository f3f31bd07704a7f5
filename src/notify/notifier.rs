use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use std::env;
use std::fs;
use std::path::PathBuf;

use super::delivery::{Delivery, DeliveryError, RetryPolicy};
use super::health::HealthMonitor;
use super::message::Message;

pub const ENV_HOST: &str = "NTFY_HOST";
pub const ENV_TOPIC: &str = "NTFY_TOPIC";
pub const ENV_TOKEN: &str = "NTFY_TOKEN";

/// Heartbeat endpoint marking the start of a session
pub const HEARTBEAT_START: &str = "start";
/// Heartbeat endpoint marking a completed session
pub const HEARTBEAT_DONE: &str = "";

/// Publishes status messages to ntfy and pings liveness monitors.
#[derive(Debug)]
pub struct Notifier {
    host: Url,
    topic: String,
    token: Option<String>,
    monitors: Vec<HealthMonitor>,
    log_path: Option<PathBuf>,
    notifications: Delivery,
    heartbeats: Delivery,
}

impl Notifier {
    /// Build from `NTFY_HOST`, `NTFY_TOPIC`, `NTFY_TOKEN` and the monitor
    /// variables.
    pub fn from_env() -> Result<Self> {
        let host = env::var(ENV_HOST).unwrap_or_default();
        let topic = env::var(ENV_TOPIC).unwrap_or_default();
        let token = env::var(ENV_TOKEN).ok();
        Self::new(&host, &topic, token, HealthMonitor::from_env())
    }

    pub fn new(
        host: &str,
        topic: &str,
        token: Option<String>,
        monitors: Vec<HealthMonitor>,
    ) -> Result<Self> {
        let host = Url::parse(host).with_context(|| format!("invalid ntfy host '{host}'"))?;
        if !matches!(host.scheme(), "http" | "https") {
            bail!("invalid ntfy host '{host}': expected an http(s) URL");
        }
        if topic.trim().is_empty() {
            bail!("the ntfy topic cannot be empty");
        }
        tracing::debug!("Notifier: {host} topic '{topic}'");

        Ok(Self {
            host,
            topic: topic.trim().to_string(),
            token: token.filter(|t| !t.is_empty()),
            monitors,
            log_path: None,
            notifications: Delivery::new(RetryPolicy::NOTIFICATION)?,
            heartbeats: Delivery::new(RetryPolicy::HEARTBEAT)?,
        })
    }

    /// Log file attached to the final heartbeat.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn with_policies(mut self, notification: RetryPolicy, heartbeat: RetryPolicy) -> Result<Self> {
        self.notifications = Delivery::new(notification)?;
        self.heartbeats = Delivery::new(heartbeat)?;
        Ok(self)
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn monitors(&self) -> &[HealthMonitor] {
        &self.monitors
    }

    /// `"<HOSTNAME> - <TOPIC>"`, upper-cased.
    pub fn status_title(&self, hostname: &str) -> String {
        format!("{hostname} - {}", self.topic).to_uppercase()
    }

    pub fn send(&self, title: &str, body: &str, tags: &[String]) -> Result<String, DeliveryError> {
        let message = Message::builder(&self.topic, body)
            .title(title)
            .tags(tags.iter().cloned())
            .build();
        self.send_message(&message)
    }

    pub fn send_message(&self, message: &Message) -> Result<String, DeliveryError> {
        let body = serde_json::to_vec(message)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => tracing::error!("Notifier: unusable token: {e}"),
            }
        }

        self.notifications
            .send(Method::POST, self.host.as_str(), &headers, Some(&body))
    }

    /// Ping every monitor. A failing monitor does not stop the others; the
    /// statuses of successful pings are joined with `"; "` and are carried by
    /// [`DeliveryError::Combined`] when any monitor failed.
    pub fn heartbeat(&self, endpoint: &str, attach_log: bool) -> Result<String, DeliveryError> {
        let mut statuses = Vec::new();
        let mut errors = Vec::new();

        for monitor in &self.monitors {
            let method = monitor.kind().method();
            let body = if attach_log && method == Method::POST {
                self.read_log()
            } else {
                None
            };

            match self.heartbeats.send(
                method,
                &monitor.url(endpoint),
                &HeaderMap::new(),
                body.as_deref(),
            ) {
                Ok(status) => statuses.push(status),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(statuses.join("; "))
        } else {
            Err(DeliveryError::Combined {
                errors,
                statuses: statuses.join("; "),
            })
        }
    }

    fn read_log(&self) -> Option<Vec<u8>> {
        let path = self.log_path.as_ref()?;
        match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!("Notifier: cannot read log file {}: {e}", path.display());
                None
            }
        }
    }
}
