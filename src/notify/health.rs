//! Liveness monitors pinged at the start and end of unattended sessions.

use reqwest::Method;
use std::env;

/// Supported heartbeat services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MonitorKind {
    /// healthchecks.io
    Healthchecks,
    /// Better Stack uptime heartbeats
    BetterUptime,
}

impl MonitorKind {
    pub const ALL: [MonitorKind; 2] = [MonitorKind::Healthchecks, MonitorKind::BetterUptime];

    /// Environment variable holding the monitor id.
    pub fn env_var(&self) -> &'static str {
        match self {
            MonitorKind::Healthchecks => "NTFY_HEALTHCHECKS",
            MonitorKind::BetterUptime => "NTFY_BETTERUPTIME",
        }
    }

    pub fn host(&self) -> &'static str {
        match self {
            MonitorKind::Healthchecks => "hc-ping.com",
            MonitorKind::BetterUptime => "uptime.betterstack.com",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            MonitorKind::Healthchecks => "",
            MonitorKind::BetterUptime => "api/v1/heartbeat",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            MonitorKind::Healthchecks => Method::POST,
            MonitorKind::BetterUptime => Method::GET,
        }
    }

    /// Whether the heartbeat endpoint (`start`, `fail`, ...) is part of the URL.
    pub fn uses_endpoint(&self) -> bool {
        matches!(self, MonitorKind::Healthchecks)
    }
}

/// A configured monitor: its kind and the check id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthMonitor {
    kind: MonitorKind,
    id: String,
    base_url: Option<String>,
}

impl HealthMonitor {
    pub fn new(kind: MonitorKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            base_url: None,
        }
    }

    /// Send pings to `base_url` instead of `https://<host>`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Monitors whose variable is set in the environment.
    pub fn from_env() -> Vec<HealthMonitor> {
        MonitorKind::ALL
            .iter()
            .filter_map(|kind| {
                let id = env::var(kind.env_var()).ok()?;
                tracing::debug!("Health monitor set: {}", kind.env_var());
                Some(HealthMonitor::new(*kind, id))
            })
            .collect()
    }

    pub fn kind(&self) -> MonitorKind {
        self.kind
    }

    /// Ping URL: `https://<host>/<path>/<id>[/<endpoint>]`.
    pub fn url(&self, endpoint: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.kind.host()),
        };
        let endpoint = if self.kind.uses_endpoint() { endpoint } else { "" };
        let path = [self.kind.path(), self.id.as_str(), endpoint]
            .iter()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("{base}/{path}")
    }
}
