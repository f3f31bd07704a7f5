use serde::{Deserialize, Serialize};

/// Backup profile of a single host, as stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub hostname: String,

    /// Files and directories to transfer, in configured order
    #[serde(default)]
    pub paths: Vec<String>,

    /// Whether hook stdout is written to the log
    #[serde(default = "default_output", rename = "output")]
    pub surface_output: bool,

    /// Commands run before the transfer phase
    #[serde(default)]
    pub pre: Vec<String>,

    /// Commands run after the transfer phase
    #[serde(default)]
    pub post: Vec<String>,
}

fn default_output() -> bool {
    true
}

impl MachineProfile {
    /// An empty profile for `hostname`.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            paths: Vec::new(),
            surface_output: true,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    /// True when the profile has neither paths nor hooks.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.pre.is_empty() && self.post.is_empty()
    }
}
