use std::env;
use std::path::{Path, PathBuf};

/// Working directory and environment threaded through one hook batch.
///
/// Builtins (`cd`, `export`) mutate it; shell commands run with it. A fresh
/// context is taken from the current process at the start of every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    cwd: PathBuf,
    env: Vec<(String, String)>,
}

impl CommandContext {
    pub fn new(cwd: impl Into<PathBuf>, env: Vec<(String, String)>) -> Self {
        Self {
            cwd: cwd.into(),
            env,
        }
    }

    /// Context inherited from the running process.
    pub fn from_process() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd, env::vars().collect())
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn set_cwd(&mut self, cwd: PathBuf) {
        self.cwd = cwd;
    }

    /// Append `key=value`. Later entries shadow earlier ones.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.push((key.into(), value.into()));
    }

    /// Current value of `key`, honouring shadowing.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Environment as passed to a child process, last assignment winning.
    pub fn env_vars(&self) -> Vec<(&str, &str)> {
        let mut seen = std::collections::HashSet::new();
        let mut vars: Vec<(&str, &str)> = self
            .env
            .iter()
            .rev()
            .filter(|(k, _)| seen.insert(k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        vars.reverse();
        vars
    }
}
