//! The `.haul.json` config file: machine profiles and named remotes.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Component, Path, PathBuf};

use crate::fs::locking::{read_json, write_json};
use crate::hooks::{expand_posix, expand_windows};
use crate::models::MachineProfile;

pub const CONFIG_FILE_NAME: &str = ".haul.json";

/// On-disk layout of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub machines: Vec<MachineProfile>,

    /// Remote name to the directory it is mounted at
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: BTreeMap<String, PathBuf>,
}

/// Loaded config file plus the path it is persisted to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    file: ConfigFile,
}

impl ConfigStore {
    /// Candidate locations, most specific first: `./.haul.json`,
    /// `./configs/.haul.json`, `~/.haul.json`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("configs").join(CONFIG_FILE_NAME),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// The explicit path if given, else the first existing search path,
    /// else `./.haul.json`.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        Self::search_paths()
            .into_iter()
            .find(|p| p.is_file())
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load the config at `path`, writing an empty one first if it is missing.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Creating config file {}", path.display());
            write_json(path, &ConfigFile::default())?;
        }
        let file = read_json(path)?;
        tracing::debug!("Loaded config {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn load_or_create(explicit: Option<&Path>) -> Result<Self> {
        Self::open(&Self::locate(explicit))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ConfigFile {
        &self.file
    }

    pub fn remotes(&self) -> &BTreeMap<String, PathBuf> {
        &self.file.remotes
    }

    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.file)
    }

    /// Register a remote and persist the config.
    pub fn add_remote(&mut self, name: &str, dir: impl Into<PathBuf>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() || name.contains([':', '/', '\\']) {
            bail!("invalid remote name '{name}'");
        }
        self.file.remotes.insert(name.to_string(), dir.into());
        self.save()
    }

    /// Profile of `hostname` with its paths cleaned.
    ///
    /// An unknown host gets an empty profile, which is appended to the file.
    /// Cleaning is not written back.
    pub fn current_machine(&mut self, hostname: &str) -> Result<MachineProfile> {
        let profile = match self.file.machines.iter().find(|m| m.hostname == hostname) {
            Some(profile) => profile.clone(),
            None => {
                tracing::warn!("No profile for '{hostname}', adding an empty one");
                let profile = MachineProfile::new(hostname);
                self.file.machines.push(profile.clone());
                self.save()?;
                profile
            }
        };

        Ok(MachineProfile {
            paths: profile
                .paths
                .iter()
                .map(|p| clean_path(p))
                .filter(|p| !p.is_empty())
                .collect(),
            ..profile
        })
    }
}

/// Expand `$VAR`, `${VAR}`, `%VAR%` and a leading `~`, then normalize the
/// path lexically. Blank input yields an empty string.
pub fn clean_path(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let lookup = |name: &str| env::var(name).ok();
    let expanded = expand_windows(&expand_posix(raw, lookup), lookup);
    let expanded = expand_home(&expanded);

    normalize(Path::new(&expanded)).display().to_string()
}

fn expand_home(path: &str) -> String {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
    };
    match (rest, dirs::home_dir()) {
        (Some(""), Some(home)) => home.display().to_string(),
        (Some(rest), Some(home)) => home.join(rest).display().to_string(),
        _ => path.to_string(),
    }
}

/// Drop `.` components and fold `..` into its parent without touching disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
