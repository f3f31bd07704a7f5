use std::env;
use std::path::{Path, PathBuf};

/// Default location of the environment file
pub const DEFAULT_ENV_FILE: &str = "configs/.env";

/// Load `KEY=VALUE` pairs into the process environment.
///
/// Tries `path`, then `.env` next to the executable. Variables already set
/// in the environment win. Returns the file that was loaded, if any.
pub fn load_env_file(path: &Path) -> Option<PathBuf> {
    let fallback = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));

    for candidate in std::iter::once(path.to_path_buf()).chain(fallback) {
        if !candidate.is_file() {
            continue;
        }
        match dotenvy::from_path(&candidate) {
            Ok(()) => {
                tracing::debug!("Loaded environment from {}", candidate.display());
                return Some(candidate);
            }
            Err(e) => tracing::warn!("Failed to load {}: {e}", candidate.display()),
        }
    }

    tracing::debug!("No environment file found at {}", path.display());
    None
}
