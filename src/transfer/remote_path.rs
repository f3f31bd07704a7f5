//! Destination paths on the remote.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Characters the remote naming scheme does not accept.
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[|<>?:*"]"#).expect("Invalid regex pattern"));

/// Strip illegal characters and make `path` relative with `/` separators.
///
/// `C:\Users\me` becomes `C/Users/me`; `/home/me` becomes `home/me`.
pub fn sanitize(path: &str) -> String {
    let path = path.replace('\\', "/");
    ILLEGAL_CHARS
        .replace_all(&path, "")
        .trim_start_matches('/')
        .to_string()
}

/// True for an absolute local directory used as a remote (`/mnt/nas`,
/// `D:\backup`).
pub fn is_local_root(remote: &str) -> bool {
    if Path::new(remote).is_absolute() || remote.starts_with('/') {
        return true;
    }
    let bytes = remote.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

/// Locator prefix of a remote: named remotes gain a trailing `:`.
pub fn locator(remote: &str) -> String {
    if is_local_root(remote) || remote.ends_with(':') {
        remote.to_string()
    } else {
        format!("{remote}:")
    }
}

/// `<locator><root>/<hostname>/<sanitized local path>`.
pub fn remote_path(remote: &str, root: &str, hostname: &str, local_path: &str) -> String {
    let prefix = locator(remote);
    let local = sanitize(local_path);
    let tail = [root, hostname, local.as_str()]
        .iter()
        .map(|part| part.trim_matches(['/', '\\']))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if prefix.ends_with([':', '/', '\\']) {
        format!("{prefix}{tail}")
    } else {
        format!("{prefix}/{tail}")
    }
}
