//! Runs one hook sub-command through the host shell

use anyhow::{Context, Result};
use std::io::Read;
use std::process::{Child, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

use super::context::CommandContext;
use super::platform::Platform;

/// How long to wait for the pipe readers once the child has exited
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Cap on captured output per stream (1MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Outcome of a shell sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Run `command` in the context's directory with exactly the context's
/// environment. With a `timeout`, the child is killed once it elapses.
///
/// Errors only when the shell cannot be started; a command that runs and
/// fails is reported through [`ShellOutput::success`].
pub fn run_shell(
    platform: &dyn Platform,
    command: &str,
    ctx: &CommandContext,
    timeout: Option<Duration>,
) -> Result<ShellOutput> {
    let mut child = spawn(platform, command, ctx)?;

    // Drain both pipes while waiting, or a chatty child blocks on a full pipe
    let stdout_rx = collect(child.stdout.take());
    let stderr_rx = collect(child.stderr.take());

    let status = match timeout {
        Some(limit) => child
            .wait_timeout(limit)
            .with_context(|| format!("Failed to wait for command: {command}"))?,
        None => Some(
            child
                .wait()
                .with_context(|| format!("Failed to wait for command: {command}"))?,
        ),
    };

    if status.is_none() {
        let _ = child.kill();
        let _ = child.wait();
    }

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    Ok(match status {
        Some(status) => ShellOutput {
            success: status.success(),
            exit_code: status.code(),
            stdout,
            stderr,
            timed_out: false,
        },
        None => ShellOutput {
            success: false,
            exit_code: None,
            stdout,
            stderr: format!(
                "{stderr}\n[killed after {}s timeout]",
                timeout.unwrap_or_default().as_secs()
            ),
            timed_out: true,
        },
    })
}

fn spawn(platform: &dyn Platform, command: &str, ctx: &CommandContext) -> Result<Child> {
    let mut cmd = platform.shell(command);
    cmd.current_dir(ctx.cwd())
        .env_clear()
        .envs(ctx.env_vars())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    cmd.spawn()
        .with_context(|| format!("Failed to spawn command: {command}"))
}

fn collect<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_capped(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read the whole stream, keeping at most [`MAX_OUTPUT_SIZE`] bytes.
fn read_capped<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let room = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(room)]);
                truncated |= n > room;
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str("\n[output truncated]");
    }
    text
}
