use std::path::PathBuf;
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};

use anyhow::{Context, Result, anyhow};
use which::which;

use crate::args::ArgList;

#[derive(Debug, Clone)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

pub fn resolve_tools(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Result<Tools> {
    Ok(Tools {
        ffmpeg: resolve_bin(ffmpeg, "ffmpeg")?,
        ffprobe: resolve_bin(ffprobe, "ffprobe")?,
    })
}

#[derive(Debug)]
pub struct TranscodeSession {
    pub child: Child,
    pub stderr: ChildStderr,
}

/// Spawns ffmpeg with the session's argument list; the diagnostic stream is
/// captured for the progress monitor.
pub fn spawn_transcode(tools: &Tools, args: &ArgList) -> Result<TranscodeSession> {
    let mut child = Command::new(&tools.ffmpeg)
        .args(args.tokens())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn ffmpeg")?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("failed to capture ffmpeg diagnostics"))?;

    Ok(TranscodeSession { child, stderr })
}

/// Final blocking wait. Success/failure UI is driven by the monitor's
/// classifier, not by the exit status.
pub fn wait_for_exit(mut child: Child) -> Result<ExitStatus> {
    Ok(child.wait()?)
}

fn resolve_bin(bin_opt: Option<PathBuf>, default: &str) -> Result<PathBuf> {
    if let Some(path) = bin_opt {
        if path.is_file() {
            return Ok(path);
        }
        anyhow::bail!("Provided binary not found: {}", path.display());
    }

    which(default)
        .or_else(|_| {
            if cfg!(windows) {
                let exe = format!("{default}.exe");
                which(&exe)
            } else {
                Err(which::Error::CannotFindBinaryPath)
            }
        })
        .with_context(|| format!("`{default}` not found in PATH"))
}
