//! Thin wrappers around the `ffmpeg` and `ffprobe` binaries.
//!
//! Children are spawned with `kill_on_drop` so an abandoned future never
//! leaves an encoder running, and their output is fully collected before
//! returning.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Collected result of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub status: String,
}

/// Run `program` with `args` to completion.
#[instrument(level = "debug", skip(args))]
pub async fn run<I, S>(program: &str, args: I) -> std::io::Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        status: output.status.to_string(),
    };
    debug!(success = result.success, status = %result.status, "Command finished");
    Ok(result)
}

/// Duration of a media file in seconds, as reported by `ffprobe`.
pub async fn media_duration(ffprobe: &str, path: &Path) -> Result<f64, String> {
    let args = [
        OsStr::new("-v"),
        OsStr::new("error"),
        OsStr::new("-show_entries"),
        OsStr::new("format=duration"),
        OsStr::new("-of"),
        OsStr::new("default=noprint_wrappers=1:nokey=1"),
        path.as_os_str(),
    ];
    let out = run(ffprobe, args)
        .await
        .map_err(|e| format!("could not start {ffprobe}: {e}"))?;
    if !out.success {
        return Err(format!("{ffprobe} exited with {}: {}", out.status, out.stderr.trim()));
    }
    parse_duration(&out.stdout)
}

fn parse_duration(stdout: &str) -> Result<f64, String> {
    let raw = stdout.trim();
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(format!("unexpected duration output {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3.480000\n"), Ok(3.48));
        assert!(parse_duration("N/A\n").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-1").is_err());
    }

    #[tokio::test]
    async fn test_media_duration_missing_binary() {
        let err = media_duration("definitely-not-a-real-ffprobe", Path::new("a.mp3"))
            .await
            .unwrap_err();
        assert!(err.contains("could not start"));
    }
}
