//! FFmpeg process management
//!
//! Wraps FFmpeg child processes so that stderr is always consumed.
//! FFmpeg writes its log output to stderr; if the pipe buffer (usually
//! 64KB) fills up while the parent is blocked in `wait()`, both
//! processes stall. A drain thread keeps the buffer empty and hands the
//! collected output back when the process exits.
//!
//! Also provides cooperative cancellation: `wait_with_output` polls the
//! child and kills it when the [`CancelToken`] trips, so Ctrl-C leaves
//! no orphaned encoder behind.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::errors::{Result, Vid2GifError};

/// How often the waiter checks for cancellation and child exit.
const CANCEL_POLL_INTERVAL_MS: u64 = 50;

// ═══════════════════════════════════════════════════════════════
// CancelToken - shared cancellation flag
// ═══════════════════════════════════════════════════════════════

/// Thread-safe cancellation flag, typically tripped by a Ctrl-C handler.
///
/// Clones share the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════════
// FfmpegProcess - deadlock-safe FFmpeg child wrapper
// ═══════════════════════════════════════════════════════════════

/// FFmpeg child process whose stderr is drained on a dedicated thread.
pub struct FfmpegProcess {
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    /// Spawns the command with stderr captured quietly.
    ///
    /// # Errors
    /// - process start failure
    /// - stderr pipe could not be captured
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        Self::spawn_impl(cmd, false)
    }

    /// Spawns the command, echoing each stderr line to the terminal as
    /// it arrives. Used in verbose mode so FFmpeg output stays visible
    /// while still being captured for error reporting.
    pub fn spawn_echoing(cmd: &mut Command) -> Result<Self> {
        Self::spawn_impl(cmd, true)
    }

    fn spawn_impl(cmd: &mut Command, echo_stderr: bool) -> Result<Self> {
        let command_str = format!("{:?}", cmd);
        info!(
            command = %command_str,
            "Executing FFmpeg command"
        );

        // stdout is unused (output goes to files); stderr must be drained
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        let stderr = child.stderr.take().ok_or_else(|| {
            Vid2GifError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Failed to capture FFmpeg stderr",
            ))
        })?;

        let stderr_thread = thread::spawn(move || {
            let mut buf = String::new();
            let reader = BufReader::new(stderr);
            for line in reader.lines() {
                if let Ok(line) = line {
                    if echo_stderr {
                        eprintln!("{}", line);
                    }
                    buf.push_str(&line);
                    buf.push('\n');
                }
            }
            buf
        });

        Ok(Self {
            child,
            stderr_thread: Some(stderr_thread),
        })
    }

    /// Waits for the process, polling the cancel token.
    ///
    /// When the token trips, the child is killed and reaped and
    /// [`Vid2GifError::Cancelled`] is returned.
    ///
    /// # Returns
    /// (ExitStatus, stderr_content) on normal completion
    pub fn wait_with_output(mut self, cancel: &CancelToken) -> Result<(ExitStatus, String)> {
        let status = loop {
            if cancel.is_cancelled() {
                let _ = self.child.kill();
                let _ = self.child.wait();
                if let Some(t) = self.stderr_thread.take() {
                    let _ = t.join();
                }
                info!("FFmpeg process killed after cancellation");
                return Err(Vid2GifError::Cancelled);
            }

            match self.child.try_wait()? {
                Some(status) => break status,
                None => thread::sleep(Duration::from_millis(CANCEL_POLL_INTERVAL_MS)),
            }
        };

        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        if status.success() {
            info!(
                exit_code = status.code(),
                "FFmpeg process completed successfully"
            );
            debug!(
                stderr_output = %stderr,
                "FFmpeg stderr output"
            );
        } else {
            error!(
                exit_code = status.code(),
                stderr_output = %stderr,
                "FFmpeg process failed"
            );
        }

        Ok((status, stderr))
    }
}

// ═══════════════════════════════════════════════════════════════
// FFmpeg error formatting
// ═══════════════════════════════════════════════════════════════

/// Extracts the most meaningful error line from FFmpeg stderr output.
///
/// 1. Prefer the last line containing "Error" or "error"
/// 2. Otherwise the last line that is not a progress line (frame=...)
/// 3. Otherwise "Unknown FFmpeg error"
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

// ═══════════════════════════════════════════════════════════════
// Unit tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        assert!(!token.is_cancelled());
        assert!(!clone.is_cancelled());

        clone.cancel();

        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_format_ffmpeg_error_with_error_line() {
        let stderr = r#"
frame=  100 fps=25.0 q=28.0 size=    1024kB time=00:00:04.00 bitrate=2097.2kbits/s
[Parsed_palettegen_0 @ 0x7f8b8c000000] Error: invalid max_colors value
"#;
        let error = format_ffmpeg_error(stderr);
        assert!(error.contains("Error"));
        assert!(error.contains("invalid max_colors value"));
    }

    #[test]
    fn test_format_ffmpeg_error_no_error_line() {
        let stderr = r#"
frame=  100 fps=25.0 q=28.0 size=    1024kB time=00:00:04.00
Conversion failed!
"#;
        let error = format_ffmpeg_error(stderr);
        assert_eq!(error, "Conversion failed!");
    }

    #[test]
    fn test_format_ffmpeg_error_empty() {
        let error = format_ffmpeg_error("");
        assert_eq!(error, "Unknown FFmpeg error");
    }

    #[test]
    fn test_wait_with_output_collects_stderr() {
        // Any command works here; the wrapper does not care that it is
        // not actually ffmpeg
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo drained line >&2"]);

        let process = FfmpegProcess::spawn(&mut cmd).unwrap();
        let (status, stderr) = process.wait_with_output(&CancelToken::new()).unwrap();

        assert!(status.success());
        assert!(stderr.contains("drained line"));
    }

    #[test]
    fn test_wait_with_output_cancelled() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");

        let process = FfmpegProcess::spawn(&mut cmd).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let start = std::time::Instant::now();
        let result = process.wait_with_output(&token);

        assert!(matches!(result, Err(Vid2GifError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}

// ═══════════════════════════════════════════════════════════════
// Property tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Non-empty stderr always yields a non-empty message
        #[test]
        fn prop_format_error_non_empty(
            content in "[a-zA-Z0-9 ]{1,100}"
        ) {
            let error = format_ffmpeg_error(&content);
            prop_assert!(!error.is_empty(), "Error message should not be empty");
        }

        /// A line containing "Error" wins over surrounding noise
        #[test]
        fn prop_format_error_prefers_error_line(
            prefix in "[A-Z ]{0,50}",
            suffix in "[A-Z ]{0,50}"
        ) {
            let stderr = format!("{}\nError: test error message\n{}", prefix, suffix);
            let error = format_ffmpeg_error(&stderr);
            prop_assert!(error.contains("Error"),
                "Should contain 'Error', got: {}", error);
        }
    }
}
