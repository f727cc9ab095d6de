use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SizelockError};
use crate::plan::EncodePlan;
use crate::progress::{ProgressParser, ProgressSample, ProgressTracker};

/// Arguments prepended to every ffmpeg invocation.
const FFMPEG_BASE_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-nostats", "-loglevel", "error"];

/// Driver seam so the workflow can be tested without ffmpeg.
#[async_trait]
pub trait EncoderBackend: Send + Sync {
    /// Check that the external encoder binary can be executed.
    fn check_availability(&self) -> Result<()>;

    /// Run the encode described by `plan`, streaming progress samples.
    async fn encode(&self, plan: &EncodePlan, total_seconds: f64, show_progress: bool)
        -> Result<()>;
}

/// ffmpeg-backed driver. Progress arrives on stdout as `-progress pipe:1`
/// key=value blocks; stdout is drained to EOF before the exit status is
/// read, so every sample is observed before the completion signal.
pub struct EncodeDriver {
    config: MediaConfig,
}

impl EncodeDriver {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EncoderBackend for EncodeDriver {
    fn check_availability(&self) -> Result<()> {
        let output = std::process::Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .map_err(|e| {
                SizelockError::Precondition(format!(
                    "ffmpeg not found at '{}': {}",
                    self.config.ffmpeg_path, e
                ))
            })?;

        if output.status.success() {
            debug!("ffmpeg is available at {}", self.config.ffmpeg_path);
            Ok(())
        } else {
            Err(SizelockError::Precondition(
                "ffmpeg version check failed".to_string(),
            ))
        }
    }

    async fn encode(
        &self,
        plan: &EncodePlan,
        total_seconds: f64,
        show_progress: bool,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(FFMPEG_BASE_ARGS)
            .arg("-progress")
            .arg("pipe:1")
            .args(plan.ffmpeg_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing: {} {:?}", self.config.ffmpeg_path, plan.ffmpeg_args());

        let mut child = cmd
            .spawn()
            .map_err(|e| SizelockError::Encode(format!("Failed to execute ffmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SizelockError::Encode("ffmpeg stdout unavailable".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SizelockError::Encode("ffmpeg stderr unavailable".to_string()))?;

        let (tx, mut rx) = mpsc::channel::<ProgressSample>(64);
        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut parser = ProgressParser::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(sample) = parser.feed_line(&line) {
                    if tx.send(sample).await.is_err() {
                        break;
                    }
                }
            }
        });

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let bar = if show_progress {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% (eta {msg})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(bar)
        } else {
            None
        };

        let mut tracker = ProgressTracker::new();
        let two_pass = plan.is_two_pass();
        while let Some(sample) = rx.recv().await {
            let report = tracker.on_sample(sample.elapsed_seconds, total_seconds, two_pass);
            if let Some(bar) = &bar {
                bar.set_position(report.percent as u64);
                bar.set_message(format_eta(report.eta));
            }
        }

        // The channel closes once stdout hits EOF, so every progress sample
        // has been handled before the exit status is observed.
        let _ = reader_task.await;
        let status = child
            .wait()
            .await
            .map_err(|e| SizelockError::Encode(format!("Failed to wait for ffmpeg: {}", e)))?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }

        if !status.success() {
            return Err(SizelockError::Encode(format!(
                "ffmpeg exited with status {}: {}",
                status.code().unwrap_or(-1),
                stderr_output.trim()
            )));
        }

        info!("Encode completed: {}", plan.output_path().display());
        Ok(())
    }
}

/// Format an ETA for display: "42s", "3m 10s", "1h 02m".
fn format_eta(eta: Duration) -> String {
    let seconds = eta.as_secs();
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {:02}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
