use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SizelockError};

/// Immutable snapshot of the input media, produced once per run.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub video: Option<VideoStreamInfo>,
    pub audio: Option<AudioStreamInfo>,
}

#[derive(Debug, Clone)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub bitrate_bps: u64,
}

/// Probe seam so planning logic can be tested without ffprobe.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// ffprobe-backed probe implementation.
pub struct FfprobeProbe {
    binary_path: String,
}

impl FfprobeProbe {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        debug!("Probing {} with {}", path.display(), self.binary_path);

        let output = Command::new(&self.binary_path)
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(path)
            .output()
            .await
            .map_err(|e| SizelockError::Probe(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SizelockError::Probe(format!(
                "ffprobe failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default)]
    streams: Vec<RawStream>,
    format: Option<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    // ffprobe reports bit_rate as a string
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    duration: Option<String>,
}

/// Parse ffprobe JSON output into a `MediaInfo` snapshot.
///
/// Only the first video and first audio stream are considered; the rest of
/// the container is ignored.
pub fn parse_probe_output(json: &str) -> Result<MediaInfo> {
    let raw: RawProbe = serde_json::from_str(json)?;

    let duration_seconds = raw
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| SizelockError::Probe("Media has no readable duration".to_string()))?;

    let mut video = None;
    let mut audio = None;
    for stream in &raw.streams {
        match stream.codec_type.as_deref() {
            Some("video") if video.is_none() => {
                video = Some(VideoStreamInfo {
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                });
            }
            Some("audio") if audio.is_none() => {
                audio = Some(AudioStreamInfo {
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    bitrate_bps: stream
                        .bit_rate
                        .as_deref()
                        .and_then(|b| b.parse::<u64>().ok())
                        .unwrap_or(0),
                });
            }
            _ => {}
        }
    }

    if video.is_none() && audio.is_none() {
        return Err(SizelockError::Probe(
            "Media has neither a video nor an audio stream".to_string(),
        ));
    }

    Ok(MediaInfo {
        duration_seconds,
        video,
        audio,
    })
}
