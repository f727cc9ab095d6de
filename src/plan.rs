use std::path::{Path, PathBuf};

use crate::bitrate::BitratePlan;
use crate::codec::{self, AudioCodecId, CodecChoice, VideoCodecId};
use crate::config::MediaConfig;
use crate::error::{Result, SizelockError};
use crate::probe::MediaInfo;
use crate::scale::Resolution;

/// Curated libvpx-vp9 tuning flags, applied verbatim in optimized mode.
pub const VP9_TUNING: &[&str] = &[
    "-row-mt", "1", "-cpu-used", "2", "-tile-columns", "2", "-frame-parallel", "1",
    "-auto-alt-ref", "1", "-lag-in-frames", "25",
];

/// Curated libaom-av1 tuning flags, applied verbatim in optimized mode.
pub const AV1_TUNING: &[&str] = &[
    "-row-mt", "1", "-cpu-used", "4", "-tiles", "2x2", "-lag-in-frames", "25",
];

/// Ordered ffmpeg argument list for one encode.
///
/// Built through value-returning transformations and read-only once handed
/// to the driver.
#[derive(Debug, Clone)]
pub struct EncodePlan {
    args: Vec<String>,
    output_path: PathBuf,
    two_pass: bool,
}

impl EncodePlan {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            output_path: PathBuf::new(),
            two_pass: false,
        }
    }

    /// Add an argument
    fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    fn input(self, path: &Path) -> Self {
        self.arg("-i").arg(path.to_string_lossy().to_string())
    }

    fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    fn video_codec(self, codec: &str) -> Self {
        self.arg("-c:v").arg(codec)
    }

    fn video_bitrate(self, bps: u64) -> Self {
        self.arg("-b:v").arg(bps.to_string())
    }

    fn pixel_format(self, format: &str) -> Self {
        self.arg("-pix_fmt").arg(format)
    }

    fn audio_codec(self, codec: &str) -> Self {
        self.arg("-c:a").arg(codec)
    }

    fn audio_bitrate(self, bps: u64) -> Self {
        self.arg("-b:a").arg(bps.to_string())
    }

    fn no_video(self) -> Self {
        self.arg("-vn")
    }

    fn threads(self, count: u32) -> Self {
        self.arg("-threads").arg(count.to_string())
    }

    fn overwrite(self) -> Self {
        self.arg("-y")
    }

    fn output(mut self, path: PathBuf) -> Self {
        self.args.push(path.to_string_lossy().to_string());
        self.output_path = path;
        self
    }

    fn two_pass(mut self, two_pass: bool) -> Self {
        self.two_pass = two_pass;
        self
    }

    pub fn ffmpeg_args(&self) -> &[String] {
        &self.args
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Whether the resolved video codec reports progress over two passes.
    pub fn is_two_pass(&self) -> bool {
        self.two_pass
    }
}

/// Compose the probe snapshot and all resolution decisions into the final
/// encoder parameter list and output path.
pub fn build_plan(
    input: &Path,
    output_dir: &Path,
    info: &MediaInfo,
    video: CodecChoice<VideoCodecId>,
    audio: CodecChoice<AudioCodecId>,
    bitrates: &BitratePlan,
    resolution: Option<Resolution>,
    optimized: bool,
    media: &MediaConfig,
) -> Result<EncodePlan> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            SizelockError::Config(format!("Cannot derive a file stem from {}", input.display()))
        })?;
    let source_extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");

    let extension = codec::container_extension(info.video.is_some(), video, audio, source_extension);
    let output_path = output_dir.join(format!("{}-target.{}", stem, extension));

    let mut plan = EncodePlan::new().input(input);

    // Scaling precedes codec settings so the pixel format applies to the
    // already-scaled frame.
    if let Some(res) = resolution {
        plan = plan.video_filter(format!("scale={}:{}", res.width, res.height));
    }

    if info.video.is_some() {
        if let CodecChoice::Explicit(v) = video {
            plan = plan.video_codec(v.encoder_name());
        }
        plan = plan
            .video_bitrate(bitrates.video_bps)
            .pixel_format(&media.pixel_format);

        if optimized {
            match video {
                CodecChoice::Explicit(VideoCodecId::Vp9) => plan = plan.args(VP9_TUNING.iter().copied()),
                CodecChoice::Explicit(VideoCodecId::Av1) => plan = plan.args(AV1_TUNING.iter().copied()),
                _ => {}
            }
        }
    } else {
        plan = plan.no_video();
    }

    if info.audio.is_some() {
        if let CodecChoice::Explicit(a) = audio {
            plan = plan.audio_codec(a.encoder_name());
        }
        if bitrates.audio_bps > 0 {
            plan = plan.audio_bitrate(bitrates.audio_bps);
        }
    }

    let two_pass = matches!(video, CodecChoice::Explicit(v) if v.is_two_pass());

    Ok(plan
        .threads(media.threads)
        .overwrite()
        .two_pass(two_pass)
        .output(output_path))
}
