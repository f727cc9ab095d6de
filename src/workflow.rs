use dialoguer::Confirm;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::bitrate;
use crate::cli::Args;
use crate::codec;
use crate::config::Config;
use crate::encoder::{EncodeDriver, EncoderBackend};
use crate::error::{Result, SizelockError};
use crate::plan;
use crate::probe::{FfprobeProbe, MediaProbe};
use crate::scale;

/// How a run ended. A declined overwrite is a clean abort, not an error.
#[derive(Debug)]
pub enum Outcome {
    Encoded(PathBuf),
    Declined,
}

pub struct Workflow {
    config: Config,
    probe: Box<dyn MediaProbe>,
    encoder: Box<dyn EncoderBackend>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let probe = Box::new(FfprobeProbe::new(config.media.ffprobe_path.clone()));
        let encoder = Box::new(EncodeDriver::new(config.media.clone()));

        // Fail before any work if the external encoder is missing.
        encoder.check_availability()?;

        Ok(Self {
            config,
            probe,
            encoder,
        })
    }

    #[cfg(test)]
    fn with_components(
        config: Config,
        probe: Box<dyn MediaProbe>,
        encoder: Box<dyn EncoderBackend>,
    ) -> Self {
        Self {
            config,
            probe,
            encoder,
        }
    }

    /// Probe, plan and encode one file per the parsed arguments.
    pub async fn run(&self, args: &Args) -> Result<Outcome> {
        if !args.input.exists() {
            return Err(SizelockError::Precondition(format!(
                "Input file not found: {}",
                args.input.display()
            )));
        }

        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if !output_dir.is_dir() {
            return Err(SizelockError::Precondition(format!(
                "Output directory not found: {}",
                output_dir.display()
            )));
        }

        let media_info = self.probe.probe(&args.input).await?;
        info!(
            "Probed {}: {:.2}s, video: {}, audio: {}",
            args.input.display(),
            media_info.duration_seconds,
            media_info
                .video
                .as_ref()
                .map(|v| format!("{} {}x{}", v.codec, v.width, v.height))
                .unwrap_or_else(|| "none".to_string()),
            media_info
                .audio
                .as_ref()
                .map(|a| format!("{} {} bps", a.codec, a.bitrate_bps))
                .unwrap_or_else(|| "none".to_string()),
        );

        let video_choice = codec::resolve_video(args.video_codec.as_deref())?;
        let audio_choice = codec::resolve_audio(
            args.audio_codec.as_deref(),
            media_info.audio.as_ref().map(|a| a.codec.as_str()),
            video_choice,
        )?;

        let resolution = match (&args.resolution, &media_info.video) {
            (Some(label), Some(v)) => Some(scale::scale(label, v.width, v.height)?),
            (Some(label), None) => {
                scale::parse_label(label)?;
                warn!("Ignoring resolution {}: input has no video stream", label);
                None
            }
            _ => None,
        };

        // Feasibility is decided before the subprocess ever starts.
        let source_audio_bps = media_info
            .audio
            .as_ref()
            .map(|a| a.bitrate_bps)
            .unwrap_or(0);
        let bitrates = bitrate::plan_bitrates(
            args.size,
            media_info.duration_seconds,
            source_audio_bps,
            args.audio_bitrate,
        )?;
        info!(
            "Planned bitrates for {} MiB: video {} bps, audio {} bps",
            args.size, bitrates.video_bps, bitrates.audio_bps
        );

        let encode_plan = plan::build_plan(
            &args.input,
            &output_dir,
            &media_info,
            video_choice,
            audio_choice,
            &bitrates,
            resolution,
            args.optimized,
            &self.config.media,
        )?;

        if args.print_args {
            println!(
                "{} {}",
                self.config.media.ffmpeg_path,
                encode_plan.ffmpeg_args().join(" ")
            );
        }

        // Benign race between this check and encode start; the prompt is the
        // only guard.
        if encode_plan.output_path().exists() {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Output file {} already exists. Overwrite?",
                    encode_plan.output_path().display()
                ))
                .default(false)
                .interact()
                .map_err(|e| {
                    SizelockError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
                })?;
            if !confirmed {
                info!("Overwrite declined, aborting");
                return Ok(Outcome::Declined);
            }
        }

        let start = Instant::now();
        self.encoder
            .encode(&encode_plan, media_info.duration_seconds, !args.no_progress)
            .await?;

        let output_path = encode_plan.output_path().to_path_buf();
        let output_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        println!(
            "Wrote {} ({:.2} MiB) in {:.1}s",
            output_path.display(),
            output_size as f64 / (1024.0 * 1024.0),
            start.elapsed().as_secs_f64()
        );

        Ok(Outcome::Encoded(output_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::EncodePlan;
    use crate::probe::{AudioStreamInfo, MediaInfo, VideoStreamInfo};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct FakeProbe {
        info: MediaInfo,
    }

    #[async_trait]
    impl MediaProbe for FakeProbe {
        async fn probe(&self, _path: &Path) -> crate::error::Result<MediaInfo> {
            Ok(self.info.clone())
        }
    }

    #[derive(Default)]
    struct RecordingEncoder {
        plans: Mutex<Vec<(Vec<String>, bool)>>,
    }

    #[async_trait]
    impl EncoderBackend for Arc<RecordingEncoder> {
        fn check_availability(&self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn encode(
            &self,
            plan: &EncodePlan,
            _total_seconds: f64,
            _show_progress: bool,
        ) -> crate::error::Result<()> {
            self.plans
                .lock()
                .unwrap()
                .push((plan.ffmpeg_args().to_vec(), plan.is_two_pass()));
            Ok(())
        }
    }

    fn sample_info() -> MediaInfo {
        MediaInfo {
            duration_seconds: 100.0,
            video: Some(VideoStreamInfo {
                codec: "h264".to_string(),
                width: 1920,
                height: 1080,
            }),
            audio: Some(AudioStreamInfo {
                codec: "aac".to_string(),
                bitrate_bps: 128_000,
            }),
        }
    }

    fn base_args(input: PathBuf, output_dir: PathBuf) -> Args {
        Args {
            input,
            size: 8.0,
            output_dir: Some(output_dir),
            video_codec: None,
            audio_codec: None,
            audio_bitrate: 0,
            resolution: None,
            print_args: false,
            no_progress: true,
            optimized: false,
            verbose: false,
            config: None,
        }
    }

    fn workflow_with(info: MediaInfo) -> (Workflow, Arc<RecordingEncoder>) {
        let encoder = Arc::new(RecordingEncoder::default());
        let workflow = Workflow::with_components(
            Config::default(),
            Box::new(FakeProbe { info }),
            Box::new(encoder.clone()),
        );
        (workflow, encoder)
    }

    #[tokio::test]
    async fn test_missing_input_is_precondition_error() {
        let (workflow, _) = workflow_with(sample_info());
        let args = base_args(PathBuf::from("/nonexistent/input.mp4"), PathBuf::from("."));
        assert!(matches!(
            workflow.run(&args).await,
            Err(SizelockError::Precondition(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (workflow, _) = workflow_with(sample_info());
        let args = base_args(input, PathBuf::from("/nonexistent/out"));
        assert!(matches!(
            workflow.run(&args).await,
            Err(SizelockError::Precondition(_))
        ));
    }

    #[tokio::test]
    async fn test_infeasible_size_fails_before_encode() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let mut info = sample_info();
        info.duration_seconds = 100_000.0;
        let (workflow, encoder) = workflow_with(info);

        let mut args = base_args(input, dir.path().to_path_buf());
        args.size = 0.5;
        assert!(matches!(
            workflow.run(&args).await,
            Err(SizelockError::Feasibility(_))
        ));
        assert!(encoder.plans.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_run_builds_expected_plan() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (workflow, encoder) = workflow_with(sample_info());
        let mut args = base_args(input, dir.path().to_path_buf());
        args.video_codec = Some("libvpx-vp9".to_string());
        args.audio_codec = Some("aac".to_string());

        let outcome = workflow.run(&args).await.unwrap();
        let output = match outcome {
            Outcome::Encoded(path) => path,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(output.extension().unwrap(), "webm");

        let plans = encoder.plans.lock().unwrap();
        assert_eq!(plans.len(), 1);
        let (plan_args, two_pass) = &plans[0];
        assert!(two_pass);
        // VP9 output forces Opus even though AAC was requested.
        let pos = plan_args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(plan_args[pos + 1], "libopus");
    }

    #[tokio::test]
    async fn test_invalid_resolution_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (workflow, _) = workflow_with(sample_info());
        let mut args = base_args(input, dir.path().to_path_buf());
        args.resolution = Some("tiny".to_string());
        assert!(matches!(
            workflow.run(&args).await,
            Err(SizelockError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_video_token_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (workflow, encoder) = workflow_with(sample_info());
        let mut args = base_args(input, dir.path().to_path_buf());
        args.video_codec = Some("divx".to_string());
        assert!(matches!(
            workflow.run(&args).await,
            Err(SizelockError::Config(_))
        ));
        assert!(encoder.plans.lock().unwrap().is_empty());
    }
}
