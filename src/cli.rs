use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Re-encode a media file to hit a target output size", long_about = None)]
pub struct Args {
    /// Input media file
    pub input: PathBuf,

    /// Target output size in MiB
    #[arg(short = 's', long)]
    pub size: f64,

    /// Output directory (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Video codec to encode with (e.g. h264, libx265, vp9, av1).
    /// Omit to keep the source codec.
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Audio codec to encode with (e.g. aac, mp3, opus).
    /// Omit to keep the source codec.
    #[arg(long)]
    pub audio_codec: Option<String>,

    /// Audio bitrate override in bits per second (0 = use source bitrate)
    #[arg(long, default_value_t = 0)]
    pub audio_bitrate: u64,

    /// Output resolution label applied to the longer dimension (e.g. 480p)
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Print the ffmpeg argument list before encoding
    #[arg(long)]
    pub print_args: bool,

    /// Suppress the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Apply the curated tuning flags for VP9/AV1 encodes
    #[arg(long)]
    pub optimized: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
