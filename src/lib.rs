//! Sizelock - Target-Size Media Re-Encoder
//!
//! Re-encodes a single media file so the output lands close to a requested
//! file size, by planning a bitrate budget from the target size and driving
//! ffmpeg with the derived parameters.

pub mod bitrate;
pub mod cli;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod error;
pub mod plan;
pub mod probe;
pub mod progress;
pub mod scale;
pub mod workflow;
