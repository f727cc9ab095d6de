use crate::error::{Result, SizelockError};

/// Bits of output budget per KiB of target size, spread over one second,
/// in the kilobit-per-second units ffmpeg rate control uses.
const BITS_PER_KIB_SECOND: f64 = 8.0 * 1024.0 * 1024.0 / 1000.0;

/// Highest bitrate accepted per stream, in bits per second.
const MAX_STREAM_BITRATE: f64 = u32::MAX as f64;

/// Bitrate budget for one encode, in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitratePlan {
    pub video_bps: u64,
    pub audio_bps: u64,
}

/// Split a target output size into video and audio bitrate budgets.
///
/// The audio budget is the override when non-zero, otherwise the source
/// stream's bitrate (zero when there is no audio stream); video gets the
/// remainder. Duration is truncated to whole seconds, matching the sizes
/// the original tool produced for fractional durations.
pub fn plan_bitrates(
    target_size_mib: f64,
    duration_seconds: f64,
    source_audio_bps: u64,
    audio_override_bps: u64,
) -> Result<BitratePlan> {
    let whole_seconds = duration_seconds.trunc();
    if whole_seconds <= 0.0 {
        return Err(SizelockError::Feasibility(
            "media duration must be at least one second".to_string(),
        ));
    }

    let target_kib = target_size_mib * 1024.0;
    let desired_bps = target_kib * BITS_PER_KIB_SECOND / whole_seconds;

    let audio_bps = if audio_override_bps != 0 {
        audio_override_bps as f64
    } else {
        source_audio_bps as f64
    };
    let video_bps = desired_bps - audio_bps;

    if video_bps <= 0.0 {
        return Err(SizelockError::Feasibility(format!(
            "{} MiB is too small for {} seconds of media with {} bps audio",
            target_size_mib, whole_seconds, audio_bps
        )));
    }
    if video_bps > MAX_STREAM_BITRATE || audio_bps > MAX_STREAM_BITRATE {
        return Err(SizelockError::Feasibility(format!(
            "{} MiB over {} seconds exceeds the representable bitrate range",
            target_size_mib, whole_seconds
        )));
    }

    Ok(BitratePlan {
        video_bps: video_bps as u64,
        audio_bps: audio_bps as u64,
    })
}
