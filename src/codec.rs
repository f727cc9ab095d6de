use crate::error::{Result, SizelockError};

/// Video codecs this tool can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecId {
    H264,
    Hevc,
    Vp8,
    Vp9,
    Av1,
}

/// Audio codecs this tool can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodecId {
    Aac,
    Mp3,
    Opus,
}

/// Outcome of codec resolution for one stream.
///
/// `KeepSource` means the stream is re-encoded at the planned bitrate with
/// the container's default encoder; no `-c:v`/`-c:a` argument is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecChoice<C> {
    KeepSource,
    Explicit(C),
}

impl VideoCodecId {
    /// ffmpeg encoder name.
    pub fn encoder_name(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Hevc => "libx265",
            Self::Vp8 => "libvpx",
            Self::Vp9 => "libvpx-vp9",
            Self::Av1 => "libaom-av1",
        }
    }

    /// Container extension used when this codec was explicitly requested.
    pub fn container_extension(self) -> &'static str {
        match self {
            Self::H264 | Self::Hevc => "mp4",
            Self::Vp8 | Self::Vp9 | Self::Av1 => "webm",
        }
    }

    /// Whether the encoder reports progress across two full-duration passes.
    pub fn is_two_pass(self) -> bool {
        matches!(self, Self::Vp8 | Self::Vp9 | Self::Av1)
    }
}

impl AudioCodecId {
    /// ffmpeg encoder name.
    pub fn encoder_name(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Mp3 => "libmp3lame",
            Self::Opus => "libopus",
        }
    }

    /// Container extension for audio-only output.
    pub fn container_extension(self) -> &'static str {
        match self {
            Self::Aac => "m4a",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }
}

// Alias order matters: VP9 must be probed before VP8 so a "libvpx-vp9"
// token does not hit the bare "libvpx" alias first.
const VIDEO_TOKENS: &[(VideoCodecId, &[&str])] = &[
    (VideoCodecId::H264, &["h264", "libx264"]),
    (VideoCodecId::Hevc, &["h265", "libx265", "hevc"]),
    (VideoCodecId::Vp9, &["vp9", "libvpx-vp9"]),
    (VideoCodecId::Av1, &["av1", "libaom-av1"]),
    (VideoCodecId::Vp8, &["vp8", "libvpx"]),
];

const AUDIO_TOKENS: &[(AudioCodecId, &[&str])] = &[
    (AudioCodecId::Aac, &["aac"]),
    (AudioCodecId::Mp3, &["mp3", "libmp3lame"]),
    (AudioCodecId::Opus, &["opus", "libopus"]),
];

/// Resolve a user-supplied video codec token.
///
/// Matching is case-insensitive containment against the known aliases.
/// An absent token means the source codec is kept; an unrecognized token
/// is a configuration error.
pub fn resolve_video(requested: Option<&str>) -> Result<CodecChoice<VideoCodecId>> {
    let token = match requested {
        Some(t) => t.to_lowercase(),
        None => return Ok(CodecChoice::KeepSource),
    };

    for (id, aliases) in VIDEO_TOKENS {
        if aliases.iter().any(|alias| token.contains(alias)) {
            return Ok(CodecChoice::Explicit(*id));
        }
    }

    Err(SizelockError::Config(format!(
        "Unknown video codec '{}'. Supported: h264, h265/hevc, vp8, vp9, av1",
        token
    )))
}

/// Resolve the audio codec for the output.
///
/// WebM-family video output forces Opus audio regardless of the requested
/// token. Without an explicit request, a vorbis source is substituted with
/// AAC; any other source codec is kept.
pub fn resolve_audio(
    requested: Option<&str>,
    source_codec: Option<&str>,
    video: CodecChoice<VideoCodecId>,
) -> Result<CodecChoice<AudioCodecId>> {
    if let CodecChoice::Explicit(v) = video {
        if v.is_two_pass() {
            return Ok(CodecChoice::Explicit(AudioCodecId::Opus));
        }
    }

    if let Some(token) = requested {
        let token = token.to_lowercase();
        for (id, aliases) in AUDIO_TOKENS {
            if aliases.iter().any(|alias| token.contains(alias)) {
                return Ok(CodecChoice::Explicit(*id));
            }
        }
        return Err(SizelockError::Config(format!(
            "Unknown audio codec '{}'. Supported: aac, mp3, opus",
            token
        )));
    }

    // Vorbis is deprecated for this tool's output targets.
    if source_codec == Some("vorbis") {
        return Ok(CodecChoice::Explicit(AudioCodecId::Aac));
    }

    Ok(CodecChoice::KeepSource)
}

/// Derive the output container extension.
///
/// An explicit video codec decides the container; keeping the source codec
/// keeps the source extension. Without a video stream the resolved audio
/// codec decides instead.
pub fn container_extension(
    has_video: bool,
    video: CodecChoice<VideoCodecId>,
    audio: CodecChoice<AudioCodecId>,
    source_extension: &str,
) -> String {
    if has_video {
        match video {
            CodecChoice::Explicit(v) => v.container_extension().to_string(),
            CodecChoice::KeepSource => source_extension.to_string(),
        }
    } else {
        match audio {
            CodecChoice::Explicit(a) => a.container_extension().to_string(),
            CodecChoice::KeepSource => source_extension.to_string(),
        }
    }
}
