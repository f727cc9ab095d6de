use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SizelockError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Pixel format forced on video encodes (10-bit 4:2:0 by default)
    pub pixel_format: String,
    /// Encoder thread count passed as -threads (0 = auto)
    pub threads: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                ffmpeg_path: "ffmpeg".to_string(),
                ffprobe_path: "ffprobe".to_string(),
                pixel_format: "yuv420p10le".to_string(),
                threads: 0,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SizelockError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SizelockError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SizelockError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SizelockError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.media.ffmpeg_path, "ffmpeg");
        assert_eq!(parsed.media.ffprobe_path, "ffprobe");
        assert_eq!(parsed.media.pixel_format, "yuv420p10le");
        assert_eq!(parsed.media.threads, 0);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sizelock.toml");
        std::fs::write(
            &path,
            "[media]\nffmpeg_path = \"/opt/ffmpeg\"\nffprobe_path = \"ffprobe\"\npixel_format = \"yuv420p\"\nthreads = 4\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.media.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(config.media.pixel_format, "yuv420p");
        assert_eq!(config.media.threads, 4);
    }
}
