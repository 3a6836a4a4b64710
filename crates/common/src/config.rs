//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where downloaded strips are written.
    pub output_dir: PathBuf,

    /// Burst capture settings.
    #[serde(default)]
    pub capture: CaptureDefaults,

    /// Strip compositing settings.
    #[serde(default)]
    pub strip: StripDefaults,

    /// Persistence boundary settings.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default burst capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDefaults {
    /// Number of shot attempts per burst.
    pub shot_count: usize,

    /// Countdown length in ticks before each shot.
    pub countdown_ticks: u8,

    /// Duration of a single countdown tick (ms).
    pub tick_ms: u64,

    /// Pause between a shot and the next countdown (ms).
    pub pause_ms: u64,

    /// Delay between burst completion and the compositing handoff (ms).
    pub handoff_ms: u64,

    /// Edge length of the square captured frame (px).
    pub output_size: u32,

    /// Filter tag used when none is given on the command line.
    pub default_filter: String,
}

/// Default strip compositing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripDefaults {
    /// Palette name or `#rrggbb` value.
    pub background: String,

    /// Footer caption text.
    pub caption: String,

    /// File name used for the local download.
    pub download_name: String,
}

/// Persistence boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Whether finished strips are handed to the store.
    pub enabled: bool,

    /// Root directory of the local store.
    pub store_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "snapstrip=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            capture: CaptureDefaults::default(),
            strip: StripDefaults::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            shot_count: 6,
            countdown_ticks: 3,
            tick_ms: 1000,
            pause_ms: 500,
            handoff_ms: 200,
            output_size: 600,
            default_filter: "none".to_string(),
        }
    }
}

impl Default for StripDefaults {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            caption: "Picapica © 2025".to_string(),
            download_name: "photostrip.png".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_dir: dirs_default_store(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl CaptureDefaults {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn handoff(&self) -> Duration {
        Duration::from_millis(self.handoff_ms)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Standard config file location.
    pub fn path() -> PathBuf {
        config_file_path()
    }
}

fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("snapstrip").join("config.json")
}

/// Default store directory.
fn dirs_default_store() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("snapstrip").join("store")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_defaults_match_burst_timing() {
        let capture = CaptureDefaults::default();
        assert_eq!(capture.shot_count, 6);
        assert_eq!(capture.countdown_ticks, 3);
        assert_eq!(capture.tick(), Duration::from_secs(1));
        assert_eq!(capture.pause(), Duration::from_millis(500));
        assert_eq!(capture.output_size, 600);
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let config: AppConfig = serde_json::from_str(r#"{ "output_dir": "/srv/booth" }"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/booth"));
        assert_eq!(config.strip.download_name, "photostrip.png");
        assert!(config.upload.enabled);
        assert_eq!(config.logging.level, "info");
    }
}
