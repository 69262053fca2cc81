//! Runtime configuration and credentials.
//!
//! [`AppConfig`] is read from an optional YAML file, every field having a
//! default, and is then patched with command-line overrides in `main`.
//! The resulting value is passed explicitly to the list source, the
//! pipeline and the session; nothing here is global.
//!
//! ```yaml
//! sheet_key: 1NroZCjXYE9s9uiLAtDeaM2T6FeKdF0C2PNrpk5WqS7g
//! worksheet: Sheet1
//! credentials_file: credentials.json
//! output_path: news_output.mp4
//! header_text: BREAKING NEWS
//! resolution: [1280, 720]
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Spreadsheet key of the article list.
    pub sheet_key: Option<String>,
    /// Worksheet (tab) name inside the spreadsheet.
    pub worksheet: String,
    /// JSON file holding the sheet credentials.
    pub credentials_file: PathBuf,
    /// Local YAML/JSON article list; takes precedence over the sheet.
    pub records_file: Option<PathBuf>,
    /// Where the rendered video is written (overwritten on every run).
    pub output_path: PathBuf,
    /// Directory for the intermediate narration and image files.
    pub work_dir: PathBuf,
    /// Banner text across the top of the video.
    pub header_text: String,
    /// Output resolution as `[width, height]`.
    pub resolution: (u32, u32),
    /// Output frame rate.
    pub fps: u32,
    /// Narration language code.
    pub language: String,
    /// Number of leading sentences used as narration.
    pub max_sentences: usize,
    /// Minimum clip length in seconds.
    pub min_duration_secs: f64,
    pub page_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub tts_timeout_secs: u64,
    /// Base URL of the image search service.
    pub image_search_url: String,
    /// Base URL of the speech service.
    pub tts_url: String,
    /// Base URL of the spreadsheet API.
    pub sheets_api_url: String,
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Font used for the banner and title; ffmpeg's default when unset.
    pub font_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_key: None,
            worksheet: "Sheet1".to_string(),
            credentials_file: PathBuf::from("credentials.json"),
            records_file: None,
            output_path: PathBuf::from("news_output.mp4"),
            work_dir: std::env::temp_dir().join("news_video"),
            header_text: "BREAKING NEWS".to_string(),
            resolution: (1280, 720),
            fps: 24,
            language: "en".to_string(),
            max_sentences: 3,
            min_duration_secs: 5.0,
            page_timeout_secs: 8,
            image_timeout_secs: 12,
            search_timeout_secs: 10,
            tts_timeout_secs: 10,
            image_search_url: "https://duckduckgo.com".to_string(),
            tts_url: "https://translate.google.com".to_string(),
            sheets_api_url: "https://sheets.googleapis.com".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            font_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = self.resolution;
        if w == 0 || h == 0 || w % 2 != 0 || h % 2 != 0 {
            return Err(ConfigError::Invalid {
                key: "resolution",
                message: format!("{w}x{h} must be non-zero and even"),
            });
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                key: "fps",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_sentences == 0 {
            return Err(ConfigError::Invalid {
                key: "max_sentences",
                message: "must be at least 1".to_string(),
            });
        }
        if self.min_duration_secs.is_nan() || self.min_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "min_duration_secs",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs)
    }
}

/// Credentials for the spreadsheet API.
///
/// Either an API key (public sheets) or an already-issued OAuth access
/// token. Obtaining a token is left to external tooling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl Credentials {
    /// Read credentials from a JSON file. Unknown fields are ignored.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.access_token.is_none()
    }
}
