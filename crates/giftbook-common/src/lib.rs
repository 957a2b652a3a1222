//! Common configuration and types shared across Giftbook crates

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the presentation configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How content pages map onto page scenes.
///
/// `ZeroBased` gives every page its own scene (`page-0` .. `page-{n-1}`).
/// `BackCoverExcluded` drops the scene of the last page, which then only
/// turns in the finale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageIndexing {
    #[default]
    ZeroBased,
    BackCoverExcluded,
}

impl PageIndexing {
    /// Offset added to the page count to get the number of page scenes
    pub fn offset(&self) -> i64 {
        match self {
            PageIndexing::ZeroBased => 0,
            PageIndexing::BackCoverExcluded => -1,
        }
    }

    /// Number of page scenes for `page_count` physical pages
    pub fn scene_pages(&self, page_count: usize) -> usize {
        (page_count as i64 + self.offset()).max(0) as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageIndexing::ZeroBased => "zero-based",
            PageIndexing::BackCoverExcluded => "back-cover-excluded",
        }
    }
}

impl std::str::FromStr for PageIndexing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zero-based" => Ok(PageIndexing::ZeroBased),
            "back-cover-excluded" => Ok(PageIndexing::BackCoverExcluded),
            other => Err(ConfigError::Invalid(format!("unknown page indexing '{}'", other))),
        }
    }
}

/// The storybook itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Number of content pages in the book
    pub page_count: usize,
    pub page_indexing: PageIndexing,
    /// Scene name to start from (e.g. "book-open"); `None` starts at the gift
    pub start_at: Option<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            page_count: 3,
            page_indexing: PageIndexing::ZeroBased,
            start_at: None,
        }
    }
}

/// Timings in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum interval between two accepted steps
    pub cooldown_ms: u64,
    /// Delay between the book opening and the cover flip
    pub cover_flip_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 600,
            cover_flip_delay_ms: 300,
        }
    }
}

/// Gesture thresholds and navigation keys
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Wheel deltas below this magnitude are treated as touchpad noise
    pub wheel_noise_floor: f32,
    /// Vertical drag distance a swipe has to exceed
    pub swipe_threshold: f32,
    pub forward_key: String,
    pub backward_key: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel_noise_floor: 2.0,
            swipe_threshold: 30.0,
            forward_key: "ArrowUp".to_string(),
            backward_key: "ArrowDown".to_string(),
        }
    }
}

/// Background music
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub music: Option<PathBuf>,
    /// Volume (0.0 – 1.0)
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music: None,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Integer scale of the 640×480 framebuffer
    pub scale: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub book: BookConfig,
    pub timing: TimingConfig,
    pub input: InputConfig,
    pub audio: AudioConfig,
    pub window: WindowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            book: BookConfig::default(),
            timing: TimingConfig::default(),
            input: InputConfig::default(),
            audio: AudioConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the config from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let input = &self.input;
        if !(input.wheel_noise_floor >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "input.wheel_noise_floor must be >= 0, got {}",
                input.wheel_noise_floor
            )));
        }
        if !(input.swipe_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "input.swipe_threshold must be >= 0, got {}",
                input.swipe_threshold
            )));
        }
        if input.forward_key.is_empty() || input.backward_key.is_empty() {
            return Err(ConfigError::Invalid("navigation keys must not be empty".into()));
        }
        if input.forward_key == input.backward_key {
            return Err(ConfigError::Invalid(format!(
                "forward and backward key are both '{}'",
                input.forward_key
            )));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::Invalid(format!(
                "audio.volume must be within 0.0..=1.0, got {}",
                self.audio.volume
            )));
        }
        if self.window.scale == 0 {
            return Err(ConfigError::Invalid("window.scale must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_match_original_timings() {
        let config = AppConfig::default();
        assert_eq!(config.timing.cooldown_ms, 600);
        assert_eq!(config.timing.cover_flip_delay_ms, 300);
        assert_eq!(config.input.wheel_noise_floor, 2.0);
        assert_eq!(config.input.swipe_threshold, 30.0);
        assert_eq!(config.input.forward_key, "ArrowUp");
        assert_eq!(config.input.backward_key, "ArrowDown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [book]
            page_count = 5
            page_indexing = "back-cover-excluded"

            [timing]
            cooldown_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.book.page_count, 5);
        assert_eq!(config.book.page_indexing, PageIndexing::BackCoverExcluded);
        assert_eq!(config.timing.cooldown_ms, 250);
        assert_eq!(config.timing.cover_flip_delay_ms, 300);
        assert_eq!(config.input.forward_key, "ArrowUp");
    }

    #[test]
    fn rejects_identical_keys() {
        let err = AppConfig::from_toml(
            r#"
            [input]
            forward_key = "Space"
            backward_key = "Space"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_volume_out_of_range() {
        let err = AppConfig::from_toml("[audio]\nvolume = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AppConfig::from_toml("[book\npage_count = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = env::temp_dir().join("giftbook_test_config").join("does_not_exist.toml");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.book.page_count, 3);
    }

    #[test]
    fn load_from_disk() {
        let dir = env::temp_dir().join("giftbook_test_config").join("load");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("giftbook.toml");
        std::fs::write(&path, "[book]\npage_count = 7\nstart_at = \"book-open\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.book.page_count, 7);
        assert_eq!(config.book.start_at.as_deref(), Some("book-open"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn scene_pages_per_indexing() {
        assert_eq!(PageIndexing::ZeroBased.scene_pages(3), 3);
        assert_eq!(PageIndexing::BackCoverExcluded.scene_pages(3), 2);
        assert_eq!(PageIndexing::ZeroBased.scene_pages(0), 0);
        assert_eq!(PageIndexing::BackCoverExcluded.scene_pages(0), 0);
    }

    #[test]
    fn indexing_names_parse_back() {
        for indexing in [PageIndexing::ZeroBased, PageIndexing::BackCoverExcluded] {
            assert_eq!(indexing.name().parse::<PageIndexing>().unwrap(), indexing);
        }
        assert!("one-based".parse::<PageIndexing>().is_err());
    }
}
