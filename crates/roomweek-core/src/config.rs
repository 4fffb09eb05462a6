use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `feed.url`.
pub const FEED_URL_ENV: &str = "ROOMWEEK_FEED_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Event feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Local feed cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Printable schedule layout
    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Endpoint returning every branch's events as JSON.
    ///
    /// Empty means "not configured"; `ROOMWEEK_FEED_URL` takes precedence.
    #[serde(default)]
    pub url: String,

    /// Key the downloaded feed is cached under
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_cache_key() -> String {
    "all-events".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            cache_key: default_cache_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store downloaded feeds locally (default: true)
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// SQLite database path; defaults to `<config_dir>/feed_cache.db`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// A cached feed older than this is downloaded again (default: 24)
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u32,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_max_age_hours() -> u32 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: None,
            max_age_hours: default_max_age_hours(),
        }
    }
}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.75,
            bottom: 0.75,
            left: 0.50,
            right: 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// `#rrggbb` form
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size in points
    #[serde(default = "default_font_size_pt")]
    pub font_size_pt: u32,

    /// Where the rendered schedule is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub margins: Margins,

    /// Day header background colour
    #[serde(default = "default_header_background")]
    pub header_background: Rgb,
}

fn default_header_background() -> Rgb {
    Rgb {
        r: 91,
        g: 155,
        b: 215,
    }
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size_pt() -> u32 {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("calendar.html")
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size_pt: default_font_size_pt(),
            output_path: default_output_path(),
            margins: Margins::default(),
            header_background: default_header_background(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            feed: FeedConfig::default(),
            cache: CacheConfig::default(),
            document: DocumentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roomweek")
}

impl Config {
    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    ///
    /// Returns the config and whether defaults were written.
    /// `ROOMWEEK_FEED_URL` overrides `feed.url` after the file is read.
    pub fn load_from(path: &Path) -> Result<(Self, bool)> {
        let created = !path.exists();
        let mut config = if created {
            let config = Self::default();
            config.save_to(path)?;
            config
        } else {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        };

        if let Ok(url) = std::env::var(FEED_URL_ENV) {
            config.apply_feed_url_override(url);
        }

        Ok((config, created))
    }

    fn apply_feed_url_override(&mut self, url: String) {
        if !url.trim().is_empty() {
            self.feed.url = url;
        }
    }

    /// Path of the feed cache database
    pub fn cache_path(&self) -> PathBuf {
        self.cache
            .path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("feed_cache.db"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.feed.is_configured() {
            self.validate_url(&self.feed.url, "feed.url", &mut result);
        } else {
            result.add_warning(
                "feed.url",
                format!("Feed URL not configured - set it or {FEED_URL_ENV}; only --offline will work"),
            );
        }

        if self.feed.cache_key.trim().is_empty() {
            result.add_error("feed.cache_key", "Cache key cannot be empty");
        }

        if self.feed.timeout_secs == 0 {
            result.add_error("feed.timeout_secs", "Timeout must be greater than 0");
        } else if self.feed.timeout_secs > 600 {
            result.add_warning("feed.timeout_secs", "Timeout is more than 10 minutes");
        }

        if self.cache.enabled && self.cache.max_age_hours == 0 {
            result.add_warning(
                "cache.max_age_hours",
                "Cached feeds expire immediately (0 hours)",
            );
        }

        let margins = self.document.margins;
        for (field, value) in [
            ("document.margins.top", margins.top),
            ("document.margins.bottom", margins.bottom),
            ("document.margins.left", margins.left),
            ("document.margins.right", margins.right),
        ] {
            if !value.is_finite() || value < 0.0 {
                result.add_error(field, "Margin must be a non-negative number of inches");
            } else if value > 3.0 {
                result.add_warning(field, "Margin is unusually large (>3 inches)");
            }
        }

        if self.document.font_family.trim().is_empty() {
            result.add_error("document.font_family", "Font family cannot be empty");
        }

        if self.document.font_size_pt == 0 {
            result.add_error("document.font_size_pt", "Font size must be greater than 0");
        } else if self.document.font_size_pt > 72 {
            result.add_warning("document.font_size_pt", "Font size is unusually large (>72pt)");
        }

        if self.document.output_path.as_os_str().is_empty() {
            result.add_error("document.output_path", "Output path cannot be empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("roomweek");

        Ok(config_dir.join("config.toml"))
    }
}
