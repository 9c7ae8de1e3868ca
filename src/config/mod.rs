use anyhow::{Context, Result};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API configuration
    pub youtube: YoutubeConfig,

    /// OpenAI configuration
    pub openai: OpenAiConfig,

    /// Google Maps configuration
    pub maps: MapsConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Data API v3 key, used for the description fallback when a video
    /// has no captions
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; place extraction is unavailable without it
    pub api_key: Option<String>,

    /// Chat model used for place extraction
    pub model: String,

    /// Base URL of the chat completions service
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Key shared by the Geocoding and Places APIs; places come back
    /// without coordinates when missing
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Caption language preference, tried in order
    pub transcript_languages: Vec<String>,

    /// Default output format
    pub default_output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YoutubeConfig::default(),
            openai: OpenAiConfig::default(),
            maps: MapsConfig::default(),
            app: AppConfig::default(),
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self { api_key: None }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-5-nano".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self { api_key: None }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transcript_languages: vec!["en".to_string(), "pl".to_string()],
            default_output_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, then apply environment overrides
    pub async fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;

                serde_yaml::from_str(&content)
                    .context("Failed to parse config file")?
            }
            _ => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        tracing::info!(
            "API keys loaded - YouTube: {}, OpenAI: {}, Google Maps: {}",
            key_mark(config.youtube.api_key.is_some()),
            key_mark(config.openai.api_key.is_some()),
            key_mark(config.maps.api_key.is_some()),
        );

        Ok(config)
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("trip-scout").join("config.yaml"))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("YOUTUBE_API_KEY").filter(|key| !key.is_empty()) {
            self.youtube.api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY").filter(|key| !key.is_empty()) {
            self.maps.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|model| !model.is_empty()) {
            self.openai.model = model;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.openai.model.trim().is_empty() {
            anyhow::bail!("OpenAI model name must not be empty");
        }

        if self.app.transcript_languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        Ok(())
    }

    /// Display which API keys are configured and what each one unlocks
    pub fn display_key_status(&self) {
        println!("API key status:");
        print_key_line(
            "OpenAI",
            self.openai.api_key.is_some(),
            "place extraction",
        );
        print_key_line(
            "Google Maps",
            self.maps.api_key.is_some(),
            "coordinates and photos",
        );
        print_key_line(
            "YouTube Data API",
            self.youtube.api_key.is_some(),
            "description fallback for videos without captions",
        );

        if self.openai.api_key.is_none() {
            println!();
            println!("Analysis will fail without an OpenAI key. Set OPENAI_API_KEY or add it to:");
            match Self::config_path() {
                Some(path) => println!("  {}", path.display()),
                None => println!("  config.yaml in the working directory"),
            }
        }
    }
}

fn print_key_line(name: &str, configured: bool, unlocks: &str) {
    let mark = if configured {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("  {} {} ({})", mark, name, unlocks);
}

fn key_mark(configured: bool) -> &'static str {
    if configured {
        "✓"
    } else {
        "✗"
    }
}
