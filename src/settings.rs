use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{DEFAULT_CACHE_TTL, DEFAULT_TIMEOUT};
use crate::sources::{Source, SourceCatalog};
use crate::theme::ThemeVariant;
use crate::time::TimeDisplay;

const APP_SENTINEL: &str = "dispatches";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_app")]
    pub app: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// 0 disables the page cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_display: Option<TimeDisplay>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeVariant>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: APP_SENTINEL.to_string(),
            api_url: None,
            timeout_secs: None,
            cache_ttl_secs: None,
            time_display: None,
            theme: None,
            sources: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.app != APP_SENTINEL {
            bail!(
                "Settings file appears to belong to another application (expected _app = '{}', found '{}')",
                APP_SENTINEL,
                self.app
            );
        }
        if let Some(sources) = &self.sources
            && sources.is_empty()
        {
            bail!("Settings file lists no sources; remove `sources` to use the defaults");
        }
        Ok(())
    }
}

/// Values from the command line and environment that beat the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub time_display: Option<TimeDisplay>,
    pub theme: Option<ThemeVariant>,
}

/// Settings with every default filled in and the API URL validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub time_display: TimeDisplay,
    pub theme: ThemeVariant,
    pub catalog: SourceCatalog,
}

impl Config {
    pub fn resolve(settings: &Settings, overrides: &Overrides) -> Result<Self> {
        let raw_url = overrides
            .api_url
            .as_deref()
            .or(settings.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL);
        let api_url =
            Url::parse(raw_url).with_context(|| format!("Invalid API URL '{}'", raw_url))?;
        if api_url.cannot_be_a_base() {
            bail!("API URL '{}' must be an http(s) URL", raw_url);
        }

        Ok(Self {
            api_url,
            timeout: settings
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            cache_ttl: settings
                .cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CACHE_TTL),
            time_display: overrides
                .time_display
                .or(settings.time_display)
                .unwrap_or_default(),
            theme: overrides.theme.or(settings.theme).unwrap_or_default(),
            catalog: settings
                .sources
                .clone()
                .map(SourceCatalog::new)
                .unwrap_or_default(),
        })
    }
}

pub fn config_dir(custom: Option<&PathBuf>) -> Option<PathBuf> {
    custom
        .cloned()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config").join("dispatches")))
}

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.toml")
}

pub fn log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("dispatches.log")
}
