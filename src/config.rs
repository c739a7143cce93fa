use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::chart::window::Window;
use crate::chart::PLACEHOLDER;
use crate::error::{Error, Result};
use crate::nowplaying::{Fallback, DEFAULT_INTERVAL};

/// Settings from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub placeholder: String,
    pub top_entries: usize,
    pub window: Window,
    pub now_playing: NowPlayingConfig,
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NowPlayingConfig {
    #[serde(deserialize_with = "parse_duration")]
    pub interval: Duration,
    #[serde(flatten)]
    pub fallback: Fallback,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            placeholder: PLACEHOLDER.to_string(),
            top_entries: 3,
            window: Window::default(),
            now_playing: NowPlayingConfig::default(),
            db_path: None,
        }
    }
}

impl Default for NowPlayingConfig {
    fn default() -> Self {
        NowPlayingConfig {
            interval: DEFAULT_INTERVAL,
            fallback: Fallback::default(),
        }
    }
}

fn parse_duration<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// ~/.config/chartwave/config.toml or platform equivalent
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "chartwave").ok_or(Error::DataDir("config"))?;
    Ok(dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;

        if config.window.min_weeks > config.window.max_weeks {
            tracing::warn!(
                min = config.window.min_weeks,
                max = config.window.max_weeks,
                "window.min_weeks exceeds window.max_weeks, no week will be comparable"
            );
        }

        Ok(config)
    }

    /// Load from `path`, or the default location. A missing default file
    /// yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Ok(p) => (p, false),
                Err(e) => {
                    tracing::debug!(error = %e, "no config directory, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Config::parse(&text)
            }
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }
}
