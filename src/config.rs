// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent settings are stored with `confy` in TOML format. The theme is
//! the only UI choice that survives a restart; everything else here tunes
//! the map and its animations.

use std::time::Duration;

use atlas_core::{AnimatorConfig, AtlasConfig, Theme};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "resume-atlas";
const CONFIG_NAME: &str = "config";

/// Current configuration schema version
pub const CONFIG_VERSION: u32 = 1;

/// Initial map view, roughly the geographic center of the contiguous US
pub const DEFAULT_LATITUDE: f64 = 39.8283;
pub const DEFAULT_LONGITUDE: f64 = -98.5795;
pub const DEFAULT_ZOOM: f64 = 3.5;

pub const DEFAULT_MAPBOX_STYLE: &str = "mapbox/dark-v11";

/// Environment variable that overrides `mapbox_token`
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Name shown in the header
    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// Headline shown under the name
    #[serde(default)]
    pub header_title: String,

    /// Color theme: "dark" or "light"
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Basemap provider: "carto" or "mapbox"
    #[serde(default = "default_tile_provider")]
    pub tile_provider: String,

    /// Mapbox access token (optional, env var takes precedence)
    #[serde(default)]
    pub mapbox_token: Option<String>,

    /// Mapbox style id used with the "mapbox" provider
    #[serde(default = "default_mapbox_style")]
    pub mapbox_style: String,

    #[serde(default = "default_latitude")]
    pub initial_latitude: f64,

    #[serde(default = "default_longitude")]
    pub initial_longitude: f64,

    #[serde(default = "default_zoom")]
    pub initial_zoom: f64,

    /// Fade-in / fade-out duration of filter transitions
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u64,

    /// Quiet period before a year slider change is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Position jitter in degrees for entries sharing a location
    #[serde(default = "default_jitter_amplitude")]
    pub jitter_amplitude: f64,

    /// Filter and timeline controls expanded state
    #[serde(default = "default_true")]
    pub controls_expanded: bool,

    /// Résumé data file; the bundled collection is used when unset
    #[serde(default)]
    pub data_path: Option<String>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    CONFIG_VERSION
}

fn default_header_name() -> String {
    "Résumé Atlas".to_string()
}

fn default_theme() -> String {
    Theme::Dark.as_str().to_string()
}

fn default_tile_provider() -> String {
    "carto".to_string()
}

fn default_mapbox_style() -> String {
    DEFAULT_MAPBOX_STYLE.to_string()
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

fn default_fade_duration_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_jitter_amplitude() -> f64 {
    atlas_core::jitter::DEFAULT_JITTER_AMPLITUDE
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            header_name: default_header_name(),
            header_title: String::new(),
            theme: default_theme(),
            tile_provider: default_tile_provider(),
            mapbox_token: None,
            mapbox_style: default_mapbox_style(),
            initial_latitude: DEFAULT_LATITUDE,
            initial_longitude: DEFAULT_LONGITUDE,
            initial_zoom: DEFAULT_ZOOM,
            fade_duration_ms: default_fade_duration_ms(),
            debounce_ms: default_debounce_ms(),
            jitter_amplitude: default_jitter_amplitude(),
            controls_expanded: true,
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, upgrading older schema versions
    pub fn load() -> Result<Self, confy::ConfyError> {
        let mut config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;

        if config.config_version < CONFIG_VERSION {
            log::info!(
                "Upgrading configuration from version {} to {}",
                config.config_version,
                CONFIG_VERSION
            );
            config.config_version = CONFIG_VERSION;
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Parsed theme; unknown names fall back to dark
    pub fn theme(&self) -> Theme {
        self.theme.parse().unwrap_or_else(|e| {
            log::warn!("{e}, using dark theme");
            Theme::Dark
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme.as_str().to_string();
    }

    /// Mapbox token from the environment first, then from the config
    pub fn resolve_mapbox_token(&self) -> Option<String> {
        if let Ok(token) = std::env::var(MAPBOX_TOKEN_ENV) {
            if !token.is_empty() {
                return Some(token);
            }
        }

        self.mapbox_token.clone().filter(|t| !t.is_empty())
    }

    /// Core timings and camera behavior derived from the settings
    pub fn atlas_config(&self) -> AtlasConfig {
        let defaults = AtlasConfig::default();
        AtlasConfig {
            animator: AnimatorConfig {
                fade_duration: Duration::from_millis(self.fade_duration_ms),
                ..defaults.animator
            },
            debounce: Duration::from_millis(self.debounce_ms),
            jitter_amplitude: self.jitter_amplitude,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"theme": "light"}"#).unwrap();
        assert_eq!(config.theme(), Theme::Light);
        assert_eq!(config.tile_provider, "carto");
        assert!((config.initial_zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
        assert_eq!(config.config_version, CONFIG_VERSION);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        let config = AppConfig {
            theme: "sepia".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.theme(), Theme::Dark);
    }

    #[test]
    fn test_atlas_config_takes_timings() {
        let config = AppConfig {
            fade_duration_ms: 250,
            debounce_ms: 100,
            ..AppConfig::default()
        };
        let atlas = config.atlas_config();
        assert_eq!(atlas.animator.fade_duration, Duration::from_millis(250));
        assert_eq!(atlas.debounce, Duration::from_millis(100));
        assert_eq!(atlas.animator.settle_delay, AtlasConfig::default().animator.settle_delay);
    }

    #[test]
    fn test_config_token_used_when_env_unset() {
        let config = AppConfig {
            mapbox_token: Some(String::new()),
            ..AppConfig::default()
        };
        if std::env::var(MAPBOX_TOKEN_ENV).is_err() {
            assert_eq!(config.resolve_mapbox_token(), None);
        }
    }
}
