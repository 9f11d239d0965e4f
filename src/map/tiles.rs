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

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use atlas_core::Theme;
use eframe::egui;
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

use crate::config::{APP_NAME, MAPBOX_TOKEN_ENV};

/// Basemap providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileProvider {
    #[default]
    Carto,
    Mapbox,
}

impl TileProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            TileProvider::Carto => "carto",
            TileProvider::Mapbox => "mapbox",
        }
    }
}

impl fmt::Display for TileProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carto" => Ok(TileProvider::Carto),
            "mapbox" => Ok(TileProvider::Mapbox),
            other => Err(format!("unknown tile provider: {other}")),
        }
    }
}

/// Tile source for Carto CDN basemap tiles, dark or light
/// Uses subdomain load balancing across a-d.basemaps.cartocdn.com
pub struct CartoTileSource {
    theme: Theme,
}

impl CartoTileSource {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn style(&self) -> &'static str {
        match self.theme {
            Theme::Dark => "dark_all",
            Theme::Light => "light_all",
        }
    }
}

impl TileSource for CartoTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        let subdomain = ['a', 'b', 'c', 'd'][((tile_id.x + tile_id.y) % 4) as usize];

        format!(
            "https://{}.basemaps.cartocdn.com/{}/{}/{}/{}.png",
            subdomain,
            self.style(),
            tile_id.zoom,
            tile_id.x,
            tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors, © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Raster tiles rendered from a Mapbox style
pub struct MapboxTileSource {
    style: String,
    token: String,
}

impl MapboxTileSource {
    pub fn new(style: String, token: String) -> Self {
        Self { style, token }
    }
}

impl TileSource for MapboxTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{}/{}/{}?access_token={}",
            self.style, tile_id.zoom, tile_id.x, tile_id.y, self.token
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Mapbox © OpenStreetMap contributors",
            url: "https://www.mapbox.com/about/maps/",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Swap the dark/light variant of a Mapbox style id
pub fn mapbox_style_for(style: &str, theme: Theme) -> String {
    match theme {
        Theme::Dark => style.replace("light-", "dark-"),
        Theme::Light => style.replace("dark-", "light-"),
    }
}

/// Basemap tiles for the current provider and theme
pub struct BaseMap {
    provider: TileProvider,
    mapbox_style: String,
    mapbox_token: Option<String>,
    theme: Option<Theme>,
    tiles: Option<HttpTiles>,
    error: Option<String>,
}

impl BaseMap {
    pub fn new(provider: TileProvider, mapbox_style: String, mapbox_token: Option<String>) -> Self {
        Self {
            provider,
            mapbox_style,
            mapbox_token,
            theme: None,
            tiles: None,
            error: None,
        }
    }

    pub fn provider(&self) -> TileProvider {
        self.provider
    }

    /// Inline message shown over the map when tiles cannot be fetched
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn cache_dir(name: &str) -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join(APP_NAME)
            .join("tiles")
            .join(name)
    }

    /// Tiles for `theme`, recreated when the theme changed
    pub fn tiles(&mut self, theme: Theme, ctx: &egui::Context) -> Option<&mut HttpTiles> {
        if self.theme != Some(theme) {
            self.theme = Some(theme);
            self.tiles = self.create(theme, ctx);
        }
        self.tiles.as_mut()
    }

    fn create(&mut self, theme: Theme, ctx: &egui::Context) -> Option<HttpTiles> {
        self.error = None;
        match self.provider {
            TileProvider::Carto => {
                let options = HttpOptions {
                    cache: Some(Self::cache_dir(&format!("carto-{theme}"))),
                    ..Default::default()
                };
                Some(HttpTiles::with_options(CartoTileSource::new(theme), options, ctx.clone()))
            }
            TileProvider::Mapbox => {
                let Some(token) = self.mapbox_token.clone() else {
                    log::warn!("Mapbox provider selected without an access token");
                    self.error = Some(format!(
                        "Map unavailable: set {MAPBOX_TOKEN_ENV} or mapbox_token in the config file"
                    ));
                    return None;
                };
                let style = mapbox_style_for(&self.mapbox_style, theme);
                let options = HttpOptions {
                    cache: Some(Self::cache_dir(&style.replace('/', "-"))),
                    ..Default::default()
                };
                Some(HttpTiles::with_options(
                    MapboxTileSource::new(style, token),
                    options,
                    ctx.clone(),
                ))
            }
        }
    }
}
