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

mod app;
mod config;
mod map;
mod ui;

use std::path::{Path, PathBuf};

use atlas_core::{load_file, load_str, ResumeEntry, Theme};
use clap::Parser;
use eframe::egui;
use mimalloc::MiMalloc;

use app::AtlasApp;
use config::AppConfig;
use map::TileProvider;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Résumé collection bundled with the binary
const EMBEDDED_DATA: &str = include_str!("../data/spatial-data.json");

/// A résumé shown as an interactive map
#[derive(Parser, Debug)]
#[command(name = "resume-atlas", version, about)]
struct Args {
    /// Résumé data file (JSON array of entries)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Color theme: dark or light
    #[arg(long)]
    theme: Option<Theme>,

    /// Basemap provider: carto or mapbox
    #[arg(long)]
    provider: Option<TileProvider>,

    /// Initial year cutoff
    #[arg(long)]
    year: Option<i32>,

    /// Print the configuration file path and exit
    #[arg(long)]
    config_path: bool,
}

fn load_entries(path: Option<&Path>) -> Vec<ResumeEntry> {
    if let Some(path) = path {
        match load_file(path) {
            Ok((entries, _)) => return entries,
            Err(e) => log::error!("Failed to load {}: {e}, using bundled data", path.display()),
        }
    }

    match load_str(EMBEDDED_DATA) {
        Ok((entries, report)) => {
            log::info!("Loaded {} bundled entries ({} dropped)", report.accepted, report.dropped);
            entries
        }
        Err(e) => {
            log::error!("Bundled data is invalid: {e}");
            Vec::new()
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("Failed to resolve config path: {e}"),
        }
        return Ok(());
    }

    log::info!("Starting Résumé Atlas...");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load configuration: {e}, using defaults");
        AppConfig::default()
    });
    if let Some(theme) = args.theme {
        config.set_theme(theme);
    }
    let provider = args.provider.unwrap_or_else(|| {
        config.tile_provider.parse().unwrap_or_else(|e| {
            log::warn!("{e}, using carto");
            TileProvider::Carto
        })
    });

    let data_path = args.data.or_else(|| config.data_path.as_ref().map(PathBuf::from));
    let entries = load_entries(data_path.as_deref());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Résumé Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "Résumé Atlas",
        options,
        Box::new(move |_cc| Ok(Box::new(AtlasApp::new(config, entries, provider, args.year)))),
    )
}
