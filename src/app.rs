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

//! The desktop application: wires the atlas to egui panels and the map.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use atlas_core::{EntryId, ResumeAtlas, ResumeEntry, Theme, ThemeContext, TypePalette};
use eframe::egui;
use walkers::{lat_lon, Map, MapMemory, Position, Tiles};

use crate::config::AppConfig;
use crate::map::{AtlasLayer, BaseMap, HitReport, PointerTracker, TileProvider, WalkersSurface};
use crate::ui::{Controls, DetailPanel, Header, UiAction};

pub struct AtlasApp {
    config: AppConfig,
    theme: ThemeContext,
    atlas: ResumeAtlas,
    surface: WalkersSurface,
    basemap: BaseMap,
    memory: MapMemory,
    home: Position,
    header: Header,
    controls: Controls,
    panel: DetailPanel,
    tracker: PointerTracker,
    reports_tx: Sender<HitReport>,
    reports_rx: Receiver<HitReport>,
    applied_theme: Option<Theme>,
    attach_requested: bool,
    last_selected: Option<EntryId>,
}

impl AtlasApp {
    pub fn new(
        config: AppConfig,
        entries: Vec<ResumeEntry>,
        provider: TileProvider,
        initial_year: Option<i32>,
    ) -> Self {
        let theme = ThemeContext::new(config.theme());
        let mut atlas = ResumeAtlas::new(entries, theme.subscribe(), config.atlas_config());
        let mut surface = WalkersSurface::new();
        if let Some(year) = initial_year {
            atlas.set_year_now(year, &mut surface, Instant::now());
        }

        let mut memory = MapMemory::default();
        if let Err(e) = memory.set_zoom(config.initial_zoom) {
            log::warn!("Invalid initial zoom {}: {e:?}", config.initial_zoom);
        }

        let basemap = BaseMap::new(
            provider,
            config.mapbox_style.clone(),
            config.resolve_mapbox_token(),
        );
        let (reports_tx, reports_rx) = mpsc::channel();

        log::info!("Using {} basemap, {} theme", provider, theme.current());

        Self {
            home: lat_lon(config.initial_latitude, config.initial_longitude),
            header: Header::new(config.header_name.clone(), config.header_title.clone()),
            controls: Controls::new(config.controls_expanded),
            config,
            theme,
            atlas,
            surface,
            basemap,
            memory,
            panel: DetailPanel::new(),
            tracker: PointerTracker::new(),
            reports_tx,
            reports_rx,
            applied_theme: None,
            attach_requested: false,
            last_selected: None,
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            log::warn!("Failed to save configuration: {e}");
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        let theme = self.theme.current();
        if self.applied_theme != Some(theme) {
            ctx.set_visuals(if theme.is_dark() {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.applied_theme = Some(theme);
        }
    }

    fn keyboard_actions(ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                actions.push(UiAction::Previous);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                actions.push(UiAction::Next);
            }
            if i.key_pressed(egui::Key::Escape) {
                actions.push(UiAction::ClosePanel);
            }
        });
    }

    fn apply(&mut self, action: UiAction, now: Instant) {
        match action {
            UiAction::ToggleFilter(entry_type) => {
                self.atlas.toggle_filter(entry_type, &mut self.surface, now);
            }
            UiAction::ScrubYear(year) => {
                self.atlas.scrub_year(year, now);
            }
            UiAction::YearDragStarted => self.atlas.begin_year_drag(),
            UiAction::YearDragStopped => self.atlas.end_year_drag(&mut self.surface, now),
            UiAction::Next => {
                self.atlas.next(&mut self.surface);
            }
            UiAction::Previous => {
                self.atlas.previous(&mut self.surface);
            }
            UiAction::ClosePanel => {
                self.atlas.close_panel(&mut self.surface);
            }
            UiAction::HoverProject(index) => {
                self.atlas.hover_project(index, &mut self.surface, now);
            }
            UiAction::LeaveProject => self.atlas.leave_project(),
            UiAction::HoverDescription => self.atlas.hover_description(&mut self.surface),
            UiAction::OpenLatest => {
                if let Some(id) = self.atlas.visible().get(0).map(|f| f.id().clone()) {
                    self.atlas.open_entry(&id, &mut self.surface);
                }
            }
            UiAction::ToggleTheme => {
                let theme = self.theme.toggle();
                self.config.set_theme(theme);
                self.save_config();
            }
            UiAction::ToggleControls => {
                self.controls.expanded = !self.controls.expanded;
                self.config.controls_expanded = self.controls.expanded;
                self.save_config();
            }
            UiAction::OpenUrl(url) => {
                if let Err(e) = webbrowser::open(&url) {
                    log::warn!("Failed to open {url}: {e}");
                }
            }
        }
    }

    fn draw_map(&mut self, ui: &mut egui::Ui, now: Instant) {
        let rect = ui.available_rect_before_wrap();
        self.surface.set_ready(rect.width() > 0.0 && rect.height() > 0.0);
        if !self.attach_requested {
            self.attach_requested = true;
            self.atlas.attach(&mut self.surface, now);
        }
        self.surface.drive_camera(&mut self.memory, self.home, now);

        let theme = self.theme.current();
        let layer = AtlasLayer::new(
            self.surface.data(),
            self.atlas.case_studies().connectors().to_vec(),
            self.atlas.hover_card().cloned(),
            theme,
            self.atlas.config().animator.fade_duration,
            now,
            !self.atlas.is_transitioning(),
            self.reports_tx.clone(),
        );

        let ctx = ui.ctx().clone();
        let tiles = self.basemap.tiles(theme, &ctx);
        let map = Map::new(
            tiles.map(|t| t as &mut dyn Tiles),
            &mut self.memory,
            self.home,
        )
        .with_plugin(layer);
        ui.add(map);

        let painter = ui.painter_at(rect);
        let palette = TypePalette::for_theme(theme);

        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            egui::Align2::RIGHT_BOTTOM,
            match self.basemap.provider() {
                TileProvider::Carto => "© OpenStreetMap contributors © CARTO",
                TileProvider::Mapbox => "© Mapbox © OpenStreetMap contributors",
            },
            egui::FontId::proportional(10.0),
            crate::map::style::rgb(palette.muted),
        );

        // Error display at the top
        if let Some(error_msg) = self.basemap.error() {
            let error_pos = rect.center_top() + egui::vec2(0.0, 20.0);
            let text_galley = painter.layout_no_wrap(
                error_msg.to_string(),
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );

            let padding = egui::vec2(12.0, 6.0);
            let bubble_rect = egui::Rect::from_center_size(
                error_pos,
                text_galley.size() + padding * 2.0,
            );

            painter.rect_filled(bubble_rect, 5.0, egui::Color32::from_rgb(220, 50, 50));
            painter.text(
                error_pos,
                egui::Align2::CENTER_CENTER,
                error_msg,
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn dispatch_pointer(&mut self) {
        let reports: Vec<HitReport> = self.reports_rx.try_iter().collect();
        for report in reports {
            if report.dragging {
                self.surface.stop_camera();
            }
            for event in self.tracker.events(&report) {
                self.atlas.handle_pointer(&event, &mut self.surface);
            }
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.apply_visuals(ctx);

        let mut actions = Vec::new();
        Self::keyboard_actions(ctx, &mut actions);

        let theme = self.theme.current();
        self.header.render(ctx, theme, !self.atlas.visible().is_empty(), &mut actions);
        self.controls.render(ctx, &self.atlas, &mut actions);

        let selected = self.atlas.selection().selected_id().cloned();
        if selected != self.last_selected {
            self.panel.reset_hover();
            self.last_selected.clone_from(&selected);
        }
        if let Some(feature) = self.atlas.selected_feature() {
            let palette = TypePalette::for_theme(theme);
            self.panel.render(
                ctx,
                feature,
                self.atlas.position_label(),
                &palette,
                now,
                &mut actions,
            );
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui, now);
            });

        for action in actions {
            self.apply(action, now);
        }
        self.dispatch_pointer();

        if self.atlas.wants_pointer_cursor() {
            ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let outcome = self.atlas.tick(&mut self.surface, now);
        if outcome.repaint || self.surface.is_animating_camera() {
            ctx.request_repaint();
        }
    }
}

impl Drop for AtlasApp {
    fn drop(&mut self) {
        self.atlas.teardown();
        self.surface.tear_down();
        self.save_config();
    }
}
