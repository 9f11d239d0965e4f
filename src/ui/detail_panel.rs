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

//! Bottom sheet showing the selected entry.

use std::time::Instant;

use atlas_core::gesture::clamp_panel_height;
use atlas_core::{PanelResize, PositionedFeature, ResumeEntry, Swipe, SwipeTracker, TypePalette};
use eframe::egui;

use super::UiAction;
use crate::map::style::rgb;

const DEFAULT_HEIGHT_FRACTION: f32 = 0.4;
const HANDLE_HEIGHT: f32 = 14.0;

#[derive(Debug, Default)]
pub struct DetailPanel {
    height: Option<f32>,
    resize: PanelResize,
    swipe: SwipeTracker,
    hovered_project: Option<usize>,
    description_hovered: bool,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget per-entry pointer state when the selection changes
    pub fn reset_hover(&mut self) {
        self.hovered_project = None;
        self.description_hovered = false;
    }

    pub fn render(
        &mut self,
        ctx: &egui::Context,
        feature: &PositionedFeature,
        position: Option<String>,
        palette: &TypePalette,
        now: Instant,
        actions: &mut Vec<UiAction>,
    ) {
        let viewport = ctx.screen_rect().height();
        let height = clamp_panel_height(
            self.height.unwrap_or(viewport * DEFAULT_HEIGHT_FRACTION),
            viewport,
        );

        let panel = egui::TopBottomPanel::bottom("detail_panel")
            .exact_height(height)
            .resizable(false)
            .show(ctx, |ui| {
                self.resize_handle(ui, height, viewport, now);
                self.navigation(ui, position.as_deref(), palette, actions);
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.content(ui, &feature.entry, palette, actions);
                });
            });

        self.track_swipe(ctx, panel.response.rect, now, actions);
    }

    fn resize_handle(&mut self, ui: &mut egui::Ui, height: f32, viewport: f32, now: Instant) {
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), HANDLE_HEIGHT),
            egui::Sense::drag(),
        );
        let grip = egui::Rect::from_center_size(rect.center(), egui::vec2(36.0, 4.0));
        ui.painter().rect_filled(grip, 2.0, ui.visuals().widgets.inactive.bg_fill);

        if response.hovered() || response.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeVertical);
        }
        let pointer_y = response.interact_pointer_pos().map(|p| p.y);
        if response.drag_started() {
            if let Some(y) = pointer_y {
                self.resize.start(y, height);
            }
        }
        if response.dragged() {
            if let Some(h) = pointer_y.and_then(|y| self.resize.drag(y, viewport, now)) {
                self.height = Some(h);
            }
        }
        if response.drag_stopped() {
            self.resize.end();
        }
    }

    fn navigation(&self, ui: &mut egui::Ui, position: Option<&str>, palette: &TypePalette, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            if ui.button("‹ Prev").on_hover_text("Previous entry (←)").clicked() {
                actions.push(UiAction::Previous);
            }
            if let Some(position) = position {
                ui.label(egui::RichText::new(position)
                    .color(rgb(palette.muted))
                    .size(11.0)
                    .monospace());
            }
            if ui.button("Next ›").on_hover_text("Next entry (→)").clicked() {
                actions.push(UiAction::Next);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui::RichText::new("✕").size(12.0))
                    .on_hover_text("Close (Esc)")
                    .clicked() {
                    actions.push(UiAction::ClosePanel);
                }
            });
        });
    }

    fn content(&mut self, ui: &mut egui::Ui, entry: &ResumeEntry, palette: &TypePalette, actions: &mut Vec<UiAction>) {
        let accent = rgb(palette.color(entry.entry_type));
        let text = rgb(palette.text);
        let muted = rgb(palette.muted);

        ui.label(egui::RichText::new(entry.entry_type.label().to_uppercase())
            .color(accent)
            .size(10.0)
            .strong());
        ui.label(egui::RichText::new(entry.display_title())
            .color(text)
            .size(17.0)
            .strong());

        let subtitle: Vec<&str> = [
            entry.institution.as_deref(),
            entry.publisher.as_deref(),
            entry.venue.as_deref(),
            entry.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
        if !subtitle.is_empty() {
            ui.label(egui::RichText::new(subtitle.join(" · ")).color(muted).size(12.0));
        }

        let dates = entry.date_label();
        if !dates.is_empty() {
            ui.label(egui::RichText::new(dates).color(muted).size(11.0).monospace());
        }

        if let Some(description) = &entry.description {
            ui.add_space(6.0);
            let response = ui.add(egui::Label::new(egui::RichText::new(description).color(text))
                .sense(egui::Sense::hover()));
            let hovered = response.hovered();
            if hovered && !self.description_hovered {
                actions.push(UiAction::HoverDescription);
            }
            self.description_hovered = hovered;
        }

        if let Some(thesis) = &entry.thesis {
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Thesis").color(muted).size(11.0).strong());
            ui.label(egui::RichText::new(&thesis.title).color(text).italics());
            if let Some(advisor) = &thesis.advisor {
                ui.label(egui::RichText::new(format!("Advisor: {advisor}")).color(muted).size(11.0));
            }
        }

        if !entry.disciplines.is_empty() {
            ui.add_space(6.0);
            ui.horizontal_wrapped(|ui| {
                for discipline in &entry.disciplines {
                    egui::Frame::NONE
                        .stroke(egui::Stroke::new(1.0, accent))
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(6, 1))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(discipline).color(text).size(10.5));
                        });
                }
            });
        }

        if let Some(url) = &entry.url {
            ui.add_space(4.0);
            if ui.link(url).clicked() {
                actions.push(UiAction::OpenUrl(url.clone()));
            }
        }

        if !entry.projects.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("PROJECTS").color(muted).size(11.0).strong());
            self.projects(ui, entry, palette, actions);
        }
    }

    fn projects(&mut self, ui: &mut egui::Ui, entry: &ResumeEntry, palette: &TypePalette, actions: &mut Vec<UiAction>) {
        let text = rgb(palette.text);
        let muted = rgb(palette.muted);
        let mut hovered = None;

        for (index, project) in entry.projects.iter().enumerate() {
            let response = egui::Frame::group(ui.style())
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(&project.title).color(text).strong());
                    let timing = project.timing_label();
                    if !timing.is_empty() {
                        ui.label(egui::RichText::new(timing).color(muted).size(10.5).monospace());
                    }
                    if let Some(description) = &project.description {
                        ui.label(egui::RichText::new(description).color(text).size(11.5));
                    }
                    if project.has_case_studies() {
                        ui.label(egui::RichText::new("Hover to see case study locations")
                            .color(rgb(palette.accent))
                            .size(10.0)
                            .italics());
                    }
                })
                .response
                .interact(egui::Sense::hover());

            if response.hovered() {
                hovered = Some(index);
            }
            ui.add_space(3.0);
        }

        if hovered != self.hovered_project {
            match hovered {
                Some(index) => actions.push(UiAction::HoverProject(index)),
                None => actions.push(UiAction::LeaveProject),
            }
            self.hovered_project = hovered;
        }
    }

    fn track_swipe(&mut self, ctx: &egui::Context, rect: egui::Rect, now: Instant, actions: &mut Vec<UiAction>) {
        if self.resize.is_dragging() {
            return;
        }
        let (pressed, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        if pressed && rect.contains(pos) {
            self.swipe.press(pos.x, pos.y, now);
        }
        if released {
            match self.swipe.release(pos.x, pos.y, now) {
                Some(Swipe::Previous) => actions.push(UiAction::Previous),
                Some(Swipe::Next) => actions.push(UiAction::Next),
                Some(Swipe::Close) => actions.push(UiAction::ClosePanel),
                None => {}
            }
        }
    }
}
