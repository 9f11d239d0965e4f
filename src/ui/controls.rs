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

use atlas_core::{EntryType, ResumeAtlas, TypePalette};
use eframe::egui;

use super::UiAction;
use crate::map::style::rgb;

/// Floating filter bar and year slider
#[derive(Debug)]
pub struct Controls {
    pub expanded: bool,
}

impl Controls {
    pub fn new(expanded: bool) -> Self {
        Self { expanded }
    }

    pub fn render(&self, ctx: &egui::Context, atlas: &ResumeAtlas, actions: &mut Vec<UiAction>) {
        let palette = TypePalette::for_theme(atlas.theme());
        let fill = if atlas.theme().is_dark() {
            egui::Color32::from_rgba_unmultiplied(22, 27, 34, 230)
        } else {
            egui::Color32::from_rgba_unmultiplied(255, 255, 255, 235)
        };

        egui::Window::new("Filters")
            .title_bar(false)
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 50.0))
            .resizable(false)
            .collapsible(false)
            .frame(egui::Frame::window(&ctx.style())
                .fill(fill)
                .corner_radius(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("FILTERS")
                        .color(rgb(palette.muted))
                        .size(11.0)
                        .strong());

                    if atlas.is_transitioning() || atlas.is_scrubbing() {
                        ui.add(egui::Spinner::new().size(10.0));
                        ui.label(egui::RichText::new("Updating…")
                            .color(rgb(palette.muted))
                            .size(10.0));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let icon = if self.expanded { "▲" } else { "▼" };
                        if ui.small_button(icon)
                            .on_hover_text(if self.expanded { "Collapse" } else { "Expand" })
                            .clicked() {
                            actions.push(UiAction::ToggleControls);
                        }
                    });
                });

                if !self.expanded {
                    return;
                }

                ui.add_space(4.0);
                ui.horizontal_wrapped(|ui| {
                    for entry_type in EntryType::ALL {
                        Self::filter_button(ui, atlas, &palette, entry_type, actions);
                    }
                });

                ui.add_space(6.0);
                Self::year_slider(ui, atlas, &palette, actions);

                ui.label(egui::RichText::new(format!("{} entries shown", atlas.visible().len()))
                    .color(rgb(palette.muted))
                    .size(10.0));
            });
    }

    fn filter_button(
        ui: &mut egui::Ui,
        atlas: &ResumeAtlas,
        palette: &TypePalette,
        entry_type: EntryType,
        actions: &mut Vec<UiAction>,
    ) {
        let active = atlas.filters().is_active(entry_type);
        let text_color = if active { palette.text } else { palette.muted };
        let dot = if active { "●" } else { "○" };

        let label = egui::RichText::new(format!("{dot} {}", entry_type.label()))
            .color(rgb(text_color))
            .size(12.0);
        let button = egui::Button::new(label)
            .selected(active)
            .stroke(egui::Stroke::new(1.0, rgb(palette.color(entry_type))));

        if ui.add(button).clicked() {
            actions.push(UiAction::ToggleFilter(entry_type));
        }
    }

    fn year_slider(ui: &mut egui::Ui, atlas: &ResumeAtlas, palette: &TypePalette, actions: &mut Vec<UiAction>) {
        let domain = atlas.domain();
        let mut year = atlas.display_year();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Up to")
                .color(rgb(palette.muted))
                .size(11.0));

            let response = ui.add(egui::Slider::new(&mut year, domain.min..=domain.max)
                .integer()
                .show_value(false));

            if response.drag_started() {
                actions.push(UiAction::YearDragStarted);
            }
            if response.changed() {
                actions.push(UiAction::ScrubYear(year));
            }
            if response.drag_stopped() {
                actions.push(UiAction::YearDragStopped);
            }

            ui.label(egui::RichText::new(year.to_string())
                .color(rgb(palette.text))
                .size(13.0)
                .monospace()
                .strong());
        });
    }
}
