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

use atlas_core::{Theme, TypePalette};
use eframe::egui;

use super::UiAction;
use crate::map::style::rgb;

/// Top bar with the owner's name, headline and the theme toggle
#[derive(Debug)]
pub struct Header {
    name: String,
    title: String,
}

impl Header {
    pub fn new(name: String, title: String) -> Self {
        Self { name, title }
    }

    pub fn render(&self, ctx: &egui::Context, theme: Theme, has_entries: bool, actions: &mut Vec<UiAction>) {
        let palette = TypePalette::for_theme(theme);

        egui::TopBottomPanel::top("header")
            .exact_height(40.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(egui::RichText::new(&self.name)
                        .color(rgb(palette.text))
                        .size(16.0)
                        .strong());

                    if !self.title.is_empty() {
                        ui.label(egui::RichText::new(&self.title)
                            .color(rgb(palette.muted))
                            .size(12.0));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (icon, hint) = match theme {
                            Theme::Dark => ("☀", "Switch to light theme"),
                            Theme::Light => ("🌙", "Switch to dark theme"),
                        };
                        if ui.button(egui::RichText::new(icon).size(14.0))
                            .on_hover_text(hint)
                            .clicked() {
                            actions.push(UiAction::ToggleTheme);
                        }

                        ui.add_space(4.0);

                        if ui.add_enabled(has_entries, egui::Button::new("Latest"))
                            .on_hover_text("Open the most recent visible entry")
                            .clicked() {
                            actions.push(UiAction::OpenLatest);
                        }
                    });
                });
            });
    }
}
