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

//! Paint rules for the point and cluster layers.

use atlas_core::{EntryType, Theme, TypePalette};
use egui::Color32;

/// Opacity of the glow drawn behind a hovered point
pub const HOVER_GLOW_OPACITY: f32 = 0.5;

/// Cluster marker thresholds and colors
const CLUSTER_SMALL: Color32 = Color32::from_rgb(0x51, 0xbb, 0xd6);
const CLUSTER_MEDIUM: Color32 = Color32::from_rgb(0xf1, 0xf0, 0x75);
const CLUSTER_LARGE: Color32 = Color32::from_rgb(0xf2, 0x8c, 0xb1);

pub fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

/// Multiply a color's alpha by `opacity`
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

/// Paint rule of one entry type's node layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub color: Color32,
    /// Filled dot, or a ring drawn with `stroke_width`
    pub filled: bool,
    pub stroke_width: f32,
    pub hover_stroke_width: f32,
    pub radius: f32,
    pub hover_radius: f32,
    pub glow_radius: f32,
}

impl LayerStyle {
    pub fn for_type(entry_type: EntryType, palette: &TypePalette) -> Self {
        let color = rgb(palette.color(entry_type));
        match entry_type {
            EntryType::Education => Self::dot(color, 5.0, 7.0, 9.0),
            EntryType::Work => Self::dot(color, 5.0, 7.0, 10.0),
            EntryType::Publication => Self::dot(color, 4.0, 6.0, 9.0),
            EntryType::Project => Self::ring(color, 5.0, 7.0, 10.0, 2.0),
            EntryType::Conference => Self::ring(color, 6.0, 8.0, 11.0, 1.5),
        }
    }

    fn dot(color: Color32, radius: f32, hover_radius: f32, glow_radius: f32) -> Self {
        Self {
            color,
            filled: true,
            stroke_width: 0.0,
            hover_stroke_width: 0.0,
            radius,
            hover_radius,
            glow_radius,
        }
    }

    fn ring(color: Color32, radius: f32, hover_radius: f32, glow_radius: f32, hover_stroke: f32) -> Self {
        Self {
            color,
            filled: false,
            stroke_width: 1.5,
            hover_stroke_width: hover_stroke,
            radius,
            hover_radius,
            glow_radius,
        }
    }

    pub fn radius(&self, hovered: bool) -> f32 {
        if hovered {
            self.hover_radius
        } else {
            self.radius
        }
    }

    pub fn stroke_width(&self, hovered: bool) -> f32 {
        if hovered {
            self.hover_stroke_width
        } else {
            self.stroke_width
        }
    }
}

pub fn cluster_color(count: usize) -> Color32 {
    match count {
        0..=9 => CLUSTER_SMALL,
        10..=29 => CLUSTER_MEDIUM,
        _ => CLUSTER_LARGE,
    }
}

pub fn cluster_radius(count: usize) -> f32 {
    match count {
        0..=9 => 18.0,
        10..=29 => 22.0,
        _ => 28.0,
    }
}

/// Case-study connector stroke color
pub fn connector_color(palette: &TypePalette) -> Color32 {
    let [r, g, b] = palette.accent;
    Color32::from_rgba_unmultiplied(r, g, b, palette.accent_alpha)
}

/// Background of floating cards drawn on the map
pub fn card_fill(theme: Theme) -> Color32 {
    if theme.is_dark() {
        Color32::from_rgba_unmultiplied(22, 27, 34, 235)
    } else {
        Color32::from_rgba_unmultiplied(255, 255, 255, 240)
    }
}

pub fn card_stroke(theme: Theme) -> Color32 {
    if theme.is_dark() {
        Color32::from_rgb(48, 54, 61)
    } else {
        Color32::from_rgb(208, 215, 222)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_steps() {
        assert_eq!(cluster_color(3), CLUSTER_SMALL);
        assert_eq!(cluster_color(10), CLUSTER_MEDIUM);
        assert_eq!(cluster_color(30), CLUSTER_LARGE);
        assert!(cluster_radius(50) > cluster_radius(15));
    }

    #[test]
    fn test_ring_layers_grow_stroke_on_hover() {
        let palette = TypePalette::for_theme(Theme::Dark);
        let project = LayerStyle::for_type(EntryType::Project, &palette);
        assert!(!project.filled);
        assert!(project.stroke_width(true) > project.stroke_width(false));

        let education = LayerStyle::for_type(EntryType::Education, &palette);
        assert!(education.filled);
        assert!((education.radius(true) - 7.0).abs() < f32::EPSILON);
        assert_eq!(education.color, Color32::from_rgb(0xF0, 0xB9, 0x17));
    }
}
