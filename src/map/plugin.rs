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

//! Walkers plugin painting the résumé layers.
//!
//! Each frame the app builds an [`AtlasLayer`] snapshot from the surface
//! and the atlas, hands it to walkers, and reads back a [`HitReport`]
//! describing what the pointer is over. [`PointerTracker`] turns those
//! reports into the layer-scoped [`PointerEvent`]s the atlas dispatches.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use atlas_core::{
    fade_opacity, Connector, EntryId, EntryType, Fade, FeatureFlags, HoverCard, LayerId,
    MemorySurface, PointerEvent, PointerKind, SourceId, Theme, TypePalette,
};
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Stroke};
use walkers::{lat_lon, MapMemory, Plugin, Projector};

use super::style::{self, LayerStyle, HOVER_GLOW_OPACITY};

/// Points closer than this on screen are merged into a cluster
pub const CLUSTER_RADIUS: f32 = 50.0;
/// No clustering at or beyond this zoom
pub const CLUSTER_MAX_ZOOM: f64 = 14.0;

const HIT_SLOP: f32 = 3.0;
const CURVE_SEGMENTS: usize = 32;

/// One point as painted this frame
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: EntryId,
    pub entry_type: EntryType,
    pub lon: f64,
    pub lat: f64,
    pub flags: FeatureFlags,
}

impl Marker {
    fn collect(surface: &MemorySurface, source: SourceId) -> Vec<Marker> {
        surface
            .features(source)
            .iter()
            .map(|f| {
                let (lon, lat) = f.position();
                Marker {
                    id: f.id().clone(),
                    entry_type: f.entry_type(),
                    lon,
                    lat,
                    flags: surface.flags(source, f.id()),
                }
            })
            .collect()
    }

    fn is_hidden(&self) -> bool {
        self.flags.fade() == Some(Fade::Hidden)
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Feature {
        id: EntryId,
        entry_type: EntryType,
        lon: f64,
        lat: f64,
    },
    Cluster {
        /// First member, identifies the cluster between frames
        key: EntryId,
        count: usize,
        lon: f64,
        lat: f64,
    },
}

impl Hit {
    fn same_target(&self, other: &Hit) -> bool {
        match (self, other) {
            (Hit::Feature { id: a, .. }, Hit::Feature { id: b, .. }) => a == b,
            (Hit::Cluster { key: a, count: n, .. }, Hit::Cluster { key: b, count: m, .. }) => {
                a == b && n == m
            }
            _ => false,
        }
    }

    fn event(&self, kind: PointerKind, zoom: f64) -> PointerEvent {
        match self {
            Hit::Feature {
                id,
                entry_type,
                lon,
                lat,
            } => PointerEvent::on_feature(LayerId::Nodes(*entry_type), kind, id.clone(), *lon, *lat)
                .with_zoom(zoom),
            Hit::Cluster { lon, lat, .. } => PointerEvent::on_cluster(kind, *lon, *lat, zoom),
        }
    }
}

/// Pointer state of one frame, reported by the plugin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitReport {
    pub hit: Option<Hit>,
    pub clicked: bool,
    /// Geographic position under the pointer
    pub pointer: Option<(f64, f64)>,
    pub zoom: f64,
    pub dragging: bool,
}

/// Turns per-frame hit reports into enter/leave/click events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    current: Option<Hit>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&mut self, report: &HitReport) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let changed = match (&self.current, &report.hit) {
            (Some(a), Some(b)) => !a.same_target(b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            if let Some(old) = self.current.take() {
                events.push(old.event(PointerKind::Leave, report.zoom));
            }
            if let Some(new) = &report.hit {
                events.push(new.event(PointerKind::Enter, report.zoom));
            }
            self.current.clone_from(&report.hit);
        }
        if report.clicked {
            match (&report.hit, report.pointer) {
                (Some(hit), _) => events.push(hit.event(PointerKind::Click, report.zoom)),
                (None, Some((lon, lat))) => events.push(PointerEvent::background_click(lon, lat)),
                (None, None) => {}
            }
        }
        events
    }

    /// Forget the hovered target, e.g. after the pointer left the map
    pub fn reset(&mut self) -> Option<PointerEvent> {
        self.current
            .take()
            .map(|old| old.event(PointerKind::Leave, 0.0))
    }
}

/// Screen-space group of markers
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCluster {
    pub members: Vec<usize>,
    pub center: Pos2,
}

/// Greedy screen-space clustering: each point joins the first cluster
/// seeded within `radius`, otherwise seeds a new one.
pub fn cluster_points(points: &[Pos2], radius: f32) -> Vec<ScreenCluster> {
    let mut clusters: Vec<(Pos2, Vec<usize>)> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        match clusters.iter_mut().find(|(seed, _)| seed.distance(*p) <= radius) {
            Some((_, members)) => members.push(i),
            None => clusters.push((*p, vec![i])),
        }
    }
    clusters
        .into_iter()
        .map(|(_, members)| {
            #[allow(clippy::cast_precision_loss, reason = "cluster sizes are tiny")]
            let n = members.len() as f32;
            let sum = members
                .iter()
                .fold(egui::Vec2::ZERO, |acc, &i| acc + points[i].to_vec2());
            ScreenCluster {
                center: (sum / n).to_pos2(),
                members,
            }
        })
        .collect()
}

/// Everything the plugin paints in one frame
pub struct AtlasLayer {
    pub points: Vec<Marker>,
    pub fading: Vec<Marker>,
    pub connectors: Vec<Connector>,
    pub hover_card: Option<HoverCard>,
    pub theme: Theme,
    pub palette: TypePalette,
    pub fade_duration: Duration,
    pub now: Instant,
    /// Hit testing is off while a transition is running
    pub interactive: bool,
    pub report: Sender<HitReport>,
}

impl AtlasLayer {
    #[allow(clippy::too_many_arguments, reason = "per-frame inputs from the app")]
    pub fn new(
        surface: &MemorySurface,
        connectors: Vec<Connector>,
        hover_card: Option<HoverCard>,
        theme: Theme,
        fade_duration: Duration,
        now: Instant,
        interactive: bool,
        report: Sender<HitReport>,
    ) -> Self {
        Self {
            points: Marker::collect(surface, SourceId::Points),
            fading: Marker::collect(surface, SourceId::Transition),
            connectors,
            hover_card,
            theme,
            palette: TypePalette::for_theme(theme),
            fade_duration,
            now,
            interactive,
            report,
        }
    }

    fn screen(projector: &Projector, lon: f64, lat: f64) -> Pos2 {
        projector.project(lat_lon(lat, lon)).to_pos2()
    }

    fn draw_marker(&self, painter: &egui::Painter, marker: &Marker, pos: Pos2) {
        let style = LayerStyle::for_type(marker.entry_type, &self.palette);
        let opacity = fade_opacity(marker.flags.fade, self.now, self.fade_duration);
        if opacity <= 0.0 {
            return;
        }
        let hovered = marker.flags.hover || marker.flags.active;

        if hovered {
            painter.circle_filled(
                pos,
                style.glow_radius,
                style::with_opacity(style.color, HOVER_GLOW_OPACITY * opacity),
            );
        }

        let radius = style.radius(hovered);
        let color = style::with_opacity(style.color, opacity);
        if style.filled {
            painter.circle_filled(pos, radius, color);
        } else {
            painter.circle_stroke(pos, radius, Stroke::new(style.stroke_width(hovered), color));
        }

        if marker.flags.active {
            let ring = if self.theme.is_dark() {
                Color32::WHITE
            } else {
                Color32::BLACK
            };
            painter.circle_stroke(
                pos,
                style.glow_radius + 2.0,
                Stroke::new(1.5, style::with_opacity(ring, opacity)),
            );
        }
    }

    fn draw_cluster(painter: &egui::Painter, count: usize, pos: Pos2) {
        let radius = style::cluster_radius(count);
        painter.circle_filled(pos, radius, style::cluster_color(count));
        painter.circle_stroke(pos, radius, Stroke::new(1.5, Color32::WHITE));
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            count.to_string(),
            FontId::proportional(12.0),
            Color32::from_rgb(20, 20, 20),
        );
    }

    fn draw_connectors(&self, painter: &egui::Painter, projector: &Projector) {
        let stroke = Stroke::new(2.0, style::connector_color(&self.palette));
        for connector in &self.connectors {
            let progress = connector.progress(self.now);
            let points: Vec<Pos2> = connector
                .curve_points(CURVE_SEGMENTS, progress)
                .into_iter()
                .map(|(lon, lat)| Self::screen(projector, lon, lat))
                .collect();
            painter.add(egui::Shape::line(points, stroke));

            if connector.popup_visible(self.now) {
                let (lon, lat) = connector.to;
                let pos = Self::screen(projector, lon, lat);
                painter.circle_filled(pos, 4.0, style::rgb(self.palette.accent));
                let mut lines = vec![connector.location.name.clone()];
                if let Some(description) = &connector.location.description {
                    lines.push(description.clone());
                }
                self.draw_card(painter, pos, &lines);
            }
        }
    }

    /// Small text card anchored above-right of `anchor`
    fn draw_card(&self, painter: &egui::Painter, anchor: Pos2, lines: &[String]) {
        let lines: Vec<&String> = lines.iter().filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return;
        }
        let text_color = style::rgb(self.palette.text);
        let muted = style::rgb(self.palette.muted);
        let galleys: Vec<_> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let (size, color) = if i == 0 { (12.0, text_color) } else { (10.5, muted) };
                painter.layout_no_wrap((*line).clone(), FontId::proportional(size), color)
            })
            .collect();

        let padding = egui::vec2(8.0, 6.0);
        let width = galleys.iter().map(|g| g.size().x).fold(0.0, f32::max);
        let height: f32 = galleys.iter().map(|g| g.size().y + 2.0).sum();
        let min = anchor + egui::vec2(12.0, -12.0 - height - padding.y * 2.0);
        let rect = egui::Rect::from_min_size(min, egui::vec2(width, height) + padding * 2.0);

        painter.rect_filled(rect, 4.0, style::card_fill(self.theme));
        painter.rect_stroke(
            rect,
            4.0,
            Stroke::new(1.0, style::card_stroke(self.theme)),
            egui::StrokeKind::Inside,
        );
        let mut y = rect.top() + padding.y;
        for galley in galleys {
            let h = galley.size().y;
            painter.galley(egui::pos2(rect.left() + padding.x, y), galley, text_color);
            y += h + 2.0;
        }
    }
}

impl Plugin for AtlasLayer {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        memory: &MapMemory,
    ) {
        let painter = ui.painter().with_clip_rect(response.rect);
        let zoom = memory.zoom();

        for marker in &self.fading {
            let pos = Self::screen(projector, marker.lon, marker.lat);
            self.draw_marker(&painter, marker, pos);
        }

        // Hidden points wait for their fade-in and take no pointer input
        let shown: Vec<&Marker> = self.points.iter().filter(|m| !m.is_hidden()).collect();

        let screen: Vec<Pos2> = shown
            .iter()
            .map(|m| Self::screen(projector, m.lon, m.lat))
            .collect();
        let clusters = if zoom < CLUSTER_MAX_ZOOM {
            cluster_points(&screen, CLUSTER_RADIUS)
        } else {
            (0..screen.len())
                .map(|i| ScreenCluster {
                    members: vec![i],
                    center: screen[i],
                })
                .collect()
        };

        self.draw_connectors(&painter, projector);

        let pointer = response.hover_pos();
        let mut best: Option<(f32, Hit)> = None;
        for cluster in &clusters {
            if let [single] = cluster.members.as_slice() {
                let marker = shown[*single];
                let pos = screen[*single];
                self.draw_marker(&painter, marker, pos);
                if let Some(p) = pointer {
                    let style = LayerStyle::for_type(marker.entry_type, &self.palette);
                    let d = p.distance(pos);
                    if d <= style.hover_radius + HIT_SLOP && best.as_ref().is_none_or(|(b, _)| d < *b) {
                        best = Some((
                            d,
                            Hit::Feature {
                                id: marker.id.clone(),
                                entry_type: marker.entry_type,
                                lon: marker.lon,
                                lat: marker.lat,
                            },
                        ));
                    }
                }
            } else {
                let count = cluster.members.len();
                Self::draw_cluster(&painter, count, cluster.center);
                if let Some(p) = pointer {
                    let d = p.distance(cluster.center);
                    if d <= style::cluster_radius(count) && best.as_ref().is_none_or(|(b, _)| d < *b) {
                        let position = projector.unproject(cluster.center.to_vec2());
                        best = Some((
                            d,
                            Hit::Cluster {
                                key: shown[cluster.members[0]].id.clone(),
                                count,
                                lon: position.x(),
                                lat: position.y(),
                            },
                        ));
                    }
                }
            }
        }

        if let Some(card) = &self.hover_card {
            let pos = Self::screen(projector, card.lon, card.lat);
            self.draw_card(&painter, pos, &card.lines);
        }

        let report = HitReport {
            hit: if self.interactive { best.map(|(_, hit)| hit) } else { None },
            clicked: response.clicked(),
            pointer: pointer.map(|p| {
                let position = projector.unproject(p.to_vec2());
                (position.x(), position.y())
            }),
            zoom,
            dragging: response.dragged(),
        };
        if self.report.send(report).is_err() {
            log::debug!("Hit report dropped, receiver gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_hit(id: i64) -> Hit {
        Hit::Feature {
            id: EntryId::from(id),
            entry_type: EntryType::Work,
            lon: 1.0,
            lat: 2.0,
        }
    }

    #[test]
    fn test_cluster_points() {
        let points = [
            egui::pos2(0.0, 0.0),
            egui::pos2(10.0, 0.0),
            egui::pos2(200.0, 200.0),
        ];
        let clusters = cluster_points(&points, CLUSTER_RADIUS);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[0].center, egui::pos2(5.0, 0.0));
        assert_eq!(clusters[1].members, vec![2]);
    }

    #[test]
    fn test_tracker_enter_leave() {
        let mut tracker = PointerTracker::new();
        let over = HitReport {
            hit: Some(feature_hit(1)),
            ..HitReport::default()
        };
        let events = tracker.events(&over);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerKind::Enter);

        // Staying on the same feature is quiet
        assert!(tracker.events(&over).is_empty());

        let events = tracker.events(&HitReport {
            hit: Some(feature_hit(2)),
            ..HitReport::default()
        });
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![PointerKind::Leave, PointerKind::Enter]);
        assert_eq!(events[0].feature, Some(EntryId::from(1)));

        let events = tracker.events(&HitReport::default());
        assert_eq!(events[0].kind, PointerKind::Leave);
        assert!(tracker.reset().is_none());
    }

    #[test]
    fn test_tracker_clicks() {
        let mut tracker = PointerTracker::new();
        let events = tracker.events(&HitReport {
            clicked: true,
            pointer: Some((3.0, 4.0)),
            ..HitReport::default()
        });
        assert_eq!(events.len(), 1);
        assert!(events[0].is_background_click());

        let events = tracker.events(&HitReport {
            hit: Some(Hit::Cluster {
                key: EntryId::from(7),
                count: 4,
                lon: 1.0,
                lat: 1.0,
            }),
            clicked: true,
            zoom: 5.0,
            ..HitReport::default()
        });
        let last = events.last().unwrap();
        assert_eq!(last.layer, Some(LayerId::Clusters));
        assert_eq!(last.kind, PointerKind::Click);
        assert!((last.zoom - 5.0).abs() < f64::EPSILON);
    }
}
