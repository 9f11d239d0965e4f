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

//! Case-study connectors drawn from a selected entry to the locations of
//! one of its projects.

use std::time::{Duration, Instant};

use log::debug;

use crate::entry::{CaseStudyLocation, EntryId, ResumeEntry};
use crate::surface::ease_in_out;

/// Default time for a connector to grow from parent to destination.
pub const DEFAULT_CONNECTOR_DURATION: Duration = Duration::from_millis(800);

/// Height of the curve's control point relative to the chord length.
const CURVE_LIFT: f64 = 0.25;

/// One animated curve from the parent entry to a case-study location.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub location: CaseStudyLocation,
    started: Instant,
    duration: Duration,
}

impl Connector {
    #[must_use]
    pub fn new(from: (f64, f64), location: CaseStudyLocation, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to: (location.lon, location.lat),
            location,
            started,
            duration,
        }
    }

    /// Eased growth in [0, 1].
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = now.saturating_duration_since(self.started).as_secs_f32() / self.duration.as_secs_f32();
        ease_in_out(t)
    }

    #[must_use]
    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    /// The destination popup shows once the curve has arrived.
    #[must_use]
    pub fn popup_visible(&self, now: Instant) -> bool {
        self.is_complete(now)
    }

    /// Control point: the chord midpoint lifted perpendicular to the chord.
    #[must_use]
    pub fn control_point(&self) -> (f64, f64) {
        let (x0, y0) = self.from;
        let (x1, y1) = self.to;
        let (mx, my) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let (dx, dy) = (x1 - x0, y1 - y0);
        // (-dy, dx) is the chord rotated a quarter turn; its length is the
        // chord length, so scaling by CURVE_LIFT gives a proportional arc
        (mx - dy * CURVE_LIFT, my + dx * CURVE_LIFT)
    }

    /// Points along the quadratic Bézier from `from` up to `progress`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "segment counts are small")]
    pub fn curve_points(&self, segments: usize, progress: f32) -> Vec<(f64, f64)> {
        let segments = segments.max(1);
        let progress = f64::from(progress.clamp(0.0, 1.0));
        let (cx, cy) = self.control_point();
        (0..=segments)
            .map(|i| {
                let t = progress * i as f64 / segments as f64;
                let u = 1.0 - t;
                (
                    u * u * self.from.0 + 2.0 * u * t * cx + t * t * self.to.0,
                    u * u * self.from.1 + 2.0 * u * t * cy + t * t * self.to.1,
                )
            })
            .collect()
    }
}

/// Connectors of the currently hovered project.
#[derive(Debug, Clone)]
pub struct CaseStudyOverlay {
    duration: Duration,
    owner: Option<(EntryId, usize)>,
    hovered: bool,
    connectors: Vec<Connector>,
}

impl Default for CaseStudyOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTOR_DURATION)
    }
}

impl CaseStudyOverlay {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            owner: None,
            hovered: false,
            connectors: Vec::new(),
        }
    }

    /// Draw connectors for project `project_index` of `parent`, replacing any
    /// previous set. Returns false when the project has no case studies.
    pub fn hover_project(
        &mut self,
        parent: &ResumeEntry,
        parent_position: (f64, f64),
        project_index: usize,
        now: Instant,
    ) -> bool {
        let Some(project) = parent.projects.get(project_index) else {
            return false;
        };
        if !project.has_case_studies() {
            return false;
        }
        self.hovered = true;
        if self.owner.as_ref() == Some(&(parent.id.clone(), project_index)) {
            return true;
        }
        debug!(
            "Drawing {} case-study connectors for {} / {}",
            project.case_study_locations.len(),
            parent.id,
            project.title
        );
        self.owner = Some((parent.id.clone(), project_index));
        self.connectors = project
            .case_study_locations
            .iter()
            .map(|location| Connector::new(parent_position, location.clone(), now, self.duration))
            .collect();
        true
    }

    /// The pointer left the project. Connectors stay so their popups can
    /// still be read; they go away on `clear` or the next hover.
    pub fn leave_project(&mut self) {
        self.hovered = false;
    }

    /// Whether the pointer is still over the project that owns the
    /// connectors.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.hovered = false;
        self.connectors.clear();
    }

    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// True while any connector is still growing.
    #[must_use]
    pub fn is_animating(&self, now: Instant) -> bool {
        self.connectors.iter().any(|c| !c.is_complete(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryType, Project};

    fn location(name: &str, lon: f64, lat: f64) -> CaseStudyLocation {
        CaseStudyLocation {
            name: name.to_string(),
            lon,
            lat,
            description: None,
        }
    }

    fn parent() -> ResumeEntry {
        ResumeEntry::new(7, EntryType::Work, 0.0, 0.0).with_projects(vec![
            Project {
                title: "Plain".to_string(),
                ..Project::default()
            },
            Project {
                title: "Field study".to_string(),
                case_study_locations: vec![location("A", 10.0, 0.0), location("B", 0.0, 10.0)],
                ..Project::default()
            },
        ])
    }

    #[test]
    fn test_hover_project_without_case_studies() {
        let mut overlay = CaseStudyOverlay::default();
        let now = Instant::now();
        assert!(!overlay.hover_project(&parent(), (0.0, 0.0), 0, now));
        assert!(!overlay.hover_project(&parent(), (0.0, 0.0), 9, now));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_connectors_persist_after_leave() {
        let mut overlay = CaseStudyOverlay::new(Duration::from_millis(800));
        let t0 = Instant::now();
        assert!(overlay.hover_project(&parent(), (0.0, 0.0), 1, t0));
        assert_eq!(overlay.connectors().len(), 2);
        assert!(overlay.is_animating(t0 + Duration::from_millis(400)));
        assert!(!overlay.connectors()[0].popup_visible(t0 + Duration::from_millis(400)));

        overlay.leave_project();
        assert!(!overlay.is_hovered());
        assert_eq!(overlay.connectors().len(), 2);
        assert!(overlay.connectors()[0].popup_visible(t0 + Duration::from_millis(800)));

        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_rehover_same_project_keeps_animation() {
        let mut overlay = CaseStudyOverlay::new(Duration::from_millis(800));
        let t0 = Instant::now();
        overlay.hover_project(&parent(), (0.0, 0.0), 1, t0);
        overlay.hover_project(&parent(), (0.0, 0.0), 1, t0 + Duration::from_millis(900));
        assert!(!overlay.is_animating(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_curve_points() {
        let connector = Connector::new(
            (0.0, 0.0),
            location("A", 10.0, 0.0),
            Instant::now(),
            Duration::from_millis(800),
        );
        assert_eq!(connector.control_point(), (5.0, 2.5));

        let full = connector.curve_points(10, 1.0);
        assert_eq!(full.len(), 11);
        assert_eq!(full[0], (0.0, 0.0));
        let end = full[10];
        assert!((end.0 - 10.0).abs() < 1e-9 && end.1.abs() < 1e-9);

        let half = connector.curve_points(10, 0.5);
        assert!(half[10].0 < 10.0);
    }

    #[test]
    fn test_progress_eases() {
        let t0 = Instant::now();
        let connector = Connector::new((0.0, 0.0), location("A", 1.0, 1.0), t0, Duration::from_millis(800));
        assert!(connector.progress(t0).abs() < f32::EPSILON);
        assert!((connector.progress(t0 + Duration::from_millis(400)) - 0.5).abs() < 0.01);
        assert!((connector.progress(t0 + Duration::from_secs(2)) - 1.0).abs() < f32::EPSILON);
    }
}
