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

//! Map surface contract.
//!
//! The rendering engine is an opaque collaborator. The atlas only ever uses
//! four primitives on it:
//!
//! - full replacement of a source's feature collection
//! - ephemeral per-feature state (hover, active, fade) read by paint rules
//! - pointer events scoped to named layers (see [`crate::events`])
//! - animated camera moves
//!
//! [`MemorySurface`] is a headless implementation of the contract. It keeps
//! sources and feature states in memory and queues camera requests; the
//! desktop renderer wraps it and paints from its contents.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::entry::EntryId;
use crate::jitter::PositionedFeature;

/// Errors reported by a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("map surface is not available")]
    Unavailable,

    #[error("unknown source: {0:?}")]
    UnknownSource(SourceId),
}

/// Named feature sources on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Main clustered source holding the visible set.
    Points,
    /// Temporary source holding leaving features while they fade out.
    Transition,
}

/// Fade phase painted for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    /// In the data layer at zero opacity, waiting for its fade-in.
    Hidden,
    /// Ramping from zero to full opacity.
    In,
    /// Ramping from full to zero opacity.
    Out,
}

/// One key/value update of a feature's ephemeral state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureState {
    Hover(bool),
    Active(bool),
    Fade(Option<Fade>),
}

/// Accumulated ephemeral state of one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub hover: bool,
    pub active: bool,
    pub fade: Option<(Fade, Instant)>,
}

impl FeatureFlags {
    #[must_use]
    pub fn fade(&self) -> Option<Fade> {
        self.fade.map(|(fade, _)| fade)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        !self.hover && !self.active && self.fade.is_none()
    }
}

/// Camera move request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub lon: f64,
    pub lat: f64,
    pub zoom: Option<f64>,
    pub duration: Duration,
}

impl CameraTarget {
    #[must_use]
    pub fn center(lon: f64, lat: f64, duration: Duration) -> Self {
        Self {
            lon,
            lat,
            zoom: None,
            duration,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }
}

/// The primitives the atlas needs from a rendering engine.
pub trait MapSurface {
    /// Whether the surface can accept commands (loaded, non-zero size).
    fn is_ready(&self) -> bool;

    /// Replace every feature of `source`.
    fn replace_source(
        &mut self,
        source: SourceId,
        features: &[PositionedFeature],
    ) -> Result<(), SurfaceError>;

    /// Apply one ephemeral state update to a feature.
    fn set_feature_state(
        &mut self,
        source: SourceId,
        id: &EntryId,
        state: FeatureState,
    ) -> Result<(), SurfaceError>;

    /// Remove every ephemeral state of a feature.
    fn clear_feature_state(&mut self, source: SourceId, id: &EntryId) -> Result<(), SurfaceError>;

    /// Animate the camera.
    fn ease_to(&mut self, target: CameraTarget) -> Result<(), SurfaceError>;
}

/// Smoothstep easing on [0, 1].
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Opacity multiplier for a feature's fade state at `now`.
#[must_use]
pub fn fade_opacity(fade: Option<(Fade, Instant)>, now: Instant, duration: Duration) -> f32 {
    let Some((fade, since)) = fade else {
        return 1.0;
    };
    let t = if duration.is_zero() {
        1.0
    } else {
        now.saturating_duration_since(since).as_secs_f32() / duration.as_secs_f32()
    };
    match fade {
        Fade::Hidden => 0.0,
        Fade::In => ease_in_out(t),
        Fade::Out => 1.0 - ease_in_out(t),
    }
}

#[derive(Debug, Default)]
struct SourceData {
    features: Vec<PositionedFeature>,
    states: HashMap<EntryId, FeatureFlags>,
    replacements: usize,
}

/// In-memory surface. Also used as the data model of the desktop renderer.
#[derive(Debug)]
pub struct MemorySurface {
    ready: bool,
    torn_down: bool,
    points: SourceData,
    transition: SourceData,
    camera_requests: Vec<CameraTarget>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: true,
            torn_down: false,
            points: SourceData::default(),
            transition: SourceData::default(),
            camera_requests: Vec::new(),
        }
    }

    /// A surface that is not ready yet (e.g. zero-sized viewport).
    #[must_use]
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Simulate the engine going away; every later call fails.
    pub fn tear_down(&mut self) {
        self.torn_down = true;
        self.ready = false;
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[must_use]
    pub fn features(&self, source: SourceId) -> &[PositionedFeature] {
        &self.source(source).features
    }

    #[must_use]
    pub fn feature_ids(&self, source: SourceId) -> Vec<EntryId> {
        self.features(source).iter().map(|f| f.id().clone()).collect()
    }

    #[must_use]
    pub fn flags(&self, source: SourceId, id: &EntryId) -> FeatureFlags {
        self.source(source)
            .states
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// Ids carrying any non-default state.
    #[must_use]
    pub fn stateful_ids(&self, source: SourceId) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self
            .source(source)
            .states
            .iter()
            .filter(|(_, flags)| !flags.is_default())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// How many times `source` was replaced.
    #[must_use]
    pub fn replacements(&self, source: SourceId) -> usize {
        self.source(source).replacements
    }

    /// Drain queued camera moves.
    pub fn take_camera_requests(&mut self) -> Vec<CameraTarget> {
        std::mem::take(&mut self.camera_requests)
    }

    fn source(&self, source: SourceId) -> &SourceData {
        match source {
            SourceId::Points => &self.points,
            SourceId::Transition => &self.transition,
        }
    }

    fn source_mut(&mut self, source: SourceId) -> Result<&mut SourceData, SurfaceError> {
        if self.torn_down {
            return Err(SurfaceError::Unavailable);
        }
        Ok(match source {
            SourceId::Points => &mut self.points,
            SourceId::Transition => &mut self.transition,
        })
    }
}

impl MapSurface for MemorySurface {
    fn is_ready(&self) -> bool {
        self.ready && !self.torn_down
    }

    fn replace_source(
        &mut self,
        source: SourceId,
        features: &[PositionedFeature],
    ) -> Result<(), SurfaceError> {
        let data = self.source_mut(source)?;
        data.features = features.to_vec();
        data.replacements += 1;
        Ok(())
    }

    fn set_feature_state(
        &mut self,
        source: SourceId,
        id: &EntryId,
        state: FeatureState,
    ) -> Result<(), SurfaceError> {
        let data = self.source_mut(source)?;
        let flags = data.states.entry(id.clone()).or_default();
        match state {
            FeatureState::Hover(on) => flags.hover = on,
            FeatureState::Active(on) => flags.active = on,
            FeatureState::Fade(fade) => flags.fade = fade.map(|f| (f, Instant::now())),
        }
        Ok(())
    }

    fn clear_feature_state(&mut self, source: SourceId, id: &EntryId) -> Result<(), SurfaceError> {
        let data = self.source_mut(source)?;
        data.states.remove(id);
        Ok(())
    }

    fn ease_to(&mut self, target: CameraTarget) -> Result<(), SurfaceError> {
        if self.torn_down {
            return Err(SurfaceError::Unavailable);
        }
        self.camera_requests.push(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryType, ResumeEntry};

    fn feature(id: i64) -> PositionedFeature {
        PositionedFeature::new(ResumeEntry::new(id, EntryType::Work, 0.0, 0.0), 0.0)
    }

    #[test]
    fn test_fade_opacity() {
        let t0 = Instant::now();
        let d = Duration::from_millis(500);
        assert!((fade_opacity(None, t0, d) - 1.0).abs() < f32::EPSILON);
        assert!(fade_opacity(Some((Fade::Hidden, t0)), t0 + d, d).abs() < f32::EPSILON);
        assert!(fade_opacity(Some((Fade::In, t0)), t0, d).abs() < f32::EPSILON);
        assert!((fade_opacity(Some((Fade::In, t0)), t0 + d * 2, d) - 1.0).abs() < f32::EPSILON);
        assert!((fade_opacity(Some((Fade::Out, t0)), t0, d) - 1.0).abs() < f32::EPSILON);
        let half = fade_opacity(Some((Fade::Out, t0)), t0 + d / 2, d);
        assert!((half - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_memory_surface_states() {
        let mut surface = MemorySurface::new();
        let id = EntryId::from(1);
        surface.replace_source(SourceId::Points, &[feature(1)]).unwrap();
        surface
            .set_feature_state(SourceId::Points, &id, FeatureState::Hover(true))
            .unwrap();
        surface
            .set_feature_state(SourceId::Points, &id, FeatureState::Fade(Some(Fade::In)))
            .unwrap();

        let flags = surface.flags(SourceId::Points, &id);
        assert!(flags.hover);
        assert_eq!(flags.fade(), Some(Fade::In));
        assert_eq!(surface.stateful_ids(SourceId::Points), vec![id.clone()]);

        surface.clear_feature_state(SourceId::Points, &id).unwrap();
        assert!(surface.flags(SourceId::Points, &id).is_default());
        assert_eq!(surface.replacements(SourceId::Points), 1);
    }

    #[test]
    fn test_memory_surface_torn_down() {
        let mut surface = MemorySurface::new();
        surface.tear_down();
        assert!(!surface.is_ready());
        assert_eq!(
            surface.replace_source(SourceId::Points, &[]),
            Err(SurfaceError::Unavailable)
        );
        assert_eq!(
            surface.ease_to(CameraTarget::center(0.0, 0.0, Duration::ZERO)),
            Err(SurfaceError::Unavailable)
        );
    }

    #[test]
    fn test_camera_requests_drain() {
        let mut surface = MemorySurface::new();
        surface
            .ease_to(CameraTarget::center(1.0, 2.0, Duration::from_millis(800)).with_zoom(6.0))
            .unwrap();
        let requests = surface.take_camera_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].zoom, Some(6.0));
        assert!(surface.take_camera_requests().is_empty());
    }
}
