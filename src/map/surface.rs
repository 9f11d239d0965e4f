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

//! The desktop map surface.
//!
//! Sources and feature states live in a [`MemorySurface`]; the plugin paints
//! from it every frame. Camera requests are turned into eased moves of the
//! walkers [`MapMemory`].

use std::time::{Duration, Instant};

use atlas_core::surface::ease_in_out;
use atlas_core::{
    CameraTarget, EntryId, FeatureState, MapSurface, MemorySurface, PositionedFeature, SourceId,
    SurfaceError,
};
use walkers::{lat_lon, MapMemory, Position};

/// Camera move in progress
#[derive(Debug, Clone, Copy)]
struct CameraMove {
    from: (f64, f64),
    from_zoom: f64,
    to: (f64, f64),
    to_zoom: f64,
    started: Instant,
    duration: Duration,
}

impl CameraMove {
    fn at(&self, now: Instant) -> ((f64, f64), f64, bool) {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            now.saturating_duration_since(self.started).as_secs_f32() / self.duration.as_secs_f32()
        };
        let k = f64::from(ease_in_out(t));
        let lerp = |a: f64, b: f64| a + (b - a) * k;
        (
            (lerp(self.from.0, self.to.0), lerp(self.from.1, self.to.1)),
            lerp(self.from_zoom, self.to_zoom),
            t >= 1.0,
        )
    }
}

#[derive(Debug)]
pub struct WalkersSurface {
    inner: MemorySurface,
    camera: Option<CameraMove>,
}

impl Default for WalkersSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkersSurface {
    /// Not ready until the first frame gives the map a size
    pub fn new() -> Self {
        Self {
            inner: MemorySurface::not_ready(),
            camera: None,
        }
    }

    pub fn data(&self) -> &MemorySurface {
        &self.inner
    }

    pub fn set_ready(&mut self, ready: bool) {
        if ready != self.inner.is_ready() && !self.inner.is_torn_down() {
            log::debug!("Map surface ready: {ready}");
            self.inner.set_ready(ready);
        }
    }

    pub fn tear_down(&mut self) {
        self.camera = None;
        self.inner.tear_down();
    }

    pub fn is_animating_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// Start queued camera requests and step the running move.
    /// `center` is where the map currently looks when it follows its
    /// default position.
    pub fn drive_camera(&mut self, memory: &mut MapMemory, center: Position, now: Instant) {
        if let Some(target) = self.inner.take_camera_requests().pop() {
            let from = memory.detached().unwrap_or(center);
            let from_zoom = memory.zoom();
            self.camera = Some(CameraMove {
                from: (from.x(), from.y()),
                from_zoom,
                to: (target.lon, target.lat),
                to_zoom: target.zoom.unwrap_or(from_zoom),
                started: now,
                duration: target.duration,
            });
        }

        let Some(camera) = self.camera else {
            return;
        };
        let ((lon, lat), zoom, done) = camera.at(now);
        memory.center_at(lat_lon(lat, lon));
        if let Err(e) = memory.set_zoom(zoom) {
            log::debug!("Camera zoom {zoom} rejected: {e:?}");
        }
        if done {
            self.camera = None;
        }
    }

    /// Interrupt a camera move, e.g. when the user starts dragging
    pub fn stop_camera(&mut self) {
        self.camera = None;
    }
}

impl MapSurface for WalkersSurface {
    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn replace_source(
        &mut self,
        source: SourceId,
        features: &[PositionedFeature],
    ) -> Result<(), SurfaceError> {
        self.inner.replace_source(source, features)
    }

    fn set_feature_state(
        &mut self,
        source: SourceId,
        id: &EntryId,
        state: FeatureState,
    ) -> Result<(), SurfaceError> {
        self.inner.set_feature_state(source, id, state)
    }

    fn clear_feature_state(&mut self, source: SourceId, id: &EntryId) -> Result<(), SurfaceError> {
        self.inner.clear_feature_state(source, id)
    }

    fn ease_to(&mut self, target: CameraTarget) -> Result<(), SurfaceError> {
        self.inner.ease_to(target)
    }
}
