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

//! Pointer gestures on the detail panel: swipe navigation and drag resize.

use std::time::{Duration, Instant};

use crate::schedule::Throttle;
use crate::timeline::DEFAULT_DRAG_THROTTLE;

/// Minimum travel for a swipe, in points.
pub const MIN_SWIPE_DISTANCE: f32 = 50.0;
/// Maximum off-axis travel for a swipe, in points.
pub const MAX_SWIPE_DEVIATION: f32 = 100.0;
/// Maximum duration of a swipe.
pub const MAX_SWIPE_TIME: Duration = Duration::from_millis(300);

/// Panel height bounds as fractions of the viewport.
pub const MIN_PANEL_FRACTION: f32 = 0.3;
pub const MAX_PANEL_FRACTION: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Previous,
    Next,
    Close,
}

/// Classify a completed pointer stroke. Right is previous, left is next,
/// down closes.
#[must_use]
pub fn classify_swipe(dx: f32, dy: f32, elapsed: Duration) -> Option<Swipe> {
    if elapsed >= MAX_SWIPE_TIME {
        return None;
    }
    if dx.abs() > MIN_SWIPE_DISTANCE && dy.abs() < MAX_SWIPE_DEVIATION {
        Some(if dx > 0.0 { Swipe::Previous } else { Swipe::Next })
    } else if dy > MIN_SWIPE_DISTANCE && dx.abs() < MAX_SWIPE_DEVIATION {
        Some(Swipe::Close)
    } else {
        None
    }
}

/// Tracks a stroke from press to release.
#[derive(Debug, Clone, Copy)]
pub struct SwipeTracker {
    start: Option<(f32, f32, Instant)>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { start: None }
    }

    pub fn press(&mut self, x: f32, y: f32, now: Instant) {
        self.start = Some((x, y, now));
    }

    pub fn release(&mut self, x: f32, y: f32, now: Instant) -> Option<Swipe> {
        let (x0, y0, t0) = self.start.take()?;
        classify_swipe(x - x0, y - y0, now.saturating_duration_since(t0))
    }
}

/// Drag-to-resize of a bottom-anchored panel.
#[derive(Debug, Clone)]
pub struct PanelResize {
    throttle: Throttle,
    origin: Option<(f32, f32)>,
}

impl Default for PanelResize {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THROTTLE)
    }
}

impl PanelResize {
    #[must_use]
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle: Throttle::new(throttle),
            origin: None,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Start a drag at pointer `y` with the panel at `height`.
    pub fn start(&mut self, y: f32, height: f32) {
        self.origin = Some((y, height));
        self.throttle.reset();
    }

    /// New panel height for pointer `y`, or `None` when throttled or not
    /// dragging. Dragging up grows the panel.
    pub fn drag(&mut self, y: f32, viewport_height: f32, now: Instant) -> Option<f32> {
        let (y0, height0) = self.origin?;
        if !self.throttle.try_acquire(now) {
            return None;
        }
        Some(clamp_panel_height(height0 + (y0 - y), viewport_height))
    }

    pub fn end(&mut self) {
        self.origin = None;
    }
}

/// Clamp a panel height to 30%..80% of the viewport.
#[must_use]
pub fn clamp_panel_height(height: f32, viewport_height: f32) -> f32 {
    let min = viewport_height * MIN_PANEL_FRACTION;
    let max = viewport_height * MAX_PANEL_FRACTION;
    height.clamp(min, max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_swipe() {
        let fast = Duration::from_millis(120);
        assert_eq!(classify_swipe(80.0, 10.0, fast), Some(Swipe::Previous));
        assert_eq!(classify_swipe(-80.0, -10.0, fast), Some(Swipe::Next));
        assert_eq!(classify_swipe(5.0, 90.0, fast), Some(Swipe::Close));
        // up is not a gesture
        assert_eq!(classify_swipe(5.0, -90.0, fast), None);
        assert_eq!(classify_swipe(30.0, 0.0, fast), None);
        assert_eq!(classify_swipe(80.0, 150.0, fast), None);
        assert_eq!(classify_swipe(80.0, 0.0, Duration::from_millis(300)), None);
    }

    #[test]
    fn test_swipe_tracker() {
        let t0 = Instant::now();
        let mut tracker = SwipeTracker::new();
        assert_eq!(tracker.release(0.0, 0.0, t0), None);
        tracker.press(100.0, 100.0, t0);
        assert_eq!(
            tracker.release(20.0, 110.0, t0 + Duration::from_millis(200)),
            Some(Swipe::Next)
        );
    }

    #[test]
    fn test_panel_resize_clamps_and_throttles() {
        let t0 = Instant::now();
        let mut resize = PanelResize::default();
        assert_eq!(resize.drag(0.0, 1000.0, t0), None);

        resize.start(600.0, 400.0);
        assert_eq!(resize.drag(500.0, 1000.0, t0), Some(500.0));
        assert_eq!(resize.drag(450.0, 1000.0, t0 + Duration::from_millis(4)), None);
        assert_eq!(resize.drag(0.0, 1000.0, t0 + Duration::from_millis(10)), Some(800.0));
        assert_eq!(resize.drag(900.0, 1000.0, t0 + Duration::from_millis(20)), Some(300.0));
        resize.end();
        assert!(!resize.is_dragging());
    }
}
