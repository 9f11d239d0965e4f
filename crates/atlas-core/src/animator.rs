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

//! Animated reconciliation between successive visible sets.
//!
//! Every filter or timeline change produces a [`TransitionDelta`]. The
//! [`TransitionAnimator`] plays it as a chain of timed steps, advanced by
//! [`TransitionAnimator::poll`] once per frame:
//!
//! 1. **Fade out** - leaving features are copied to the transition source
//!    and fade there at their current position; the main layer hides them.
//! 2. **Swap** - the main source is replaced with the new visible set.
//!    Entering features exist at zero opacity.
//! 3. **Settle** - a short pause so the engine has the new data before the
//!    fade-in starts.
//! 4. **Fade in** - entering features ramp to full opacity.
//! 5. **Clear** - the transient fade state is removed.
//!
//! Each transition runs under a child [`CancellationToken`]. A newer change
//! cancels the running transition, clears whatever transient state it left
//! behind and diffs against what the main source actually holds. Any
//! surface error degrades to an immediate, non-animated update.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::entry::EntryId;
use crate::jitter::PositionedFeature;
use crate::schedule::Deadline;
use crate::surface::{Fade, FeatureState, MapSurface, SourceId, SurfaceError};
use crate::timeline::VisibleSet;

/// Default duration of each fade.
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(500);

/// Default pause between the data swap and the fade-in.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Membership difference between two visible sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionDelta {
    pub entering: Vec<EntryId>,
    pub leaving: Vec<EntryId>,
    pub unchanged: Vec<EntryId>,
}

impl TransitionDelta {
    /// Entering in `new` order, leaving and unchanged in `old` order.
    #[must_use]
    pub fn between(old: &[PositionedFeature], new: &[PositionedFeature]) -> Self {
        let old_ids: HashSet<&EntryId> = old.iter().map(PositionedFeature::id).collect();
        let new_ids: HashSet<&EntryId> = new.iter().map(PositionedFeature::id).collect();

        let entering = new
            .iter()
            .filter(|f| !old_ids.contains(f.id()))
            .map(|f| f.id().clone())
            .collect();
        let (unchanged, leaving) = old
            .iter()
            .map(|f| f.id().clone())
            .partition(|id| new_ids.contains(id));

        Self {
            entering,
            leaving,
            unchanged,
        }
    }

    /// True when no feature enters or leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.leaving.is_empty()
    }
}

/// Timings of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorConfig {
    pub fade_duration: Duration,
    pub settle_delay: Duration,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            fade_duration: DEFAULT_FADE_DURATION,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Whether a transition is still running after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorStatus {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    FadingOut { until: Instant },
    Settling { until: Instant },
    FadingIn,
}

#[derive(Debug)]
struct Transition {
    token: CancellationToken,
    target: Vec<PositionedFeature>,
    delta: TransitionDelta,
    phase: Phase,
}

/// Plays visible-set changes on a [`MapSurface`].
#[derive(Debug)]
pub struct TransitionAnimator {
    config: AnimatorConfig,
    root: CancellationToken,
    /// Contents of the main source.
    applied: Vec<PositionedFeature>,
    transition: Option<Transition>,
    /// Ids carrying a fade state on the main source.
    faded: Vec<EntryId>,
    overlay_active: bool,
    pending_clear: Deadline,
}

impl TransitionAnimator {
    #[must_use]
    pub fn new(config: AnimatorConfig, root: CancellationToken) -> Self {
        Self {
            config,
            root,
            applied: Vec::new(),
            transition: None,
            faded: Vec::new(),
            overlay_active: false,
            pending_clear: Deadline::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> AnimatorConfig {
        self.config
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Features currently held by the main source.
    #[must_use]
    pub fn applied(&self) -> &[PositionedFeature] {
        &self.applied
    }

    /// Delta of the running transition, if any.
    #[must_use]
    pub fn current_delta(&self) -> Option<&TransitionDelta> {
        self.transition.as_ref().map(|t| &t.delta)
    }

    /// Start animating towards `next`. Returns the delta that started
    /// playing, or `None` when there was nothing to animate.
    pub fn begin(
        &mut self,
        next: &VisibleSet,
        surface: &mut dyn MapSurface,
        now: Instant,
    ) -> Option<TransitionDelta> {
        if self.root.is_cancelled() {
            return None;
        }
        if let Err(e) = self.interrupt(surface) {
            warn!("Could not reconcile interrupted transition: {e}");
            self.apply_immediately(next.as_slice(), surface);
            return None;
        }

        let delta = TransitionDelta::between(&self.applied, next.as_slice());
        if delta.is_empty() {
            // Same membership; only the order may differ
            self.applied = next.as_slice().to_vec();
            return None;
        }

        let leaving_ids: HashSet<&EntryId> = delta.leaving.iter().collect();
        let leaving: Vec<PositionedFeature> = self
            .applied
            .iter()
            .filter(|f| leaving_ids.contains(f.id()))
            .cloned()
            .collect();

        let mut transition = Transition {
            token: self.root.child_token(),
            target: next.as_slice().to_vec(),
            delta,
            phase: Phase::FadingIn,
        };

        let started = if leaving.is_empty() {
            self.swap(&mut transition, surface, now)
        } else {
            self.fade_out(&mut transition, &leaving, surface, now)
        };

        match started {
            Ok(()) => {
                let delta = transition.delta.clone();
                self.transition = Some(transition);
                Some(delta)
            }
            Err(e) => {
                warn!("Transition failed to start, applying without animation: {e}");
                self.apply_immediately(&transition.target, surface);
                None
            }
        }
    }

    /// Advance the running transition.
    pub fn poll(&mut self, surface: &mut dyn MapSurface, now: Instant) -> AnimatorStatus {
        let Some(mut transition) = self.transition.take() else {
            return AnimatorStatus::Idle;
        };
        if transition.token.is_cancelled() {
            debug!("Transition cancelled, dropping remaining steps");
            self.pending_clear.cancel();
            return AnimatorStatus::Idle;
        }

        let step = match transition.phase {
            Phase::FadingOut { until } if now >= until => {
                self.swap(&mut transition, surface, now).map(|()| true)
            }
            Phase::Settling { until } if now >= until => {
                self.fade_in(&mut transition, surface, now).map(|()| true)
            }
            Phase::FadingIn if self.pending_clear.fire(now) => {
                self.clear_transient(surface).map(|()| false)
            }
            _ => Ok(true),
        };

        match step {
            Ok(true) => {
                self.transition = Some(transition);
                AnimatorStatus::Running
            }
            Ok(false) => AnimatorStatus::Idle,
            Err(e) => {
                warn!("Transition step failed, applying without animation: {e}");
                self.apply_immediately(&transition.target, surface);
                AnimatorStatus::Idle
            }
        }
    }

    /// Fade every feature of the main source back in, e.g. after a palette
    /// change. Skipped while a transition is running.
    pub fn refade(&mut self, surface: &mut dyn MapSurface, now: Instant) -> bool {
        if self.root.is_cancelled() || self.transition.is_some() || self.applied.is_empty() {
            return false;
        }
        let transition = Transition {
            token: self.root.child_token(),
            target: self.applied.clone(),
            delta: TransitionDelta::default(),
            phase: Phase::FadingIn,
        };
        let ids: Vec<EntryId> = self.applied.iter().map(|f| f.id().clone()).collect();
        let result = ids.iter().try_for_each(|id| {
            surface.set_feature_state(SourceId::Points, id, FeatureState::Fade(Some(Fade::In)))
        });
        self.faded = ids;
        match result {
            Ok(()) => {
                self.pending_clear.schedule(now + self.config.fade_duration);
                self.transition = Some(transition);
                true
            }
            Err(e) => {
                debug!("Re-fade skipped: {e}");
                self.apply_immediately(&transition.target, surface);
                false
            }
        }
    }

    /// Put `features` on the surface without animation and drop every
    /// transient state. Used for the initial data and as the error fallback.
    pub fn apply_immediately(&mut self, features: &[PositionedFeature], surface: &mut dyn MapSurface) {
        if let Some(transition) = self.transition.take() {
            transition.token.cancel();
        }
        self.pending_clear.cancel();
        self.applied = features.to_vec();

        let result = surface
            .replace_source(SourceId::Points, features)
            .and_then(|()| self.clear_transient(surface));
        if let Err(e) = result {
            // The surface is gone; nothing left to update
            debug!("Immediate update skipped: {e}");
            self.faded.clear();
            self.overlay_active = false;
        }
    }

    /// Cancel everything without touching the surface (teardown).
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.transition = None;
        self.pending_clear.cancel();
        self.faded.clear();
        self.overlay_active = false;
    }

    fn interrupt(&mut self, surface: &mut dyn MapSurface) -> Result<(), SurfaceError> {
        let Some(transition) = self.transition.take() else {
            return Ok(());
        };
        debug!(
            "Interrupting transition (+{} / -{})",
            transition.delta.entering.len(),
            transition.delta.leaving.len()
        );
        transition.token.cancel();
        self.pending_clear.cancel();
        self.clear_transient(surface)
    }

    fn fade_out(
        &mut self,
        transition: &mut Transition,
        leaving: &[PositionedFeature],
        surface: &mut dyn MapSurface,
        now: Instant,
    ) -> Result<(), SurfaceError> {
        surface.replace_source(SourceId::Transition, leaving)?;
        self.overlay_active = true;
        for feature in leaving {
            surface.set_feature_state(
                SourceId::Transition,
                feature.id(),
                FeatureState::Fade(Some(Fade::Out)),
            )?;
            surface.set_feature_state(
                SourceId::Points,
                feature.id(),
                FeatureState::Fade(Some(Fade::Hidden)),
            )?;
            self.faded.push(feature.id().clone());
        }
        transition.phase = Phase::FadingOut {
            until: now + self.config.fade_duration,
        };
        Ok(())
    }

    fn swap(
        &mut self,
        transition: &mut Transition,
        surface: &mut dyn MapSurface,
        now: Instant,
    ) -> Result<(), SurfaceError> {
        surface.replace_source(SourceId::Points, &transition.target)?;
        self.applied.clone_from(&transition.target);

        // Leaving features are gone; drop all of their state so a later
        // re-entry starts clean
        for id in &transition.delta.leaving {
            surface.clear_feature_state(SourceId::Points, id)?;
        }
        self.faded.retain(|id| !transition.delta.leaving.contains(id));
        if self.overlay_active {
            surface.replace_source(SourceId::Transition, &[])?;
            self.overlay_active = false;
        }

        for id in &transition.delta.entering {
            surface.set_feature_state(SourceId::Points, id, FeatureState::Fade(Some(Fade::Hidden)))?;
            self.faded.push(id.clone());
        }
        transition.phase = Phase::Settling {
            until: now + self.config.settle_delay,
        };
        Ok(())
    }

    fn fade_in(
        &mut self,
        transition: &mut Transition,
        surface: &mut dyn MapSurface,
        now: Instant,
    ) -> Result<(), SurfaceError> {
        for id in &transition.delta.entering {
            surface.set_feature_state(SourceId::Points, id, FeatureState::Fade(Some(Fade::In)))?;
        }
        transition.phase = Phase::FadingIn;
        self.pending_clear.schedule(now + self.config.fade_duration);
        Ok(())
    }

    fn clear_transient(&mut self, surface: &mut dyn MapSurface) -> Result<(), SurfaceError> {
        for id in std::mem::take(&mut self.faded) {
            surface.set_feature_state(SourceId::Points, &id, FeatureState::Fade(None))?;
        }
        if self.overlay_active {
            surface.replace_source(SourceId::Transition, &[])?;
            self.overlay_active = false;
        }
        Ok(())
    }
}
