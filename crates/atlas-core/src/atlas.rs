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

//! The résumé atlas: the single owner of everything that mutates the map.
//!
//! [`ResumeAtlas`] wires the filter state, the year scrubber, the transition
//! animator, the selection controller and the case-study overlay together.
//! The UI calls its operations in response to input and calls
//! [`ResumeAtlas::tick`] once per frame so that debounced commits, transition
//! phases, setup retries and theme re-fades make progress.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::animator::{AnimatorConfig, AnimatorStatus, TransitionAnimator};
use crate::case_study::{CaseStudyOverlay, DEFAULT_CONNECTOR_DURATION};
use crate::entry::{EntryId, EntryType, ResumeEntry};
use crate::events::{EventRegistry, LayerAction, PointerEvent, PointerKind};
use crate::jitter::{project, PositionedFeature, DEFAULT_JITTER_AMPLITUDE};
use crate::schedule::{Backoff, Deadline};
use crate::selection::{HighlightTracker, SelectionChange, SelectionController};
use crate::surface::{CameraTarget, MapSurface, SurfaceError};
use crate::theme::Theme;
use crate::timeline::{
    FilterState, VisibleSet, YearDomain, YearScrubber, DEFAULT_DEBOUNCE, DEFAULT_DRAG_THROTTLE,
};

/// Timings and camera parameters of the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasConfig {
    pub animator: AnimatorConfig,
    pub debounce: Duration,
    pub drag_throttle: Duration,
    pub connector_duration: Duration,
    pub jitter_amplitude: f64,
    /// Zoom levels added when a cluster is clicked.
    pub cluster_zoom_step: f64,
    pub cluster_ease: Duration,
    pub max_zoom: f64,
    /// Zoom applied when a selection recenters the map; `None` keeps the
    /// current zoom.
    pub focus_zoom: Option<f64>,
    pub focus_ease: Duration,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            animator: AnimatorConfig::default(),
            debounce: DEFAULT_DEBOUNCE,
            drag_throttle: DEFAULT_DRAG_THROTTLE,
            connector_duration: DEFAULT_CONNECTOR_DURATION,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            cluster_zoom_step: 1.5,
            cluster_ease: Duration::from_millis(600),
            max_zoom: 19.0,
            focus_zoom: None,
            focus_ease: Duration::from_millis(800),
        }
    }
}

/// What the frame loop should do after a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Something is animating or waiting on a deadline.
    pub repaint: bool,
}

/// Popup content for the hovered point.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverCard {
    pub id: EntryId,
    pub lines: Vec<String>,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Pending,
    Attached,
    TornDown,
}

/// Interactive résumé map state.
#[derive(Debug)]
pub struct ResumeAtlas {
    config: AtlasConfig,
    features: Vec<PositionedFeature>,
    filters: FilterState,
    scrubber: YearScrubber,
    visible: VisibleSet,
    animator: TransitionAnimator,
    selection: SelectionController,
    highlights: HighlightTracker,
    case_studies: CaseStudyOverlay,
    registry: EventRegistry,
    theme: watch::Receiver<Theme>,
    root: CancellationToken,
    attachment: Attachment,
    backoff: Backoff,
    retry: Deadline,
    recomputations: usize,
    hover_card: Option<HoverCard>,
    pointer_cursor: bool,
}

impl ResumeAtlas {
    /// Build the atlas with the year domain ending at the current year.
    #[must_use]
    pub fn new(entries: Vec<ResumeEntry>, theme: watch::Receiver<Theme>, config: AtlasConfig) -> Self {
        let features = project(entries, config.jitter_amplitude);
        let domain = YearDomain::from_features_now(&features);
        Self::with_features(features, domain, theme, config)
    }

    /// Build the atlas for already positioned features and an explicit
    /// year domain.
    #[must_use]
    pub fn with_features(
        features: Vec<PositionedFeature>,
        domain: YearDomain,
        theme: watch::Receiver<Theme>,
        config: AtlasConfig,
    ) -> Self {
        let root = CancellationToken::new();
        let filters = FilterState::new(domain);
        let visible = filters.derive(&features);
        info!(
            "Atlas ready: {} features, {} visible, years {}..={}",
            features.len(),
            visible.len(),
            domain.min,
            domain.max
        );
        Self {
            scrubber: YearScrubber::new(filters.cutoff(), config.debounce, config.drag_throttle),
            animator: TransitionAnimator::new(config.animator, root.child_token()),
            case_studies: CaseStudyOverlay::new(config.connector_duration),
            config,
            features,
            filters,
            visible,
            selection: SelectionController::new(),
            highlights: HighlightTracker::new(),
            registry: EventRegistry::new(),
            theme,
            root,
            attachment: Attachment::Pending,
            backoff: Backoff::default(),
            retry: Deadline::default(),
            recomputations: 1,
            hover_card: None,
            pointer_cursor: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    #[must_use]
    pub fn features(&self) -> &[PositionedFeature] {
        &self.features
    }

    #[must_use]
    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn domain(&self) -> YearDomain {
        self.filters.domain()
    }

    #[must_use]
    pub fn display_year(&self) -> i32 {
        self.scrubber.display_year()
    }

    #[must_use]
    pub fn is_scrubbing(&self) -> bool {
        self.scrubber.is_dragging()
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// The selected feature, resolved against the visible set.
    #[must_use]
    pub fn selected_feature(&self) -> Option<&PositionedFeature> {
        self.selection.selected_id().and_then(|id| self.visible.find(id))
    }

    #[must_use]
    pub fn position_label(&self) -> Option<String> {
        self.selection.position_label(&self.visible)
    }

    #[must_use]
    pub fn hover_card(&self) -> Option<&HoverCard> {
        self.hover_card.as_ref()
    }

    #[must_use]
    pub fn case_studies(&self) -> &CaseStudyOverlay {
        &self.case_studies
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.animator.is_transitioning()
    }

    #[must_use]
    pub fn wants_pointer_cursor(&self) -> bool {
        self.pointer_cursor
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment == Attachment::Attached
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    /// Number of visible-set derivations so far, the initial one included.
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Hook the atlas up to `surface`. When the surface is not ready yet the
    /// attempt is retried from [`ResumeAtlas::tick`] with backoff.
    pub fn attach(&mut self, surface: &mut dyn MapSurface, now: Instant) -> bool {
        if self.root.is_cancelled() || self.attachment == Attachment::Attached {
            return self.is_attached();
        }
        if !surface.is_ready() {
            let delay = self.backoff.next_delay();
            debug!(
                "Map surface not ready (attempt {}), retrying in {delay:?}",
                self.backoff.attempts()
            );
            self.retry.schedule(now + delay);
            return false;
        }

        self.registry = EventRegistry::with_default_layers();
        self.animator.apply_immediately(self.visible.as_slice(), surface);
        self.attachment = Attachment::Attached;
        self.backoff.reset();
        self.retry.cancel();
        info!("Map surface attached, {} entries shown", self.visible.len());
        true
    }

    /// Advance every pending continuation.
    pub fn tick(&mut self, surface: &mut dyn MapSurface, now: Instant) -> TickOutcome {
        if self.root.is_cancelled() {
            return TickOutcome::default();
        }
        if self.attachment == Attachment::Pending {
            if self.retry.fire(now) {
                self.attach(surface, now);
            }
            if !self.is_attached() {
                return TickOutcome {
                    repaint: self.retry.is_armed(),
                };
            }
        }

        let mut repaint = false;

        if let Some(year) = self.scrubber.poll(now) {
            self.apply_cutoff(year, surface, now);
            repaint = true;
        }

        if self.theme.has_changed().unwrap_or(false) {
            let theme = *self.theme.borrow_and_update();
            debug!("Re-fading points for {theme} theme");
            self.animator.refade(surface, now);
            repaint = true;
        }

        if self.animator.poll(surface, now) == AnimatorStatus::Running {
            repaint = true;
        }

        repaint |= self.scrubber.has_pending() || self.case_studies.is_animating(now);
        TickOutcome { repaint }
    }

    /// Flip a type filter and animate towards the new visible set.
    pub fn toggle_filter(
        &mut self,
        entry_type: EntryType,
        surface: &mut dyn MapSurface,
        now: Instant,
    ) -> bool {
        let active = self.filters.toggle_filter(entry_type);
        debug!("Filter {entry_type} {}", if active { "on" } else { "off" });
        self.refresh(surface, now);
        active
    }

    /// Slider moved. Returns true when the displayed year changed.
    pub fn scrub_year(&mut self, year: i32, now: Instant) -> bool {
        let year = self.filters.domain().clamp(year);
        self.scrubber.input(year, now)
    }

    pub fn begin_year_drag(&mut self) {
        self.scrubber.drag_start();
    }

    /// Slider released: commit the last dragged year right away.
    pub fn end_year_drag(&mut self, surface: &mut dyn MapSurface, now: Instant) {
        if let Some(year) = self.scrubber.drag_end() {
            self.apply_cutoff(year, surface, now);
        }
    }

    /// Commit `year` immediately, bypassing the debounce.
    pub fn set_year_now(&mut self, year: i32, surface: &mut dyn MapSurface, now: Instant) {
        let year = self.filters.domain().clamp(year);
        if let Some(year) = self.scrubber.commit_now(year) {
            self.apply_cutoff(year, surface, now);
        }
    }

    /// Dispatch a pointer event through the layer registry. Returns true
    /// when something visible changed.
    pub fn handle_pointer(&mut self, event: &PointerEvent, surface: &mut dyn MapSurface) -> bool {
        if !self.is_attached() {
            return false;
        }
        if event.is_background_click() {
            return self.close_panel(surface);
        }
        let Some(layer) = event.layer else {
            return false;
        };
        // Points are moving between layers mid-transition; only let go of
        // the hover
        if self.animator.is_transitioning() && event.kind != PointerKind::Leave {
            return false;
        }

        let actions = self.registry.actions_for(layer, event.kind).to_vec();
        let mut changed = false;
        for action in actions {
            let result = match action {
                LayerAction::Hover => self.hover(event.feature.as_ref(), surface),
                LayerAction::Unhover => self.unhover(surface),
                LayerAction::Select => Ok(match &event.feature {
                    Some(id) => {
                        let change = self.selection.click_feature(&self.visible, id);
                        self.apply_selection(change, surface)
                    }
                    None => false,
                }),
                LayerAction::ExpandCluster => self.expand_cluster(event, surface),
                LayerAction::PointerCursor(on) => {
                    let changed = self.pointer_cursor != on;
                    self.pointer_cursor = on;
                    Ok(changed)
                }
            };
            match result {
                Ok(c) => changed |= c,
                Err(e) => debug!("Pointer action {action:?} dropped: {e}"),
            }
        }
        changed
    }

    /// Open the panel for `id` (e.g. from a header shortcut).
    pub fn open_entry(&mut self, id: &EntryId, surface: &mut dyn MapSurface) -> bool {
        let change = self.selection.open_entry(&self.visible, id);
        self.apply_selection(change, surface)
    }

    pub fn next(&mut self, surface: &mut dyn MapSurface) -> bool {
        let change = self.selection.next(&self.visible);
        self.apply_selection(change, surface)
    }

    pub fn previous(&mut self, surface: &mut dyn MapSurface) -> bool {
        let change = self.selection.previous(&self.visible);
        self.apply_selection(change, surface)
    }

    pub fn close_panel(&mut self, surface: &mut dyn MapSurface) -> bool {
        let change = self.selection.close();
        self.apply_selection(change, surface)
    }

    /// Pointer over project `index` of the selected entry. Draws its
    /// case-study connectors, or recenters on the entry when it has none.
    pub fn hover_project(&mut self, index: usize, surface: &mut dyn MapSurface, now: Instant) -> bool {
        let Some(feature) = self.selected_feature() else {
            return false;
        };
        let feature = feature.clone();
        if self
            .case_studies
            .hover_project(&feature.entry, feature.position(), index, now)
        {
            return true;
        }
        self.hover_description(surface);
        false
    }

    pub fn leave_project(&mut self) {
        self.case_studies.leave_project();
    }

    /// Recenter on the selected entry.
    pub fn hover_description(&mut self, surface: &mut dyn MapSurface) {
        if let Some((lon, lat)) = self.selected_feature().map(PositionedFeature::position) {
            self.ease(surface, CameraTarget::center(lon, lat, self.config.focus_ease));
        }
    }

    /// Cancel every pending continuation. The surface is not touched; it
    /// may already be gone.
    pub fn teardown(&mut self) {
        if self.root.is_cancelled() {
            return;
        }
        info!("Tearing down atlas");
        self.root.cancel();
        self.animator.shutdown();
        self.scrubber.cancel();
        self.retry.cancel();
        self.registry.clear();
        self.highlights.reset();
        self.case_studies.clear();
        self.hover_card = None;
        self.attachment = Attachment::TornDown;
    }

    fn apply_cutoff(&mut self, year: i32, surface: &mut dyn MapSurface, now: Instant) {
        if self.filters.set_year_cutoff(year) {
            debug!("Year cutoff {year}");
            self.refresh(surface, now);
        }
    }

    fn refresh(&mut self, surface: &mut dyn MapSurface, now: Instant) {
        self.visible = self.filters.derive(&self.features);
        self.recomputations += 1;

        if self.selection.reconcile(&self.visible) == SelectionChange::Closed {
            self.case_studies.clear();
        }
        if let Err(e) = self.highlights.retain_visible(&self.visible, surface) {
            debug!("Stale highlight not cleared: {e}");
        }
        if self
            .hover_card
            .as_ref()
            .is_some_and(|card| !self.visible.contains(&card.id))
        {
            self.hover_card = None;
        }

        if self.is_attached() {
            if let Some(delta) = self.animator.begin(&self.visible, surface, now) {
                debug!(
                    "Transition: {} entering, {} leaving, {} unchanged",
                    delta.entering.len(),
                    delta.leaving.len(),
                    delta.unchanged.len()
                );
            }
        }
    }

    fn apply_selection(&mut self, change: SelectionChange, surface: &mut dyn MapSurface) -> bool {
        match change {
            SelectionChange::Unchanged => false,
            SelectionChange::Focus { id, lon, lat } => {
                self.case_studies.clear();
                if let Err(e) = self.highlights.select(Some(&id), surface) {
                    debug!("Selection highlight skipped: {e}");
                }
                let mut target = CameraTarget::center(lon, lat, self.config.focus_ease);
                if let Some(zoom) = self.config.focus_zoom {
                    target = target.with_zoom(zoom);
                }
                self.ease(surface, target);
                true
            }
            SelectionChange::Closed => {
                self.case_studies.clear();
                if let Err(e) = self.highlights.select(None, surface) {
                    debug!("Selection highlight skipped: {e}");
                }
                true
            }
        }
    }

    fn hover(&mut self, id: Option<&EntryId>, surface: &mut dyn MapSurface) -> Result<bool, SurfaceError> {
        let Some(feature) = id.and_then(|id| self.visible.find(id)) else {
            return Ok(false);
        };
        let (lon, lat) = feature.position();
        let card = HoverCard {
            id: feature.id().clone(),
            lines: feature.entry.hover_lines(),
            lon,
            lat,
        };
        let changed = self.highlights.hover(&card.id, surface)?;
        self.hover_card = Some(card);
        Ok(changed)
    }

    fn unhover(&mut self, surface: &mut dyn MapSurface) -> Result<bool, SurfaceError> {
        let had_card = self.hover_card.take().is_some();
        self.highlights.unhover(surface)?;
        Ok(had_card)
    }

    fn expand_cluster(&mut self, event: &PointerEvent, surface: &mut dyn MapSurface) -> Result<bool, SurfaceError> {
        let zoom = (event.zoom + self.config.cluster_zoom_step).min(self.config.max_zoom);
        surface.ease_to(CameraTarget::center(event.lon, event.lat, self.config.cluster_ease).with_zoom(zoom))?;
        Ok(true)
    }

    // Camera moves are a courtesy; a failure never blocks the state change
    fn ease(&self, surface: &mut dyn MapSurface, target: CameraTarget) {
        if let Err(e) = surface.ease_to(target) {
            warn!("Camera move skipped: {e}");
        }
    }
}
