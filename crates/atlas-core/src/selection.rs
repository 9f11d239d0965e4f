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

//! Selection state and detail panel navigation.

use log::{debug, warn};

use crate::entry::EntryId;
use crate::surface::{FeatureState, MapSurface, SourceId, SurfaceError};
use crate::timeline::VisibleSet;

/// Detail panel state. `index` always refers to the current visible set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    Open { id: EntryId, index: usize },
}

/// Result of a selection mutation, telling the caller what to do with the
/// camera and the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Unchanged,
    /// A feature became selected; recenter on it.
    Focus { id: EntryId, lon: f64, lat: f64 },
    Closed,
}

/// Tracks the single selected feature.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: PanelState,
}

impl SelectionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open { .. })
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&EntryId> {
        match &self.state {
            PanelState::Open { id, .. } => Some(id),
            PanelState::Closed => None,
        }
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        match self.state {
            PanelState::Open { index, .. } => Some(index),
            PanelState::Closed => None,
        }
    }

    /// "3 / 12" for the panel header.
    #[must_use]
    pub fn position_label(&self, visible: &VisibleSet) -> Option<String> {
        self.selected_index()
            .map(|index| format!("{} / {}", index + 1, visible.len()))
    }

    /// A click on a feature: selects it, or closes the panel when it is the
    /// feature already selected.
    pub fn click_feature(&mut self, visible: &VisibleSet, id: &EntryId) -> SelectionChange {
        if self.selected_id() == Some(id) {
            return self.close();
        }
        self.open_entry(visible, id)
    }

    /// Open the panel on `id`. Ignored when the entry is not visible.
    pub fn open_entry(&mut self, visible: &VisibleSet, id: &EntryId) -> SelectionChange {
        let Some(index) = visible.index_of(id) else {
            warn!("Entry {id} is not in the visible set, not opening it");
            return SelectionChange::Unchanged;
        };
        self.focus(visible, index)
    }

    pub fn close(&mut self) -> SelectionChange {
        match std::mem::take(&mut self.state) {
            PanelState::Open { id, .. } => {
                debug!("Closed panel for entry {id}");
                SelectionChange::Closed
            }
            PanelState::Closed => SelectionChange::Unchanged,
        }
    }

    /// Move to the next visible feature, wrapping at the end.
    pub fn next(&mut self, visible: &VisibleSet) -> SelectionChange {
        self.step(visible, 1)
    }

    /// Move to the previous visible feature, wrapping at the start.
    pub fn previous(&mut self, visible: &VisibleSet) -> SelectionChange {
        self.step(visible, -1)
    }

    /// Re-resolve the selection after the visible set changed. The selection
    /// follows its id to the new index and closes when the id is gone.
    pub fn reconcile(&mut self, visible: &VisibleSet) -> SelectionChange {
        let PanelState::Open { id, index } = &mut self.state else {
            return SelectionChange::Unchanged;
        };
        match visible.index_of(id) {
            Some(new_index) => {
                *index = new_index;
                SelectionChange::Unchanged
            }
            None => {
                debug!("Selected entry {id} left the visible set");
                self.state = PanelState::Closed;
                SelectionChange::Closed
            }
        }
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, reason = "index is wrapped into 0..len")]
    fn step(&mut self, visible: &VisibleSet, delta: isize) -> SelectionChange {
        let PanelState::Open { id, index } = &self.state else {
            return SelectionChange::Unchanged;
        };
        let len = visible.len();
        if len == 0 {
            return self.close();
        }
        // Resolve against the current set; fall back to a clamped index
        // when the selected id is no longer there
        let current = visible.index_of(id).unwrap_or_else(|| (*index).min(len - 1));
        let len = len as isize;
        let target = (current as isize + delta).rem_euclid(len) as usize;
        self.focus(visible, target)
    }

    fn focus(&mut self, visible: &VisibleSet, index: usize) -> SelectionChange {
        let Some(feature) = visible.get(index) else {
            return SelectionChange::Unchanged;
        };
        let id = feature.id().clone();
        let (lon, lat) = feature.position();
        self.state = PanelState::Open {
            id: id.clone(),
            index,
        };
        SelectionChange::Focus { id, lon, lat }
    }
}

/// Last hovered and last selected ids as painted on the surface.
///
/// Each is cleared on the surface before it is reassigned, so a stale id
/// never keeps its highlight.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    hovered: Option<EntryId>,
    selected: Option<EntryId>,
}

impl HighlightTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&EntryId> {
        self.hovered.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&EntryId> {
        self.selected.as_ref()
    }

    /// Returns true when the hovered id changed.
    pub fn hover(&mut self, id: &EntryId, surface: &mut dyn MapSurface) -> Result<bool, SurfaceError> {
        if self.hovered.as_ref() == Some(id) {
            return Ok(false);
        }
        self.unhover(surface)?;
        surface.set_feature_state(SourceId::Points, id, FeatureState::Hover(true))?;
        self.hovered = Some(id.clone());
        Ok(true)
    }

    pub fn unhover(&mut self, surface: &mut dyn MapSurface) -> Result<(), SurfaceError> {
        if let Some(prev) = self.hovered.take() {
            surface.set_feature_state(SourceId::Points, &prev, FeatureState::Hover(false))?;
        }
        Ok(())
    }

    /// Move the active highlight to `id` (or nowhere).
    pub fn select(
        &mut self,
        id: Option<&EntryId>,
        surface: &mut dyn MapSurface,
    ) -> Result<(), SurfaceError> {
        if self.selected.as_ref() == id {
            return Ok(());
        }
        if let Some(prev) = self.selected.take() {
            surface.set_feature_state(SourceId::Points, &prev, FeatureState::Active(false))?;
        }
        if let Some(id) = id {
            surface.set_feature_state(SourceId::Points, id, FeatureState::Active(true))?;
            self.selected = Some(id.clone());
        }
        Ok(())
    }

    /// Drop highlights on ids that are no longer visible. Their flags are
    /// cleared here since a reverted change keeps the feature in the source.
    pub fn retain_visible(
        &mut self,
        visible: &VisibleSet,
        surface: &mut dyn MapSurface,
    ) -> Result<(), SurfaceError> {
        let mut result = Ok(());
        if let Some(id) = self.hovered.take_if(|id| !visible.contains(id)) {
            let cleared = surface.set_feature_state(SourceId::Points, &id, FeatureState::Hover(false));
            result = result.and(cleared);
        }
        if let Some(id) = self.selected.take_if(|id| !visible.contains(id)) {
            let cleared = surface.set_feature_state(SourceId::Points, &id, FeatureState::Active(false));
            result = result.and(cleared);
        }
        result
    }

    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryType, ResumeEntry};
    use crate::jitter::PositionedFeature;
    use crate::surface::MemorySurface;
    use crate::timeline::derive_visible_set;
    use std::collections::BTreeSet;

    fn features(n: i64) -> Vec<PositionedFeature> {
        (1..=n)
            .map(|i| {
                let year = format!("{}-01", 2000 + i);
                #[allow(clippy::cast_precision_loss, reason = "test longitudes are small")]
                let entry = ResumeEntry::new(i, EntryType::Work, i as f64, 0.0).with_start_date(year);
                PositionedFeature::new(entry, 0.0)
            })
            .collect()
    }

    fn visible(n: i64, cutoff: i32) -> VisibleSet {
        let active: BTreeSet<EntryType> = EntryType::ALL.into_iter().collect();
        derive_visible_set(&features(n), &active, cutoff)
    }

    #[test]
    fn test_click_toggles_closed() {
        let set = visible(3, 2100);
        let mut selection = SelectionController::new();
        let id = EntryId::from(1);

        let change = selection.click_feature(&set, &id);
        assert!(matches!(change, SelectionChange::Focus { ref id, .. } if *id == EntryId::from(1)));
        // descending by year: id 1 (2001) is last
        assert_eq!(selection.state(), &PanelState::Open { id: id.clone(), index: 2 });

        assert_eq!(selection.click_feature(&set, &id), SelectionChange::Closed);
        assert_eq!(selection.state(), &PanelState::Closed);
    }

    #[test]
    fn test_click_other_feature_switches() {
        let set = visible(3, 2100);
        let mut selection = SelectionController::new();
        selection.click_feature(&set, &EntryId::from(1));
        selection.click_feature(&set, &EntryId::from(3));
        assert_eq!(selection.selected_id(), Some(&EntryId::from(3)));
        assert_eq!(selection.selected_index(), Some(0));
    }

    #[test]
    fn test_wraparound() {
        let set = visible(4, 2100);
        let mut selection = SelectionController::new();
        selection.open_entry(&set, &EntryId::from(4));
        assert_eq!(selection.selected_index(), Some(0));

        selection.previous(&set);
        assert_eq!(selection.selected_index(), Some(3));
        selection.next(&set);
        assert_eq!(selection.selected_index(), Some(0));
        assert_eq!(selection.position_label(&set).as_deref(), Some("1 / 4"));
    }

    #[test]
    fn test_open_entry_not_visible_is_ignored() {
        let set = visible(3, 2002);
        let mut selection = SelectionController::new();
        assert_eq!(
            selection.open_entry(&set, &EntryId::from(3)),
            SelectionChange::Unchanged
        );
        assert!(!selection.is_open());
    }

    #[test]
    fn test_reconcile_follows_or_closes() {
        let mut selection = SelectionController::new();
        let all = visible(5, 2100);
        selection.open_entry(&all, &EntryId::from(2));
        assert_eq!(selection.selected_index(), Some(3));

        let fewer = visible(5, 2003);
        assert_eq!(selection.reconcile(&fewer), SelectionChange::Unchanged);
        assert_eq!(selection.selected_index(), Some(1));

        let tiny = visible(5, 2001);
        assert_eq!(selection.reconcile(&tiny), SelectionChange::Closed);
        assert_eq!(selection.selected_index(), None);
    }

    #[test]
    fn test_navigation_uses_current_set() {
        let mut selection = SelectionController::new();
        let all = visible(5, 2100);
        selection.open_entry(&all, &EntryId::from(1));
        assert_eq!(selection.selected_index(), Some(4));

        // set shrank without a reconcile; stepping must stay in bounds
        let fewer = visible(3, 2100);
        selection.next(&fewer);
        let index = selection.selected_index().unwrap();
        assert!(index < fewer.len());
    }

    #[test]
    fn test_highlight_tracker_clears_previous() {
        let mut surface = MemorySurface::new();
        let mut tracker = HighlightTracker::new();
        let a = EntryId::from(1);
        let b = EntryId::from(2);

        assert!(tracker.hover(&a, &mut surface).unwrap());
        assert!(!tracker.hover(&a, &mut surface).unwrap());
        assert!(tracker.hover(&b, &mut surface).unwrap());
        assert!(!surface.flags(SourceId::Points, &a).hover);
        assert!(surface.flags(SourceId::Points, &b).hover);

        tracker.select(Some(&a), &mut surface).unwrap();
        tracker.select(Some(&b), &mut surface).unwrap();
        assert!(!surface.flags(SourceId::Points, &a).active);
        assert!(surface.flags(SourceId::Points, &b).active);

        tracker.select(None, &mut surface).unwrap();
        tracker.unhover(&mut surface).unwrap();
        assert!(surface.stateful_ids(SourceId::Points).is_empty());
    }

    #[test]
    fn test_retain_visible_clears_stale_flags() {
        let mut surface = MemorySurface::new();
        let mut tracker = HighlightTracker::new();
        let kept = EntryId::from(1);
        let gone = EntryId::from(3);
        tracker.hover(&gone, &mut surface).unwrap();
        tracker.select(Some(&gone), &mut surface).unwrap();

        tracker.retain_visible(&visible(3, 2100), &mut surface).unwrap();
        assert_eq!(tracker.hovered(), Some(&gone));

        tracker.retain_visible(&visible(3, 2002), &mut surface).unwrap();
        assert_eq!(tracker.hovered(), None);
        assert_eq!(tracker.selected(), None);
        assert!(surface.stateful_ids(SourceId::Points).is_empty());

        tracker.hover(&kept, &mut surface).unwrap();
        tracker.retain_visible(&visible(3, 2100), &mut surface).unwrap();
        assert_eq!(tracker.hovered(), Some(&kept));
    }
}
