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

//! Type filters, year cutoff and the visible set.
//!
//! [`FilterState`] holds the active entry types and the year cutoff;
//! [`derive_visible_set`] turns it into the ordered [`VisibleSet`] the map
//! shows. [`YearScrubber`] decouples the year shown on the slider from the
//! year that actually drives filtering, so a fast drag gives instant
//! feedback while the animated recomputation happens once.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::Datelike;

use crate::entry::{EntryId, EntryType};
use crate::jitter::PositionedFeature;
use crate::schedule::{Debouncer, Throttle};

/// Fallback first year when no entry carries a parseable date.
pub const FALLBACK_MIN_YEAR: i32 = 2010;

/// Default quiet period before a slider value is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default minimum interval between drag-follow updates (~120 Hz).
pub const DEFAULT_DRAG_THROTTLE: Duration = Duration::from_millis(8);

/// Inclusive range of years the slider covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearDomain {
    pub min: i32,
    pub max: i32,
}

impl YearDomain {
    /// Earliest and latest effective years of the collection, with the upper
    /// bound raised to `current_year` so the slider always reaches today.
    #[must_use]
    pub fn from_features(features: &[PositionedFeature], current_year: i32) -> Self {
        let years = features.iter().filter_map(PositionedFeature::effective_year);
        let (min, max) = years.fold((None, None), |(lo, hi): (Option<i32>, Option<i32>), y| {
            (
                Some(lo.map_or(y, |lo| lo.min(y))),
                Some(hi.map_or(y, |hi| hi.max(y))),
            )
        });
        match (min, max) {
            (Some(min), Some(max)) => Self {
                min: min.min(current_year),
                max: max.max(current_year),
            },
            _ => Self {
                min: FALLBACK_MIN_YEAR.min(current_year),
                max: current_year,
            },
        }
    }

    /// Same as [`YearDomain::from_features`] using the local calendar year.
    #[must_use]
    pub fn from_features_now(features: &[PositionedFeature]) -> Self {
        Self::from_features(features, chrono::Local::now().year())
    }

    #[must_use]
    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// Active type filters and the year cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    active: BTreeSet<EntryType>,
    cutoff: i32,
    domain: YearDomain,
}

impl FilterState {
    /// All types active, cutoff at the end of the domain.
    #[must_use]
    pub fn new(domain: YearDomain) -> Self {
        Self {
            active: EntryType::ALL.into_iter().collect(),
            cutoff: domain.max,
            domain,
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: impl IntoIterator<Item = EntryType>) -> Self {
        self.active = active.into_iter().collect();
        self
    }

    /// Flip membership of `entry_type`. Returns the new membership.
    pub fn toggle_filter(&mut self, entry_type: EntryType) -> bool {
        if self.active.remove(&entry_type) {
            false
        } else {
            self.active.insert(entry_type);
            true
        }
    }

    /// Set the cutoff, clamped into the domain. Returns true on change.
    pub fn set_year_cutoff(&mut self, year: i32) -> bool {
        let year = self.domain.clamp(year);
        let changed = year != self.cutoff;
        self.cutoff = year;
        changed
    }

    #[must_use]
    pub fn is_active(&self, entry_type: EntryType) -> bool {
        self.active.contains(&entry_type)
    }

    #[must_use]
    pub fn active_types(&self) -> &BTreeSet<EntryType> {
        &self.active
    }

    #[must_use]
    pub fn cutoff(&self) -> i32 {
        self.cutoff
    }

    #[must_use]
    pub fn domain(&self) -> YearDomain {
        self.domain
    }

    /// Visible set for the current filters.
    #[must_use]
    pub fn derive(&self, features: &[PositionedFeature]) -> VisibleSet {
        derive_visible_set(features, &self.active, self.cutoff)
    }
}

/// Ordered subset of features eligible for display, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    features: Vec<PositionedFeature>,
}

impl VisibleSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PositionedFeature> {
        self.features.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: &EntryId) -> Option<usize> {
        self.features.iter().position(|f| f.id() == id)
    }

    #[must_use]
    pub fn find(&self, id: &EntryId) -> Option<&PositionedFeature> {
        self.features.iter().find(|f| f.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionedFeature> {
        self.features.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.features.iter().map(|f| f.id().clone()).collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PositionedFeature] {
        &self.features
    }
}

/// Features whose type is active and whose effective year is at or before
/// `cutoff`, sorted by effective year descending. Entries without a
/// parseable year never match. Ties keep collection order.
#[must_use]
pub fn derive_visible_set(
    features: &[PositionedFeature],
    active: &BTreeSet<EntryType>,
    cutoff: i32,
) -> VisibleSet {
    let mut matching: Vec<(i32, &PositionedFeature)> = features
        .iter()
        .filter(|f| active.contains(&f.entry_type()))
        .filter_map(|f| f.effective_year().map(|year| (year, f)))
        .filter(|(year, _)| *year <= cutoff)
        .collect();
    matching.sort_by(|a, b| b.0.cmp(&a.0));

    VisibleSet {
        features: matching.into_iter().map(|(_, f)| f.clone()).collect(),
    }
}

/// Slider state with an instantly updated display year and a debounced
/// effective year.
#[derive(Debug, Clone)]
pub struct YearScrubber {
    display_year: i32,
    committed_year: i32,
    dragging: bool,
    latest: Option<i32>,
    debounce: Debouncer<i32>,
    throttle: Throttle,
}

impl YearScrubber {
    #[must_use]
    pub fn new(year: i32, debounce: Duration, drag_throttle: Duration) -> Self {
        Self {
            display_year: year,
            committed_year: year,
            dragging: false,
            latest: None,
            debounce: Debouncer::new(debounce),
            throttle: Throttle::new(drag_throttle),
        }
    }

    /// Year to show next to the slider.
    #[must_use]
    pub fn display_year(&self) -> i32 {
        self.display_year
    }

    /// Year currently driving the visible set.
    #[must_use]
    pub fn committed_year(&self) -> i32 {
        self.committed_year
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.debounce.is_pending() || self.latest.is_some()
    }

    /// A new slider value. Outside a drag the display follows immediately and
    /// the commit is debounced; during a drag display updates are throttled
    /// and the commit waits for release. Returns true when the display year
    /// changed.
    pub fn input(&mut self, year: i32, now: Instant) -> bool {
        let before = self.display_year;
        if self.dragging {
            self.latest = Some(year);
            if self.throttle.try_acquire(now) {
                self.display_year = year;
            }
        } else {
            self.display_year = year;
            self.debounce.call(year, now);
        }
        before != self.display_year
    }

    /// Pointer down on the slider: suspend commits until release. A value
    /// still waiting on the debounce is carried into the drag.
    pub fn drag_start(&mut self) {
        self.dragging = true;
        if let Some(pending) = self.debounce.flush() {
            self.latest = Some(pending);
        }
        self.throttle.reset();
    }

    /// Pointer released: commit the last value immediately.
    pub fn drag_end(&mut self) -> Option<i32> {
        self.dragging = false;
        let value = self.latest.take().or_else(|| self.debounce.flush())?;
        self.display_year = value;
        self.commit(value)
    }

    /// Commit a debounced value once its quiet period elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<i32> {
        if self.dragging {
            return None;
        }
        let value = self.debounce.poll(now)?;
        self.commit(value)
    }

    /// Commit `year` right away, dropping anything pending.
    pub fn commit_now(&mut self, year: i32) -> Option<i32> {
        self.debounce.cancel();
        self.latest = None;
        self.display_year = year;
        self.commit(year)
    }

    /// Drop pending work (teardown).
    pub fn cancel(&mut self) {
        self.debounce.cancel();
        self.latest = None;
        self.dragging = false;
        self.display_year = self.committed_year;
    }

    fn commit(&mut self, year: i32) -> Option<i32> {
        if year == self.committed_year {
            return None;
        }
        self.committed_year = year;
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ResumeEntry;

    fn feature(id: i64, ty: EntryType, start: &str) -> PositionedFeature {
        PositionedFeature::new(ResumeEntry::new(id, ty, 0.0, 0.0).with_start_date(start), 0.0)
    }

    fn sample() -> Vec<PositionedFeature> {
        vec![
            feature(1, EntryType::Work, "2020-01"),
            feature(2, EntryType::Education, "2018-01"),
        ]
    }

    fn all_types() -> BTreeSet<EntryType> {
        EntryType::ALL.into_iter().collect()
    }

    #[test]
    fn test_visible_set_order_most_recent_first() {
        let visible = derive_visible_set(&sample(), &all_types(), 2021);
        assert_eq!(visible.ids(), vec![EntryId::from(1), EntryId::from(2)]);
    }

    #[test]
    fn test_visible_set_cutoff() {
        let visible = derive_visible_set(&sample(), &all_types(), 2019);
        assert_eq!(visible.ids(), vec![EntryId::from(2)]);

        let inclusive = derive_visible_set(&sample(), &all_types(), 2020);
        assert_eq!(inclusive.len(), 2);
    }

    #[test]
    fn test_visible_set_type_filter() {
        let active: BTreeSet<_> = [EntryType::Work].into_iter().collect();
        let visible = derive_visible_set(&sample(), &active, 2021);
        assert_eq!(visible.ids(), vec![EntryId::from(1)]);

        let none = derive_visible_set(&sample(), &BTreeSet::new(), 2021);
        assert!(none.is_empty());
    }

    #[test]
    fn test_visible_set_excludes_unparseable_dates() {
        let mut features = sample();
        features.push(feature(3, EntryType::Work, "sometime"));
        features.push(PositionedFeature::new(
            ResumeEntry::new(4, EntryType::Work, 0.0, 0.0),
            0.0,
        ));
        let visible = derive_visible_set(&features, &all_types(), 3000);
        assert_eq!(visible.len(), 2);
        assert!(!visible.contains(&EntryId::from(3)));
        assert!(!visible.contains(&EntryId::from(4)));
    }

    #[test]
    fn test_visible_set_matches_predicate_for_all_cutoffs() {
        let features = vec![
            feature(1, EntryType::Work, "2015"),
            feature(2, EntryType::Education, "2012-09"),
            feature(3, EntryType::Publication, "2019-03"),
            feature(4, EntryType::Conference, "2019-11"),
            feature(5, EntryType::Project, "2022"),
        ];
        let filter_sets: Vec<BTreeSet<EntryType>> = vec![
            all_types(),
            [EntryType::Work, EntryType::Publication].into_iter().collect(),
            [EntryType::Conference].into_iter().collect(),
        ];
        for active in &filter_sets {
            for cutoff in 2010..=2024 {
                let visible = derive_visible_set(&features, active, cutoff);
                let expected: BTreeSet<EntryId> = features
                    .iter()
                    .filter(|f| active.contains(&f.entry_type()))
                    .filter(|f| f.effective_year().is_some_and(|y| y <= cutoff))
                    .map(|f| f.id().clone())
                    .collect();
                let actual: BTreeSet<EntryId> = visible.ids().into_iter().collect();
                assert_eq!(actual, expected, "cutoff {cutoff}");

                let years: Vec<i32> = visible.iter().filter_map(PositionedFeature::effective_year).collect();
                assert!(years.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_year_domain() {
        let domain = YearDomain::from_features(&sample(), 2026);
        assert_eq!(domain, YearDomain { min: 2018, max: 2026 });

        let empty = YearDomain::from_features(&[], 2026);
        assert_eq!(empty, YearDomain { min: FALLBACK_MIN_YEAR, max: 2026 });
    }

    #[test]
    fn test_filter_state_toggle_and_cutoff() {
        let mut filters = FilterState::new(YearDomain { min: 2018, max: 2026 });
        assert_eq!(filters.cutoff(), 2026);
        assert!(!filters.toggle_filter(EntryType::Education));
        assert!(!filters.is_active(EntryType::Education));
        assert!(filters.toggle_filter(EntryType::Education));
        assert!(filters.is_active(EntryType::Education));

        assert!(filters.set_year_cutoff(2019));
        assert!(!filters.set_year_cutoff(2019));
        filters.set_year_cutoff(1990);
        assert_eq!(filters.cutoff(), 2018);
    }

    #[test]
    fn test_scrubber_debounces_commit() {
        let t0 = Instant::now();
        let mut scrubber = YearScrubber::new(2021, DEFAULT_DEBOUNCE, DEFAULT_DRAG_THROTTLE);

        scrubber.input(2020, t0);
        assert_eq!(scrubber.display_year(), 2020);
        scrubber.input(2019, t0 + Duration::from_millis(100));
        assert_eq!(scrubber.display_year(), 2019);
        assert_eq!(scrubber.committed_year(), 2021);

        assert_eq!(scrubber.poll(t0 + Duration::from_millis(350)), None);
        assert_eq!(scrubber.poll(t0 + Duration::from_millis(400)), Some(2019));
        assert_eq!(scrubber.committed_year(), 2019);
        assert_eq!(scrubber.poll(t0 + Duration::from_millis(800)), None);
    }

    #[test]
    fn test_scrubber_drag_suspends_until_release() {
        let t0 = Instant::now();
        let mut scrubber = YearScrubber::new(2024, DEFAULT_DEBOUNCE, DEFAULT_DRAG_THROTTLE);

        scrubber.input(2023, t0);
        scrubber.drag_start();
        assert_eq!(scrubber.poll(t0 + Duration::from_secs(1)), None);

        scrubber.input(2022, t0 + Duration::from_millis(10));
        scrubber.input(2021, t0 + Duration::from_millis(12));
        assert_eq!(scrubber.display_year(), 2022);
        assert_eq!(scrubber.poll(t0 + Duration::from_secs(5)), None);

        assert_eq!(scrubber.drag_end(), Some(2021));
        assert_eq!(scrubber.display_year(), 2021);
        assert_eq!(scrubber.committed_year(), 2021);
    }

    #[test]
    fn test_scrubber_drag_keeps_debounced_value() {
        let t0 = Instant::now();
        let mut scrubber = YearScrubber::new(2024, DEFAULT_DEBOUNCE, DEFAULT_DRAG_THROTTLE);

        // click on the track, then grab the handle without moving it
        scrubber.input(2019, t0);
        scrubber.drag_start();
        assert!(scrubber.has_pending());

        assert_eq!(scrubber.drag_end(), Some(2019));
        assert_eq!(scrubber.display_year(), 2019);
        assert_eq!(scrubber.committed_year(), 2019);
        assert!(!scrubber.has_pending());
    }

    #[test]
    fn test_scrubber_same_year_is_not_a_change() {
        let t0 = Instant::now();
        let mut scrubber = YearScrubber::new(2020, DEFAULT_DEBOUNCE, DEFAULT_DRAG_THROTTLE);
        scrubber.input(2019, t0);
        scrubber.input(2020, t0 + Duration::from_millis(50));
        assert_eq!(scrubber.poll(t0 + Duration::from_secs(1)), None);
        assert_eq!(scrubber.drag_end(), None);
    }
}
