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

//! End-to-end behaviour of the atlas against the headless surface.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use atlas_core::jitter::jitter;
use atlas_core::{
    derive_visible_set, project, AtlasConfig, EntryId, EntryType, LayerId, MapSurface,
    MemorySurface, PointerEvent, PointerKind, ResumeAtlas, ResumeEntry, SourceId, Theme,
    ThemeContext, TransitionDelta, YearDomain,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn two_entries() -> Vec<ResumeEntry> {
    vec![
        ResumeEntry::new(1, EntryType::Work, -122.4, 37.7).with_start_date("2020-01"),
        ResumeEntry::new(2, EntryType::Education, -71.1, 42.3).with_start_date("2018-01"),
    ]
}

fn atlas_for(entries: Vec<ResumeEntry>, context: &ThemeContext) -> ResumeAtlas {
    let features = project(entries, 0.05);
    let domain = YearDomain::from_features(&features, 2024);
    ResumeAtlas::with_features(features, domain, context.subscribe(), AtlasConfig::default())
}

fn attached(entries: Vec<ResumeEntry>, context: &ThemeContext) -> (ResumeAtlas, MemorySurface, Instant) {
    let mut atlas = atlas_for(entries, context);
    let mut surface = MemorySurface::new();
    let now = Instant::now();
    assert!(atlas.attach(&mut surface, now));
    (atlas, surface, now)
}

/// Tick at frame rate until nothing is pending.
fn run_frames(atlas: &mut ResumeAtlas, surface: &mut MemorySurface, from: Instant) -> Instant {
    let mut now = from;
    for _ in 0..500 {
        now += ms(16);
        if !atlas.tick(surface, now).repaint {
            break;
        }
    }
    now
}

#[test]
fn test_basic_filter_round_trip() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    atlas.set_year_now(2021, &mut surface, t0);
    let t1 = run_frames(&mut atlas, &mut surface, t0);

    assert_eq!(atlas.visible().ids(), vec![EntryId::from(1), EntryId::from(2)]);

    let before = atlas.visible().clone();
    atlas.toggle_filter(EntryType::Education, &mut surface, t1);
    assert_eq!(atlas.visible().ids(), vec![EntryId::from(1)]);

    let delta = TransitionDelta::between(before.as_slice(), atlas.visible().as_slice());
    assert_eq!(delta.leaving, vec![EntryId::from(2)]);
    assert!(delta.entering.is_empty());

    run_frames(&mut atlas, &mut surface, t1);
    assert_eq!(surface.feature_ids(SourceId::Points), vec![EntryId::from(1)]);
    assert!(surface.stateful_ids(SourceId::Points).is_empty());
    assert!(surface.features(SourceId::Transition).is_empty());
}

#[test]
fn test_cutoff_exclusion() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    atlas.set_year_now(2019, &mut surface, t0);
    assert_eq!(atlas.visible().ids(), vec![EntryId::from(2)]);
    run_frames(&mut atlas, &mut surface, t0);
    assert_eq!(surface.feature_ids(SourceId::Points), vec![EntryId::from(2)]);
}

#[test]
fn test_debounced_commit_recomputes_once() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    atlas.set_year_now(2021, &mut surface, t0);
    let t1 = run_frames(&mut atlas, &mut surface, t0);
    let before = atlas.recomputations();

    atlas.scrub_year(2020, t1 + ms(50));
    atlas.tick(&mut surface, t1 + ms(60));
    atlas.scrub_year(2019, t1 + ms(120));
    atlas.tick(&mut surface, t1 + ms(200));
    assert_eq!(atlas.display_year(), 2019);
    assert_eq!(atlas.recomputations(), before);

    run_frames(&mut atlas, &mut surface, t1 + ms(200));
    assert_eq!(atlas.recomputations(), before + 1);
    assert_eq!(atlas.filters().cutoff(), 2019);
    assert_eq!(atlas.visible().ids(), vec![EntryId::from(2)]);
}

#[test]
fn test_drag_suspends_recomputation_until_release() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    let before = atlas.recomputations();

    atlas.begin_year_drag();
    for (i, year) in [2023, 2022, 2021, 2020, 2019].into_iter().enumerate() {
        let at = t0 + ms(20 * (i as u64 + 1));
        atlas.scrub_year(year, at);
        atlas.tick(&mut surface, at + ms(500));
    }
    assert_eq!(atlas.recomputations(), before);
    assert!(!atlas.is_transitioning());

    atlas.end_year_drag(&mut surface, t0 + ms(200));
    assert_eq!(atlas.recomputations(), before + 1);
    assert_eq!(atlas.filters().cutoff(), 2019);
    assert!(atlas.is_transitioning());
}

#[test]
fn test_same_feature_click_toggles_closed() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, _) = attached(two_entries(), &context);
    let click = PointerEvent::on_feature(
        LayerId::Nodes(EntryType::Work),
        PointerKind::Click,
        EntryId::from(1),
        -122.4,
        37.7,
    );

    assert!(!atlas.selection().is_open());
    atlas.handle_pointer(&click, &mut surface);
    assert_eq!(atlas.selection().selected_id(), Some(&EntryId::from(1)));
    assert_eq!(atlas.selection().selected_index(), Some(0));
    atlas.handle_pointer(&click, &mut surface);
    assert!(!atlas.selection().is_open());
}

#[test]
fn test_navigation_wraps_both_ways() {
    let context = ThemeContext::new(Theme::Dark);
    let entries: Vec<ResumeEntry> = (0_i64..5)
        .map(|i| {
            ResumeEntry::new(i, EntryType::Publication, 0.0, 0.0).with_date(format!("{}", 2015 + i))
        })
        .collect();
    let (mut atlas, mut surface, _) = attached(entries, &context);
    let n = atlas.visible().len();
    let first = atlas.visible().get(0).unwrap().id().clone();

    atlas.open_entry(&first, &mut surface);
    atlas.previous(&mut surface);
    assert_eq!(atlas.selection().selected_index(), Some(n - 1));
    atlas.next(&mut surface);
    assert_eq!(atlas.selection().selected_index(), Some(0));
    assert_eq!(atlas.position_label().as_deref(), Some("1 / 5"));
}

#[test]
fn test_selection_never_out_of_bounds_after_shrink() {
    let context = ThemeContext::new(Theme::Dark);
    let entries: Vec<ResumeEntry> = (0_i64..5)
        .map(|i| ResumeEntry::new(i, EntryType::Project, 0.0, 0.0).with_start_date(format!("{}-06", 2015 + i)))
        .collect();
    let (mut atlas, mut surface, t0) = attached(entries, &context);
    let last = atlas.visible().get(4).unwrap().id().clone();
    atlas.open_entry(&last, &mut surface);

    for year in [2019, 2018, 2017, 2016] {
        atlas.set_year_now(year, &mut surface, t0);
        if let Some(index) = atlas.selection().selected_index() {
            assert!(index < atlas.visible().len());
        }
    }
    atlas.set_year_now(2010, &mut surface, t0);
    assert_eq!(atlas.filters().cutoff(), 2015);
    assert_eq!(atlas.selection().selected_index(), Some(0));

    atlas.toggle_filter(EntryType::Project, &mut surface, t0);
    assert!(atlas.visible().is_empty());
    assert!(!atlas.selection().is_open());
    assert!(!atlas.next(&mut surface));
}

#[test]
fn test_reapplying_same_state_is_idempotent() {
    let features = project(two_entries(), 0.05);
    let active: BTreeSet<EntryType> = [EntryType::Work].into_iter().collect();
    let first = derive_visible_set(&features, &active, 2021);
    let second = derive_visible_set(&features, &active, 2021);
    assert!(TransitionDelta::between(first.as_slice(), second.as_slice()).is_empty());

    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    atlas.toggle_filter(EntryType::Work, &mut surface, t0);
    let t1 = run_frames(&mut atlas, &mut surface, t0);
    let replacements = surface.replacements(SourceId::Points);
    atlas.set_year_now(atlas.filters().cutoff(), &mut surface, t1);
    assert!(!atlas.is_transitioning());
    assert_eq!(surface.replacements(SourceId::Points), replacements);
}

#[test]
fn test_rapid_toggles_end_in_consistent_state() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    let mut now = t0;
    for _ in 0..3 {
        atlas.toggle_filter(EntryType::Education, &mut surface, now);
        now += ms(30);
        atlas.tick(&mut surface, now);
        atlas.toggle_filter(EntryType::Work, &mut surface, now);
        now += ms(120);
        atlas.tick(&mut surface, now);
    }
    run_frames(&mut atlas, &mut surface, now);

    let mut expected = atlas.visible().ids();
    expected.sort();
    let mut shown = surface.feature_ids(SourceId::Points);
    shown.sort();
    assert_eq!(shown, expected);
    assert!(surface.stateful_ids(SourceId::Points).is_empty());
    assert!(surface.features(SourceId::Transition).is_empty());
}

#[test]
fn test_torn_down_surface_degrades_silently() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    atlas.toggle_filter(EntryType::Work, &mut surface, t0);
    surface.tear_down();
    assert!(!surface.is_ready());

    run_frames(&mut atlas, &mut surface, t0);
    assert!(!atlas.is_transitioning());
    assert_eq!(atlas.visible().ids(), vec![EntryId::from(2)]);
}

#[test]
fn test_jitter_is_deterministic_and_distinct() {
    let a = EntryId::from(1);
    let b = EntryId::text("phd");
    assert_eq!(jitter(&a, 10.0, 20.0, 0.05), jitter(&a, 10.0, 20.0, 0.05));
    assert_ne!(jitter(&a, 10.0, 20.0, 0.05), jitter(&b, 10.0, 20.0, 0.05));

    let (lon, lat) = jitter(&b, 10.0, 20.0, 0.05);
    assert!((lon - 10.0).abs() <= 0.025 && (lat - 20.0).abs() <= 0.025);
}

#[test]
fn test_reverted_toggle_leaves_no_active_flag() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    let id = EntryId::from(2);
    atlas.open_entry(&id, &mut surface);
    assert!(surface.flags(SourceId::Points, &id).active);

    atlas.toggle_filter(EntryType::Education, &mut surface, t0);
    atlas.tick(&mut surface, t0 + ms(50));
    atlas.toggle_filter(EntryType::Education, &mut surface, t0 + ms(100));
    run_frames(&mut atlas, &mut surface, t0 + ms(100));

    assert!(!atlas.selection().is_open());
    assert!(surface.feature_ids(SourceId::Points).contains(&id));
    assert!(!surface.flags(SourceId::Points, &id).active);
}

#[test]
fn test_reverted_toggle_leaves_no_hover_flag() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);
    let id = EntryId::from(2);
    let layer = LayerId::Nodes(EntryType::Education);
    atlas.handle_pointer(
        &PointerEvent::on_feature(layer, PointerKind::Enter, id.clone(), -71.1, 42.3),
        &mut surface,
    );
    assert!(surface.flags(SourceId::Points, &id).hover);

    atlas.toggle_filter(EntryType::Education, &mut surface, t0);
    atlas.tick(&mut surface, t0 + ms(50));
    atlas.toggle_filter(EntryType::Education, &mut surface, t0 + ms(100));
    let t1 = run_frames(&mut atlas, &mut surface, t0 + ms(100));
    atlas.handle_pointer(
        &PointerEvent::on_feature(layer, PointerKind::Leave, id.clone(), -71.1, 42.3),
        &mut surface,
    );
    atlas.tick(&mut surface, t1 + ms(16));

    assert!(!surface.flags(SourceId::Points, &id).hover);
    assert!(atlas.hover_card().is_none());
}

#[test]
fn test_drag_right_after_click_commits_clicked_year() {
    let context = ThemeContext::new(Theme::Dark);
    let (mut atlas, mut surface, t0) = attached(two_entries(), &context);

    atlas.scrub_year(2019, t0);
    atlas.begin_year_drag();
    atlas.end_year_drag(&mut surface, t0 + ms(100));
    run_frames(&mut atlas, &mut surface, t0 + ms(100));

    assert_eq!(atlas.display_year(), 2019);
    assert_eq!(atlas.filters().cutoff(), 2019);
    assert_eq!(atlas.visible().ids(), vec![EntryId::from(2)]);
}
