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

//! Core of the résumé atlas: a résumé shown as points on a map.
//!
//! The crate is free of any GUI dependency. It is organised in layers that
//! can be used on their own or through [`ResumeAtlas`]:
//!
//! - **Data**: [`entry`] (data model), [`loader`] (lenient JSON loading and
//!   validation) and [`jitter`] (deterministic position perturbation)
//! - **Filtering**: [`timeline`] (type filters, year cutoff, debounced year
//!   scrubbing and the ordered visible set)
//! - **Presentation state**: [`animator`] (fade transitions between visible
//!   sets), [`selection`] (detail panel navigation and highlights),
//!   [`case_study`] (connector overlay), [`theme`] and [`gesture`]
//! - **Engine seam**: [`surface`] (the four map primitives the atlas needs)
//!   and [`events`] (declarative pointer bindings per layer)
//!
//! # Quick Start
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use atlas_core::{
//!     load_str, AtlasConfig, EntryType, MemorySurface, ResumeAtlas, SourceId, Theme,
//!     ThemeContext,
//! };
//!
//! let json = r#"[
//!     {"id": 1, "type": "work", "lon": -122.4, "lat": 37.7, "title": "Engineer", "startDate": "2020-01"},
//!     {"id": 2, "type": "education", "lon": -71.1, "lat": 42.3, "title": "Degree", "startDate": "2018-01"}
//! ]"#;
//! let (entries, report) = load_str(json).unwrap();
//! assert_eq!(report.accepted, 2);
//!
//! let theme = ThemeContext::new(Theme::Dark);
//! let mut atlas = ResumeAtlas::new(entries, theme.subscribe(), AtlasConfig::default());
//! let mut surface = MemorySurface::new();
//!
//! let now = Instant::now();
//! atlas.attach(&mut surface, now);
//! atlas.toggle_filter(EntryType::Education, &mut surface, now);
//!
//! // Drive the frame loop until the fade-out, swap and fade-in are done
//! let mut t = now;
//! while atlas.tick(&mut surface, t).repaint {
//!     t += Duration::from_millis(16);
//! }
//! assert_eq!(surface.features(SourceId::Points).len(), 1);
//! ```

pub mod animator;
pub mod atlas;
pub mod case_study;
pub mod entry;
pub mod events;
pub mod gesture;
pub mod jitter;
pub mod loader;
pub mod schedule;
pub mod selection;
pub mod surface;
pub mod theme;
pub mod timeline;

pub use animator::{AnimatorConfig, AnimatorStatus, TransitionAnimator, TransitionDelta};
pub use atlas::{AtlasConfig, HoverCard, ResumeAtlas, TickOutcome};
pub use case_study::{CaseStudyOverlay, Connector};
pub use entry::{CaseStudyLocation, EntryId, EntryType, Project, ResumeEntry, Thesis};
pub use events::{EventRegistry, LayerAction, LayerId, PointerEvent, PointerKind};
pub use gesture::{classify_swipe, PanelResize, Swipe, SwipeTracker};
pub use jitter::{jitter, project, PositionedFeature};
pub use loader::{load_file, load_str, LoadError, LoadReport};
pub use schedule::{Backoff, Deadline, Debouncer, Throttle};
pub use selection::{HighlightTracker, PanelState, SelectionChange, SelectionController};
pub use surface::{
    fade_opacity, CameraTarget, Fade, FeatureFlags, FeatureState, MapSurface, MemorySurface,
    SourceId, SurfaceError,
};
pub use theme::{Theme, ThemeContext, TypePalette};
pub use timeline::{derive_visible_set, FilterState, VisibleSet, YearDomain, YearScrubber};
