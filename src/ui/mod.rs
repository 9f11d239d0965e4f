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

//! UI components for Résumé Atlas.
//!
//! Components draw themselves and report what the user asked for as
//! [`UiAction`]s; the app applies them to the atlas after the frame's
//! layout pass.

pub mod controls;
pub mod detail_panel;
pub mod header;

pub use controls::Controls;
pub use detail_panel::DetailPanel;
pub use header::Header;

use atlas_core::EntryType;

/// User intent collected while drawing one frame
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    ToggleFilter(EntryType),
    ScrubYear(i32),
    YearDragStarted,
    YearDragStopped,
    Next,
    Previous,
    ClosePanel,
    HoverProject(usize),
    LeaveProject,
    HoverDescription,
    ToggleTheme,
    OpenLatest,
    ToggleControls,
    OpenUrl(String),
}
