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

//! Map rendering.
//!
//! Basemap tile sources, the walkers-backed map surface, the point layer
//! plugin and its paint rules.

pub mod plugin;
pub mod style;
pub mod surface;
pub mod tiles;

pub use plugin::{AtlasLayer, HitReport, PointerTracker};
pub use surface::WalkersSurface;
pub use tiles::{BaseMap, TileProvider};
