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

//! Declarative pointer-event registry.
//!
//! Instead of wiring closures per layer, each layer registers a table of
//! `(pointer kind -> action)` pairs when it is created and removes the
//! whole table when it is torn down. The renderer produces
//! [`PointerEvent`]s; the atlas looks the action up here and performs it.

use std::collections::HashMap;

use crate::entry::{EntryId, EntryType};

/// Interactive layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// Unclustered points of one entry type.
    Nodes(EntryType),
    /// Cluster markers.
    Clusters,
}

/// Pointer event kinds the engine reports per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Enter,
    Leave,
    Move,
    Click,
}

/// What the atlas does in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAction {
    Hover,
    Unhover,
    Select,
    ExpandCluster,
    PointerCursor(bool),
}

/// A pointer event on the surface. `layer` is `None` for the background.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub layer: Option<LayerId>,
    pub kind: PointerKind,
    pub feature: Option<EntryId>,
    pub lon: f64,
    pub lat: f64,
    /// Current camera zoom, used by cluster expansion.
    pub zoom: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn on_feature(layer: LayerId, kind: PointerKind, feature: EntryId, lon: f64, lat: f64) -> Self {
        Self {
            layer: Some(layer),
            kind,
            feature: Some(feature),
            lon,
            lat,
            zoom: 0.0,
        }
    }

    #[must_use]
    pub fn on_cluster(kind: PointerKind, lon: f64, lat: f64, zoom: f64) -> Self {
        Self {
            layer: Some(LayerId::Clusters),
            kind,
            feature: None,
            lon,
            lat,
            zoom,
        }
    }

    #[must_use]
    pub fn background_click(lon: f64, lat: f64) -> Self {
        Self {
            layer: None,
            kind: PointerKind::Click,
            feature: None,
            lon,
            lat,
            zoom: 0.0,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn is_background_click(&self) -> bool {
        self.layer.is_none() && self.kind == PointerKind::Click
    }
}

/// `(layer, kind) -> actions` table.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    handlers: HashMap<(LayerId, PointerKind), Vec<LayerAction>>,
}

impl EventRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the node layers of every entry type and the cluster
    /// layer populated.
    #[must_use]
    pub fn with_default_layers() -> Self {
        let mut registry = Self::new();
        for entry_type in EntryType::ALL {
            registry.register_layer(LayerId::Nodes(entry_type), NODE_BINDINGS);
        }
        registry.register_layer(LayerId::Clusters, CLUSTER_BINDINGS);
        registry
    }

    /// Add `bindings` for `layer`, replacing anything registered before.
    pub fn register_layer(&mut self, layer: LayerId, bindings: &[(PointerKind, LayerAction)]) {
        self.unregister_layer(layer);
        for (kind, action) in bindings {
            self.handlers.entry((layer, *kind)).or_default().push(*action);
        }
    }

    /// Remove every binding of `layer`.
    pub fn unregister_layer(&mut self, layer: LayerId) {
        self.handlers.retain(|(l, _), _| *l != layer);
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    #[must_use]
    pub fn actions_for(&self, layer: LayerId, kind: PointerKind) -> &[LayerAction] {
        self.handlers
            .get(&(layer, kind))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_registered(&self, layer: LayerId) -> bool {
        self.handlers.keys().any(|(l, _)| *l == layer)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Bindings for point layers.
pub const NODE_BINDINGS: &[(PointerKind, LayerAction)] = &[
    (PointerKind::Enter, LayerAction::PointerCursor(true)),
    (PointerKind::Enter, LayerAction::Hover),
    (PointerKind::Move, LayerAction::Hover),
    (PointerKind::Leave, LayerAction::Unhover),
    (PointerKind::Leave, LayerAction::PointerCursor(false)),
    (PointerKind::Click, LayerAction::Select),
];

/// Bindings for the cluster layer.
pub const CLUSTER_BINDINGS: &[(PointerKind, LayerAction)] = &[
    (PointerKind::Enter, LayerAction::PointerCursor(true)),
    (PointerKind::Leave, LayerAction::PointerCursor(false)),
    (PointerKind::Click, LayerAction::ExpandCluster),
];
