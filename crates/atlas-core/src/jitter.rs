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

//! Deterministic positional jitter.
//!
//! Entries that share a location would render as a single point, so every
//! feature is nudged by a small offset derived from a hash of its id. The
//! offset is a pure function of the id: the same entry lands on the same
//! spot on every frame and every launch.

use crate::entry::{EntryId, EntryType, ResumeEntry};

/// Default offset amplitude in degrees.
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.05;

// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.051_128_78;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

// Leading byte separating numeric ids from text ids with the same digits
const NUMBER_TAG: u8 = b'#';
const TEXT_TAG: u8 = b'$';

/// 32-bit hash of the id: FNV-1a over a kind tag and the id's display form,
/// followed by an avalanche finaliser so that ids differing in one character
/// spread over all bits.
#[must_use]
pub fn id_hash(id: &EntryId) -> u32 {
    let tag = match id {
        EntryId::Number(_) => NUMBER_TAG,
        EntryId::Text(_) => TEXT_TAG,
    };
    let text = id.to_string();
    let mut hash = FNV_OFFSET_BASIS;
    for byte in std::iter::once(tag).chain(text.bytes()) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2_ae35);
    hash ^= hash >> 16;
    hash
}

/// Two pseudo-random values in [-0.5, 0.5], one per axis.
#[must_use]
pub fn jitter_offsets(id: &EntryId) -> (f64, f64) {
    let hash = id_hash(id);
    let low = f64::from(hash & 0xffff) / f64::from(0xffff_u32) - 0.5;
    let high = f64::from(hash >> 16) / f64::from(0xffff_u32) - 0.5;
    (low, high)
}

/// Jittered `(lon, lat)` for an entry.
#[must_use]
pub fn jitter(id: &EntryId, lon: f64, lat: f64, amplitude: f64) -> (f64, f64) {
    let (dx, dy) = jitter_offsets(id);
    (
        lon + dx * amplitude,
        (lat + dy * amplitude).clamp(-MAX_LATITUDE, MAX_LATITUDE),
    )
}

/// An entry with its rendered coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedFeature {
    pub entry: ResumeEntry,
    pub lon: f64,
    pub lat: f64,
}

impl PositionedFeature {
    #[must_use]
    pub fn new(entry: ResumeEntry, amplitude: f64) -> Self {
        let (lon, lat) = jitter(&entry.id, entry.lon, entry.lat, amplitude);
        Self { entry, lon, lat }
    }

    #[must_use]
    pub fn id(&self) -> &EntryId {
        &self.entry.id
    }

    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        self.entry.entry_type
    }

    #[must_use]
    pub fn effective_year(&self) -> Option<i32> {
        self.entry.effective_year()
    }

    /// Rendered `(lon, lat)`.
    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    /// Unperturbed `(lon, lat)` from the data set.
    #[must_use]
    pub fn base_position(&self) -> (f64, f64) {
        (self.entry.lon, self.entry.lat)
    }
}

/// Project validated entries into positioned features.
#[must_use]
pub fn project(entries: Vec<ResumeEntry>, amplitude: f64) -> Vec<PositionedFeature> {
    entries
        .into_iter()
        .map(|entry| PositionedFeature::new(entry, amplitude))
        .collect()
}
