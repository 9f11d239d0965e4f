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

//! Static data loading and validation.
//!
//! The résumé collection is a JSON array read once at startup. Only
//! file-level problems are errors; malformed or incomplete entries are
//! dropped with a warning so a single bad record never hides the map.

use std::collections::HashSet;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::entry::{EntryId, EntryType, Project, ResumeEntry, Thesis};

/// Errors that prevent the collection from being read at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("data file must contain a JSON array of entries")]
    NotAnArray,
}

/// Lenient view of one record, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub id: Option<EntryId>,
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub thesis: Option<Thesis>,
    #[serde(default)]
    pub disciplines: Vec<String>,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub dropped: usize,
}

/// Parse a JSON array into raw records. Elements that are not objects of the
/// expected shape are skipped with a warning.
pub fn parse_entries(json: &str) -> Result<Vec<RawEntry>, LoadError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(LoadError::NotAnArray);
    };

    let mut raw = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawEntry>(item) {
            Ok(entry) => raw.push(entry),
            Err(e) => warn!("Skipping malformed entry at index {index}: {e}"),
        }
    }
    Ok(raw)
}

/// Read and validate a data file.
pub fn load_file(path: &Path) -> Result<(Vec<ResumeEntry>, LoadReport), LoadError> {
    let text = std::fs::read_to_string(path)?;
    let raw = parse_entries(&text)?;
    let result = validate(raw);
    info!(
        "Loaded {} entries from {} ({} dropped)",
        result.1.accepted,
        path.display(),
        result.1.dropped
    );
    Ok(result)
}

/// Parse and validate an in-memory collection.
pub fn load_str(json: &str) -> Result<(Vec<ResumeEntry>, LoadReport), LoadError> {
    Ok(validate(parse_entries(json)?))
}

/// Keep only entries usable by the map: id present and unique, both
/// coordinates present and finite, type in the closed set.
#[must_use]
pub fn validate(raw: Vec<RawEntry>) -> (Vec<ResumeEntry>, LoadReport) {
    let mut seen: HashSet<EntryId> = HashSet::with_capacity(raw.len());
    let mut entries = Vec::with_capacity(raw.len());
    let mut report = LoadReport::default();

    for item in raw {
        let label = item
            .id
            .as_ref()
            .map_or_else(|| "(missing id)".to_string(), ToString::to_string);

        let Some(id) = item.id else {
            warn!("Entry {label} dropped: id is required for map interactions");
            report.dropped += 1;
            continue;
        };
        let (Some(lon), Some(lat)) = (item.lon, item.lat) else {
            warn!("Entry {label} dropped: missing coordinates");
            report.dropped += 1;
            continue;
        };
        if !lon.is_finite() || !lat.is_finite() {
            warn!("Entry {label} dropped: non-finite coordinates");
            report.dropped += 1;
            continue;
        }
        let Some(entry_type) = item.entry_type.as_deref().and_then(EntryType::parse) else {
            warn!(
                "Entry {label} dropped: unknown type {:?}",
                item.entry_type.as_deref().unwrap_or("")
            );
            report.dropped += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!("Entry {label} dropped: duplicate id");
            report.dropped += 1;
            continue;
        }

        entries.push(ResumeEntry {
            id,
            entry_type,
            lon,
            lat,
            title: item.title.unwrap_or_default(),
            description: item.description,
            start_date: item.start_date,
            end_date: item.end_date,
            date: item.date,
            location: item.location,
            institution: item.institution,
            publisher: item.publisher,
            venue: item.venue,
            url: item.url,
            projects: item.projects,
            thesis: item.thesis,
            disciplines: item.disciplines,
        });
        report.accepted += 1;
    }

    (entries, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "type": "work", "lon": -71.06, "lat": 42.36, "title": "Analyst", "startDate": "2020-01",
         "projects": [{"title": "Survey", "caseStudyLocations": [{"name": "Lima", "lon": -77.04, "lat": -12.05}]}]},
        {"id": "phd", "type": "education", "lon": -72.92, "lat": 41.31, "startDate": "2018-09", "endDate": "Present",
         "thesis": {"title": "Networks", "advisor": "Dr. A"}},
        {"type": "publication", "lon": 0.0, "lat": 0.0},
        {"id": 3, "type": "conference", "lat": 10.0},
        {"id": 4, "type": "hobby", "lon": 1.0, "lat": 1.0},
        {"id": 1, "type": "project", "lon": 2.0, "lat": 2.0},
        "not an object"
    ]"#;

    #[test]
    fn test_load_str_validates() {
        let (entries, report) = load_str(SAMPLE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(report, LoadReport { accepted: 2, dropped: 4 });

        let work = &entries[0];
        assert_eq!(work.id, EntryId::Number(1));
        assert_eq!(work.entry_type, EntryType::Work);
        assert_eq!(work.projects.len(), 1);
        assert!(work.projects[0].has_case_studies());

        let phd = &entries[1];
        assert_eq!(phd.id, EntryId::text("phd"));
        assert!(phd.is_ongoing());
        assert_eq!(phd.thesis.as_ref().unwrap().advisor.as_deref(), Some("Dr. A"));
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(load_str(r#"{"id": 1}"#), Err(LoadError::NotAnArray)));
        assert!(matches!(load_str("not json"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_file(Path::new("/nonexistent/spatial-data.json"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_empty_collection() {
        let (entries, report) = load_str("[]").unwrap();
        assert!(entries.is_empty());
        assert_eq!(report, LoadReport::default());
    }
}
