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

//! Résumé entry data model.
//!
//! A [`ResumeEntry`] is one validated record of the static résumé collection:
//! an education, work, publication, conference or project item with a
//! geographic coordinate, dates and free-form descriptive fields. Entries are
//! identified by an [`EntryId`] that every stateful map operation (hover,
//! selection, fade) is keyed on.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal used by the data set for ongoing ranges.
pub const PRESENT: &str = "Present";

/// Closed set of entry kinds. Determines layer membership and paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Education,
    Work,
    Publication,
    Conference,
    Project,
}

impl EntryType {
    /// Every entry type, in filter-bar order.
    pub const ALL: [EntryType; 5] = [
        EntryType::Education,
        EntryType::Work,
        EntryType::Project,
        EntryType::Publication,
        EntryType::Conference,
    ];

    /// Data-set spelling of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Work => "work",
            Self::Publication => "publication",
            Self::Conference => "conference",
            Self::Project => "project",
        }
    }

    /// Capitalised label for buttons and panel headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Work => "Work",
            Self::Publication => "Publication",
            Self::Conference => "Conference",
            Self::Project => "Project",
        }
    }

    /// Parse the data-set spelling. Unknown spellings are rejected.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of an entry. The data set uses both numbers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl EntryId {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl PartialOrd for EntryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntryId {
    // Numbers sort before strings
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Thesis details attached to education entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thesis {
    pub title: String,
    #[serde(default)]
    pub advisor: Option<String>,
}

/// Auxiliary location a project was studied at, drawn as a connector from
/// the parent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudyLocation {
    #[serde(default)]
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sub-entry of a work item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub case_study_locations: Vec<CaseStudyLocation>,
}

impl Project {
    #[must_use]
    pub fn has_case_studies(&self) -> bool {
        !self.case_study_locations.is_empty()
    }

    /// "2021-03 - Present", "2019 - 2020", or just the start.
    #[must_use]
    pub fn timing_label(&self) -> String {
        let mut label = String::new();
        if let Some(status) = self.status.as_deref() {
            if !status.eq_ignore_ascii_case("completed") {
                label.push_str(status);
                label.push(' ');
            }
        }
        if let Some(start) = self.start_date.as_deref() {
            label.push_str(start);
        }
        match self.end_date.as_deref() {
            Some(PRESENT) => label.push_str(" - Present"),
            Some(end) => {
                label.push_str(" - ");
                label.push_str(end);
            }
            None => {}
        }
        label.trim().to_string()
    }
}

/// A validated résumé record. Coordinates and id are guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeEntry {
    pub id: EntryId,
    pub entry_type: EntryType,
    pub lon: f64,
    pub lat: f64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub institution: Option<String>,
    pub publisher: Option<String>,
    pub venue: Option<String>,
    pub url: Option<String>,
    pub projects: Vec<Project>,
    pub thesis: Option<Thesis>,
    pub disciplines: Vec<String>,
}

impl ResumeEntry {
    /// Minimal entry, mostly useful for building fixtures.
    #[must_use]
    pub fn new(id: impl Into<EntryId>, entry_type: EntryType, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            entry_type,
            lon,
            lat,
            title: String::new(),
            description: None,
            start_date: None,
            end_date: None,
            date: None,
            location: None,
            institution: None,
            publisher: None,
            venue: None,
            url: None,
            projects: Vec::new(),
            thesis: None,
            disciplines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_start_date(mut self, start: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    /// Year the entry counts for on the timeline: the leading four digits of
    /// the start date, or of the single date when no range applies.
    #[must_use]
    pub fn effective_year(&self) -> Option<i32> {
        [self.start_date.as_deref(), self.date.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .and_then(leading_year)
    }

    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.end_date.as_deref() == Some(PRESENT)
    }

    /// Human readable date range, empty when the entry carries no dates.
    #[must_use]
    pub fn date_label(&self) -> String {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(PRESENT)) => format!("{start} to Present"),
            (Some(start), Some(end)) => format!("{start} to {end}"),
            (Some(start), None) => start.to_string(),
            (None, _) => self.date.clone().unwrap_or_default(),
        }
    }

    /// Display title with the data set's fallback.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Lines shown in the hover card next to a point.
    #[must_use]
    pub fn hover_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.display_title().to_string(),
            format!("Type: {}", self.entry_type.label()),
            format!("Loc: {}", self.location.as_deref().unwrap_or("N/A")),
        ];
        if let Some(start) = &self.start_date {
            lines.push(format!("Start: {start}"));
        }
        match self.end_date.as_deref() {
            Some(PRESENT) => lines.push("Ongoing".to_string()),
            Some(end) => lines.push(format!("End: {end}")),
            None => {}
        }
        if self.start_date.is_none() {
            if let Some(date) = &self.date {
                lines.push(format!("Date: {date}"));
            }
        }
        lines
    }
}

/// First four characters as a year, when they are all ASCII digits.
#[must_use]
pub fn leading_year(value: &str) -> Option<i32> {
    let digits = value.trim().get(..4)?;
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
