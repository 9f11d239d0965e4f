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

//! Shared theme context.
//!
//! The theme toggle owns a [`ThemeContext`]; every component that paints
//! holds a `watch::Receiver<Theme>` from [`ThemeContext::subscribe`] and
//! checks `has_changed()` once per frame.

use std::fmt;
use std::str::FromStr;

use log::info;
use tokio::sync::watch;

use crate::entry::EntryType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Publisher side of the theme setting.
#[derive(Debug)]
pub struct ThemeContext {
    tx: watch::Sender<Theme>,
}

impl ThemeContext {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        let (tx, _rx) = watch::channel(theme);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Publish `theme`; subscribers are only notified when it differs.
    pub fn set(&self, theme: Theme) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        });
        if changed {
            info!("Theme changed to {theme}");
        }
        changed
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }
}

/// RGB triple.
pub type Rgb = [u8; 3];

/// Colours per entry type and for the UI chrome of one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePalette {
    pub education: Rgb,
    pub work: Rgb,
    pub project: Rgb,
    pub publication: Rgb,
    pub conference: Rgb,
    /// Case-study connectors; the alpha goes with it.
    pub accent: Rgb,
    pub accent_alpha: u8,
    pub text: Rgb,
    pub muted: Rgb,
}

impl TypePalette {
    const GOLD: Rgb = [0xF0, 0xB9, 0x17];
    const BLUE: Rgb = [0x58, 0xA6, 0xFF];

    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                education: Self::GOLD,
                work: [0x3F, 0xB9, 0x50],
                project: Self::BLUE,
                publication: Self::BLUE,
                conference: Self::GOLD,
                accent: [0xFF, 0xD7, 0x00],
                accent_alpha: 77,
                text: [0xCD, 0xD9, 0xE5],
                muted: [0x7D, 0x85, 0x90],
            },
            Theme::Light => Self {
                education: [0xC9, 0x96, 0x00],
                work: [0x1A, 0x7F, 0x37],
                project: [0x09, 0x69, 0xDA],
                publication: [0x09, 0x69, 0xDA],
                conference: [0xC9, 0x96, 0x00],
                accent: Self::BLUE,
                accent_alpha: 64,
                text: [0x1F, 0x23, 0x28],
                muted: [0x65, 0x6D, 0x76],
            },
        }
    }

    #[must_use]
    pub fn color(&self, entry_type: EntryType) -> Rgb {
        match entry_type {
            EntryType::Education => self.education,
            EntryType::Work => self.work,
            EntryType::Project => self.project,
            EntryType::Publication => self.publication,
            EntryType::Conference => self.conference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(" light ".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_context_notifies_only_on_change() {
        let context = ThemeContext::new(Theme::Dark);
        let mut rx = context.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(!context.set(Theme::Dark));
        assert!(!rx.has_changed().unwrap());

        assert_eq!(context.toggle(), Theme::Light);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Theme::Light);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_every_subscriber_sees_the_change() {
        let context = ThemeContext::new(Theme::Light);
        let mut a = context.subscribe();
        let mut b = context.subscribe();
        context.set(Theme::Dark);
        assert_eq!(*a.borrow_and_update(), Theme::Dark);
        assert_eq!(*b.borrow_and_update(), Theme::Dark);
    }

    #[test]
    fn test_palette() {
        let dark = TypePalette::for_theme(Theme::Dark);
        assert_eq!(dark.color(EntryType::Education), [0xF0, 0xB9, 0x17]);
        assert_eq!(dark.color(EntryType::Publication), [0x58, 0xA6, 0xFF]);
        assert_ne!(TypePalette::for_theme(Theme::Light), dark);
    }
}
