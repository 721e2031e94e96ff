//! Visitor preferences that outlive a single page load: locale and theme.
//!
//! Preferences are held by an explicitly passed `PreferenceStore` rather than
//! ambient globals, so every consumer can be tested against an in-memory
//! store.

use crate::i18n::Locale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Color scheme of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_code(code: &str) -> Option<Theme> {
        match code {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Read/write access to persisted preferences.
///
/// Reads return `None` when nothing is stored or the stored value is not
/// one of the known codes.
pub trait PreferenceStore: Send + Sync {
    fn locale(&self) -> Option<Locale>;
    fn set_locale(&self, locale: Locale) -> Result<()>;
    fn theme(&self) -> Option<Theme>;
    fn set_theme(&self, theme: Theme) -> Result<()>;
}

/// On-disk shape. Values stay strings so a hand-edited file cannot break loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

impl StoredPreferences {
    fn locale(&self) -> Option<Locale> {
        self.language.as_deref().and_then(Locale::from_code)
    }

    fn theme(&self) -> Option<Theme> {
        self.theme.as_deref().and_then(Theme::from_code)
    }
}

fn lock(prefs: &Mutex<StoredPreferences>) -> MutexGuard<'_, StoredPreferences> {
    // A poisoned lock still holds plain data
    prefs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Preferences kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    prefs: Mutex<StoredPreferences>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn locale(&self) -> Option<Locale> {
        lock(&self.prefs).locale()
    }

    fn set_locale(&self, locale: Locale) -> Result<()> {
        lock(&self.prefs).language = Some(locale.code().to_string());
        Ok(())
    }

    fn theme(&self) -> Option<Theme> {
        lock(&self.prefs).theme()
    }

    fn set_theme(&self, theme: Theme) -> Result<()> {
        lock(&self.prefs).theme = Some(theme.code().to_string());
        Ok(())
    }
}

/// Preferences persisted to a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    prefs: Mutex<StoredPreferences>,
}

impl FilePreferences {
    /// Open the file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences file {}: {}", path.display(), e);
                StoredPreferences::default()
            }),
            Err(_) => StoredPreferences::default(),
        };
        Self {
            path,
            prefs: Mutex::new(prefs),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, apply: impl FnOnce(&mut StoredPreferences)) -> Result<()> {
        let mut prefs = lock(&self.prefs);
        apply(&mut prefs);

        let json = serde_json::to_string_pretty(&*prefs).context("Failed to serialize preferences")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;

        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn locale(&self) -> Option<Locale> {
        lock(&self.prefs).locale()
    }

    fn set_locale(&self, locale: Locale) -> Result<()> {
        self.update(|prefs| prefs.language = Some(locale.code().to_string()))
    }

    fn theme(&self) -> Option<Theme> {
        lock(&self.prefs).theme()
    }

    fn set_theme(&self, theme: Theme) -> Result<()> {
        self.update(|prefs| prefs.theme = Some(theme.code().to_string()))
    }
}

/// The active theme, persisted on every explicit toggle.
pub struct ThemeState {
    theme: Theme,
    store: Arc<dyn PreferenceStore>,
}

impl ThemeState {
    /// Saved theme wins; otherwise follow the system color scheme.
    pub fn initialize(store: Arc<dyn PreferenceStore>, prefers_dark: bool) -> Self {
        let theme = store.theme().unwrap_or(if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        });
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Class to put on the document root element.
    pub fn root_class(&self) -> Option<&'static str> {
        self.is_dark().then_some("dark")
    }

    /// Flip the theme and persist the new choice.
    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.store.set_theme(next)?;
        self.theme = next;
        Ok(next)
    }
}
