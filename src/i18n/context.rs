//! Language context: the current locale of a page and its loaded bundle.
//!
//! One context exists per page load. It is the only owner of the current
//! locale and translation tree, and changes them only through `load` and
//! `set_locale`.
//!
//! Bundle loads are asynchronous. While a load is in flight, lookups return
//! raw keys; the page briefly shows keys instead of text until the bundle is
//! installed. That flash is accepted behavior, not an error.

use crate::i18n::{Locale, Translation, TranslationSource, TranslationTree};
use crate::preferences::PreferenceStore;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Browser-style navigation used by the context to rewrite the URL.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown.
    fn current_path(&self) -> String;

    /// Navigate to `path` without a full reload.
    fn push(&self, path: &str);
}

/// In-process navigation history.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial_path.into()]),
        }
    }

    /// Every path visited, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}

/// Where the context is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Locale known, no bundle requested yet
    Uninitialized,
    /// A bundle load is in flight
    Loading,
    /// The bundle for the current locale is installed
    Ready,
}

pub struct LanguageContext {
    locale: Locale,
    state: LoadState,
    translations: Arc<TranslationTree>,
    preferences: Arc<dyn PreferenceStore>,
    navigator: Arc<dyn Navigator>,
}

impl LanguageContext {
    /// Create the context for the page the navigator currently shows.
    ///
    /// The locale comes from the first path segment, defaulting to Russian.
    /// A valid URL locale is also persisted as the visitor's preference.
    pub fn new(preferences: Arc<dyn PreferenceStore>, navigator: Arc<dyn Navigator>) -> Self {
        let path = navigator.current_path();
        let locale = match Locale::from_path_prefix(&path) {
            Some(locale) => {
                persist(preferences.as_ref(), locale);
                locale
            }
            None => Locale::default(),
        };

        Self {
            locale,
            state: LoadState::Uninitialized,
            translations: Arc::new(TranslationTree::empty()),
            preferences,
            navigator,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Look up a dot-separated key. Missing keys and unloaded bundles yield
    /// the key itself.
    pub fn lookup<'a>(&'a self, key: &'a str) -> Translation<'a> {
        match self.state {
            LoadState::Ready => self.translations.lookup(key),
            LoadState::Uninitialized | LoadState::Loading => Translation::Missing(key),
        }
    }

    /// Leaf text for `key`, or the key.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        match self.lookup(key) {
            Translation::Found(TranslationTree::Leaf(text)) => text.as_str(),
            _ => key,
        }
    }

    /// Load the bundle of the current locale.
    pub async fn load(&mut self, source: &dyn TranslationSource) {
        let locale = self.locale;
        self.state = LoadState::Loading;
        let tree = load_with_fallback(source, locale).await;
        self.install(locale, tree);
    }

    /// Switch locale: persist it, rewrite the URL and start a reload.
    ///
    /// Returns the locale whose bundle must now be installed. Lookups return
    /// raw keys until `install` is called.
    pub fn begin_set_locale(&mut self, locale: Locale) -> Locale {
        persist(self.preferences.as_ref(), locale);

        let target = locale.localize_path(&self.navigator.current_path());
        debug!("Switching locale to '{}', navigating to {}", locale, target);
        self.navigator.push(&target);

        self.locale = locale;
        self.state = LoadState::Loading;
        locale
    }

    /// Install a loaded bundle. Bundles for a locale that is no longer
    /// current are dropped; returns whether the bundle was installed.
    pub fn install(&mut self, locale: Locale, tree: Arc<TranslationTree>) -> bool {
        if locale != self.locale {
            debug!("Dropping stale '{}' bundle, current locale is '{}'", locale, self.locale);
            return false;
        }
        self.translations = tree;
        self.state = LoadState::Ready;
        true
    }

    /// Switch locale and load its bundle.
    pub async fn set_locale(&mut self, locale: Locale, source: &dyn TranslationSource) {
        let locale = self.begin_set_locale(locale);
        let tree = load_with_fallback(source, locale).await;
        self.install(locale, tree);
    }

    /// Switch to the other locale, as the language toggle button does.
    pub async fn toggle_locale(&mut self, source: &dyn TranslationSource) -> Locale {
        let next = self.locale.toggled();
        self.set_locale(next, source).await;
        next
    }
}

fn persist(preferences: &dyn PreferenceStore, locale: Locale) {
    if let Err(e) = preferences.set_locale(locale) {
        warn!("Failed to persist locale preference '{}': {:#}", locale, e);
    }
}

/// Fetch `locale`, falling back to Russian, then to an empty bundle.
pub async fn load_with_fallback(
    source: &dyn TranslationSource,
    locale: Locale,
) -> Arc<TranslationTree> {
    match source.fetch(locale).await {
        Ok(tree) => return tree,
        Err(e) => warn!("{}", e),
    }

    let fallback = Locale::default();
    if locale != fallback {
        match source.fetch(fallback).await {
            Ok(tree) => return tree,
            Err(e) => warn!("{}", e),
        }
    }

    Arc::new(TranslationTree::empty())
}
