//! Internationalization (i18n) for the two site locales.
//!
//! # Architecture
//!
//! - `locale`: the `Locale` type and URL prefix helpers
//! - `tree`: typed translation bundles with total key lookup
//! - `store`: on-demand bundle loading (files or HTTP)
//! - `context`: per-page language state with a locale-change operation
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_site::i18n::{LanguageContext, Locale, TranslationStore};
//!
//! let store = TranslationStore::new("locales");
//! let mut ctx = LanguageContext::new(preferences, navigator);
//! ctx.load(&store).await;
//! let title = ctx.text("hero.title");
//! ```

mod context;
mod locale;
mod store;
mod tree;

pub use context::{load_with_fallback, HistoryNavigator, LanguageContext, LoadState, Navigator};
pub use locale::{Locale, LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE};
pub use store::{HttpTranslationSource, TranslationSource, TranslationStore};
pub use tree::{Translation, TranslationTree};
