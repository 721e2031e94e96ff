//! Bilingual portfolio site: locale routing, translation bundles, visitor
//! preferences and the contact form relay.

pub mod config;
pub mod error;
pub mod form;
pub mod i18n;
pub mod middleware;
pub mod notifier;
pub mod preferences;
pub mod resolver;
pub mod server;
pub mod validation;
