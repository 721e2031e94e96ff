//! Locale type: the two languages the site is published in.
//!
//! Every conversion from untrusted input (cookie, header, URL segment,
//! stored preference) goes through `Locale::parse`, which degrades to
//! Russian instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the cookie that remembers the visitor's locale.
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Cookie lifetime: one year, in seconds.
pub const LOCALE_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// A supported site locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Russian (default)
    #[default]
    Ru,
    /// English
    En,
}

impl Locale {
    /// All locales, default first.
    pub const ALL: [Locale; 2] = [Locale::Ru, Locale::En];

    /// Strict conversion: only the exact codes "ru" and "en" are accepted.
    pub fn from_code(code: &str) -> Option<Locale> {
        match code {
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Lenient conversion: anything unrecognized becomes `Locale::Ru`.
    pub fn parse(code: &str) -> Locale {
        Self::from_code(code).unwrap_or_default()
    }

    /// Two-letter code used in URLs, cookies and bundle file names.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    /// The other locale, used by the language toggle.
    pub fn toggled(&self) -> Locale {
        match self {
            Locale::Ru => Locale::En,
            Locale::En => Locale::Ru,
        }
    }

    /// Locale named by the first segment of `path`, if the path is
    /// `/ru`, `/en`, or starts with `/ru/` or `/en/`.
    pub fn from_path_prefix(path: &str) -> Option<Locale> {
        Self::ALL.into_iter().find(|locale| locale.prefixes(path))
    }

    fn prefixes(&self, path: &str) -> bool {
        match path
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(self.code()))
        {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Rewrite `path` under this locale, replacing any existing locale prefix.
    ///
    /// `/ru/projects` becomes `/en/projects`, and `/` or `/ru` becomes `/en`.
    pub fn localize_path(&self, path: &str) -> String {
        let unprefixed = match Self::from_path_prefix(path) {
            Some(current) => &path[1 + current.code().len()..],
            None => path,
        };

        if unprefixed.is_empty() || unprefixed == "/" {
            format!("/{}", self.code())
        } else if unprefixed.starts_with('/') {
            format!("/{}{}", self.code(), unprefixed)
        } else {
            format!("/{}/{}", self.code(), unprefixed)
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
