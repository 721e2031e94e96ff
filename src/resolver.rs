//! Locale resolution for incoming page requests.
//!
//! Decides, before any page is rendered, whether a request passes through
//! untouched, is served while remembering its locale in a cookie, or is
//! redirected to a locale-prefixed URL.
//!
//! Priority: path prefix, then a valid locale cookie, then the
//! `Accept-Language` header, then Russian.

use crate::i18n::Locale;

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Not a page route; no locale logic applies.
    PassThrough,
    /// Already locale-prefixed; serve it and remember the locale.
    SetCookieOnly { locale: Locale },
    /// Redirect to `target` and remember the locale.
    RedirectWithCookie { locale: Locale, target: String },
}

/// Path prefixes that never carry a locale.
const EXCLUDED_PREFIXES: &[&str] = &["/_", "/api", "/static", "/locales"];

/// Asset, API and framework paths, plus anything that looks like a file.
pub fn is_excluded(path: &str) -> bool {
    path.contains('.') || EXCLUDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Resolve the routing decision for a request.
///
/// * `path` - request path without query string
/// * `cookie` - value of the locale cookie, if sent
/// * `accept_language` - raw `Accept-Language` header, if sent
pub fn resolve(path: &str, cookie: Option<&str>, accept_language: Option<&str>) -> RoutingDecision {
    if is_excluded(path) {
        return RoutingDecision::PassThrough;
    }

    if let Some(locale) = Locale::from_path_prefix(path) {
        return RoutingDecision::SetCookieOnly { locale };
    }

    let locale = cookie
        .and_then(Locale::from_code)
        .unwrap_or_else(|| detect_from_header(accept_language.unwrap_or("")));

    RoutingDecision::RedirectWithCookie {
        locale,
        target: redirect_target(locale, path),
    }
}

/// Language tags of an `Accept-Language` header, in header order,
/// lowercased and stripped of quality parameters.
pub fn language_tags(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(|part| part.split(';').next().unwrap_or("").trim().to_lowercase())
        .collect()
}

/// English if any tag starts with "en", otherwise Russian.
///
/// Any English tag wins regardless of position or quality.
pub fn detect_from_header(header: &str) -> Locale {
    let tags = language_tags(header);
    if tags.iter().any(|tag| tag.starts_with("en")) {
        Locale::En
    } else {
        Locale::Ru
    }
}

/// `/<locale>` followed by the original path; the root maps to `/<locale>`.
pub fn redirect_target(locale: Locale, path: &str) -> String {
    if path.is_empty() || path == "/" {
        format!("/{}", locale.code())
    } else {
        format!("/{}{}", locale.code(), path)
    }
}

/// Value of the locale cookie in a raw `Cookie` header.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}
