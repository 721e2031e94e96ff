use crate::i18n::{Locale, LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE};
use crate::resolver::{cookie_value, resolve, RoutingDecision};
use axum::{
    body::Body,
    http::{
        header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

/// `Set-Cookie` value remembering `locale` for one year on every path.
pub fn locale_cookie(locale: Locale) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}",
        LOCALE_COOKIE,
        locale.code(),
        LOCALE_COOKIE_MAX_AGE
    )
}

fn request_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, LOCALE_COOKIE))
        .map(str::to_string)
}

fn append_locale_cookie(headers: &mut HeaderMap, locale: Locale) {
    match HeaderValue::from_str(&locale_cookie(locale)) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => warn!("Failed to build locale cookie: {}", e),
    }
}

/// Apply locale routing to every request before it reaches a handler.
pub async fn locale_routing(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let cookie = request_cookie(req.headers());
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let decision = resolve(&path, cookie.as_deref(), accept_language.as_deref());

    match decision {
        RoutingDecision::PassThrough => next.run(req).await,
        RoutingDecision::SetCookieOnly { locale } => {
            debug!("{} served as '{}'", path, locale);
            let mut response = next.run(req).await;
            append_locale_cookie(response.headers_mut(), locale);
            response
        }
        RoutingDecision::RedirectWithCookie { locale, target } => {
            debug!("{} redirected to {}", path, target);
            let mut response = Redirect::temporary(&target).into_response();
            append_locale_cookie(response.headers_mut(), locale);
            response
        }
    }
}
