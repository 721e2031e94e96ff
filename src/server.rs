//! HTTP server: locale pages, translation bundles, static files and the
//! contact endpoint, all behind the locale routing middleware.

use crate::config::Config;
use crate::error::{ContactError, ContactResponse, MSG_SENT};
use crate::i18n::{load_with_fallback, Locale, TranslationStore, TranslationTree};
use crate::middleware::locale_routing;
use crate::notifier::{ContactNotice, MailRelayNotifier, Notifier};
use crate::validation::{escape_html, validate, ContactSubmission};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    middleware,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Maximum accepted request body (contact messages are at most 2000 chars).
const BODY_LIMIT: usize = 64 * 1024;

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TranslationStore>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let notifier = config
            .mail
            .clone()
            .map(|mail| Arc::new(MailRelayNotifier::new(mail)) as Arc<dyn Notifier>);

        Self {
            store: Arc::new(TranslationStore::new(&config.locales_dir)),
            notifier,
        }
    }
}

/// Build the router with every route and layer.
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/contact", post(contact).fallback(method_not_allowed))
        .route("/locales/:file", get(bundle))
        .route("/:locale", get(page))
        .route("/:locale/", get(page))
        .nest_service("/resume", ServeDir::new(&config.resume_dir))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn(locale_routing))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and run until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config);

    for (locale, e) in state.store.preload().await {
        warn!("Translation bundle for '{}' unavailable: {}", locale, e);
    }
    if state.notifier.is_none() {
        warn!("Mail relay not configured, contact submissions will be rejected");
    }

    let app = build_router(state, &config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// `GET /api/health`
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/contact`: validate, escape and relay a contact submission.
async fn contact(
    State(state): State<AppState>,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactResponse>, ContactError> {
    let Json(submission) = body.map_err(|e| {
        warn!("Malformed contact submission: {}", e);
        ContactError::MalformedBody
    })?;

    let contact = validate(&submission).map_err(|errors| {
        info!("Rejected contact submission: {}", errors);
        ContactError::Validation(errors)
    })?;

    let notifier = state.notifier.as_ref().ok_or_else(|| {
        error!("Mail relay credentials not configured");
        ContactError::NotConfigured
    })?;

    let notice = ContactNotice::from_contact(&contact, Utc::now());
    notifier.deliver(&notice).await.map_err(|e| {
        error!("Error sending contact notice: {}", e);
        ContactError::from(e)
    })?;

    info!("Contact submission relayed");
    Ok(Json(ContactResponse::ok(MSG_SENT)))
}

async fn method_not_allowed() -> ContactError {
    ContactError::MethodNotAllowed
}

/// `GET /locales/:file`: a locale bundle as JSON.
async fn bundle(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Json<TranslationTree>, StatusCode> {
    let locale = file
        .strip_suffix(".json")
        .and_then(Locale::from_code)
        .ok_or(StatusCode::NOT_FOUND)?;

    let tree = state.store.load(locale).await.map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })?;

    Ok(Json(tree.as_ref().clone()))
}

/// `GET /:locale`: the page shell for a locale.
async fn page(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let locale = Locale::from_code(&segment).ok_or(StatusCode::NOT_FOUND)?;
    let tree = load_with_fallback(state.store.as_ref(), locale).await;
    Ok(Html(render_shell(locale, &tree)))
}

/// Document shell: language, title and description. The page body is
/// rendered client-side from `/static`.
pub fn render_shell(locale: Locale, tree: &TranslationTree) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:type" content="website">
<link rel="icon" href="/favicon.ico">
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<div id="root" data-locale="{lang}"></div>
<script src="/static/app.js" defer></script>
</body>
</html>
"#,
        lang = locale.code(),
        title = escape_html(tree.text("meta.title")),
        description = escape_html(tree.text("meta.description")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shell_uses_bundle_meta() {
        let tree = TranslationTree::from_json(json!({
            "meta": {
                "title": "Portfolio | Dev",
                "description": "Frontend \"developer\""
            }
        }));
        let html = render_shell(Locale::En, &tree);
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("<title>Portfolio | Dev</title>"));
        assert!(html.contains("Frontend &quot;developer&quot;"));
    }

    #[test]
    fn test_render_shell_with_empty_bundle_shows_keys() {
        let html = render_shell(Locale::Ru, &TranslationTree::empty());
        assert!(html.contains("<title>meta.title</title>"));
        assert!(html.contains(r#"data-locale="ru""#));
    }
}
