//! Translation store: per-locale bundles loaded on demand.

use crate::error::TranslationLoadError;
use crate::i18n::{Locale, TranslationTree};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Anything that can produce the translation bundle of a locale.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    async fn fetch(&self, locale: Locale) -> Result<Arc<TranslationTree>, TranslationLoadError>;
}

/// Bundles read from `<dir>/<locale>.json`, cached after the first load.
///
/// A bundle is immutable once loaded; later loads of the same locale return
/// the cached tree.
#[derive(Debug)]
pub struct TranslationStore {
    dir: PathBuf,
    cache: RwLock<HashMap<Locale, Arc<TranslationTree>>>,
}

impl TranslationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the bundle file for `locale`.
    pub fn bundle_path(&self, locale: Locale) -> PathBuf {
        self.dir.join(format!("{}.json", locale.code()))
    }

    /// Load a bundle, reading it from disk only the first time.
    pub async fn load(&self, locale: Locale) -> Result<Arc<TranslationTree>, TranslationLoadError> {
        if let Some(tree) = self.cache.read().await.get(&locale) {
            return Ok(Arc::clone(tree));
        }

        let path = self.bundle_path(locale);
        debug!("Reading translation bundle {}", path.display());

        let raw = tokio::fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TranslationLoadError::NotFound(locale)
            } else {
                TranslationLoadError::Io { locale, source }
            }
        })?;

        let tree: TranslationTree = serde_json::from_str(&raw)
            .map_err(|source| TranslationLoadError::Parse { locale, source })?;

        let mut cache = self.cache.write().await;
        let tree = Arc::clone(cache.entry(locale).or_insert_with(|| Arc::new(tree)));
        info!("Loaded translation bundle for '{}'", locale);
        Ok(tree)
    }

    /// Load every locale up front so the first page view does not hit disk.
    ///
    /// Returns the locales that failed; their pages fall back at request time.
    pub async fn preload(&self) -> Vec<(Locale, TranslationLoadError)> {
        let mut failures = Vec::new();
        for locale in Locale::ALL {
            if let Err(e) = self.load(locale).await {
                failures.push((locale, e));
            }
        }
        failures
    }
}

#[async_trait]
impl TranslationSource for TranslationStore {
    async fn fetch(&self, locale: Locale) -> Result<Arc<TranslationTree>, TranslationLoadError> {
        self.load(locale).await
    }
}

/// Bundles fetched over HTTP from the site's `/locales/<locale>.json` route.
#[derive(Debug, Clone)]
pub struct HttpTranslationSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranslationSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranslationSource for HttpTranslationSource {
    async fn fetch(&self, locale: Locale) -> Result<Arc<TranslationTree>, TranslationLoadError> {
        let url = format!("{}/locales/{}.json", self.base_url, locale.code());
        let fetch_error = |message: String| TranslationLoadError::Fetch { locale, message };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TranslationLoadError::NotFound(locale));
        }
        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let tree: TranslationTree = response
            .json()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(Arc::new(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Test Helpers ====================

    fn write_bundle(dir: &TempDir, locale: &str, contents: &str) {
        std::fs::write(dir.path().join(format!("{}.json", locale)), contents)
            .expect("Failed to write bundle");
    }

    // ==================== File Store Tests ====================

    #[tokio::test]
    async fn test_load_reads_bundle() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_bundle(&dir, "en", r#"{"hero": {"title": "Developer"}}"#);

        let store = TranslationStore::new(dir.path());
        let tree = store.load(Locale::En).await.expect("Should load");
        assert_eq!(tree.text("hero.title"), "Developer");
    }

    #[tokio::test]
    async fn test_load_caches_first_result() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_bundle(&dir, "ru", r#"{"a": "one"}"#);

        let store = TranslationStore::new(dir.path());
        let first = store.load(Locale::Ru).await.expect("Should load");

        // Changing the file after the first load has no effect
        write_bundle(&dir, "ru", r#"{"a": "two"}"#);
        let second = store.load(Locale::Ru).await.expect("Should load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.text("a"), "one");
    }

    #[tokio::test]
    async fn test_missing_bundle_is_not_found() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = TranslationStore::new(dir.path());

        let err = store.load(Locale::En).await.expect_err("Should fail");
        assert!(matches!(err, TranslationLoadError::NotFound(Locale::En)));
    }

    #[tokio::test]
    async fn test_malformed_bundle_is_parse_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_bundle(&dir, "en", "{ not json");
        let store = TranslationStore::new(dir.path());

        let err = store.load(Locale::En).await.expect_err("Should fail");
        assert!(matches!(err, TranslationLoadError::Parse { locale: Locale::En, .. }));
    }

    #[tokio::test]
    async fn test_preload_reports_failures() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_bundle(&dir, "ru", r#"{"a": "b"}"#);
        let store = TranslationStore::new(dir.path());

        let failures = store.preload().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Locale::En);
    }

    #[tokio::test]
    async fn test_repository_bundles_parse() {
        let store = TranslationStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/locales"));
        for locale in Locale::ALL {
            let tree = store.load(locale).await.expect("Bundled locale should load");
            assert!(tree.lookup("contact.title").is_found());
            assert!(tree.lookup("meta.title").is_found());
        }
    }

    // ==================== HTTP Source Tests ====================

    #[tokio::test]
    async fn test_http_source_fetches_bundle() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/locales/en.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"nav": {"about": "About"}}"#),
            )
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(format!("{}/", mock_server.uri()));
        let tree = source.fetch(Locale::En).await.expect("Should fetch");
        assert_eq!(tree.text("nav.about"), "About");
    }

    #[tokio::test]
    async fn test_http_source_maps_404() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/locales/ru.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(mock_server.uri());
        let err = source.fetch(Locale::Ru).await.expect_err("Should fail");
        assert!(matches!(err, TranslationLoadError::NotFound(Locale::Ru)));
    }

    #[tokio::test]
    async fn test_http_source_maps_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(mock_server.uri());
        let err = source.fetch(Locale::En).await.expect_err("Should fail");
        assert!(matches!(err, TranslationLoadError::Fetch { .. }));
    }
}
