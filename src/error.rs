use crate::i18n::Locale;
use crate::validation::ValidationErrors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// A translation bundle could not be loaded.
///
/// Never shown to visitors: the language context recovers through its
/// fallback chain.
#[derive(Debug, Error)]
pub enum TranslationLoadError {
    #[error("no translation bundle for locale '{0}'")]
    NotFound(Locale),

    #[error("failed to read translation bundle for '{locale}': {source}")]
    Io {
        locale: Locale,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse translation bundle for '{locale}': {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fetch translation bundle for '{locale}': {message}")]
    Fetch { locale: Locale, message: String },
}

/// The mail relay did not accept a contact notice.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("mail relay request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// The contact form could not hand a submission to the endpoint.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("contact endpoint answered {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("contact endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

/// Everything that can go wrong while handling a contact submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact submission failed validation")]
    Validation(ValidationErrors),

    #[error("request body is not a contact submission")]
    MalformedBody,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("mail relay credentials not configured")]
    NotConfigured,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// JSON body returned by the contact endpoint.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
}

impl ContactResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }
}

/// Language of every message the endpoint produces.
///
/// The contact form is rendered in both locales, but endpoint messages are
/// not localized per request.
pub const ENDPOINT_LOCALE: Locale = Locale::Ru;

pub const MSG_SENT: &str = "Сообщение успешно отправлено";
pub const MSG_ALL_FIELDS_REQUIRED: &str = "Все поля обязательны для заполнения";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_NOT_CONFIGURED: &str = "Сервер не настроен для отправки email";
pub const MSG_DELIVERY_FAILED: &str = "Ошибка при отправке сообщения. Попробуйте позже.";

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::Validation(_) | ContactError::MalformedBody => StatusCode::BAD_REQUEST,
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::NotConfigured | ContactError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ContactResponse {
        match self {
            ContactError::Validation(errors) => {
                let message = if errors.has_missing_fields() {
                    MSG_ALL_FIELDS_REQUIRED.to_string()
                } else {
                    errors
                        .first_message(ENDPOINT_LOCALE)
                        .unwrap_or_else(|| MSG_ALL_FIELDS_REQUIRED.to_string())
                };
                ContactResponse {
                    success: false,
                    message,
                    errors: errors.messages(ENDPOINT_LOCALE),
                }
            }
            ContactError::MalformedBody => ContactResponse::failure(MSG_ALL_FIELDS_REQUIRED),
            ContactError::MethodNotAllowed => ContactResponse::failure(MSG_METHOD_NOT_ALLOWED),
            ContactError::NotConfigured => ContactResponse::failure(MSG_NOT_CONFIGURED),
            ContactError::Delivery(_) => ContactResponse::failure(MSG_DELIVERY_FAILED),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
