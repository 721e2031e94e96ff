//! Contact form state on the visitor's side.
//!
//! Runs the shared validator on change and blur for quick feedback, and
//! guards submission so only one request is outstanding at a time. The
//! endpoint re-validates everything; nothing here is trusted.

use crate::error::SubmitError;
use crate::i18n::Locale;
use crate::validation::{validate, validate_field, ContactSubmission, Field, ValidationErrors};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Sends a submission to the contact endpoint.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmitError>;
}

#[derive(Debug, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

/// Posts submissions as JSON to the site's `/api/contact` endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmitTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubmitTransport for HttpSubmitTransport {
    async fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmitError> {
        let response = self.client.post(&self.endpoint).json(submission).send().await?;
        let status = response.status();
        let reply: Option<EndpointReply> = response.json().await.ok();

        match reply {
            Some(reply) if status.is_success() && reply.success => Ok(()),
            reply => Err(SubmitError::Rejected {
                status: status.as_u16(),
                message: reply.map(|r| r.message).unwrap_or_default(),
            }),
        }
    }
}

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Sent,
    /// Delivery failed; the message is not tied to a field
    Failed(String),
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    /// Field errors were found; nothing was sent
    Invalid,
    /// The request failed; field values are kept for a retry
    Failed,
    /// A submission is already in flight
    Busy,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    locale: Locale,
    values: ContactSubmission,
    touched: BTreeSet<Field>,
    errors: ValidationErrors,
    status: FormStatus,
}

impl ContactForm {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            values: ContactSubmission::default(),
            touched: BTreeSet::new(),
            errors: ValidationErrors::default(),
            status: FormStatus::Idle,
        }
    }

    pub fn values(&self) -> &ContactSubmission {
        &self.values
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// The submit button is disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        self.status != FormStatus::Submitting
    }

    /// Inline message for `field`, if it currently has an error.
    pub fn error(&self, field: Field) -> Option<String> {
        self.errors
            .get(field)
            .map(|error| error.message(field, self.locale))
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Update a field. Touched fields are revalidated immediately.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.values.get_mut(field) = value.into();
        if self.touched.contains(&field) {
            self.revalidate(field);
        }
    }

    /// The field lost focus: mark it touched and validate it.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    fn revalidate(&mut self, field: Field) {
        match validate_field(field, self.values.get(field)) {
            Some(error) => self.errors.insert(field, error),
            None => self.errors.remove(field),
        }
    }

    /// Start a submission. Returns the payload to send, or the outcome
    /// that ends the attempt without a request.
    pub fn begin_submit(&mut self) -> Result<ContactSubmission, SubmitOutcome> {
        if self.status == FormStatus::Submitting {
            return Err(SubmitOutcome::Busy);
        }

        self.touched.extend(Field::ALL);
        if let Err(errors) = validate(&self.values) {
            debug!("Contact form has {} invalid field(s)", errors.len());
            self.errors = errors;
            return Err(SubmitOutcome::Invalid);
        }

        self.errors = ValidationErrors::default();
        self.status = FormStatus::Submitting;
        Ok(self.values.clone())
    }

    /// Record the result of a submission and re-enable the form.
    pub fn finish_submit(&mut self, result: Result<(), SubmitError>) -> SubmitOutcome {
        match result {
            Ok(()) => {
                self.values = ContactSubmission::default();
                self.touched.clear();
                self.status = FormStatus::Sent;
                SubmitOutcome::Sent
            }
            Err(e) => {
                warn!("Contact form submission failed: {}", e);
                self.status = FormStatus::Failed(delivery_failed_message(self.locale).to_string());
                SubmitOutcome::Failed
            }
        }
    }

    /// Validate and send the form through `transport`.
    pub async fn submit(&mut self, transport: &dyn SubmitTransport) -> SubmitOutcome {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(outcome) => return outcome,
        };
        let result = transport.submit(&submission).await;
        self.finish_submit(result)
    }
}

fn delivery_failed_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Ошибка при отправке сообщения. Попробуйте позже.",
        Locale::En => "Failed to send the message. Please try again later.",
    }
}
