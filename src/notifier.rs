use crate::config::MailRelayConfig;
use crate::error::DeliveryError;
use crate::validation::{escape_html, ValidContact};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Display name used in the `From` header of contact notices.
const SENDER_NAME: &str = "Portfolio Contact Form";

/// A validated contact submission, rendered for delivery.
///
/// `html` contains only escaped visitor input; `text` uses the trimmed input
/// as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNotice {
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl ContactNotice {
    pub fn from_contact(contact: &ValidContact, received_at: DateTime<Utc>) -> Self {
        let safe_name = escape_html(&contact.name);
        let safe_email = escape_html(&contact.email);
        let safe_message = escape_html(&contact.message);
        let received = received_at.format("%Y-%m-%d %H:%M UTC");

        let subject = format!("Новое сообщение от {} через форму портфолио", safe_name);

        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Новое сообщение из формы контактов</h2>
  <div style="background-color: #f5f5f5; padding: 20px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Имя:</strong> {}</p>
    <p><strong>Email:</strong> {}</p>
    <p><strong>Сообщение:</strong></p>
    <p style="white-space: pre-wrap; margin-top: 10px;">{}</p>
  </div>
  <p style="color: #666; font-size: 12px;">Получено {}</p>
</div>"#,
            safe_name, safe_email, safe_message, received
        );

        let text = format!(
            "Новое сообщение из формы контактов\n\nИмя: {}\nEmail: {}\n\nСообщение:\n{}\n\nПолучено {}\n",
            contact.name, contact.email, contact.message, received
        );

        Self {
            reply_to: contact.email.clone(),
            subject,
            html,
            text,
            received_at,
        }
    }
}

/// Delivers contact notices to the site owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notice: &ContactNotice) -> Result<(), DeliveryError>;
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: String,
    to: &'a str,
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends notices through an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct MailRelayNotifier {
    client: reqwest::Client,
    config: MailRelayConfig,
}

impl MailRelayNotifier {
    pub fn new(config: MailRelayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn deliver(&self, notice: &ContactNotice) -> Result<(), DeliveryError> {
        let request = RelayRequest {
            from: format!("\"{}\" <{}>", SENDER_NAME, self.config.sender),
            to: &self.config.recipient,
            reply_to: &notice.reply_to,
            subject: &notice.subject,
            html: &notice.html,
            text: &notice.text,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        info!("Contact notice delivered to {}", self.config.recipient);
        Ok(())
    }
}
