use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Content
    pub locales_dir: PathBuf,
    pub static_dir: PathBuf,
    pub resume_dir: PathBuf,

    // Contact form delivery (None = endpoint answers 500)
    pub mail: Option<MailRelayConfig>,
}

/// Mail relay credentials for contact form delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRelayConfig {
    pub url: String,
    pub token: String,
    pub sender: String,
    pub recipient: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let static_dir: PathBuf = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "public".to_string())
            .into();

        Ok(Self {
            port: match std::env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("PORT is not a valid port number: {}", port))?,
                Err(_) => 3000,
            },

            locales_dir: std::env::var("LOCALES_DIR")
                .unwrap_or_else(|_| "locales".to_string())
                .into(),
            resume_dir: std::env::var("RESUME_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| static_dir.join("resume")),
            static_dir,

            mail: MailRelayConfig::from_env(),
        })
    }
}

impl MailRelayConfig {
    /// Relay settings, or `None` when URL, token or sender is missing.
    ///
    /// The recipient defaults to the sender address.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let url = var("MAIL_RELAY_URL")?;
        let token = var("MAIL_RELAY_TOKEN")?;
        let sender = var("MAIL_SENDER")?;
        let recipient = var("CONTACT_EMAIL").unwrap_or_else(|| sender.clone());

        Some(Self {
            url,
            token,
            sender,
            recipient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "LOCALES_DIR",
        "STATIC_DIR",
        "RESUME_DIR",
        "MAIL_RELAY_URL",
        "MAIL_RELAY_TOKEN",
        "MAIL_SENDER",
        "CONTACT_EMAIL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should load defaults");
        assert_eq!(config.port, 3000);
        assert_eq!(config.locales_dir, PathBuf::from("locales"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.resume_dir, PathBuf::from("public").join("resume"));
        assert!(config.mail.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_error() {
        clear_env();
        std::env::set_var("PORT", "eighty");
        let result = Config::from_env();
        clear_env();
        assert!(result.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    #[serial]
    fn test_mail_relay_recipient_defaults_to_sender() {
        clear_env();
        std::env::set_var("MAIL_RELAY_URL", "https://relay.example.com/send");
        std::env::set_var("MAIL_RELAY_TOKEN", "secret");
        std::env::set_var("MAIL_SENDER", "site@example.com");
        let mail = Config::from_env().expect("Should load").mail;
        clear_env();

        let mail = mail.expect("Mail should be configured");
        assert_eq!(mail.recipient, "site@example.com");
        assert_eq!(mail.token, "secret");
    }

    #[test]
    #[serial]
    fn test_mail_relay_requires_token() {
        clear_env();
        std::env::set_var("MAIL_RELAY_URL", "https://relay.example.com/send");
        std::env::set_var("MAIL_SENDER", "site@example.com");
        std::env::set_var("MAIL_RELAY_TOKEN", "  ");
        let mail = MailRelayConfig::from_env();
        clear_env();
        assert!(mail.is_none());
    }

    #[test]
    #[serial]
    fn test_explicit_contact_email() {
        clear_env();
        std::env::set_var("MAIL_RELAY_URL", "https://relay.example.com/send");
        std::env::set_var("MAIL_RELAY_TOKEN", "secret");
        std::env::set_var("MAIL_SENDER", "site@example.com");
        std::env::set_var("CONTACT_EMAIL", "me@example.com");
        let mail = MailRelayConfig::from_env();
        clear_env();
        assert_eq!(mail.map(|m| m.recipient), Some("me@example.com".to_string()));
    }
}
