//! Contact form validation shared by the form model and the contact endpoint.
//!
//! The endpoint is the authority: the form runs the same rules only to give
//! faster feedback, and the server always re-validates and escapes.

use crate::i18n::Locale;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// A contact form field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    InvalidFormat,
}

impl FieldError {
    /// Human-readable message for `field` in `locale`.
    pub fn message(&self, field: Field, locale: Locale) -> String {
        match locale {
            Locale::Ru => self.message_ru(field),
            Locale::En => self.message_en(field),
        }
    }

    fn message_ru(&self, field: Field) -> String {
        let (subject, must, must_not) = match field {
            Field::Name => ("Имя", "должно", "не должно"),
            Field::Email => ("Email", "должен", "не должен"),
            Field::Message => ("Сообщение", "должно", "не должно"),
        };
        match self {
            FieldError::Required => match field {
                Field::Name => "Введите имя".to_string(),
                Field::Email => "Введите email".to_string(),
                Field::Message => "Введите сообщение".to_string(),
            },
            FieldError::TooShort { min } => format!(
                "{} {} содержать минимум {} {}",
                subject,
                must,
                min,
                ru_characters(*min)
            ),
            FieldError::TooLong { max } => format!(
                "{} {} превышать {} {}",
                subject,
                must_not,
                max,
                ru_characters(*max)
            ),
            FieldError::InvalidCharacters => format!("{} содержит недопустимые символы", subject),
            FieldError::InvalidFormat => "Некорректный email адрес".to_string(),
        }
    }

    fn message_en(&self, field: Field) -> String {
        let subject = match field {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Message => "Message",
        };
        match self {
            FieldError::Required => format!("{} is required", subject),
            FieldError::TooShort { min } => {
                format!("{} must be at least {} characters long", subject, min)
            }
            FieldError::TooLong { max } => {
                format!("{} must not exceed {} characters", subject, max)
            }
            FieldError::InvalidCharacters => format!("{} contains invalid characters", subject),
            FieldError::InvalidFormat => "Invalid email address".to_string(),
        }
    }
}

/// Russian plural of "символ" for `n`.
fn ru_characters(n: usize) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "символ",
        (2..=4, r) if !(12..=14).contains(&r) => "символа",
        _ => "символов",
    }
}

/// Raw contact form payload. Missing JSON fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        }
    }
}

/// A submission that passed every rule, with trimmed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Field-level validation failures. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }

    pub fn remove(&mut self, field: Field) {
        self.errors.remove(&field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(field, error)| (*field, *error))
    }

    /// Whether any field was left empty.
    pub fn has_missing_fields(&self) -> bool {
        self.errors.values().any(|e| *e == FieldError::Required)
    }

    /// Message of the first failing field, in form order.
    pub fn first_message(&self, locale: Locale) -> Option<String> {
        self.iter()
            .next()
            .map(|(field, error)| error.message(field, locale))
    }

    /// Field name to message, for JSON responses and inline display.
    pub fn messages(&self, locale: Locale) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(field, error)| (field.as_str(), error.message(field, locale)))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.keys().map(|field| field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

fn email_shape() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c.is_whitespace() || c == '-' || c == '\''
}

/// Check one field. `value` is trimmed first.
///
/// Rules run in order presence, minimum length, maximum length, character
/// class; the first failure wins.
pub fn validate_field(field: Field, value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Some(FieldError::Required);
    }

    let chars = value.chars().count();
    match field {
        Field::Name => {
            if chars < NAME_MIN_CHARS {
                Some(FieldError::TooShort { min: NAME_MIN_CHARS })
            } else if chars > NAME_MAX_CHARS {
                Some(FieldError::TooLong { max: NAME_MAX_CHARS })
            } else if !value.chars().all(is_name_char) {
                Some(FieldError::InvalidCharacters)
            } else {
                None
            }
        }
        Field::Email => {
            if chars > EMAIL_MAX_CHARS {
                Some(FieldError::TooLong { max: EMAIL_MAX_CHARS })
            } else if !email_shape().is_match(value) {
                Some(FieldError::InvalidFormat)
            } else {
                None
            }
        }
        Field::Message => {
            if chars < MESSAGE_MIN_CHARS {
                Some(FieldError::TooShort { min: MESSAGE_MIN_CHARS })
            } else if chars > MESSAGE_MAX_CHARS {
                Some(FieldError::TooLong { max: MESSAGE_MAX_CHARS })
            } else {
                None
            }
        }
    }
}

/// Validate every field of a submission.
pub fn validate(submission: &ContactSubmission) -> Result<ValidContact, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for field in Field::ALL {
        if let Some(error) = validate_field(field, submission.get(field)) {
            errors.insert(field, error);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidContact {
        name: submission.name.trim().to_string(),
        email: submission.email.trim().to_string(),
        message: submission.message.trim().to_string(),
    })
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
