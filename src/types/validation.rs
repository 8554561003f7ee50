use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Display;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("compile email regex")
});

pub const NAME_MIN: usize = 1;
pub const NAME_MAX: usize = 80;

pub const EMAIL_MIN: usize = 10;
pub const EMAIL_MAX: usize = 100;

pub const ROLE_MIN: usize = 1;
pub const ROLE_MAX: usize = 80;

pub const REQUIRED: &str = "is required";

/// Field-level validation failures, kept in insertion order.
///
/// It serializes as a list of `{ "field": ..., "message": ... }` objects
/// so clients can show every problem of a form at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    entries: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl ValidationError {
    #[must_use]
    pub fn builder() -> ValidationErrorBuilder {
        ValidationErrorBuilder(Self::default())
    }

    /// Shorthand for an error with a single field message.
    #[must_use]
    pub fn field(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let mut builder = Self::builder();
        builder.insert(field, message);
        builder.build()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_ref(), m.as_ref()))
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
#[must_use]
pub struct ValidationErrorBuilder(ValidationError);

impl ValidationErrorBuilder {
    pub fn insert(
        &mut self,
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> &mut Self {
        self.0.entries.push((field.into(), message.into()));
        self
    }

    pub fn extend(&mut self, other: ValidationError) -> &mut Self {
        self.0.entries.extend(other.entries);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn build(self) -> ValidationError {
        self.0
    }
}

#[derive(Deserialize, Serialize)]
struct Entry<'a> {
    field: Cow<'a, str>,
    message: Cow<'a, str>,
}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (field, message) in self.iter() {
            seq.serialize_element(&Entry {
                field: Cow::Borrowed(field),
                message: Cow::Borrowed(message),
            })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ValidationError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<Entry<'static>>::deserialize(deserializer)?;
        Ok(Self {
            entries: entries.into_iter().map(|e| (e.field, e.message)).collect(),
        })
    }
}

/// Checks the address format. IP literal hosts (`user@[127.0.0.1]`) are
/// rejected by the pattern itself.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Length checks are done on characters, not bytes.
fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_name(builder: &mut ValidationErrorBuilder, field: &'static str, name: &str) {
    let len = char_len(name);
    if len < NAME_MIN || len > NAME_MAX {
        builder.insert(
            field,
            format!("{field} must be between {NAME_MIN} and {NAME_MAX} characters"),
        );
    }
}

pub fn validate_email(builder: &mut ValidationErrorBuilder, field: &'static str, email: &str) {
    let len = char_len(email);
    if len < EMAIL_MIN || len > EMAIL_MAX {
        builder.insert(
            field,
            format!("{field} must be between {EMAIL_MIN} and {EMAIL_MAX} characters"),
        );
    }
    if !is_valid_email(email) {
        builder.insert(field, format!("{field} must be an email"));
    }
}

pub fn validate_roles(builder: &mut ValidationErrorBuilder, field: &'static str, roles: &[String]) {
    let invalid = roles.iter().any(|v| {
        let len = char_len(v);
        !(ROLE_MIN..=ROLE_MAX).contains(&len)
    });
    if invalid {
        builder.insert(field, "roles must be an array of strings");
    }
}
