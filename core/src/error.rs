//! Error types for the admin API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers act
//! on them directly (show "not found", drop the session). All other non-2xx
//! responses land in `HttpError` with the server's message and any per-field
//! messages it reported. Errors are `Clone` so a single in-flight result can
//! be handed to every caller waiting on it.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors returned by the client, the store and the form gates.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server returned 404; the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the session token (401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The server returned a non-2xx status other than 401 and 404.
    #[error("HTTP {status}: {message}")]
    HttpError {
        status: u16,
        message: String,
        fields: FieldErrors,
    },

    /// The host could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Client-side validation rejected the input; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Per-field messages carried by this error, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::HttpError { fields, .. } | ApiError::Validation(fields) if !fields.is_empty() => {
                Some(fields)
            }
            _ => None,
        }
    }
}

/// Field name to message, one message per field.
///
/// The first message recorded for a field wins, matching how a form shows a
/// single error line under each input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("price", "Price must be a number");
        errors.add("price", "Price must be greater than zero");
        assert_eq!(errors.get("price"), Some("Price must be a number"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn display_joins_fields_in_order() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Product Name is required");
        errors.add("color", "Color is required");
        assert_eq!(
            errors.to_string(),
            "color: Color is required; name: Product Name is required"
        );
    }

    #[test]
    fn field_errors_only_for_field_carrying_variants() {
        assert!(ApiError::NotFound.field_errors().is_none());
        let err = ApiError::HttpError {
            status: 500,
            message: "boom".into(),
            fields: FieldErrors::new(),
        };
        assert!(err.field_errors().is_none());
    }
}
