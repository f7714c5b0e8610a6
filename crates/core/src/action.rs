//! Result shape returned by every form action.
//!
//! ```json
//! { "success": false, "error": { "postal_code": { "_errors": ["..."] } } }
//! { "success": false, "error": "Servicio no disponible. Intente más tarde." }
//! { "success": true,  "error": null, "data": { ... } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shown when the backend cannot be reached at all.
pub const SERVICE_UNAVAILABLE: &str = "Servicio no disponible. Intente más tarde.";

/// Messages attached to a single form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMessages {
    #[serde(rename = "_errors")]
    pub errors: Vec<String>,
}

/// Per-field validation errors keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, FieldMessages>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0
            .entry(field.into())
            .or_default()
            .errors
            .push(message.into());
    }

    /// Builder form of [`FieldErrors::add`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// All messages for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], |m| m.errors.as_slice())
    }

    /// First message for `field`, which is what forms render under the input.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.errors.as_slice()))
    }

    /// `Ok(value)` when no errors were collected.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field has a message.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Read a Django REST Framework validation body.
    ///
    /// DRF answers 400 with `{"field": ["msg", ...], ...}`. `detail` and
    /// `non_field_errors` are not field errors and are skipped. Returns `None`
    /// when the body has no field entries.
    #[must_use]
    pub fn from_drf(body: &serde_json::Value) -> Option<Self> {
        let object = body.as_object()?;
        let mut errors = Self::new();
        for (field, value) in object {
            if field == "detail" || field == "non_field_errors" {
                continue;
            }
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let Some(message) = item.as_str() {
                            errors.add(field.as_str(), message);
                        }
                    }
                }
                serde_json::Value::String(message) => errors.add(field.as_str(), message.as_str()),
                _ => {}
            }
        }
        (!errors.is_empty()).then_some(errors)
    }
}

/// The `error` member of an [`ActionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionError {
    /// A toast/banner message.
    Message(String),
    /// Inline messages under each offending field.
    Fields(FieldErrors),
}

impl From<FieldErrors> for ActionError {
    fn from(errors: FieldErrors) -> Self {
        Self::Fields(errors)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

/// The human-readable message of a backend error body.
///
/// Looks at `detail` (a string, or the first entry of a list) and then at the
/// first `non_field_errors` entry.
#[must_use]
pub fn drf_message(body: &serde_json::Value) -> Option<String> {
    let first_str = |value: &serde_json::Value| match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()).map(str::to_owned),
        _ => None,
    };
    body.get("detail")
        .and_then(first_str)
        .or_else(|| body.get("non_field_errors").and_then(first_str))
        .filter(|m| !m.trim().is_empty())
}

/// Outcome of a form action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState<T> {
    pub success: bool,
    pub error: Option<ActionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> ActionState<T> {
    /// State before the form has been submitted.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            success: false,
            error: None,
            data: None,
        }
    }

    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    #[must_use]
    pub const fn done() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<ActionError>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }

    /// Field errors, if the failure was a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match &self.error {
            Some(ActionError::Fields(errors)) => Some(errors),
            _ => None,
        }
    }

    /// First message for `field`, empty when there is none.
    #[must_use]
    pub fn field_error(&self, field: &str) -> &str {
        self.field_errors()
            .and_then(|e| e.first(field))
            .unwrap_or_default()
    }

    /// The toast message, if the failure was not field-scoped.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.error {
            Some(ActionError::Message(message)) => Some(message),
            _ => None,
        }
    }

    /// Convert the payload, keeping the outcome.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionState<U> {
        ActionState {
            success: self.success,
            error: self.error,
            data: self.data.map(f),
        }
    }
}

impl<T, E: Into<ActionError>> From<Result<T, E>> for ActionState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::failed(error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_errors_serialize_with_underscore_errors() {
        let state: ActionState<()> = ActionState::failed(
            FieldErrors::new().with("postal_code", "El código postal es requerido"),
        );
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "success": false,
                "error": { "postal_code": { "_errors": ["El código postal es requerido"] } }
            })
        );
    }

    #[test]
    fn test_message_error_serializes_as_string() {
        let state: ActionState<()> = ActionState::failed("Error al crear la dirección");
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({ "success": false, "error": "Error al crear la dirección" })
        );
        assert_eq!(state.message(), Some("Error al crear la dirección"));
    }

    #[test]
    fn test_success_serializes_null_error_and_data() {
        let state = ActionState::ok(json!({ "id": 3 }));
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({ "success": true, "error": null, "data": { "id": 3 } })
        );
    }

    #[test]
    fn test_deserialize_both_error_shapes() {
        let fields: ActionState<()> =
            serde_json::from_str(r#"{"success":false,"error":{"city":{"_errors":["x"]}}}"#).unwrap();
        assert_eq!(fields.field_error("city"), "x");

        let message: ActionState<()> =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert_eq!(message.message(), Some("boom"));
        assert_eq!(message.field_error("city"), "");
    }

    #[test]
    fn test_from_drf_skips_detail_and_non_field_errors() {
        let body = json!({
            "email": ["Ya existe un usuario con este email."],
            "username": "Requerido",
            "detail": "ignored",
            "non_field_errors": ["ignored"]
        });
        let errors = FieldErrors::from_drf(&body).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first("email"), Some("Ya existe un usuario con este email."));
        assert_eq!(errors.first("username"), Some("Requerido"));
        assert!(FieldErrors::from_drf(&json!({ "detail": "x" })).is_none());
        assert!(FieldErrors::from_drf(&json!("x")).is_none());
    }

    #[test]
    fn test_drf_message_precedence() {
        assert_eq!(
            drf_message(&json!({ "detail": "Sin stock", "non_field_errors": ["otro"] })).as_deref(),
            Some("Sin stock")
        );
        assert_eq!(
            drf_message(&json!({ "detail": ["Primero", "Segundo"] })).as_deref(),
            Some("Primero")
        );
        assert_eq!(
            drf_message(&json!({ "non_field_errors": ["Credenciales inválidas"] })).as_deref(),
            Some("Credenciales inválidas")
        );
        assert_eq!(drf_message(&json!({ "email": ["x"] })), None);
        assert_eq!(drf_message(&json!({ "detail": "  " })), None);
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FieldErrors::new().into_result(5), Ok(5));
        assert!(FieldErrors::new().with("a", "b").into_result(5).is_err());
    }
}
