//! Form validators.
//!
//! Each form has a `*Form` struct deserialized straight from the request body
//! and a `validate` method that either yields the payload the backend expects
//! or a [`FieldErrors`] map with the Spanish message for every bad field.

pub mod contacto;
pub mod cuenta;
pub mod direccion;
pub mod inventario;
pub mod password;
pub mod servicio;

pub use contacto::{ContactoForm, MensajeContacto, Prioridad};
pub use cuenta::{Credenciales, LoginForm, ProfileForm, ProfileUpdate, Registro, RegistroForm};
pub use direccion::{DireccionForm, DireccionUpdate, ExtraInfoForm, NuevaDireccion};
pub use inventario::{MovimientoForm, MovimientoKind, MovimientoPayload};
pub use password::{
    ChangePassword, ChangePasswordForm, PasswordResetConfirm, PasswordResetConfirmForm,
    PasswordResetRequestForm, PasswordStrength,
};
pub use servicio::{GARANTIA_DIAS, ServicioForm, VentaServicioForm};

use serde::{Deserialize, Deserializer};

use crate::action::FieldErrors;

/// Trim `value` and check it is present and at most `max` characters.
///
/// Records `required` or `too_long` under `field` and returns the trimmed
/// value either way.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
    required: &str,
    too_long: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, required);
    } else if trimmed.chars().count() > max {
        errors.add(field, too_long);
    }
    trimmed.to_owned()
}

/// Trim an optional input, treating blank as absent.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Deserialize an HTML checkbox.
///
/// Browsers send `on` (or the `value` attribute) when checked and omit the
/// field otherwise; JSON clients send a boolean.
///
/// # Errors
///
/// Fails only when the input is neither a boolean nor a string.
pub fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Text(s) => matches!(s.trim(), "on" | "true" | "1" | "yes" | "si" | "sí"),
    })
}

/// Deserialize a form field that may be blank into `Option<String>`.
///
/// # Errors
///
/// Propagates the deserializer's error for non-string input.
pub fn blank_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(optional_text(raw.as_deref()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "checkbox")]
        flag: bool,
        #[serde(default, deserialize_with = "blank_as_none")]
        note: Option<String>,
    }

    #[test]
    fn test_checkbox_from_json_and_strings() {
        let f: Form = serde_json::from_str(r#"{"flag": true}"#).unwrap();
        assert!(f.flag);
        let f: Form = serde_json::from_str(r#"{"flag": "on"}"#).unwrap();
        assert!(f.flag);
        let f: Form = serde_json::from_str(r#"{"flag": "false"}"#).unwrap();
        assert!(!f.flag);
        let f: Form = serde_json::from_str("{}").unwrap();
        assert!(!f.flag);
    }

    #[test]
    fn test_blank_as_none() {
        let f: Form = serde_json::from_str(r#"{"note": "   "}"#).unwrap();
        assert_eq!(f.note, None);
        let f: Form = serde_json::from_str(r#"{"note": " hola "}"#).unwrap();
        assert_eq!(f.note.as_deref(), Some("hola"));
    }

    #[test]
    fn test_required_text_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        let value = required_text(&mut errors, "city", &"ñ".repeat(100), 100, "req", "long");
        assert!(errors.is_empty());
        assert_eq!(value.chars().count(), 100);

        required_text(&mut errors, "city", "   ", 100, "req", "long");
        assert_eq!(errors.first("city"), Some("req"));
    }
}
