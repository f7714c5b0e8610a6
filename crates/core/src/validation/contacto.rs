//! Contact form.

use serde::{Deserialize, Serialize};

use super::cuenta::{check_email, is_valid_phone};
use super::{blank_as_none, checkbox, required_text};
use crate::action::FieldErrors;
use crate::types::Email;

/// How soon the sender expects an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prioridad {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Prioridad {
    pub const ALL: [Self; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    /// Form value.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Normal => "Normal",
            Self::High => "Alta",
            Self::Urgent => "Urgente",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// Body of the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactoForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub terms: bool,
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MensajeContacto {
    pub nombre: String,
    pub email: Email,
    pub telefono: Option<String>,
    pub asunto: String,
    pub mensaje: String,
    pub prioridad: Prioridad,
}

impl ContactoForm {
    /// # Errors
    ///
    /// Name, email, subject and message are required, the phone is optional
    /// but must look like one, and the terms must be accepted.
    pub fn validate(&self) -> Result<MensajeContacto, FieldErrors> {
        let mut errors = FieldErrors::new();

        let nombre = required_text(
            &mut errors,
            "name",
            &self.name,
            100,
            "El nombre es requerido",
            "El nombre no puede exceder 100 caracteres",
        );
        let email = check_email(&mut errors, &self.email);
        if self.phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
            errors.add("phone", "Por favor ingresa un teléfono válido");
        }
        let asunto = required_text(
            &mut errors,
            "subject",
            &self.subject,
            150,
            "El asunto es requerido",
            "El asunto no puede exceder 150 caracteres",
        );
        let mensaje = required_text(
            &mut errors,
            "message",
            &self.message,
            2000,
            "El mensaje es requerido",
            "El mensaje no puede exceder 2000 caracteres",
        );
        let prioridad = match self.priority.as_deref() {
            None => Prioridad::default(),
            Some(raw) => Prioridad::from_code(raw).unwrap_or_else(|| {
                errors.add("priority", "Prioridad inválida");
                Prioridad::default()
            }),
        };
        if !self.terms {
            errors.add("terms", "Debes aceptar los términos y condiciones");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(MensajeContacto {
                nombre,
                email,
                telefono: self.phone.clone(),
                asunto,
                mensaje,
                prioridad,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ContactoForm {
        ContactoForm {
            name: " Rosa Martínez ".into(),
            email: "rosa@example.com".into(),
            phone: Some("+52 222 123 4567".into()),
            subject: "Cotización".into(),
            message: "¿Tienen termostato para refrigerador Mabe?".into(),
            priority: None,
            terms: true,
        }
    }

    #[test]
    fn test_valid_message_defaults_priority() {
        let mensaje = valid_form().validate().unwrap();
        assert_eq!(mensaje.nombre, "Rosa Martínez");
        assert_eq!(mensaje.prioridad, Prioridad::Normal);
        assert_eq!(mensaje.email.as_str(), "rosa@example.com");
    }

    #[test]
    fn test_required_fields_and_terms() {
        let errors = ContactoForm::default().validate().unwrap_err();
        assert_eq!(errors.first("name"), Some("El nombre es requerido"));
        assert!(errors.contains("email"));
        assert_eq!(errors.first("subject"), Some("El asunto es requerido"));
        assert_eq!(errors.first("message"), Some("El mensaje es requerido"));
        assert_eq!(
            errors.first("terms"),
            Some("Debes aceptar los términos y condiciones")
        );
        assert!(!errors.contains("phone"));
    }

    #[test]
    fn test_rejects_bad_phone_and_priority() {
        let form = ContactoForm {
            phone: Some("llámame".into()),
            priority: Some("ya".into()),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("phone"));
        assert_eq!(errors.first("priority"), Some("Prioridad inválida"));

        let form = ContactoForm {
            priority: Some("urgent".into()),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().prioridad, Prioridad::Urgent);
    }
}
