//! Login, registration and profile forms.

use serde::{Deserialize, Serialize};

use super::password::check_password;
use super::{blank_as_none, checkbox, optional_text};
use crate::action::FieldErrors;
use crate::types::{Email, PostalCode};

const EMAIL_REQUIRED: &str = "El correo electrónico es requerido";
const EMAIL_INVALID: &str = "Por favor ingresa un email válido";

pub(super) fn check_email(errors: &mut FieldErrors, raw: &str) -> Option<Email> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add("email", EMAIL_REQUIRED);
        return None;
    }
    Email::parse(trimmed)
        .map_err(|_| errors.add("email", EMAIL_INVALID))
        .ok()
}

/// `[\d\s\-+()]+`
pub(super) fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || "-+()".contains(c))
}

/// Body of the login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub remember: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub next: Option<String>,
}

/// Payload for `POST /user/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credenciales {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns a message on each blank field.
    pub fn validate(&self) -> Result<Credenciales, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            errors.add("email", EMAIL_REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", "La contraseña es requerida");
        }
        errors.into_result(Credenciales {
            email,
            password: self.password.clone(),
        })
    }

    /// Where to go after login; only same-site paths are honored.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => "/",
        }
    }
}

/// Body of the registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistroForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Payload for `POST /user/registro/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registro {
    pub username: String,
    pub phone: String,
    pub email: Email,
    pub password: String,
}

impl RegistroForm {
    /// # Errors
    ///
    /// Returns one entry per offending field.
    pub fn validate(&self) -> Result<Registro, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = self.name.trim();
        if username.is_empty() {
            errors.add("name", "El nombre de usuario es requerido");
        } else if username.chars().count() > 150 {
            errors.add("name", "El nombre no puede exceder 150 caracteres");
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.add("phone", "El teléfono es requerido");
        } else if !is_valid_phone(phone) {
            errors.add("phone", "Por favor ingresa un teléfono válido");
        }

        let email = check_email(&mut errors, &self.email.to_lowercase());
        check_password(&mut errors, "password", &self.password);
        if self.password != self.password_confirm {
            errors.add("password_confirm", "Las contraseñas no coinciden");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(Registro {
                username: username.to_owned(),
                phone: phone.to_owned(),
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Body of the profile edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub address_street: String,
    #[serde(default)]
    pub address_colony: String,
    #[serde(default)]
    pub address_city: String,
    #[serde(default)]
    pub address_state: String,
    #[serde(default)]
    pub address_postal_code: String,
    #[serde(default)]
    pub address_references: String,
}

/// Payload for `PATCH /user/user-profile/update/`. Blank fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_colony: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_postal_code: Option<PostalCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_references: Option<String>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Email is required; phone and postal code are checked when present.
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = check_email(&mut errors, &self.email);

        let phone = optional_text(Some(&self.phone));
        if phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
            errors.add("phone", "Por favor ingresa un teléfono válido");
        }

        let address_postal_code = if PostalCode::normalize(&self.address_postal_code).is_empty() {
            None
        } else {
            PostalCode::parse(&self.address_postal_code)
                .map_err(|_| {
                    errors.add(
                        "address_postal_code",
                        "El código postal debe tener 5 dígitos",
                    );
                })
                .ok()
        };

        errors.into_result(ProfileUpdate {
            first_name: optional_text(Some(&self.first_name)),
            last_name: optional_text(Some(&self.last_name)),
            email,
            phone,
            bio: optional_text(Some(&self.bio)),
            address_street: optional_text(Some(&self.address_street)),
            address_colony: optional_text(Some(&self.address_colony)),
            address_city: optional_text(Some(&self.address_city)),
            address_state: optional_text(Some(&self.address_state)),
            address_postal_code,
            address_references: optional_text(Some(&self.address_references)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));

        let form = LoginForm {
            email: " Ana@Correo.mx ".into(),
            password: "x".into(),
            ..LoginForm::default()
        };
        assert_eq!(form.validate().unwrap().email, "ana@correo.mx");
    }

    #[test]
    fn test_login_redirect_target_rejects_offsite() {
        let mut form = LoginForm {
            next: Some("/checkout".into()),
            ..LoginForm::default()
        };
        assert_eq!(form.redirect_target(), "/checkout");
        form.next = Some("//evil.example".into());
        assert_eq!(form.redirect_target(), "/");
        form.next = Some("https://evil.example".into());
        assert_eq!(form.redirect_target(), "/");
    }

    #[test]
    fn test_registro_payload_uses_username() {
        let form = RegistroForm {
            name: "ana".into(),
            phone: "222 123 4567".into(),
            email: "Ana@Correo.mx".into(),
            password: "Segura#2025".into(),
            password_confirm: "Segura#2025".into(),
        };
        let json = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "username": "ana",
                "phone": "222 123 4567",
                "email": "ana@correo.mx",
                "password": "Segura#2025"
            })
        );
    }

    #[test]
    fn test_registro_reports_mismatch_and_weak_password() {
        let form = RegistroForm {
            name: "ana".into(),
            phone: "2221234567".into(),
            email: "ana@correo.mx".into(),
            password: "debil".into(),
            password_confirm: "otra".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("password"));
        assert_eq!(errors.first("password_confirm"), Some("Las contraseñas no coinciden"));
    }

    #[test]
    fn test_profile_email_rules() {
        let errors = ProfileForm::default().validate().unwrap_err();
        assert_eq!(errors.first("email"), Some(EMAIL_REQUIRED));

        let form = ProfileForm {
            email: "sin-arroba".into(),
            ..ProfileForm::default()
        };
        assert_eq!(form.validate().unwrap_err().first("email"), Some(EMAIL_INVALID));
    }

    #[test]
    fn test_profile_phone_and_postal_code() {
        let form = ProfileForm {
            email: "ana@correo.mx".into(),
            phone: "abc".into(),
            address_postal_code: "123".into(),
            ..ProfileForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("phone"));
        assert_eq!(
            errors.first("address_postal_code"),
            Some("El código postal debe tener 5 dígitos")
        );
    }

    #[test]
    fn test_profile_update_omits_blank_fields() {
        let form = ProfileForm {
            email: "ana@correo.mx".into(),
            phone: "+52 (222) 123-4567".into(),
            address_postal_code: "72 000".into(),
            ..ProfileForm::default()
        };
        let json = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "email": "ana@correo.mx",
                "phone": "+52 (222) 123-4567",
                "address_postal_code": "72000"
            })
        );
    }
}
