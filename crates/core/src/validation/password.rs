//! Password rules, strength meter and the reset/change forms.

use serde::{Deserialize, Serialize};

use crate::action::FieldErrors;
use crate::types::Email;

/// Characters that satisfy the "special character" rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Minimum password length, in characters.
pub const MIN_LENGTH: usize = 8;

const MIN_LENGTH_MSG: &str = "La contraseña debe tener al menos 8 caracteres";
const UPPERCASE_MSG: &str = "La contraseña debe contener al menos una letra mayúscula";
const NUMBER_MSG: &str = "La contraseña debe contener al menos un número";
const SPECIAL_MSG: &str = "La contraseña debe contener al menos un carácter especial (!@#$%^&*...)";
const MISMATCH_MSG: &str = "Las contraseñas no coinciden";

/// Which password requirements are met, and the resulting score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_special: bool,
}

impl PasswordStrength {
    #[must_use]
    pub fn of(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_LENGTH,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_special: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        }
    }

    /// Number of requirements met, 0 to 4.
    #[must_use]
    pub fn score(&self) -> u8 {
        [
            self.min_length,
            self.has_uppercase,
            self.has_number,
            self.has_special,
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.score() {
            0 => "muy débil",
            1 => "débil",
            2 => "media",
            3 => "fuerte",
            _ => "muy fuerte",
        }
    }

    /// Unmet requirements, in the order the form lists them.
    #[must_use]
    pub fn errors(&self) -> Vec<&'static str> {
        [
            (self.min_length, MIN_LENGTH_MSG),
            (self.has_uppercase, UPPERCASE_MSG),
            (self.has_number, NUMBER_MSG),
            (self.has_special, SPECIAL_MSG),
        ]
        .into_iter()
        .filter(|(met, _)| !met)
        .map(|(_, msg)| msg)
        .collect()
    }
}

/// Record every unmet requirement of `password` under `field`.
pub(crate) fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    for message in PasswordStrength::of(password).errors() {
        errors.add(field, message);
    }
}

/// Body of the "olvidé mi contraseña" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordResetRequestForm {
    #[serde(default)]
    pub email: String,
}

impl PasswordResetRequestForm {
    /// Trim and lowercase the email before checking it.
    ///
    /// # Errors
    ///
    /// Returns a message on `email` when it is blank or malformed.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        if self.email.trim().is_empty() {
            return Err(FieldErrors::new().with("email", "El correo electrónico es requerido"));
        }
        Email::parse_normalized(&self.email).map_err(|_| {
            FieldErrors::new().with("email", "Por favor ingresa un correo electrónico válido")
        })
    }
}

/// Body of the reset form reached from the emailed link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordResetConfirmForm {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Payload for `POST /user/password-reset/confirm/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetConfirm {
    pub uid: String,
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

impl PasswordResetConfirmForm {
    /// # Errors
    ///
    /// Returns the unmet password rules on `password` and a mismatch on
    /// `password_confirm`.
    pub fn validate(&self) -> Result<PasswordResetConfirm, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.uid.trim().is_empty() {
            errors.add("uid", "UID requerido");
        }
        if self.token.trim().is_empty() {
            errors.add("token", "Token requerido");
        }
        check_password(&mut errors, "password", &self.password);
        if self.password_confirm.is_empty() {
            errors.add("password_confirm", "Confirma tu contraseña");
        } else if self.password != self.password_confirm {
            errors.add("password_confirm", MISMATCH_MSG);
        }

        errors.into_result(PasswordResetConfirm {
            uid: self.uid.trim().to_owned(),
            token: self.token.trim().to_owned(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        })
    }
}

/// Body of the change-password form on the profile page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub new_password_confirm: String,
}

/// Payload for `POST /user/user-profile/change-password/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl ChangePasswordForm {
    /// # Errors
    ///
    /// Returns one entry per offending field.
    pub fn validate(&self) -> Result<ChangePassword, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.current_password.is_empty() {
            errors.add("current_password", "La contraseña actual es requerida");
        }
        check_password(&mut errors, "new_password", &self.new_password);
        if self.new_password_confirm.is_empty() {
            errors.add("new_password_confirm", "Confirma tu nueva contraseña");
        } else if self.new_password != self.new_password_confirm {
            errors.add("new_password_confirm", MISMATCH_MSG);
        }

        errors.into_result(ChangePassword {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
            new_password_confirm: self.new_password_confirm.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_labels() {
        assert_eq!(PasswordStrength::of("").label(), "muy débil");
        assert_eq!(PasswordStrength::of("abc").label(), "muy débil");
        assert_eq!(PasswordStrength::of("abcdefgh").label(), "débil");
        assert_eq!(PasswordStrength::of("Abcdefgh").label(), "media");
        assert_eq!(PasswordStrength::of("Abcdefg1").label(), "fuerte");
        assert_eq!(PasswordStrength::of("Abcdef1!").label(), "muy fuerte");
        assert_eq!(PasswordStrength::of("Abcdef1!").score(), 4);
    }

    #[test]
    fn test_errors_list_every_unmet_rule() {
        let errors = PasswordStrength::of("abc").errors();
        assert_eq!(errors, vec![MIN_LENGTH_MSG, UPPERCASE_MSG, NUMBER_MSG, SPECIAL_MSG]);
        assert!(PasswordStrength::of("Segura#2025").errors().is_empty());
    }

    #[test]
    fn test_reset_request_normalizes_email() {
        let form = PasswordResetRequestForm {
            email: "  Cliente@Correo.MX ".into(),
        };
        assert_eq!(form.validate().unwrap().as_str(), "cliente@correo.mx");

        let errors = PasswordResetRequestForm::default().validate().unwrap_err();
        assert_eq!(errors.first("email"), Some("El correo electrónico es requerido"));

        let errors = PasswordResetRequestForm { email: "nope".into() }
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.first("email"),
            Some("Por favor ingresa un correo electrónico válido")
        );
    }

    #[test]
    fn test_reset_confirm_mismatch_on_confirm_field() {
        let form = PasswordResetConfirmForm {
            uid: "MQ".into(),
            token: "abc-123".into(),
            password: "Segura#2025".into(),
            password_confirm: "Segura#2024".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first("password_confirm"), Some(MISMATCH_MSG));
    }

    #[test]
    fn test_change_password() {
        let form = ChangePasswordForm {
            current_password: "Vieja#123".into(),
            new_password: "Nueva#2025".into(),
            new_password_confirm: "Nueva#2025".into(),
        };
        assert!(form.validate().is_ok());

        let errors = ChangePasswordForm::default().validate().unwrap_err();
        assert!(errors.contains("current_password"));
        assert_eq!(errors.get("new_password").len(), 4);
        assert_eq!(
            errors.first("new_password_confirm"),
            Some("Confirma tu nueva contraseña")
        );
    }
}
