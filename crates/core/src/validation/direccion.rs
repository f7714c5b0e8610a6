//! Address book and extra delivery info forms.

use serde::{Deserialize, Serialize};

use super::{blank_as_none, checkbox, optional_text, required_text};
use crate::action::FieldErrors;
use crate::models::ExtraInfo;
use crate::types::{PostalCode, PostalCodeError, TipoLugar};

/// Body of the "nueva dirección" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DireccionForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub colony: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub references: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_primary: bool,
}

/// Validated payload for `POST /user/user-profile/direcciones/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NuevaDireccion {
    pub nombre: String,
    pub street: String,
    pub colony: String,
    pub city: String,
    pub state: String,
    pub postal_code: PostalCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    pub is_primary: bool,
}

impl DireccionForm {
    /// Validate every field, normalizing the postal code first.
    ///
    /// # Errors
    ///
    /// Returns one message per offending field.
    pub fn validate(&self) -> Result<NuevaDireccion, FieldErrors> {
        let mut errors = FieldErrors::new();
        let nombre = required_text(
            &mut errors,
            "nombre",
            &self.nombre,
            100,
            "El nombre de la dirección es requerido",
            "El nombre no puede exceder 100 caracteres",
        );
        let street = required_text(
            &mut errors,
            "street",
            &self.street,
            255,
            "La calle y número son requeridos",
            "La calle no puede exceder 255 caracteres",
        );
        let colony = required_text(
            &mut errors,
            "colony",
            &self.colony,
            255,
            "La colonia es requerida",
            "La colonia no puede exceder 255 caracteres",
        );
        let city = required_text(
            &mut errors,
            "city",
            &self.city,
            100,
            "La ciudad es requerida",
            "La ciudad no puede exceder 100 caracteres",
        );
        let state = required_text(
            &mut errors,
            "state",
            &self.state,
            100,
            "El estado es requerido",
            "El estado no puede exceder 100 caracteres",
        );
        let postal_code = PostalCode::parse(&self.postal_code)
            .map_err(|e| errors.add("postal_code", e.to_string()))
            .ok();

        match postal_code {
            Some(postal_code) if errors.is_empty() => Ok(NuevaDireccion {
                nombre,
                street,
                colony,
                city,
                state,
                postal_code,
                references: optional_text(self.references.as_deref()),
                is_primary: self.is_primary,
            }),
            _ => Err(errors),
        }
    }
}

/// Partial update for `PATCH /user/user-profile/direcciones/{id}/`.
///
/// Blank fields are left out of the payload; present fields follow the same
/// rules as creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DireccionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colony: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<PostalCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(flatten)]
    pub extra: Option<ExtraInfo>,
}

impl DireccionUpdate {
    /// Only flip the primary flag.
    #[must_use]
    pub fn primary() -> Self {
        Self {
            is_primary: Some(true),
            ..Self::default()
        }
    }

    /// Only set the extra delivery info.
    #[must_use]
    pub fn extra_info(extra: ExtraInfo) -> Self {
        Self {
            extra: Some(extra),
            ..Self::default()
        }
    }
}

impl DireccionForm {
    /// Validate the fields that were filled in, for edits.
    ///
    /// # Errors
    ///
    /// Returns one message per offending field.
    pub fn validate_partial(&self) -> Result<DireccionUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut check = |field: &str, value: &str, max: usize, too_long: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.chars().count() > max {
                errors.add(field, too_long);
            }
            Some(trimmed.to_owned())
        };

        let mut update = DireccionUpdate {
            nombre: check("nombre", &self.nombre, 100, "El nombre no puede exceder 100 caracteres"),
            street: check("street", &self.street, 255, "La calle no puede exceder 255 caracteres"),
            colony: check("colony", &self.colony, 255, "La colonia no puede exceder 255 caracteres"),
            city: check("city", &self.city, 100, "La ciudad no puede exceder 100 caracteres"),
            state: check("state", &self.state, 100, "El estado no puede exceder 100 caracteres"),
            postal_code: None,
            references: optional_text(self.references.as_deref()),
            is_primary: self.is_primary.then_some(true),
            extra: None,
        };

        match PostalCode::parse(&self.postal_code) {
            Ok(code) => update.postal_code = Some(code),
            Err(PostalCodeError::Empty) => {}
            Err(e) => errors.add("postal_code", e.to_string()),
        }

        errors.into_result(update)
    }
}

/// Body of the extra delivery info form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtraInfoForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tipo_lugar: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub barrio_privado: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub conserjeria: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub nombre_lugar: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub horario_apertura: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub horario_cierre: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub horario_24hs: bool,
}

const HORA_INVALIDA: &str = "Formato de hora inválido (HH:MM)";

/// `HH:MM` with `HH` in 00..=23 and `MM` in 00..=59.
#[must_use]
pub fn is_valid_hour(value: &str) -> bool {
    let Some((h, m)) = value.split_once(':') else {
        return false;
    };
    if h.len() != 2 || m.len() != 2 {
        return false;
    }
    matches!(
        (h.parse::<u8>(), m.parse::<u8>()),
        (Ok(h), Ok(m)) if h <= 23 && m <= 59
    ) && value.bytes().filter(u8::is_ascii_digit).count() == 4
}

impl ExtraInfoForm {
    /// Validate the delivery details.
    ///
    /// # Errors
    ///
    /// Opening and closing hours are required unless the place is open 24
    /// hours; the message is reported on `horario_apertura`.
    pub fn validate(&self) -> Result<ExtraInfo, FieldErrors> {
        let mut errors = FieldErrors::new();

        let tipo_lugar = match self.tipo_lugar.as_deref() {
            None => None,
            Some(code) => {
                let tipo = TipoLugar::from_code(code);
                if tipo.is_none() {
                    errors.add("tipo_lugar", "Tipo de lugar inválido");
                }
                tipo
            }
        };

        if self
            .nombre_lugar
            .as_deref()
            .is_some_and(|n| n.chars().count() > 255)
        {
            errors.add(
                "nombre_lugar",
                "El nombre del lugar no puede exceder 255 caracteres",
            );
        }

        for (field, value) in [
            ("horario_apertura", &self.horario_apertura),
            ("horario_cierre", &self.horario_cierre),
        ] {
            if value.as_deref().is_some_and(|v| !is_valid_hour(v)) {
                errors.add(field, HORA_INVALIDA);
            }
        }

        if !self.horario_24hs && (self.horario_apertura.is_none() || self.horario_cierre.is_none()) {
            errors.add(
                "horario_apertura",
                "Los horarios de apertura y cierre son requeridos cuando no es 24 horas",
            );
        }

        errors.into_result(ExtraInfo {
            tipo_lugar,
            barrio_privado: self.barrio_privado,
            conserjeria: self.conserjeria,
            nombre_lugar: self.nombre_lugar.clone(),
            horario_apertura: self.horario_apertura.clone(),
            horario_cierre: self.horario_cierre.clone(),
            horario_24hs: self.horario_24hs,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> DireccionForm {
        DireccionForm {
            nombre: "Casa".into(),
            street: "Av. Reforma 123".into(),
            colony: "Juárez".into(),
            city: "CDMX".into(),
            state: "CDMX".into(),
            postal_code: "06600".into(),
            references: Some("Portón azul".into()),
            is_primary: true,
        }
    }

    #[test]
    fn test_valid_address() {
        let direccion = valid_form().validate().unwrap();
        assert_eq!(direccion.postal_code.as_str(), "06600");
        assert!(direccion.is_primary);
    }

    #[test]
    fn test_postal_code_normalized_before_validation() {
        let form = DireccionForm {
            postal_code: "12 345".into(),
            ..valid_form()
        };
        let direccion = form.validate().unwrap();
        assert_eq!(direccion.postal_code.as_str(), "12345");
        let json = serde_json::to_value(&direccion).unwrap();
        assert_eq!(json["postal_code"], "12345");
    }

    #[test]
    fn test_missing_fields_reported_per_field() {
        let errors = DireccionForm::default().validate().unwrap_err();
        assert_eq!(errors.first("nombre"), Some("El nombre de la dirección es requerido"));
        assert_eq!(errors.first("street"), Some("La calle y número son requeridos"));
        assert_eq!(errors.first("colony"), Some("La colonia es requerida"));
        assert_eq!(errors.first("city"), Some("La ciudad es requerida"));
        assert_eq!(errors.first("state"), Some("El estado es requerido"));
        assert_eq!(errors.first("postal_code"), Some("El código postal es requerido"));
        assert!(!errors.contains("references"));
    }

    #[test]
    fn test_bad_postal_code_only() {
        let form = DireccionForm {
            postal_code: "1234".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first("postal_code"),
            Some("El código postal debe tener exactamente 5 dígitos")
        );
    }

    #[test]
    fn test_too_long_name() {
        let form = DireccionForm {
            nombre: "x".repeat(101),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.first("nombre"), Some("El nombre no puede exceder 100 caracteres"));
    }

    #[test]
    fn test_partial_update_skips_blank_fields() {
        let form = DireccionForm {
            city: "Monterrey".into(),
            postal_code: "64-000".into(),
            ..DireccionForm::default()
        };
        let update = form.validate_partial().unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Monterrey", "postal_code": "64000" }));
    }

    #[test]
    fn test_primary_update_payload() {
        let json = serde_json::to_value(DireccionUpdate::primary()).unwrap();
        assert_eq!(json, serde_json::json!({ "is_primary": true }));
    }

    #[test]
    fn test_hour_format() {
        assert!(is_valid_hour("00:00"));
        assert!(is_valid_hour("23:59"));
        assert!(!is_valid_hour("24:00"));
        assert!(!is_valid_hour("9:00"));
        assert!(!is_valid_hour("09:60"));
        assert!(!is_valid_hour("+9:00"));
    }

    #[test]
    fn test_hours_required_unless_24h() {
        let errors = ExtraInfoForm::default().validate().unwrap_err();
        assert_eq!(
            errors.first("horario_apertura"),
            Some("Los horarios de apertura y cierre son requeridos cuando no es 24 horas")
        );

        let form = ExtraInfoForm {
            horario_24hs: true,
            tipo_lugar: Some("edificio".into()),
            conserjeria: true,
            ..ExtraInfoForm::default()
        };
        let extra = form.validate().unwrap();
        assert_eq!(extra.tipo_lugar, Some(TipoLugar::Edificio));
    }

    #[test]
    fn test_invalid_hour_and_tipo() {
        let form = ExtraInfoForm {
            tipo_lugar: Some("castillo".into()),
            horario_apertura: Some("08:00".into()),
            horario_cierre: Some("25:00".into()),
            ..ExtraInfoForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("tipo_lugar"));
        assert_eq!(errors.first("horario_cierre"), Some(HORA_INVALIDA));
        assert!(!errors.contains("horario_apertura"));
    }
}
