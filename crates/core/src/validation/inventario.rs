//! Inventory movement forms (entrada, salida, devolución).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::blank_as_none;
use crate::action::FieldErrors;
use crate::types::{Price, RefaccionId, VentaId};

/// Which movement is being registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovimientoKind {
    Entrada,
    Salida,
    Devolucion,
}

impl MovimientoKind {
    /// Backend path segment under `/inventario/`.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Salida => "salida",
            Self::Devolucion => "devolucion",
        }
    }

    #[must_use]
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "entrada" => Some(Self::Entrada),
            "salida" => Some(Self::Salida),
            "devolucion" => Some(Self::Devolucion),
            _ => None,
        }
    }

    /// Message shown when the backend call fails without a specific reason.
    #[must_use]
    pub const fn default_error(self) -> &'static str {
        match self {
            Self::Entrada => "Error al registrar la entrada",
            Self::Salida => "Error al registrar la salida",
            Self::Devolucion => "Error al registrar la devolucion",
        }
    }

    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Entrada => "Entrada registrada",
            Self::Salida => "Salida registrada",
            Self::Devolucion => "Devolución registrada",
        }
    }
}

/// Body of the movement forms. Unused fields are ignored per kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovimientoForm {
    #[serde(default)]
    pub refaccion: String,
    #[serde(default)]
    pub cantidad: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub precio_unitario: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub observaciones: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub venta_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub motivo: Option<String>,
}

/// Payload for `POST /inventario/{entrada|salida|devolucion}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovimientoPayload {
    pub refaccion: RefaccionId,
    pub cantidad: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_unitario: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venta_id: Option<VentaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
}

impl MovimientoForm {
    /// # Errors
    ///
    /// Returns field errors for a missing part, a non-positive quantity or
    /// a malformed price.
    pub fn validate(&self, kind: MovimientoKind) -> Result<MovimientoPayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let refaccion = self
            .refaccion
            .parse::<RefaccionId>()
            .ok()
            .filter(|id| id.as_i32() > 0);
        if refaccion.is_none() {
            errors.add("refaccion", "Selecciona una refaccion");
        }

        let cantidad = self.cantidad.trim().parse::<u32>().ok().filter(|c| *c > 0);
        if cantidad.is_none() {
            errors.add("cantidad", "La cantidad debe ser mayor a 0");
        }

        let precio_unitario = match (kind, self.precio_unitario.as_deref()) {
            (MovimientoKind::Salida, _) | (_, None) => None,
            (_, Some(raw)) => match raw.parse::<Decimal>() {
                Ok(value) if !value.is_sign_negative() => Some(Price::new(value)),
                _ => {
                    errors.add("precio_unitario", "El precio debe ser un numero valido");
                    None
                }
            },
        };

        let (observaciones, venta_id, motivo) = match kind {
            MovimientoKind::Salida => (None, None, None),
            MovimientoKind::Entrada => (self.observaciones.clone(), None, None),
            MovimientoKind::Devolucion => (
                self.observaciones.clone(),
                self.venta_id.as_deref().and_then(|v| v.parse().ok()),
                self.motivo.clone(),
            ),
        };

        match (refaccion, cantidad) {
            (Some(refaccion), Some(cantidad)) if errors.is_empty() => Ok(MovimientoPayload {
                refaccion,
                cantidad,
                precio_unitario,
                observaciones,
                venta_id,
                motivo,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entrada_with_price() {
        let form = MovimientoForm {
            refaccion: "4".into(),
            cantidad: "10".into(),
            precio_unitario: Some("85.5".into()),
            observaciones: Some("Proveedor local".into()),
            ..MovimientoForm::default()
        };
        let payload = form.validate(MovimientoKind::Entrada).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "refaccion": 4,
                "cantidad": 10,
                "precio_unitario": "85.5",
                "observaciones": "Proveedor local"
            })
        );
    }

    #[test]
    fn test_salida_ignores_extra_fields() {
        let form = MovimientoForm {
            refaccion: "4".into(),
            cantidad: "1".into(),
            precio_unitario: Some("abc".into()),
            motivo: Some("x".into()),
            ..MovimientoForm::default()
        };
        let payload = form.validate(MovimientoKind::Salida).unwrap();
        assert_eq!(payload.precio_unitario, None);
        assert_eq!(payload.motivo, None);
    }

    #[test]
    fn test_quantity_and_part_required() {
        let errors = MovimientoForm {
            cantidad: "0".into(),
            ..MovimientoForm::default()
        }
        .validate(MovimientoKind::Devolucion)
        .unwrap_err();
        assert_eq!(errors.first("refaccion"), Some("Selecciona una refaccion"));
        assert_eq!(errors.first("cantidad"), Some("La cantidad debe ser mayor a 0"));
    }

    #[test]
    fn test_kind_paths() {
        for kind in [MovimientoKind::Entrada, MovimientoKind::Salida, MovimientoKind::Devolucion] {
            assert_eq!(MovimientoKind::from_path(kind.path()), Some(kind));
        }
        assert_eq!(MovimientoKind::from_path("ajuste"), None);
    }
}
