//! Repair ticket and service sale forms.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{blank_as_none, optional_text};
use crate::action::FieldErrors;
use crate::models::{Servicio, VentaServicioInput};
use crate::types::{EstadoPago, Price, ServicioEstado, ServicioId};

/// Body of the create/edit service form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicioForm {
    #[serde(default, rename = "noDeServicio", deserialize_with = "blank_as_none")]
    pub no_de_servicio: Option<String>,
    #[serde(default)]
    pub fecha: String,
    #[serde(default)]
    pub aparato: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub cliente: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub marca: String,
}

fn nonempty(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_owned()
}

impl ServicioForm {
    /// # Errors
    ///
    /// Every field except `observaciones` is required; `telefono` must be
    /// exactly ten digits.
    pub fn validate(&self) -> Result<Servicio, FieldErrors> {
        let mut errors = FieldErrors::new();

        let no_de_servicio = match self.no_de_servicio.as_deref() {
            None => None,
            Some(raw) => raw
                .parse::<ServicioId>()
                .map_err(|_| errors.add("noDeServicio", "El número de servicio es inválido"))
                .ok(),
        };

        let fecha = if self.fecha.trim().is_empty() {
            errors.add("fecha", "La fecha es obligatoria");
            None
        } else {
            NaiveDate::parse_from_str(self.fecha.trim(), "%Y-%m-%d")
                .map_err(|_| errors.add("fecha", "La fecha es inválida"))
                .ok()
        };

        let aparato = nonempty(&mut errors, "aparato", &self.aparato, "El aparato es obligatorio");
        let cliente = nonempty(&mut errors, "cliente", &self.cliente, "El cliente es obligatorio");
        let marca = nonempty(&mut errors, "marca", &self.marca, "La marca es obligatoria");

        let telefono = self.telefono.trim();
        if telefono.is_empty() {
            errors.add("telefono", "El teléfono es obligatorio");
        } else if telefono.len() != 10 || !telefono.bytes().all(|b| b.is_ascii_digit()) {
            errors.add("telefono", "El teléfono debe tener 10 dígitos");
        }

        let estado = ServicioEstado::from_label(self.estado.trim());
        if estado.is_none() {
            errors.add("estado", "Estado inválido");
        }

        match estado {
            Some(estado) if errors.is_empty() => Ok(Servicio {
                no_de_servicio,
                fecha,
                aparato,
                telefono: Some(telefono.to_owned()),
                cliente,
                observaciones: optional_text(self.observaciones.as_deref()),
                estado,
                marca,
                estado_pago: None,
                nota: None,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of the "registrar venta de servicio" form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VentaServicioForm {
    #[serde(default)]
    pub servicio: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mano_obra: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub refacciones_total: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub total: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub observaciones: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tecnico: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub garantia_dias: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub estado_pago: Option<String>,
}

/// Default warranty, in days.
pub const GARANTIA_DIAS: u32 = 30;

fn amount(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<Price> {
    let raw = raw?;
    match raw.parse::<Decimal>() {
        Ok(value) if !value.is_sign_negative() => Some(Price::new(value)),
        _ => {
            errors.add(field, "El monto debe ser un número válido");
            None
        }
    }
}

impl VentaServicioForm {
    /// Missing amounts default to zero and the total to labor plus parts.
    ///
    /// # Errors
    ///
    /// Returns field errors for a missing service id or malformed amounts.
    pub fn validate(&self) -> Result<VentaServicioInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let servicio = self
            .servicio
            .parse::<ServicioId>()
            .ok()
            .filter(|id| id.as_i32() > 0);
        if servicio.is_none() {
            errors.add("servicio", "ID de servicio inválido");
        }

        let mano_obra = amount(&mut errors, "mano_obra", self.mano_obra.as_deref()).unwrap_or_default();
        let refacciones_total =
            amount(&mut errors, "refacciones_total", self.refacciones_total.as_deref())
                .unwrap_or_default();
        let total = amount(&mut errors, "total", self.total.as_deref())
            .filter(|t| !t.is_zero())
            .unwrap_or(mano_obra + refacciones_total);

        let garantia_dias = match self.garantia_dias.as_deref() {
            None => GARANTIA_DIAS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add("garantia_dias", "La garantía debe ser un número de días");
                GARANTIA_DIAS
            }),
        };

        let estado_pago = match self.estado_pago.as_deref() {
            None => EstadoPago::Pendiente,
            Some(raw) => EstadoPago::from_label(raw).unwrap_or_else(|| {
                errors.add("estado_pago", "Estado de pago inválido");
                EstadoPago::Pendiente
            }),
        };

        match servicio {
            Some(servicio) if errors.is_empty() => Ok(VentaServicioInput {
                servicio,
                mano_obra,
                refacciones_total,
                total,
                observaciones: self.observaciones.clone().unwrap_or_default(),
                tecnico: self.tecnico.clone(),
                garantia_dias,
                estado_pago,
            }),
            _ => Err(errors),
        }
    }
}
