//! Repair service tickets (`/servicios/...`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{EstadoPago, Price, ServicioEstado, ServicioId};

/// A repair ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servicio {
    #[serde(rename = "noDeServicio", default, skip_serializing_if = "Option::is_none")]
    pub no_de_servicio: Option<ServicioId>,
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
    pub aparato: String,
    #[serde(default)]
    pub telefono: Option<String>,
    pub cliente: String,
    #[serde(default)]
    pub observaciones: Option<String>,
    pub estado: ServicioEstado,
    pub marca: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado_pago: Option<EstadoPago>,
    /// Cost note written when the ticket's sale is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nota: Option<NotaServicio>,
}

impl Servicio {
    #[must_use]
    pub fn fecha_display(&self) -> String {
        self.fecha
            .map(|f| f.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }
}

/// Cost snapshot stored on the ticket so its note prints without reading
/// the sales ledger. Keys are camelCase on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotaServicio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_cost: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<EstadoPago>,
}

impl From<&VentaServicioInput> for NotaServicio {
    fn from(venta: &VentaServicioInput) -> Self {
        Self {
            labor_cost: Some(venta.mano_obra),
            parts_cost: Some(venta.refacciones_total),
            total_cost: Some(venta.total),
            notes: Some(venta.observaciones.clone()).filter(|n| !n.is_empty()),
            technician: venta.tecnico.clone(),
            warranty: Some(venta.garantia_dias),
            payment_status: Some(venta.estado_pago),
        }
    }
}

/// Body of `POST /ventas/registros-servicios/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentaServicioInput {
    pub servicio: ServicioId,
    pub mano_obra: Price,
    pub refacciones_total: Price,
    pub total: Price,
    #[serde(default)]
    pub observaciones: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnico: Option<String>,
    pub garantia_dias: u32,
    pub estado_pago: EstadoPago,
}

/// Count for one appliance or brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conteo {
    #[serde(alias = "aparato", alias = "marca", alias = "semana")]
    pub nombre: String,
    pub count: u64,
}

/// Response of `/servicios/estadisticas/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiciosEstadisticas {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pendientes: u64,
    #[serde(default)]
    pub completados: u64,
    #[serde(default)]
    pub tasa_completado: f64,
    #[serde(default)]
    pub por_estado: BTreeMap<String, u64>,
    #[serde(default)]
    pub por_aparato: Vec<Conteo>,
    #[serde(default)]
    pub por_marca: Vec<Conteo>,
    #[serde(default)]
    pub tendencia_semanal: Vec<Conteo>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_servicio_uses_backend_primary_key_name() {
        let servicio: Servicio = serde_json::from_value(json!({
            "noDeServicio": 120,
            "fecha": "2025-01-31",
            "aparato": "Lavadora",
            "telefono": "2221234567",
            "cliente": "María López",
            "observaciones": null,
            "estado": "En Proceso",
            "marca": "Mabe"
        }))
        .unwrap();
        assert_eq!(servicio.no_de_servicio, Some(ServicioId::new(120)));
        assert_eq!(servicio.estado, ServicioEstado::EnProceso);
        assert_eq!(servicio.fecha_display(), "31/01/2025");
    }

    #[test]
    fn test_nota_reads_camel_case_and_numbers() {
        let servicio: Servicio = serde_json::from_value(json!({
            "noDeServicio": 12,
            "aparato": "Lavadora",
            "cliente": "María López",
            "estado": "Reparado",
            "marca": "Mabe",
            "nota": {
                "laborCost": 300,
                "partsCost": "150.50",
                "technician": "Alfredo",
                "paymentStatus": "Parcial"
            }
        }))
        .unwrap();
        let nota = servicio.nota.unwrap();
        assert_eq!(nota.labor_cost, Some(Price::from_centavos(30_000)));
        assert_eq!(nota.parts_cost, Some(Price::from_centavos(15_050)));
        assert_eq!(nota.total_cost, None);
        assert_eq!(nota.payment_status, Some(EstadoPago::Parcial));
    }

    #[test]
    fn test_nota_from_venta() {
        let venta = VentaServicioInput {
            servicio: ServicioId::new(12),
            mano_obra: Price::from_centavos(30_000),
            refacciones_total: Price::from_centavos(15_000),
            total: Price::from_centavos(45_000),
            observaciones: String::new(),
            tecnico: Some("Alfredo".into()),
            garantia_dias: 30,
            estado_pago: EstadoPago::Pagado,
        };
        let json = serde_json::to_value(NotaServicio::from(&venta)).unwrap();
        assert_eq!(json["totalCost"], "450.00");
        assert_eq!(json["warranty"], 30);
        assert_eq!(json["paymentStatus"], "Pagado");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_estadisticas_counts_accept_named_keys() {
        let stats: ServiciosEstadisticas = serde_json::from_value(json!({
            "total": 10,
            "pendientes": 4,
            "completados": 6,
            "tasa_completado": 60.0,
            "por_aparato": [{ "aparato": "Refrigerador", "count": 3 }],
            "por_marca": [{ "marca": "LG", "count": 2 }]
        }))
        .unwrap();
        assert_eq!(stats.por_aparato[0].nombre, "Refrigerador");
        assert_eq!(stats.por_marca[0].count, 2);
    }
}
