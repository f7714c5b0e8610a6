//! Sales records (`/ventas/all/...`).

use serde::{Deserialize, Serialize};

use crate::types::{EstadoPago, Price, ServicioId, VentaId};

/// A row of the unified sales listing, tagged by `tipo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum Venta {
    Refaccion {
        id: VentaId,
        #[serde(default)]
        usuario_username: String,
        refaccion_nombre: String,
        #[serde(default)]
        marca_nombre: String,
        cantidad: u32,
        precio_unitario: Price,
        total: Price,
        fecha: String,
    },
    Servicio {
        id: VentaId,
        servicio: ServicioId,
        #[serde(default)]
        servicio_aparato: String,
        mano_obra: Price,
        refacciones_total: Price,
        total: Price,
        #[serde(default)]
        tecnico: Option<String>,
        estado_pago: EstadoPago,
        fecha: String,
    },
    Devolucion {
        id: VentaId,
        #[serde(default)]
        refaccion_nombre: String,
        cantidad: u32,
        total: Price,
        #[serde(default)]
        motivo: Option<String>,
        fecha: String,
    },
}

impl Venta {
    #[must_use]
    pub const fn id(&self) -> VentaId {
        match self {
            Self::Refaccion { id, .. } | Self::Servicio { id, .. } | Self::Devolucion { id, .. } => {
                *id
            }
        }
    }

    #[must_use]
    pub const fn total(&self) -> Price {
        match self {
            Self::Refaccion { total, .. }
            | Self::Servicio { total, .. }
            | Self::Devolucion { total, .. } => *total,
        }
    }

    #[must_use]
    pub fn fecha(&self) -> &str {
        match self {
            Self::Refaccion { fecha, .. }
            | Self::Servicio { fecha, .. }
            | Self::Devolucion { fecha, .. } => fecha,
        }
    }

    #[must_use]
    pub const fn tipo_label(&self) -> &'static str {
        match self {
            Self::Refaccion { .. } => "Refacción",
            Self::Servicio { .. } => "Servicio",
            Self::Devolucion { .. } => "Devolución",
        }
    }

    /// What was sold, for the description column.
    #[must_use]
    pub fn descripcion(&self) -> String {
        match self {
            Self::Refaccion {
                refaccion_nombre,
                cantidad,
                ..
            } => format!("{refaccion_nombre} x{cantidad}"),
            Self::Servicio {
                servicio,
                servicio_aparato,
                ..
            } => format!("Servicio #{servicio} {servicio_aparato}"),
            Self::Devolucion {
                refaccion_nombre,
                cantidad,
                ..
            } => format!("{refaccion_nombre} x{cantidad}"),
        }
    }

    #[must_use]
    pub const fn estado_pago(&self) -> Option<EstadoPago> {
        match self {
            Self::Servicio { estado_pago, .. } => Some(*estado_pago),
            _ => None,
        }
    }
}

/// Total amount and number of transactions for one sales kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalYCantidad {
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub cantidad: u64,
}

/// Response of `/ventas/all/estadisticas/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadisticasVentas {
    #[serde(default)]
    pub ventas_servicios: TotalYCantidad,
    #[serde(default)]
    pub ventas_refacciones: TotalYCantidad,
    #[serde(default)]
    pub devoluciones: TotalYCantidad,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_venta_tagged_by_tipo() {
        let ventas: Vec<Venta> = serde_json::from_value(json!([
            {
                "tipo": "refaccion", "id": 1, "refaccion_nombre": "Filtro",
                "cantidad": 2, "precio_unitario": "50.00", "total": "100.00",
                "fecha": "2025-02-01"
            },
            {
                "tipo": "servicio", "id": 2, "servicio": 40, "servicio_aparato": "Estufa",
                "mano_obra": "300.00", "refacciones_total": "120.00", "total": "420.00",
                "estado_pago": "Parcial", "fecha": "2025-02-02"
            }
        ]))
        .unwrap();
        assert_eq!(ventas[0].descripcion(), "Filtro x2");
        assert_eq!(ventas[1].estado_pago(), Some(EstadoPago::Parcial));
        assert_eq!(ventas[1].total(), Price::from_centavos(42_000));
    }

    #[test]
    fn test_estadisticas_accept_numeric_totals() {
        let stats: EstadisticasVentas = serde_json::from_value(json!({
            "ventas_servicios": { "total": 1500.5, "cantidad": 3 },
            "ventas_refacciones": { "total": "800.00", "cantidad": 5 },
            "devoluciones": { "total": 0, "cantidad": 0 }
        }))
        .unwrap();
        assert_eq!(stats.ventas_servicios.total, Price::from_centavos(150_050));
        assert_eq!(stats.ventas_refacciones.cantidad, 5);
    }
}
