//! Inventory movements (`/inventario/...`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MovimientoId, Price, RefaccionId, TipoMovimiento};

/// An entry or exit of stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovimientoInventario {
    pub id: MovimientoId,
    pub refaccion: RefaccionId,
    #[serde(default)]
    pub refaccion_nombre: String,
    pub cantidad: u32,
    #[serde(default)]
    pub precio_unitario: Price,
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    pub tipo_movimiento: TipoMovimiento,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub observaciones: String,
}

impl MovimientoInventario {
    #[must_use]
    pub fn fecha_display(&self) -> String {
        self.fecha.format("%d/%m/%Y %H:%M").to_string()
    }
}
