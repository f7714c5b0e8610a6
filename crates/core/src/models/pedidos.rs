//! Order resources (`/pedidos/...`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PedidoEstado, PedidoId, Price, RefaccionId};

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedidoItem {
    #[serde(default)]
    pub id: Option<i32>,
    pub refaccion: RefaccionId,
    #[serde(default)]
    pub refaccion_nombre: String,
    #[serde(default)]
    pub refaccion_imagen: Option<String>,
    pub cantidad: u32,
    pub precio_unitario: Price,
    pub subtotal: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pedido {
    pub id: PedidoId,
    pub estado: PedidoEstado,
    pub total: Price,
    pub fecha_creacion: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<PedidoItem>,
    #[serde(default)]
    pub usuario_nombre: String,
    #[serde(default)]
    pub usuario_email: String,
    #[serde(default)]
    pub metodo_pago: String,
    #[serde(default)]
    pub pago_status: Option<String>,
}

impl Pedido {
    /// Number of units across all lines.
    #[must_use]
    pub fn unidades(&self) -> u32 {
        self.items.iter().map(|i| i.cantidad).sum()
    }

    /// Creation date as `dd/mm/yyyy`.
    #[must_use]
    pub fn fecha_display(&self) -> String {
        self.fecha_creacion.format("%d/%m/%Y").to_string()
    }
}

/// One line of the body sent to `POST /pedidos/checkout/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub refaccion: RefaccionId,
    pub cantidad: u32,
}

/// Body returned by `POST /pedidos/checkout/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub pedido_id: PedidoId,
    pub total: Price,
    pub estado: PedidoEstado,
}
