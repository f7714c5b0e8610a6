//! Resources exchanged with the backend REST API.
//!
//! Field names follow the backend's JSON. Optional members default so that
//! older backend deployments that omit a field still deserialize.

pub mod blog;
pub mod catalogo;
pub mod cuenta;
pub mod inventario;
pub mod pedidos;
pub mod servicios;
pub mod ventas;

pub use blog::BlogPost;
pub use catalogo::{Categoria, CategoriaRefacciones, Refaccion};
pub use cuenta::{Direccion, ExtraInfo, Favoritos, LoginResponse, LoginUsuario, UserProfile};
pub use inventario::MovimientoInventario;
pub use pedidos::{CheckoutItem, CheckoutResponse, Pedido, PedidoItem};
pub use servicios::{NotaServicio, Servicio, ServiciosEstadisticas, VentaServicioInput};
pub use ventas::{EstadisticasVentas, TotalYCantidad, Venta};

use serde::{Deserialize, Serialize};

/// Page of a DRF paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    /// Number of pages for a given page size, at least one.
    #[must_use]
    pub fn total_pages(&self, page_size: u64) -> u64 {
        if page_size == 0 {
            return 1;
        }
        self.count.div_ceil(page_size).max(1)
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// A list endpoint that answers either a bare array or a DRF page,
/// depending on whether pagination is enabled for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listado<T> {
    Page(Paginated<T>),
    List(Vec<T>),
}

impl<T> Listado<T> {
    /// The rows, whichever shape arrived.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page(page) => page.results,
            Self::List(items) => items,
        }
    }

    /// The rows as a page; a bare array becomes a single page.
    #[must_use]
    pub fn into_page(self) -> Paginated<T> {
        match self {
            Self::Page(page) => page,
            Self::List(results) => Paginated {
                count: u64::try_from(results.len()).unwrap_or(u64::MAX),
                next: None,
                previous: None,
                results,
            },
        }
    }
}
