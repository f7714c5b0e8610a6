//! Display structs shared by several templates.
//!
//! Templates only see preformatted strings and flags; prices are rendered as
//! MXN here rather than in the template.

use refaccionaria_core::cart::Cart;
use refaccionaria_core::models::{Categoria, Direccion, Pedido, Refaccion};
use tower_sessions::Session;

use crate::middleware::AuthContext;
use crate::middleware::session::{self, keys};

/// Data every page's header needs.
#[derive(Clone, Default)]
pub struct Layout {
    pub username: Option<String>,
    pub signed_in: bool,
    pub cart_count: u64,
}

impl Layout {
    pub async fn load(session: &Session, auth: &AuthContext) -> Self {
        let cart: Cart = session::load(session, keys::CART).await;
        Self {
            username: auth.username.clone(),
            signed_in: auth.is_authenticated(),
            cart_count: cart.total_items(),
        }
    }
}

/// A part in a grid or list.
#[derive(Clone)]
pub struct RefaccionCard {
    pub id: i32,
    pub codigo: String,
    pub nombre: String,
    pub marca: String,
    pub categoria: String,
    pub precio: String,
    /// Plain decimal for the add-to-cart form.
    pub precio_raw: String,
    pub imagen: String,
    pub estado: &'static str,
    pub existencias: i32,
    pub en_existencia: bool,
    pub url: String,
}

impl From<&Refaccion> for RefaccionCard {
    fn from(r: &Refaccion) -> Self {
        Self {
            id: r.id.as_i32(),
            codigo: r.codigo_parte.clone(),
            nombre: r.nombre.clone(),
            marca: r.marca_display().to_owned(),
            categoria: r.categoria_nombre.clone().unwrap_or_default(),
            precio: r.precio.display(),
            precio_raw: r.precio.amount().to_string(),
            imagen: r.imagen_url().to_owned(),
            estado: r.estado.label(),
            existencias: r.existencias,
            en_existencia: r.en_existencia(),
            url: refaccion_url(r),
        }
    }
}

impl RefaccionCard {
    /// Toggle for a card already in the favorites list.
    #[must_use]
    pub const fn quitar_favorito(&self) -> FavoritoBoton {
        FavoritoBoton {
            id: self.id,
            favorito: true,
        }
    }
}

/// The heart toggle next to a part.
#[derive(Clone, Copy)]
pub struct FavoritoBoton {
    pub id: i32,
    pub favorito: bool,
}

/// Detail page path: `/categorias/{categoria}/{codigo}`.
///
/// Parts without a part number are addressed by id instead.
#[must_use]
pub fn refaccion_url(r: &Refaccion) -> String {
    let categoria = r.categoria.map_or(0, |c| c.as_i32());
    let codigo = if r.codigo_parte.is_empty() {
        r.id.to_string()
    } else {
        urlencoding::encode(&r.codigo_parte).into_owned()
    };
    format!("/categorias/{categoria}/{codigo}")
}

#[derive(Clone)]
pub struct CategoriaView {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub imagen: String,
}

impl From<&Categoria> for CategoriaView {
    fn from(c: &Categoria) -> Self {
        Self {
            id: c.id.as_i32(),
            nombre: c.nombre.clone(),
            descripcion: c.descripcion.clone().unwrap_or_default(),
            imagen: c.imagen.clone().unwrap_or_default(),
        }
    }
}

/// An address row.
#[derive(Clone)]
pub struct DireccionView {
    pub id: i32,
    pub nombre: String,
    pub full_address: String,
    pub references: String,
    pub is_primary: bool,
    pub selected: bool,
}

impl DireccionView {
    #[must_use]
    pub fn new(d: &Direccion, selected: bool) -> Self {
        Self {
            id: d.id.as_i32(),
            nombre: d.nombre.clone(),
            full_address: d.full_address(),
            references: d.references.clone().unwrap_or_default(),
            is_primary: d.is_primary,
            selected,
        }
    }
}

/// An order in the customer's history.
#[derive(Clone)]
pub struct PedidoView {
    pub id: i32,
    pub fecha: String,
    pub estado: &'static str,
    pub estado_code: &'static str,
    pub total: String,
    pub unidades: u32,
    pub lineas: Vec<PedidoLineaView>,
}

#[derive(Clone)]
pub struct PedidoLineaView {
    pub nombre: String,
    pub cantidad: u32,
    pub precio_unitario: String,
    pub subtotal: String,
}

impl From<&Pedido> for PedidoView {
    fn from(p: &Pedido) -> Self {
        Self {
            id: p.id.as_i32(),
            fecha: p.fecha_display(),
            estado: p.estado.label(),
            estado_code: p.estado.code(),
            total: p.total.display(),
            unidades: p.unidades(),
            lineas: p
                .items
                .iter()
                .map(|i| PedidoLineaView {
                    nombre: i.refaccion_nombre.clone(),
                    cantidad: i.cantidad,
                    precio_unitario: i.precio_unitario.display(),
                    subtotal: i.subtotal.display(),
                })
                .collect(),
        }
    }
}

/// Previous/next links for a paginated list.
#[derive(Clone, Default)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// `base` already carries any filters; `page=` is appended.
    #[must_use]
    pub fn new(base: &str, page: u32, has_prev: bool, has_next: bool, total_pages: u64) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        Self {
            page,
            total_pages,
            prev_url: has_prev.then(|| format!("{base}{sep}page={}", page.saturating_sub(1).max(1))),
            next_url: has_next.then(|| format!("{base}{sep}page={}", page + 1)),
        }
    }
}
