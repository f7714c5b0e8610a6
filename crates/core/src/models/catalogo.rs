//! Catalog resources (`/productos/...`).

use serde::{Deserialize, Serialize};

use crate::types::{CategoriaId, MarcaId, Price, ProveedorId, RefaccionEstado, RefaccionId};

/// A spare part offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refaccion {
    pub id: RefaccionId,
    #[serde(default)]
    pub codigo_parte: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub marca: Option<MarcaId>,
    #[serde(default)]
    pub marca_nombre: Option<String>,
    #[serde(default)]
    pub categoria: Option<CategoriaId>,
    #[serde(default)]
    pub categoria_nombre: Option<String>,
    #[serde(default)]
    pub proveedor: Option<ProveedorId>,
    pub precio: Price,
    #[serde(default)]
    pub existencias: i32,
    #[serde(default)]
    pub estado: RefaccionEstado,
    #[serde(default)]
    pub compatibilidad: String,
    #[serde(default)]
    pub imagen: Option<String>,
}

impl Refaccion {
    #[must_use]
    pub const fn en_existencia(&self) -> bool {
        self.existencias > 0
    }

    /// Brand name for display, empty when the backend did not expand it.
    #[must_use]
    pub fn marca_display(&self) -> &str {
        self.marca_nombre.as_deref().unwrap_or_default()
    }

    /// Image URL or an empty string.
    #[must_use]
    pub fn imagen_url(&self) -> &str {
        self.imagen.as_deref().unwrap_or_default()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categoria {
    pub id: CategoriaId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub imagen: Option<String>,
}

/// Response of `/productos/categorias/{id}/refacciones/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriaRefacciones {
    pub categoria: Categoria,
    pub refacciones: Vec<Refaccion>,
    #[serde(default)]
    pub total: u64,
}
