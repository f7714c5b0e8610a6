//! Catalog reads (`/productos/...`).

use refaccionaria_core::models::{Categoria, CategoriaRefacciones, Listado, Paginated, Refaccion};
use refaccionaria_core::{CategoriaId, RefaccionEstado, RefaccionId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{BackendClient, BackendError};

/// Filters accepted by the parts listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefaccionesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<CategoriaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<RefaccionEstado>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl BackendClient {
    /// List parts matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn refacciones(
        &self,
        query: &RefaccionesQuery,
    ) -> Result<Paginated<Refaccion>, BackendError> {
        let listado: Listado<Refaccion> = self
            .send(
                self.request(Method::GET, "/productos/refacciones/", None)
                    .query(query),
            )
            .await?;
        Ok(listado.into_page())
    }

    /// Get a single part.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the part does not exist.
    #[instrument(skip(self), fields(refaccion_id = %id))]
    pub async fn refaccion(&self, id: RefaccionId) -> Result<Refaccion, BackendError> {
        self.send(self.request(Method::GET, &format!("/productos/refacciones/{id}/"), None))
            .await
    }

    /// Find a part by its exact part number.
    ///
    /// The backend only offers a fuzzy search, so the match is narrowed here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row has exactly that `codigo_parte`.
    #[instrument(skip(self))]
    pub async fn refaccion_por_codigo(&self, codigo: &str) -> Result<Refaccion, BackendError> {
        let query = RefaccionesQuery {
            search: Some(codigo.to_owned()),
            ..RefaccionesQuery::default()
        };
        self.refacciones(&query)
            .await?
            .results
            .into_iter()
            .find(|r| r.codigo_parte.eq_ignore_ascii_case(codigo))
            .ok_or(BackendError::NotFound)
    }

    /// All categories. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categorias(&self) -> Result<Vec<Categoria>, BackendError> {
        let key = CacheKey::Categorias;
        if let Some(CacheValue::Categorias(categorias)) = self.inner.catalog_cache.get(&key).await {
            debug!("Cache hit for categorias");
            return Ok(categorias);
        }

        let listado: Listado<Categoria> = self
            .send(self.request(Method::GET, "/productos/categorias/", None))
            .await?;
        let categorias = listado.into_vec();

        self.inner
            .catalog_cache
            .insert(key, CacheValue::Categorias(categorias.clone()))
            .await;
        Ok(categorias)
    }

    /// Parts of one category, optionally narrowed by brand and condition.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    #[instrument(skip(self), fields(categoria_id = %id))]
    pub async fn categoria_refacciones(
        &self,
        id: CategoriaId,
        marca: Option<&str>,
        estado: Option<RefaccionEstado>,
    ) -> Result<CategoriaRefacciones, BackendError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(marca) = marca.filter(|m| !m.is_empty()) {
            params.push(("marca", marca.to_owned()));
        }
        if let Some(estado) = estado {
            params.push(("estado", estado.code().to_owned()));
        }
        self.send(
            self.request(
                Method::GET,
                &format!("/productos/categorias/{id}/refacciones/"),
                None,
            )
            .query(&params),
        )
        .await
    }

    /// Parts for the home page: in-stock rows first, at most `limit`.
    /// Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn destacados(&self, limit: usize) -> Result<Vec<Refaccion>, BackendError> {
        let key = CacheKey::Destacados { limit };
        if let Some(CacheValue::Refacciones(refacciones)) = self.inner.catalog_cache.get(&key).await
        {
            debug!("Cache hit for destacados");
            return Ok(refacciones);
        }

        let mut refacciones = self.refacciones(&RefaccionesQuery::default()).await?.results;
        refacciones.sort_by_key(|r| !r.en_existencia());
        refacciones.truncate(limit);

        self.inner
            .catalog_cache
            .insert(key, CacheValue::Refacciones(refacciones.clone()))
            .await;
        Ok(refacciones)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_omits_unset_filters() {
        let query = RefaccionesQuery {
            search: Some("bomba".into()),
            estado: Some(RefaccionEstado::Nuevo),
            ..RefaccionesQuery::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({ "search": "bomba", "estado": "NVO" }));
    }
}
