//! Stock movements (`/inventario/...`) and the part picker.

use chrono::NaiveDate;
use refaccionaria_core::models::{Listado, MovimientoInventario, Paginated, Refaccion};
use refaccionaria_core::validation::{MovimientoKind, MovimientoPayload};
use refaccionaria_core::{RefaccionId, TipoMovimiento};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError};

/// Filters for the movements table, in the backend's parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovimientosQuery {
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_movimiento: Option<TipoMovimiento>,
    /// Django ordering, e.g. `-fecha`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refaccion: Option<RefaccionId>,
    #[serde(rename = "fecha__gte", skip_serializing_if = "Option::is_none")]
    pub fecha_desde: Option<NaiveDate>,
    #[serde(rename = "fecha__lte", skip_serializing_if = "Option::is_none")]
    pub fecha_hasta: Option<NaiveDate>,
}

#[derive(Serialize)]
struct BusquedaQuery<'a> {
    search: &'a str,
    page_size: u32,
}

impl BackendClient {
    /// A page of movements. The endpoint answers either a page or a bare list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn movimientos(
        &self,
        token: &AccessToken,
        query: &MovimientosQuery,
    ) -> Result<Paginated<MovimientoInventario>, BackendError> {
        let query = MovimientosQuery {
            page: query.page.max(1),
            ..query.clone()
        };
        let listado: Listado<MovimientoInventario> = self
            .send(
                self.request(Method::GET, "/inventario/refacciones/", token)
                    .query(&query),
            )
            .await?;
        Ok(listado.into_page())
    }

    /// Register an entrada, salida or devolución.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a rejected movement, e.g. insufficient stock.
    #[instrument(skip(self, token, payload), fields(kind = kind.path(), refaccion = %payload.refaccion))]
    pub async fn registrar_movimiento(
        &self,
        token: &AccessToken,
        kind: MovimientoKind,
        payload: &MovimientoPayload,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(
                Method::POST,
                &format!("/inventario/{}/", kind.path()),
                token,
            )
            .json(payload),
        )
        .await
    }

    /// Parts whose name or code matches `search`, for the movement form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn buscar_refacciones(
        &self,
        token: &AccessToken,
        search: &str,
    ) -> Result<Vec<Refaccion>, BackendError> {
        let listado: Listado<Refaccion> = self
            .send(
                self.request(Method::GET, "/productos/refacciones/", token)
                    .query(&BusquedaQuery {
                        search,
                        page_size: 50,
                    }),
            )
            .await?;
        Ok(listado.into_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_uses_backend_names() {
        let query = MovimientosQuery {
            page: 2,
            tipo_movimiento: Some(TipoMovimiento::Salida),
            fecha_desde: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..MovimientosQuery::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["tipo_movimiento"], "SAL");
        assert_eq!(json["fecha__gte"], "2025-01-01");
        assert!(json.get("fecha__lte").is_none());
        assert!(json.get("search").is_none());
    }
}
