//! Sales ledger (`/ventas/all/`) and its statistics.

use refaccionaria_core::models::{EstadisticasVentas, Listado, Paginated, Venta};
use refaccionaria_core::ventas::Periodo;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError};

/// Filters for the sales table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VentasQuery {
    pub page: u32,
    /// `refaccion`, `servicio` or `devolucion`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Serialize)]
struct EstadisticasQuery {
    tipo: &'static str,
}

impl BackendClient {
    /// A page of parts sales, service sales and returns, mixed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn ventas(
        &self,
        token: &AccessToken,
        query: &VentasQuery,
    ) -> Result<Paginated<Venta>, BackendError> {
        let query = VentasQuery {
            page: query.page.max(1),
            ..query.clone()
        };
        let listado: Listado<Venta> = self
            .send(self.request(Method::GET, "/ventas/all/", token).query(&query))
            .await?;
        Ok(listado.into_page())
    }

    /// Totals for the current day, month or year.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(periodo = periodo.param()))]
    pub async fn estadisticas_ventas(
        &self,
        token: &AccessToken,
        periodo: Periodo,
    ) -> Result<EstadisticasVentas, BackendError> {
        self.send(
            self.request(Method::GET, "/ventas/all/estadisticas/", token)
                .query(&EstadisticasQuery {
                    tipo: periodo.param(),
                }),
        )
        .await
    }
}
