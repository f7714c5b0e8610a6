//! Repair tickets (`/servicios/...`) and their sales (`/ventas/registros-servicios/`).

use refaccionaria_core::models::{
    Listado, NotaServicio, Paginated, Servicio, ServiciosEstadisticas, VentaServicioInput,
};
use refaccionaria_core::{EstadoPago, ServicioEstado, ServicioId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError, PAGE_SIZE};

#[derive(Serialize)]
struct ServiciosQuery<'a> {
    page: u32,
    page_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

/// Partial update of a ticket; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServicioPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<ServicioEstado>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado_pago: Option<EstadoPago>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nota: Option<NotaServicio>,
}

impl BackendClient {
    /// A page of tickets, optionally filtered by a free-text search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn servicios(
        &self,
        token: &AccessToken,
        page: u32,
        search: Option<&str>,
    ) -> Result<Paginated<Servicio>, BackendError> {
        let query = ServiciosQuery {
            page: page.max(1),
            page_size: PAGE_SIZE,
            search,
        };
        let listado: Listado<Servicio> = self
            .send(self.request(Method::GET, "/servicios/", token).query(&query))
            .await?;
        Ok(listado.into_page())
    }

    /// Open a new ticket.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with per-field messages for a rejected ticket.
    #[instrument(skip(self, token, servicio), fields(cliente = %servicio.cliente))]
    pub async fn crear_servicio(
        &self,
        token: &AccessToken,
        servicio: &Servicio,
    ) -> Result<Servicio, BackendError> {
        self.send(
            self.request(Method::POST, "/servicios/nuevo/", token)
                .json(servicio),
        )
        .await
    }

    /// A single ticket.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ticket.
    #[instrument(skip(self, token))]
    pub async fn servicio(
        &self,
        token: &AccessToken,
        id: ServicioId,
    ) -> Result<Servicio, BackendError> {
        self.send(self.request(Method::GET, &format!("/servicios/{id}/"), token))
            .await
    }

    /// Replace a ticket's fields. The ticket number comes from `id`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with per-field messages for a rejected edit.
    #[instrument(skip(self, token, servicio))]
    pub async fn actualizar_servicio(
        &self,
        token: &AccessToken,
        id: ServicioId,
        servicio: &Servicio,
    ) -> Result<(), BackendError> {
        let servicio = Servicio {
            no_de_servicio: Some(id),
            ..servicio.clone()
        };
        self.send_empty(
            self.request(Method::PUT, &format!("/servicios/{id}/"), token)
                .json(&servicio),
        )
        .await
    }

    /// Change some fields of a ticket.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ticket.
    #[instrument(skip(self, token))]
    pub async fn patch_servicio(
        &self,
        token: &AccessToken,
        id: ServicioId,
        patch: &ServicioPatch,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::PATCH, &format!("/servicios/{id}/"), token)
                .json(patch),
        )
        .await
    }

    /// Delete a ticket. The backend answers 204.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ticket.
    #[instrument(skip(self, token))]
    pub async fn eliminar_servicio(
        &self,
        token: &AccessToken,
        id: ServicioId,
    ) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/servicios/{id}/"), token))
            .await
    }

    /// Aggregate counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn servicios_estadisticas(
        &self,
        token: &AccessToken,
    ) -> Result<ServiciosEstadisticas, BackendError> {
        self.send(self.request(Method::GET, "/servicios/estadisticas/", token))
            .await
    }

    /// Record the sale that closes a repaired ticket.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the backend rejects the amounts.
    #[instrument(skip(self, token, venta), fields(servicio = %venta.servicio))]
    pub async fn registrar_venta_servicio(
        &self,
        token: &AccessToken,
        venta: &VentaServicioInput,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/ventas/registros-servicios/", token)
                .json(venta),
        )
        .await
    }
}
