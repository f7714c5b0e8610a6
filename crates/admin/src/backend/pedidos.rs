//! Order management (`/pedidos/all/`, `/pedidos/{id}/update-estado/`).

use refaccionaria_core::models::{Listado, Paginated, Pedido};
use refaccionaria_core::{PedidoEstado, PedidoId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError};

#[derive(Serialize)]
struct PedidosQuery {
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    estado: Option<PedidoEstado>,
}

#[derive(Serialize)]
struct EstadoBody {
    estado: PedidoEstado,
}

impl BackendClient {
    /// Every customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the token lacks staff permissions.
    #[instrument(skip(self, token))]
    pub async fn pedidos(
        &self,
        token: &AccessToken,
        page: u32,
        estado: Option<PedidoEstado>,
    ) -> Result<Paginated<Pedido>, BackendError> {
        let query = PedidosQuery {
            page: page.max(1),
            estado,
        };
        let listado: Listado<Pedido> = self
            .send(
                self.request(Method::GET, "/pedidos/all/", token)
                    .query(&query),
            )
            .await?;
        Ok(listado.into_page())
    }

    /// Move an order to another status.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the backend refuses the transition.
    #[instrument(skip(self, token), fields(pedido = %id, estado = estado.code()))]
    pub async fn update_pedido_estado(
        &self,
        token: &AccessToken,
        id: PedidoId,
        estado: PedidoEstado,
    ) -> Result<Pedido, BackendError> {
        self.send(
            self.request(Method::PATCH, &format!("/pedidos/{id}/update-estado/"), token)
                .json(&EstadoBody { estado }),
        )
        .await
    }
}
