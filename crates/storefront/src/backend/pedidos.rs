//! Order calls (`/pedidos/...`).

use refaccionaria_core::models::{CheckoutItem, CheckoutResponse, Listado, Paginated, Pedido};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError};

#[derive(Serialize)]
struct CheckoutBody<'a> {
    items: &'a [CheckoutItem],
}

impl BackendClient {
    /// Place an order for the cart lines.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the backend refuses the order, e.g. for
    /// insufficient stock.
    #[instrument(skip(self, token, items), fields(lines = items.len()))]
    pub async fn checkout(
        &self,
        token: &AccessToken,
        items: &[CheckoutItem],
    ) -> Result<CheckoutResponse, BackendError> {
        self.send(
            self.request(Method::POST, "/pedidos/checkout/", Some(token))
                .json(&CheckoutBody { items }),
        )
        .await
    }

    /// Order history of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn mis_pedidos(
        &self,
        token: &AccessToken,
        page: u32,
    ) -> Result<Paginated<Pedido>, BackendError> {
        let listado: Listado<Pedido> = self
            .send(
                self.request(Method::GET, "/pedidos/mis-pedidos/", Some(token))
                    .query(&[("page", page.max(1))]),
            )
            .await?;
        Ok(listado.into_page())
    }
}
