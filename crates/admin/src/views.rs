//! View models shared by the back office templates.

use askama::Template;
use askama_web::WebTemplate;
use refaccionaria_core::models::{Paginated, Pedido, Servicio};
use refaccionaria_core::{EstadoPago, PedidoEstado, ServicioEstado};

use crate::backend::PAGE_SIZE;
use crate::components::FilterOption;
use crate::middleware::{StaffUser, Theme};

/// Data every page's chrome needs.
#[derive(Debug, Clone)]
pub struct AdminLayout {
    pub username: String,
    pub theme: Theme,
    pub current_path: String,
}

impl AdminLayout {
    #[must_use]
    pub fn new(user: &StaffUser, theme: Theme, current_path: &str) -> Self {
        Self {
            username: user.username.clone(),
            theme,
            current_path: current_path.to_owned(),
        }
    }

    /// Whether the nav link for `prefix` is the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        self.current_path.starts_with(prefix)
    }
}

/// Previous/next links for a paginated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// `base` already carries any filters; `page=` is appended.
    #[must_use]
    pub fn new<T>(base: &str, page: u32, results: &Paginated<T>) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        let page = page.max(1);
        Self {
            page,
            total_pages: results.total_pages(PAGE_SIZE),
            prev_url: results
                .has_previous()
                .then(|| format!("{base}{sep}page={}", page.saturating_sub(1).max(1))),
            next_url: results
                .has_next()
                .then(|| format!("{base}{sep}page={}", page + 1)),
        }
    }
}

/// A status `<select>` that saves itself on change.
///
/// Posted as `{field}=<new>&actual=<current>`; the handler answers with this
/// same cell, showing whatever value survived the backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstadoSelect {
    /// DOM id of the cell, the `hx-target` of its own form.
    pub dom_id: String,
    pub action: String,
    pub field: &'static str,
    pub current: String,
    pub options: Vec<FilterOption>,
}

impl EstadoSelect {
    #[must_use]
    pub fn pedido(pedido: &Pedido) -> Self {
        Self::pedido_estado(&pedido.id.to_string(), pedido.estado)
    }

    #[must_use]
    pub fn pedido_estado(id: &str, estado: PedidoEstado) -> Self {
        Self {
            dom_id: format!("pedido-{id}-estado"),
            action: format!("/admin/pedidos/{id}/estado"),
            field: "estado",
            current: estado.code().to_owned(),
            options: PedidoEstado::ALL
                .iter()
                .map(|e| FilterOption::new(e.code(), e.label()))
                .collect(),
        }
    }

    #[must_use]
    pub fn servicio_estado(id: &str, estado: ServicioEstado) -> Self {
        Self {
            dom_id: format!("servicio-{id}-estado"),
            action: format!("/admin/servicios/{id}/estado"),
            field: "estado",
            current: estado.label().to_owned(),
            options: ServicioEstado::ALL
                .iter()
                .map(|e| FilterOption::new(e.label(), e.label()))
                .collect(),
        }
    }

    #[must_use]
    pub fn servicio_pago(id: &str, pago: EstadoPago) -> Self {
        Self {
            dom_id: format!("servicio-{id}-pago"),
            action: format!("/admin/servicios/{id}/pago"),
            field: "estado_pago",
            current: pago.label().to_owned(),
            options: EstadoPago::ALL
                .iter()
                .map(|e| FilterOption::new(e.label(), e.label()))
                .collect(),
        }
    }
}

/// A single status cell, swapped in place by HTMX after a change.
#[derive(Template, WebTemplate)]
#[template(path = "partials/estado_select.html")]
pub struct EstadoCell {
    pub cell: EstadoSelect,
}

/// One row of the orders table.
#[derive(Debug, Clone)]
pub struct PedidoRow {
    pub pedido: Pedido,
    pub cliente: String,
    pub estado: EstadoSelect,
}

impl From<Pedido> for PedidoRow {
    fn from(pedido: Pedido) -> Self {
        let cliente = if pedido.usuario_nombre.trim().is_empty() {
            pedido.usuario_email.clone()
        } else {
            pedido.usuario_nombre.clone()
        };
        Self {
            estado: EstadoSelect::pedido(&pedido),
            cliente,
            pedido,
        }
    }
}

/// One row of the service tickets table.
#[derive(Debug, Clone)]
pub struct ServicioRow {
    pub servicio: Servicio,
    /// Ticket number; tickets without one cannot be edited from the table.
    pub numero: Option<String>,
    pub estado: Option<EstadoSelect>,
    pub pago: Option<EstadoSelect>,
}

impl From<Servicio> for ServicioRow {
    fn from(servicio: Servicio) -> Self {
        let numero = servicio.no_de_servicio.map(|id| id.to_string());
        let estado = numero
            .as_deref()
            .map(|id| EstadoSelect::servicio_estado(id, servicio.estado));
        let pago = numero.as_deref().map(|id| {
            EstadoSelect::servicio_pago(id, servicio.estado_pago.unwrap_or(EstadoPago::Pendiente))
        });
        Self {
            servicio,
            numero,
            estado,
            pago,
        }
    }
}

/// A headline number on the dashboard or the sales page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
    pub hint: Option<String>,
}

impl Kpi {
    #[must_use]
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
