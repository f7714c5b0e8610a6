//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use refaccionaria_core::models::servicios::Conteo;
use refaccionaria_core::models::{Pedido, ServiciosEstadisticas};
use refaccionaria_core::ventas::{Periodo, VentasKpis};
use tracing::instrument;

use crate::filters;
use crate::middleware::{RequireStaff, Theme};
use crate::state::AppState;
use crate::views::{AdminLayout, Kpi};

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: AdminLayout,
    pub kpis: Vec<Kpi>,
    pub servicios: ServiciosEstadisticas,
    pub recent_pedidos: Vec<Pedido>,
    /// Sections that could not be loaded.
    pub avisos: Vec<&'static str>,
}

impl DashboardTemplate {
    /// Status counts in a stable order for the bar list.
    #[must_use]
    pub fn por_estado(&self) -> Vec<Conteo> {
        self.servicios
            .por_estado
            .iter()
            .map(|(nombre, count)| Conteo {
                nombre: nombre.clone(),
                count: *count,
            })
            .collect()
    }
}

fn kpis(ventas: Option<&VentasKpis>, pedidos_total: Option<u64>, servicios: &ServiciosEstadisticas) -> Vec<Kpi> {
    let mut kpis = Vec::new();
    if let Some(ventas) = ventas {
        kpis.push(Kpi::new("Ingresos del mes", ventas.ingresos_totales.display()));
        kpis.push(
            Kpi::new("Ingresos netos", ventas.ingresos_netos.display())
                .hint(format!("Devoluciones {}", ventas.devoluciones.display())),
        );
        kpis.push(Kpi::new("Ticket promedio", ventas.ticket_promedio.display()));
    }
    if let Some(total) = pedidos_total {
        kpis.push(Kpi::new("Pedidos", total.to_string()));
    }
    kpis.push(
        Kpi::new("Servicios abiertos", servicios.pendientes.to_string())
            .hint(format!("{} en total", servicios.total)),
    );
    kpis.push(Kpi::new(
        "Servicios completados",
        format!("{:.1}%", servicios.tasa_completado),
    ));
    kpis
}

/// Dashboard page handler.
///
/// The three sources are fetched concurrently; a failing source is logged
/// and its cards are left out rather than failing the page.
#[instrument(skip(state, user, theme))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
) -> DashboardTemplate {
    let backend = state.backend();
    let (ventas_result, pedidos_result, servicios_result) = tokio::join!(
        backend.estadisticas_ventas(&user.token, Periodo::Mes),
        backend.pedidos(&user.token, 1, None),
        backend.servicios_estadisticas(&user.token),
    );

    let mut avisos = Vec::new();

    let ventas = match ventas_result {
        Ok(stats) => Some(VentasKpis::from_estadisticas(&stats)),
        Err(e) => {
            tracing::error!("Failed to fetch ventas estadisticas: {e}");
            avisos.push("No se pudieron cargar las ventas");
            None
        }
    };

    let (pedidos_total, recent_pedidos) = match pedidos_result {
        Ok(page) => (Some(page.count), page.results.into_iter().take(5).collect()),
        Err(e) => {
            tracing::error!("Failed to fetch pedidos: {e}");
            avisos.push("No se pudieron cargar los pedidos");
            (None, vec![])
        }
    };

    let servicios = servicios_result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch servicios estadisticas: {e}");
        avisos.push("No se pudieron cargar los servicios");
        ServiciosEstadisticas::default()
    });

    DashboardTemplate {
        layout: AdminLayout::new(&user, theme, "/admin/dashboard"),
        kpis: kpis(ventas.as_ref(), pedidos_total, &servicios),
        servicios,
        recent_pedidos,
        avisos,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use refaccionaria_core::Price;
    use refaccionaria_core::models::{EstadisticasVentas, TotalYCantidad};

    use super::*;

    #[test]
    fn test_kpis_skip_missing_sources() {
        let servicios = ServiciosEstadisticas {
            total: 12,
            pendientes: 5,
            tasa_completado: 58.33,
            ..ServiciosEstadisticas::default()
        };
        let cards = kpis(None, None, &servicios);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].value, "5");
        assert_eq!(cards[0].hint.as_deref(), Some("12 en total"));
        assert_eq!(cards[1].value, "58.3%");
    }

    #[test]
    fn test_kpis_with_sales() {
        let stats = EstadisticasVentas {
            ventas_servicios: TotalYCantidad {
                total: Price::from_centavos(30_000),
                cantidad: 1,
            },
            ventas_refacciones: TotalYCantidad {
                total: Price::from_centavos(10_000),
                cantidad: 3,
            },
            devoluciones: TotalYCantidad::default(),
        };
        let ventas = VentasKpis::from_estadisticas(&stats);
        let cards = kpis(Some(&ventas), Some(40), &ServiciosEstadisticas::default());
        assert_eq!(cards[0].label, "Ingresos del mes");
        assert_eq!(cards[0].value, ventas.ingresos_totales.display());
        assert!(cards.iter().any(|k| k.label == "Pedidos" && k.value == "40"));
    }
}
