//! Sales ledger handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use refaccionaria_core::models::Venta;
use refaccionaria_core::validation::blank_as_none;
use refaccionaria_core::ventas::{Periodo, VentasKpis};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::VentasQuery;
use crate::components::{DataTableConfig, data_table::ventas_table_config};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireStaff, Theme};
use crate::state::AppState;
use crate::views::{AdminLayout, Kpi, Pager};

const TIPOS: [&str; 3] = ["refaccion", "servicio", "devolucion"];

#[derive(Debug, Deserialize)]
pub struct VentasParams {
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tipo: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub periodo: Option<String>,
}

/// Sales page.
#[derive(Template, WebTemplate)]
#[template(path = "ventas.html")]
pub struct VentasTemplate {
    pub layout: AdminLayout,
    pub periodo: Periodo,
    pub kpis: Vec<Kpi>,
    pub table: DataTableConfig,
    pub ventas: Vec<Venta>,
    pub pager: Pager,
    pub total: u64,
    /// Set when the statistics could not be loaded.
    pub aviso: Option<&'static str>,
}

fn kpis(ventas: &VentasKpis) -> Vec<Kpi> {
    vec![
        Kpi::new("Ingresos totales", ventas.ingresos_totales.display()),
        Kpi::new("Transacciones", ventas.transacciones.to_string()),
        Kpi::new("Ticket promedio", ventas.ticket_promedio.display()),
        Kpi::new("Servicios / refacciones", ventas.ratio_display()),
        Kpi::new("Ingresos netos", ventas.ingresos_netos.display())
            .hint(format!("Devoluciones {}", ventas.devoluciones.display())),
    ]
}

/// List sales with the KPIs for the chosen period.
///
/// Statistics failures only hide the KPI cards; a failing listing fails the
/// page.
#[instrument(skip(state, user, theme))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    theme: Theme,
    Query(params): Query<VentasParams>,
) -> Result<VentasTemplate> {
    let page = params.page.unwrap_or(1).max(1);
    let periodo = params
        .periodo
        .as_deref()
        .and_then(Periodo::from_param)
        .unwrap_or_default();
    let tipo = params.tipo.filter(|t| TIPOS.contains(&t.as_str()));
    let query = VentasQuery {
        page,
        tipo,
        search: params.search,
    };

    let backend = state.backend();
    let (ventas, estadisticas) = tokio::join!(
        backend.ventas(&user.token, &query),
        backend.estadisticas_ventas(&user.token, periodo),
    );
    let ventas = ventas?;

    let (kpis, aviso) = match estadisticas {
        Ok(stats) => (kpis(&VentasKpis::from_estadisticas(&stats)), None),
        Err(e) => {
            tracing::error!("Failed to fetch ventas estadisticas: {e}");
            (vec![], Some("No se pudieron cargar las estadísticas"))
        }
    };

    let table = ventas_table_config(query.tipo.as_deref(), query.search.as_deref(), periodo);
    let pager = Pager::new(&table.base_url(), page, &ventas);
    Ok(VentasTemplate {
        layout: AdminLayout::new(&user, theme, "/admin/ventas"),
        periodo,
        kpis,
        table,
        pager,
        total: ventas.count,
        ventas: ventas.results,
        aviso,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use refaccionaria_core::Price;
    use refaccionaria_core::models::{EstadisticasVentas, TotalYCantidad};

    use super::*;

    #[test]
    fn test_kpis_without_parts_sales() {
        let stats = EstadisticasVentas {
            ventas_servicios: TotalYCantidad {
                total: Price::from_centavos(50_000),
                cantidad: 2,
            },
            ..EstadisticasVentas::default()
        };
        let cards = kpis(&VentasKpis::from_estadisticas(&stats));
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[1].value, "2");
        assert_eq!(cards[3].value, "N/A");
    }
}
