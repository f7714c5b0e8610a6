//! Sales KPIs derived from `/ventas/all/estadisticas/`.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::EstadisticasVentas;
use crate::types::Price;

/// Period the statistics endpoint aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Periodo {
    Dia,
    #[default]
    Mes,
    Anio,
}

impl Periodo {
    /// Value of the `tipo` query parameter.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Dia => "dia",
            Self::Mes => "mes",
            Self::Anio => "año",
        }
    }

    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "dia" => Some(Self::Dia),
            "mes" => Some(Self::Mes),
            "año" | "anio" => Some(Self::Anio),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dia => "Hoy",
            Self::Mes => "Este mes",
            Self::Anio => "Este año",
        }
    }
}

/// Headline numbers for the sales dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VentasKpis {
    /// Services plus parts.
    pub ingresos_totales: Price,
    pub transacciones: u64,
    /// Zero when there were no transactions.
    pub ticket_promedio: Price,
    /// Services as a percentage of parts; `None` when parts sold nothing.
    pub ratio_servicios_refacciones: Option<Decimal>,
    pub devoluciones: Price,
    /// Income minus returns.
    pub ingresos_netos: Price,
}

impl VentasKpis {
    #[must_use]
    pub fn from_estadisticas(stats: &EstadisticasVentas) -> Self {
        let servicios = stats.ventas_servicios;
        let refacciones = stats.ventas_refacciones;

        let ingresos_totales = servicios.total + refacciones.total;
        let transacciones = servicios.cantidad + refacciones.cantidad;

        let ticket_promedio = if transacciones == 0 {
            Price::ZERO
        } else {
            Price::new((ingresos_totales.amount() / Decimal::from(transacciones)).round_dp(2))
        };

        let ratio_servicios_refacciones = if refacciones.total.is_zero() {
            None
        } else {
            Some(
                (servicios.total.amount() / refacciones.total.amount() * Decimal::ONE_HUNDRED)
                    .round_dp(1),
            )
        };

        Self {
            ingresos_totales,
            transacciones,
            ticket_promedio,
            ratio_servicios_refacciones,
            devoluciones: stats.devoluciones.total,
            ingresos_netos: Price::new(ingresos_totales.amount() - stats.devoluciones.total.amount()),
        }
    }

    /// Ratio formatted for a KPI card, `N/A` when undefined.
    #[must_use]
    pub fn ratio_display(&self) -> String {
        self.ratio_servicios_refacciones
            .map_or_else(|| "N/A".to_owned(), |r| format!("{r:.1}%"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::TotalYCantidad;

    fn stats(servicios: (i64, u64), refacciones: (i64, u64), devoluciones: i64) -> EstadisticasVentas {
        EstadisticasVentas {
            ventas_servicios: TotalYCantidad {
                total: Price::from_centavos(servicios.0),
                cantidad: servicios.1,
            },
            ventas_refacciones: TotalYCantidad {
                total: Price::from_centavos(refacciones.0),
                cantidad: refacciones.1,
            },
            devoluciones: TotalYCantidad {
                total: Price::from_centavos(devoluciones),
                cantidad: 0,
            },
        }
    }

    #[test]
    fn test_kpis() {
        let kpis = VentasKpis::from_estadisticas(&stats((50_000, 2), (100_000, 3), 10_000));
        assert_eq!(kpis.ingresos_totales, Price::from_centavos(150_000));
        assert_eq!(kpis.transacciones, 5);
        assert_eq!(kpis.ticket_promedio, Price::from_centavos(30_000));
        assert_eq!(kpis.ratio_servicios_refacciones, Some(Decimal::new(500, 1)));
        assert_eq!(kpis.ratio_display(), "50.0%");
        assert_eq!(kpis.ingresos_netos, Price::from_centavos(140_000));
    }

    #[test]
    fn test_no_transactions() {
        let kpis = VentasKpis::from_estadisticas(&EstadisticasVentas::default());
        assert_eq!(kpis.ticket_promedio, Price::ZERO);
        assert_eq!(kpis.ratio_servicios_refacciones, None);
        assert_eq!(kpis.ratio_display(), "N/A");
    }

    #[test]
    fn test_periodo_params() {
        assert_eq!(Periodo::from_param("año"), Some(Periodo::Anio));
        assert_eq!(Periodo::from_param("anio"), Some(Periodo::Anio));
        assert_eq!(Periodo::default().param(), "mes");
        assert_eq!(Periodo::from_param("semana"), None);
    }
}
