//! Data table component types.
//!
//! These types define the columns and the filter bar of the back office
//! tables. The filter bar is a plain GET form, so every filter carries the
//! value currently applied.

use refaccionaria_core::ventas::Periodo;
use refaccionaria_core::{PedidoEstado, TipoMovimiento};
use serde::Serialize;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

impl TableColumn {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Text,
    Select,
    Date,
}

/// Filter definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    pub label: String,
    pub filter_type: FilterType,
    pub placeholder: Option<String>,
    /// Available options (for selects). An empty value means "all".
    pub options: Vec<FilterOption>,
    /// Value currently applied, empty when unset.
    pub value: String,
}

/// Option for select filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: Some(placeholder.to_string()),
            options: vec![],
            value: String::new(),
        }
    }

    /// A select whose first option clears the filter.
    #[must_use]
    pub fn select(key: &str, label: &str, all_label: &str, options: Vec<FilterOption>) -> Self {
        let mut all = vec![FilterOption::new("", all_label)];
        all.extend(options);
        Self::choice(key, label, all)
    }

    /// A select that always has one of `options` applied.
    #[must_use]
    pub fn choice(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: None,
            options,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn date(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Date,
            placeholder: None,
            options: vec![],
            value: String::new(),
        }
    }

    /// Set the applied value.
    #[must_use]
    pub fn with_value(mut self, value: Option<&str>) -> Self {
        self.value = value.unwrap_or_default().to_string();
        self
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.filter_type, FilterType::Text)
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self.filter_type, FilterType::Select)
    }

    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self.filter_type, FilterType::Date)
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier, also the `id` of the `<tbody>`.
    pub table_id: String,
    /// Page the filter form submits to.
    pub action: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub empty_title: String,
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str, action: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            action: action.to_string(),
            columns: vec![],
            filters: vec![],
            empty_title: "Sin resultados".to_string(),
            empty_description: None,
        }
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Query string (`a=1&b=2`) of the applied filters, for pager links.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.filters
            .iter()
            .filter(|f| !f.value.is_empty())
            .map(|f| format!("{}={}", f.key, urlencoding::encode(&f.value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `action` plus the applied filters, ready for `page=` to be appended.
    #[must_use]
    pub fn base_url(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.action.clone()
        } else {
            format!("{}?{query}", self.action)
        }
    }
}

/// Orders table, filtered by status.
#[must_use]
pub fn pedidos_table_config(estado: Option<PedidoEstado>) -> DataTableConfig {
    let options = PedidoEstado::ALL
        .iter()
        .map(|e| FilterOption::new(e.code(), e.label()))
        .collect();
    DataTableConfig::new("pedidos", "/admin/pedidos")
        .column(TableColumn::new("id", "Pedido"))
        .column(TableColumn::new("cliente", "Cliente"))
        .column(TableColumn::new("fecha", "Fecha"))
        .column(TableColumn::new("unidades", "Piezas"))
        .column(TableColumn::new("total", "Total"))
        .column(TableColumn::new("pago", "Pago"))
        .column(TableColumn::new("estado", "Estado"))
        .filter(
            TableFilter::select("estado", "Estado", "Todos", options)
                .with_value(estado.map(PedidoEstado::code)),
        )
        .empty_state("No hay pedidos", Some("Prueba con otro estado"))
}

/// Service tickets table, with free-text search.
#[must_use]
pub fn servicios_table_config(search: Option<&str>) -> DataTableConfig {
    DataTableConfig::new("servicios", "/admin/servicios")
        .column(TableColumn::new("no", "No."))
        .column(TableColumn::new("fecha", "Fecha"))
        .column(TableColumn::new("cliente", "Cliente"))
        .column(TableColumn::new("telefono", "Teléfono"))
        .column(TableColumn::new("aparato", "Aparato"))
        .column(TableColumn::new("marca", "Marca"))
        .column(TableColumn::new("estado", "Estado"))
        .column(TableColumn::new("pago", "Pago"))
        .column(TableColumn::new("acciones", ""))
        .filter(
            TableFilter::text("search", "Buscar", "Cliente, aparato o marca").with_value(search),
        )
        .empty_state(
            "No hay servicios",
            Some("Registra el primero con el formulario"),
        )
}

/// Sales table, filtered by kind and search, with the KPI period.
#[must_use]
pub fn ventas_table_config(
    tipo: Option<&str>,
    search: Option<&str>,
    periodo: Periodo,
) -> DataTableConfig {
    let periodos = [Periodo::Dia, Periodo::Mes, Periodo::Anio]
        .iter()
        .map(|p| FilterOption::new(p.param(), p.label()))
        .collect();

    DataTableConfig::new("ventas", "/admin/ventas")
        .column(TableColumn::new("id", "Folio"))
        .column(TableColumn::new("tipo", "Tipo"))
        .column(TableColumn::new("descripcion", "Descripción"))
        .column(TableColumn::new("fecha", "Fecha"))
        .column(TableColumn::new("pago", "Pago"))
        .column(TableColumn::new("total", "Total"))
        .filter(
            TableFilter::select(
                "tipo",
                "Tipo",
                "Todas",
                vec![
                    FilterOption::new("refaccion", "Refacciones"),
                    FilterOption::new("servicio", "Servicios"),
                    FilterOption::new("devolucion", "Devoluciones"),
                ],
            )
            .with_value(tipo),
        )
        .filter(TableFilter::text("search", "Buscar", "Refacción, aparato o cliente").with_value(search))
        .filter(TableFilter::choice("periodo", "Periodo", periodos).with_value(Some(periodo.param())))
        .empty_state("No hay ventas", None)
}

/// Filters applied to the movements table, as the page received them.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventarioFiltros<'a> {
    pub search: Option<&'a str>,
    pub tipo_movimiento: Option<TipoMovimiento>,
    pub ordering: Option<&'a str>,
    pub fecha_desde: Option<&'a str>,
    pub fecha_hasta: Option<&'a str>,
}

/// Stock movements table.
#[must_use]
pub fn inventario_table_config(filtros: InventarioFiltros<'_>) -> DataTableConfig {
    let tipos = TipoMovimiento::ALL
        .iter()
        .map(|t| FilterOption::new(t.code(), t.label()))
        .collect();
    DataTableConfig::new("movimientos", "/admin/inventario")
        .column(TableColumn::new("fecha", "Fecha"))
        .column(TableColumn::new("refaccion", "Refacción"))
        .column(TableColumn::new("marca", "Marca"))
        .column(TableColumn::new("tipo", "Tipo"))
        .column(TableColumn::new("cantidad", "Cantidad"))
        .column(TableColumn::new("precio_unitario", "Precio unitario"))
        .column(TableColumn::new("observaciones", "Observaciones"))
        .filter(TableFilter::text("search", "Buscar", "Refacción o marca").with_value(filtros.search))
        .filter(
            TableFilter::select("tipo_movimiento", "Tipo", "Todos", tipos)
                .with_value(filtros.tipo_movimiento.map(TipoMovimiento::code)),
        )
        .filter(TableFilter::date("fecha_desde", "Desde").with_value(filtros.fecha_desde))
        .filter(TableFilter::date("fecha_hasta", "Hasta").with_value(filtros.fecha_hasta))
        .filter(
            TableFilter::select(
                "ordering",
                "Orden",
                "Más recientes",
                vec![
                    FilterOption::new("fecha", "Más antiguos"),
                    FilterOption::new("-cantidad", "Mayor cantidad"),
                    FilterOption::new("cantidad", "Menor cantidad"),
                ],
            )
            .with_value(filtros.ordering),
        )
        .empty_state("No hay movimientos", Some("Ajusta los filtros o registra una entrada"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pedidos_filter_marks_selected() {
        let config = pedidos_table_config(Some(PedidoEstado::Enviado));
        let estado = &config.filters[0];
        assert_eq!(estado.value, "ENV");
        assert_eq!(estado.options[0].value, "");
        assert_eq!(estado.options.len(), PedidoEstado::ALL.len() + 1);
        assert_eq!(config.base_url(), "/admin/pedidos?estado=ENV");
    }

    #[test]
    fn test_base_url_without_filters() {
        let config = servicios_table_config(None);
        assert_eq!(config.base_url(), "/admin/servicios");
        assert!(config.has_filters());
    }

    #[test]
    fn test_query_string_encodes_values() {
        let config = ventas_table_config(Some("servicio"), Some("José Pérez"), Periodo::Anio);
        assert_eq!(
            config.query_string(),
            "tipo=servicio&search=Jos%C3%A9%20P%C3%A9rez&periodo=a%C3%B1o"
        );
        let periodo = config.filters.iter().find(|f| f.key == "periodo").unwrap();
        assert_eq!(periodo.options.len(), 3);
    }

    #[test]
    fn test_inventario_filters() {
        let config = inventario_table_config(InventarioFiltros {
            tipo_movimiento: Some(TipoMovimiento::Entrada),
            fecha_desde: Some("2025-01-01"),
            ..InventarioFiltros::default()
        });
        assert_eq!(
            config.base_url(),
            "/admin/inventario?tipo_movimiento=ENT&fecha_desde=2025-01-01"
        );
        let ordering = config.filters.iter().find(|f| f.key == "ordering").unwrap();
        assert_eq!(ordering.options[0].label, "Más recientes");
    }
}
