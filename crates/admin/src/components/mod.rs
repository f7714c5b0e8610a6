//! Reusable table configuration for the back office pages.

pub mod data_table;

pub use data_table::{DataTableConfig, FilterOption, InventarioFiltros, TableColumn, TableFilter};
