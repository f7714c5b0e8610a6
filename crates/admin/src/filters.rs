//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Percentage with one decimal, for completion rates.
///
/// Usage in templates: `{{ stats.tasa_completado|porcentaje }}` renders `62.5%`.
#[askama::filter_fn]
pub fn porcentaje(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .parse::<f64>()
        .map_or_else(|_| format!("{raw}%"), |v| format!("{v:.1}%")))
}
