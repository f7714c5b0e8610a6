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

/// Count with the Spanish noun for pieces.
///
/// Usage in templates: `{{ layout.cart_count|piezas }}` renders `1 pieza`,
/// `3 piezas`.
#[askama::filter_fn]
pub fn piezas(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = count.to_string();
    let noun = if count == "1" { "pieza" } else { "piezas" };
    Ok(format!("{count} {noun}"))
}
