//! Refaccionaria Core - Shared types and state machines.
//!
//! This crate provides common types used across all Refaccionaria components:
//! - `storefront` - Public catalog, cart, checkout and customer account
//! - `admin` - Back office for pedidos, servicios, ventas and inventario
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure reducers - no I/O,
//! no HTTP clients. Every state transition the web binaries render (cart edits,
//! checkout address selection, optimistic table updates) lives here so it can
//! be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, postal codes and status enums
//! - [`models`] - Resources exchanged with the backend REST API
//! - [`cart`] - Cart reducer
//! - [`checkout`] - Address creation/selection state machine
//! - [`optimistic`] - Apply/rollback reducer for optimistic updates
//! - [`action`] - `ActionState` result shape returned by form actions
//! - [`validation`] - Form validators with Spanish field messages
//! - [`ventas`] - Sales KPI derivation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod action;
pub mod cart;
pub mod checkout;
pub mod models;
pub mod optimistic;
pub mod types;
pub mod validation;
pub mod ventas;

pub use action::{ActionError, ActionState, FieldErrors, SERVICE_UNAVAILABLE, drf_message};
pub use types::*;
