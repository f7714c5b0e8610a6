//! Core types for Refaccionaria.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod postal_code;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use postal_code::{PostalCode, PostalCodeError};
pub use price::Price;
pub use status::*;
