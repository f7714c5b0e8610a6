//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (stricter CSP for admin)
//!
//! Access control is the [`RequireStaff`] extractor on every `/admin` handler
//! except the unauthorized page. The theme is read with the [`Theme`]
//! extractor.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod theme;

pub use auth::{RequireStaff, StaffClaims, StaffUser};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use theme::Theme;
