//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span)
//! 5. Rate limiting on login and registration (governor)
//!
//! Authentication is done per handler by the extractors in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthRejection, RequireAdmin, RequireAuth, RequireStoreOwner};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
