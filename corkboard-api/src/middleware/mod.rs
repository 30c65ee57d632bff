//! HTTP middleware for the API server
//!
//! - `security`: response security headers (OWASP recommendations)
//!
//! JWT authentication is a per-route-group layer defined in `app.rs`.

pub mod security;
