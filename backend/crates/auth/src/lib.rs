//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store traits
//! - `application/` - Use cases and application services
//! - `infra/` - Store implementations (Postgres, in-memory) and mail
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Member login with email + password
//! - Two-factor administrator login (password + emailed one-time code)
//! - Stateless signed session tokens carried in HttpOnly cookies
//! - Shared brute-force throttle with sliding window and lockout
//!
//! ## Security Model
//! - Secrets hashed with salted scrypt, verified in constant time
//! - Unknown accounts burn a full derivation (no enumeration by timing)
//! - One-time codes are single-use and expire after 10 minutes
//! - Account status and role are re-checked on every session resolution

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthStore;
pub use presentation::router::{admin_router, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryAuthStore;
    pub use crate::infra::postgres::PgAuthStore as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
