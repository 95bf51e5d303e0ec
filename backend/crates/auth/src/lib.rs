//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration and password login with email or phone
//! - Phone OTP login with on-demand citizen provisioning
//! - TOTP-based 2FA (Google Authenticator compatible)
//! - Stateless bearer tokens (HS256)
//! - Role-based access (Citizen, Officer, Admin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id; bcrypt and plaintext legacy rows
//!   upgraded transparently on first successful login
//! - OTP codes stored as SHA-256 hashes with a 5-attempt ceiling
//! - TOTP secrets sealed with AES-256-GCM at rest
//! - Each TOTP time step grants at most one login

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
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
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
