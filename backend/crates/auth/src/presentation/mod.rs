//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{authenticate_bearer, require_auth, require_roles, AuthMiddlewareState};
pub use router::{admin_router, auth_router};
