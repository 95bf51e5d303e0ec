//! Auth Router

use axum::middleware::from_fn;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::sms::SmsSender;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_auth, require_roles, AuthMiddlewareState};

/// Roles allowed on the admin surface
const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Officer];

/// Create the auth router, mounted under /api/auth
pub fn auth_router<R, S>(repo: Arc<R>, sms: Arc<S>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: repo.clone(),
        sms,
        config: config.clone(),
    };
    let mw_state = AuthMiddlewareState { repo, config };

    let public = Router::new()
        .route("/register", post(handlers::register::<R, S>))
        .route("/login", post(handlers::login::<R, S>))
        .route("/otp/request", post(handlers::otp_request::<R, S>))
        .route("/otp/verify", post(handlers::otp_verify::<R, S>))
        .route("/totp/verify", post(handlers::totp_login::<R, S>));

    let protected = Router::new()
        .route("/totp/setup", post(handlers::totp_setup::<R, S>))
        .route(
            "/totp/setup/verify",
            post(handlers::totp_setup_verify::<R, S>),
        )
        .route("/profile", get(handlers::get_profile::<R, S>))
        .route("/profile", put(handlers::update_profile::<R, S>))
        .layer(from_fn(move |req, next| {
            let st = mw_state.clone();
            async move { require_auth(st, req, next).await }
        }));

    public.merge(protected).with_state(state)
}

/// Create the admin router, mounted under /api/admin
///
/// Every route is gated on the staff allow-set (admin or officer).
pub fn admin_router<R, S>(repo: Arc<R>, sms: Arc<S>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: repo.clone(),
        sms,
        config: config.clone(),
    };
    let mw_state = AuthMiddlewareState { repo, config };

    Router::new()
        .route("/users", get(handlers::list_users::<R, S>))
        .layer(from_fn(move |req, next| {
            let st = mw_state.clone();
            async move { require_roles(st, STAFF_ROLES, req, next).await }
        }))
        .with_state(state)
}
