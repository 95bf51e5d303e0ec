//! Auth Middleware
//!
//! Bearer token authentication and role gating for protected routes.
//! The authenticated `User` lands in request extensions for handlers.

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::decode_token;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Middleware state
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            config: Arc::clone(&self.config),
        }
    }
}

/// Pull the token out of an Authorization: Bearer header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Whether a role is in the allow-set
pub fn role_allowed(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(&role)
}

/// Resolve a bearer token to a live user
///
/// Distinguishes a missing header (`Unauthorized`) from a bad token
/// (`InvalidToken`); a decoded token whose user no longer exists is
/// `UserNotFound`, and a deactivated user is refused outright.
pub async fn authenticate_bearer<R>(
    repo: &R,
    config: &AuthConfig,
    headers: &HeaderMap,
) -> AuthResult<User>
where
    R: UserRepository + Send + Sync,
{
    let token = extract_bearer(headers).ok_or(AuthError::Unauthorized)?;
    let user_id = decode_token(&config.jwt_secret, token)?;

    let user = repo
        .find_by_id(&user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !user.can_login() {
        return Err(AuthError::AccountInactive);
    }

    Ok(user)
}

/// Middleware that requires a valid bearer token
pub async fn require_auth<R>(
    state: AuthMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = authenticate_bearer(state.repo.as_ref(), &state.config, req.headers())
        .await
        .map_err(|e| e.into_response())?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Middleware that requires a bearer token AND a role in the allow-set
pub async fn require_roles<R>(
    state: AuthMiddlewareState<R>,
    allowed: &'static [UserRole],
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = authenticate_bearer(state.repo.as_ref(), &state.config, req.headers())
        .await
        .map_err(|e| e.into_response())?;

    if !role_allowed(user.role, allowed) {
        tracing::warn!(
            user_id = %user.user_id,
            role = %user.role,
            "Role not permitted for this route"
        );
        return Err(AuthError::Forbidden.into_response());
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_missing_or_malformed() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_role_allowed() {
        let staff = [UserRole::Admin, UserRole::Officer];
        assert!(role_allowed(UserRole::Admin, &staff));
        assert!(role_allowed(UserRole::Officer, &staff));
        assert!(!role_allowed(UserRole::Citizen, &staff));

        let admin_only = [UserRole::Admin];
        assert!(!role_allowed(UserRole::Officer, &admin_only));
    }

    mod bearer {
        use super::*;
        use crate::application::token::mint_token;
        use crate::domain::value_object::phone::Phone;
        use crate::infra::memory::InMemoryAuthRepository;

        fn bearer_headers(token: &str) -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
            headers
        }

        async fn seed_user(repo: &InMemoryAuthRepository) -> User {
            let user = User::provision_by_phone(Phone::new("+910000000001").unwrap());
            repo.create(&user).await.unwrap();
            user
        }

        #[tokio::test]
        async fn test_valid_token_resolves_user() {
            let repo = InMemoryAuthRepository::new();
            let config = AuthConfig::development();
            let seeded = seed_user(&repo).await;

            let token = mint_token(&config.jwt_secret, &seeded.user_id).unwrap();
            let user = authenticate_bearer(&repo, &config, &bearer_headers(&token))
                .await
                .unwrap();
            assert_eq!(user.user_id, seeded.user_id);
        }

        #[tokio::test]
        async fn test_missing_header() {
            let repo = InMemoryAuthRepository::new();
            let config = AuthConfig::development();

            let err = authenticate_bearer(&repo, &config, &HeaderMap::new())
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Unauthorized));
        }

        #[tokio::test]
        async fn test_tampered_token() {
            let repo = InMemoryAuthRepository::new();
            let config = AuthConfig::development();
            let seeded = seed_user(&repo).await;

            let mut token = mint_token(&config.jwt_secret, &seeded.user_id).unwrap();
            token.push('x');
            let err = authenticate_bearer(&repo, &config, &bearer_headers(&token))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidToken));
        }

        #[tokio::test]
        async fn test_token_for_deleted_user() {
            let repo = InMemoryAuthRepository::new();
            let config = AuthConfig::development();

            let token = mint_token(&config.jwt_secret, &kernel::id::UserId::new()).unwrap();
            let err = authenticate_bearer(&repo, &config, &bearer_headers(&token))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::UserNotFound));
        }

        #[tokio::test]
        async fn test_token_for_deactivated_user() {
            let repo = InMemoryAuthRepository::new();
            let config = AuthConfig::development();
            let mut seeded = seed_user(&repo).await;
            seeded.is_active = false;
            repo.update(&seeded).await.unwrap();

            let token = mint_token(&config.jwt_secret, &seeded.user_id).unwrap();
            let err = authenticate_bearer(&repo, &config, &bearer_headers(&token))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::AccountInactive));
        }
    }
}
