//! Bearer Token Service
//!
//! Stateless HS256 tokens carrying only the user id. Tokens have no
//! expiry claim; revocation happens by deactivating the account, which
//! every authenticated request re-checks against the store.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID
    pub sub: String,
}

/// Mint a bearer token for a user
pub fn mint_token(secret: &str, user_id: &UserId) -> AuthResult<String> {
    let claims = Claims {
        sub: user_id.to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("failed to sign token: {}", e)))
}

/// Decode a bearer token back to a user id
///
/// Every failure mode collapses to `InvalidToken` so callers leak
/// nothing about why a token was refused.
pub fn decode_token(secret: &str, token: &str) -> AuthResult<UserId> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens carry no exp claim
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::InvalidToken)?;

    let uuid = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
    Ok(UserId::from(uuid))
}
