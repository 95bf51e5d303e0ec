//! TOTP Login Use Case
//!
//! Token issuance against an authenticator code. Each 30-second time
//! step grants at most one login: the replay guard compares the current
//! step to the last accepted one before the code is even validated, and
//! a compare-and-set on persist closes the race between two requests
//! inside the same step.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::mint_token;
use crate::application::totp_setup::unix_now;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, phone::Phone, totp_secret::TotpSecret};
use crate::error::{AuthError, AuthResult};

/// TOTP login input
pub struct TotpLoginInput {
    /// Email or phone number
    pub identifier: String,
    /// Authenticator code
    pub code: String,
}

/// TOTP login output
#[derive(Debug)]
pub struct TotpLoginOutput {
    pub token: String,
    pub user: User,
}

/// TOTP login use case
pub struct TotpLoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> TotpLoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: TotpLoginInput) -> AuthResult<TotpLoginOutput> {
        self.execute_at(input, unix_now()).await
    }

    /// Verify against an explicit timestamp (time-injectable for tests)
    pub async fn execute_at(
        &self,
        input: TotpLoginInput,
        time: u64,
    ) -> AuthResult<TotpLoginOutput> {
        let user = self
            .find_user(&input.identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.can_login() {
            return Err(AuthError::AccountInactive);
        }

        let enrollment = user
            .totp
            .as_ref()
            .filter(|t| t.enabled)
            .ok_or(AuthError::TotpNotEnabled)?;

        // Replay guard before validation: a code from an already-consumed
        // step is refused without touching the secret
        let step = TotpSecret::current_step(&self.config.totp, time);
        if enrollment.last_verified_step == Some(step) {
            return Err(AuthError::CodeAlreadyUsed);
        }

        let label = user.totp_label();
        if !enrollment
            .secret
            .verify_at(input.code.trim(), &self.config.totp, &label, time)?
        {
            return Err(AuthError::InvalidTotpCode);
        }

        // Persist the consumed step; losing the compare-and-set means a
        // parallel request got here first within this step
        if !self.user_repo.set_totp_step(&user.user_id, step).await? {
            return Err(AuthError::CodeAlreadyUsed);
        }

        let token = mint_token(&self.config.jwt_secret, &user.user_id)?;

        tracing::info!(user_id = %user.user_id, "User logged in via TOTP");

        Ok(TotpLoginOutput { token, user })
    }

    async fn find_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        if identifier.contains('@') {
            let email = Email::new(identifier).map_err(|_| AuthError::UserNotFound)?;
            self.user_repo.find_by_email(&email).await
        } else {
            let phone = Phone::new(identifier).map_err(|_| AuthError::UserNotFound)?;
            self.user_repo.find_by_phone(&phone).await
        }
    }
}
