//! OTP Login Use Cases
//!
//! Phone-based login in two halves: request issues a short-lived 6-digit
//! code, verify exchanges it for a bearer token, provisioning a citizen
//! account on first contact.

use std::sync::Arc;

use platform::crypto::{constant_time_eq, random_numeric_code, sha256};

use crate::application::config::AuthConfig;
use crate::application::sms::SmsSender;
use crate::application::token::mint_token;
use crate::domain::entity::otp::{OtpRecord, MAX_OTP_ATTEMPTS};
use crate::domain::entity::user::User;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::phone::Phone;
use crate::error::{AuthError, AuthResult};

/// Length of the numeric one-time code
const OTP_CODE_LENGTH: usize = 6;

/// OTP request input
pub struct OtpRequestInput {
    pub phone: String,
}

/// OTP request output
pub struct OtpRequestOutput {
    /// Present only when the deployment echoes codes for development
    pub debug_code: Option<String>,
}

/// OTP verify input
pub struct OtpVerifyInput {
    pub phone: String,
    pub code: String,
    /// Display name for first-time provisioning
    pub name: Option<String>,
    /// Locality for first-time provisioning
    pub gram_panchayat: Option<String>,
}

/// OTP verify output
#[derive(Debug)]
pub struct OtpVerifyOutput {
    pub token: String,
    pub user: User,
}

/// OTP request use case
pub struct OtpRequestUseCase<O, S>
where
    O: OtpRepository,
    S: SmsSender,
{
    otp_repo: Arc<O>,
    sms: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<O, S> OtpRequestUseCase<O, S>
where
    O: OtpRepository,
    S: SmsSender,
{
    pub fn new(otp_repo: Arc<O>, sms: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            otp_repo,
            sms,
            config,
        }
    }

    pub async fn execute(&self, input: OtpRequestInput) -> AuthResult<OtpRequestOutput> {
        let phone = Phone::new(&input.phone)?;

        let code = random_numeric_code(OTP_CODE_LENGTH);
        let code_hash = sha256(code.as_bytes()).to_vec();

        // Replaces any previous record for this phone, resetting attempts
        let record = OtpRecord::issue(phone.clone(), code_hash, self.config.otp_ttl);
        self.otp_repo.upsert(&record).await?;

        // Delivery failure is not fatal: the record stays valid and the
        // debug echo still works in development
        if let Err(e) = self.sms.send_otp(&phone, &code).await {
            tracing::warn!(phone = %phone, error = %e, "OTP delivery failed");
        }

        tracing::info!(phone = %phone, "OTP issued");

        let debug_code = self.config.debug_otp.then_some(code);
        Ok(OtpRequestOutput { debug_code })
    }
}

/// OTP verify use case
pub struct OtpVerifyUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    user_repo: Arc<U>,
    otp_repo: Arc<O>,
    config: Arc<AuthConfig>,
}

impl<U, O> OtpVerifyUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub fn new(user_repo: Arc<U>, otp_repo: Arc<O>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            otp_repo,
            config,
        }
    }

    pub async fn execute(&self, input: OtpVerifyInput) -> AuthResult<OtpVerifyOutput> {
        let phone = Phone::new(&input.phone)?;

        let record = self
            .otp_repo
            .find_by_phone(&phone)
            .await?
            .ok_or(AuthError::OtpNotFound)?;

        // Expired records behave as if they never existed
        if record.is_expired(chrono::Utc::now()) {
            self.otp_repo.delete(&phone).await?;
            return Err(AuthError::OtpNotFound);
        }

        if record.is_exhausted() {
            return Err(AuthError::TooManyAttempts);
        }

        // Burn an attempt before comparing, so a crash after the check
        // can never grant a free retry
        let attempts = self.otp_repo.increment_attempts(&phone).await?;

        let submitted_hash = sha256(input.code.trim().as_bytes());
        if !constant_time_eq(&submitted_hash, &record.code_hash) {
            if attempts >= MAX_OTP_ATTEMPTS {
                return Err(AuthError::TooManyAttempts);
            }
            return Err(AuthError::InvalidCode);
        }

        // One-time use
        self.otp_repo.delete(&phone).await?;

        let user = match self.user_repo.find_by_phone(&phone).await? {
            Some(user) => {
                if !user.can_login() {
                    return Err(AuthError::AccountInactive);
                }
                user
            }
            None => {
                let mut user = User::provision_by_phone(phone.clone());
                if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
                    user.name = name.trim().to_string();
                }
                user.gram_panchayat = input.gram_panchayat;
                self.user_repo.create(&user).await?;
                tracing::info!(user_id = %user.user_id, "Citizen provisioned via OTP");
                user
            }
        };

        let token = mint_token(&self.config.jwt_secret, &user.user_id)?;

        tracing::info!(user_id = %user.user_id, "User logged in via OTP");

        Ok(OtpVerifyOutput { token, user })
    }
}
