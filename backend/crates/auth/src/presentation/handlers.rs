//! HTTP Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, OtpRequestInput, OtpRequestUseCase, OtpVerifyInput, OtpVerifyUseCase,
    ProfileUpdateInput, ProfileUseCase, SignUpInput, SignUpUseCase, SmsSender, TotpLoginInput,
    TotpLoginUseCase, TotpSetupUseCase,
};
use crate::domain::entity::user::User;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    AuthResponse, LoginRequest, OtpRequestRequest, OtpRequestResponse, OtpVerifyRequest,
    ProfileUpdateRequest, RegisterRequest, TotpConfirmRequest, TotpConfirmResponse,
    TotpLoginRequest, TotpSetupResponse, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, S>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub sms: Arc<S>,
    pub config: Arc<AuthConfig>,
}

impl<R, S> Clone for AuthAppState<R, S>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            sms: Arc::clone(&self.sms),
            config: Arc::clone(&self.config),
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            role: req.role,
            gram_panchayat: req.gram_panchayat,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::bearer(output.token, &output.user)),
    ))
}

/// POST /api/auth/login
pub async fn login<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            identifier: req.identifier,
            password: req.password,
        })
        .await?;

    Ok(Json(AuthResponse::bearer(output.token, &output.user)))
}

// ============================================================================
// OTP
// ============================================================================

/// POST /api/auth/otp/request
pub async fn otp_request<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<OtpRequestRequest>,
) -> AuthResult<Json<OtpRequestResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case =
        OtpRequestUseCase::new(state.repo.clone(), state.sms.clone(), state.config.clone());

    let output = use_case.execute(OtpRequestInput { phone: req.phone }).await?;

    Ok(Json(OtpRequestResponse {
        success: true,
        message: "OTP sent".to_string(),
        debug_code: output.debug_code,
    }))
}

/// POST /api/auth/otp/verify
pub async fn otp_verify<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<OtpVerifyRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case =
        OtpVerifyUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(OtpVerifyInput {
            phone: req.phone,
            code: req.code,
            name: req.name,
            gram_panchayat: req.gram_panchayat,
        })
        .await?;

    Ok(Json(AuthResponse::bearer(output.token, &output.user)))
}

// ============================================================================
// TOTP (setup requires authentication, login does not)
// ============================================================================

/// POST /api/auth/totp/setup
pub async fn totp_setup<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Extension(user): Extension<User>,
) -> AuthResult<Json<TotpSetupResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case.setup(&user.user_id).await?;

    Ok(Json(TotpSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /api/auth/totp/setup/verify
pub async fn totp_setup_verify<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Extension(user): Extension<User>,
    Json(req): Json<TotpConfirmRequest>,
) -> AuthResult<Json<TotpConfirmResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.config.clone());

    use_case.confirm(&user.user_id, &req.code).await?;

    Ok(Json(TotpConfirmResponse { success: true }))
}

/// POST /api/auth/totp/verify
pub async fn totp_login<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<TotpLoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = TotpLoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(TotpLoginInput {
            identifier: req.identifier,
            code: req.code,
        })
        .await?;

    Ok(Json(AuthResponse::bearer(output.token, &output.user)))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/auth/profile
pub async fn get_profile<R, S>(
    State(_state): State<AuthAppState<R, S>>,
    Extension(user): Extension<User>,
) -> Json<UserResponse>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    Json(UserResponse::from(&user))
}

/// PUT /api/auth/profile
pub async fn update_profile<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Extension(user): Extension<User>,
    Json(req): Json<ProfileUpdateRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(state.repo.clone());

    let updated = use_case
        .update(
            &user.user_id,
            ProfileUpdateInput {
                name: req.name,
                gram_panchayat: req.gram_panchayat,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/admin/users
pub async fn list_users<R, S>(
    State(state): State<AuthAppState<R, S>>,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: UserRepository + OtpRepository + Send + Sync + 'static,
    S: SmsSender + Send + Sync + 'static,
{
    let users = UserRepository::list(state.repo.as_ref()).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
