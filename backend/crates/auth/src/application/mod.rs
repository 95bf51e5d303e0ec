//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod otp;
pub mod profile;
pub mod sign_up;
pub mod sms;
pub mod token;
pub mod totp_login;
pub mod totp_setup;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use otp::{
    OtpRequestInput, OtpRequestOutput, OtpRequestUseCase, OtpVerifyInput, OtpVerifyOutput,
    OtpVerifyUseCase,
};
pub use profile::{ProfileUpdateInput, ProfileUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use sms::{DisabledSms, SmsSender};
pub use totp_login::{TotpLoginInput, TotpLoginOutput, TotpLoginUseCase};
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase};
