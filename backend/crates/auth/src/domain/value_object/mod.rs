//! Value Object Module

pub mod email;
pub mod phone;
pub mod totp_secret;
pub mod user_role;
