//! SMS Delivery Port
//!
//! The OTP flow only needs "send this code to this phone". Gateways
//! implement the trait in infrastructure; the default deployment carries
//! no gateway and relies on the debug echo in development.

use crate::domain::value_object::phone::Phone;
use crate::error::{AuthError, AuthResult};

/// SMS sender trait
#[trait_variant::make(SmsSender: Send)]
pub trait LocalSmsSender {
    /// Deliver a one-time code to a phone
    async fn send_otp(&self, phone: &Phone, code: &str) -> AuthResult<()>;
}

/// Sender for deployments without an SMS gateway
///
/// Always reports `SmsUnavailable`; the request flow treats that as
/// non-fatal so the OTP record still exists for the debug echo path.
#[derive(Debug, Clone, Default)]
pub struct DisabledSms;

impl SmsSender for DisabledSms {
    async fn send_otp(&self, _phone: &Phone, _code: &str) -> AuthResult<()> {
        Err(AuthError::SmsUnavailable)
    }
}
