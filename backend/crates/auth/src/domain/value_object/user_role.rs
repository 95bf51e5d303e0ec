use serde::{Deserialize, Serialize};
use std::fmt;

/// User role for authorization decisions
///
/// Stored as a string discriminant on the single users collection. Some
/// legacy data uses "panchayat" for what the API calls an officer; parsing
/// accepts the alias but it is never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Citizen,
    Officer,
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Citizen => "citizen",
            Officer => "officer",
            Admin => "admin",
        }
    }

    /// Parse a role discriminant, case-insensitively
    ///
    /// Accepts the legacy "panchayat" alias for Officer.
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code.to_ascii_lowercase().as_str() {
            "citizen" => Some(Citizen),
            "officer" | "panchayat" => Some(Officer),
            "admin" => Some(Admin),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_officer_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Officer | Admin)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
