//! Authentication types for staff tokens.
//!
//! Token issuance lives in the identity service; this backend only decodes
//! tokens and trusts the role they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles recognized by the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Full administrative access.
    Admin,
    /// Treasury and ledger access.
    Accountant,
    /// Read-only academy staff; no treasury access.
    Viewer,
}

impl StaffRole {
    /// Returns true if this role may use the treasury endpoints.
    #[must_use]
    pub const fn can_access_treasury(self) -> bool {
        matches!(self, Self::Admin | Self::Accountant)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "accountant" => Ok(Self::Accountant),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown staff role: {s}")),
        }
    }
}

/// JWT claims for staff access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff member ID).
    pub sub: Uuid,
    /// Staff member's role.
    pub role: StaffRole,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a staff member.
    #[must_use]
    pub fn new(staff_id: Uuid, role: StaffRole, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: staff_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the staff member ID from claims.
    #[must_use]
    pub const fn staff_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_treasury_access() {
        assert!(StaffRole::Admin.can_access_treasury());
        assert!(StaffRole::Accountant.can_access_treasury());
        assert!(!StaffRole::Viewer.can_access_treasury());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(StaffRole::from_str("admin").unwrap(), StaffRole::Admin);
        assert_eq!(
            StaffRole::from_str("ACCOUNTANT").unwrap(),
            StaffRole::Accountant
        );
        assert!(StaffRole::from_str("owner").is_err());
    }

    #[test]
    fn test_role_display_roundtrip() {
        for role in [StaffRole::Admin, StaffRole::Accountant, StaffRole::Viewer] {
            assert_eq!(StaffRole::from_str(&role.to_string()).unwrap(), role);
        }
    }
}
