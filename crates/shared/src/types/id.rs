//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `GuardianId` where a
//! `TutorId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(GuardianId, "Unique identifier for a guardian.");
typed_id!(TutorId, "Unique identifier for a tutor.");
typed_id!(StudentId, "Unique identifier for a student.");
typed_id!(CourseId, "Unique identifier for a course.");
typed_id!(EnrollmentId, "Unique identifier for an enrollment.");
typed_id!(AccountId, "Unique identifier for a current account.");
typed_id!(ObligationId, "Unique identifier for an obligation.");
typed_id!(PaymentId, "Unique identifier for a payment.");
typed_id!(ApplicationId, "Unique identifier for a payment application.");
typed_id!(ClassSessionId, "Unique identifier for a tutoring session.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_ids_are_unique() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_roundtrip_from_str() {
        let id = PaymentId::new();
        let parsed = PaymentId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::now_v7();
        let id = ObligationId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }
}
