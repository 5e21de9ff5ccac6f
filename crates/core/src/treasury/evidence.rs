//! Evidence requirements for payment methods.
//!
//! Cash needs no paper trail. Every other method must carry a receipt
//! number, receipt date, and receipt URL before the payment may be
//! confirmed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash; no receipt required.
    Cash,
    /// Bank transfer.
    Transfer,
    /// SINPE Movil.
    Sinpe,
    /// Card payment.
    Card,
}

impl PaymentMethod {
    /// Returns true if this method requires receipt evidence before the
    /// payment can be confirmed.
    #[must_use]
    pub const fn requires_evidence(self) -> bool {
        !matches!(self, Self::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Transfer => write!(f, "transfer"),
            Self::Sinpe => write!(f, "sinpe"),
            Self::Card => write!(f, "card"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            "sinpe" => Ok(Self::Sinpe),
            "card" => Ok(Self::Card),
            _ => Err(format!("Unknown payment method: {s}")),
        }
    }
}

/// Receipt evidence attached to a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    /// Receipt or voucher number.
    pub receipt_number: Option<String>,
    /// Date printed on the receipt.
    pub receipt_date: Option<NaiveDate>,
    /// URL of the stored receipt file.
    pub receipt_url: Option<String>,
}

impl Evidence {
    /// Returns true if all three evidence fields are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.receipt_number.as_deref().is_some_and(|n| !n.is_empty())
            && self.receipt_date.is_some()
            && self.receipt_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Evidence validation failures, naming the missing field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvidenceError {
    /// Receipt number missing for a non-cash method.
    #[error("receipt_number is required for {method} payments")]
    MissingReceiptNumber {
        /// The payment method.
        method: PaymentMethod,
    },

    /// Receipt date missing for a non-cash method.
    #[error("receipt_date is required for {method} payments")]
    MissingReceiptDate {
        /// The payment method.
        method: PaymentMethod,
    },

    /// Receipt URL missing for a non-cash method.
    #[error("receipt_url is required for {method} payments")]
    MissingReceiptUrl {
        /// The payment method.
        method: PaymentMethod,
    },
}

/// Validates that a payment's evidence satisfies its method's requirements.
///
/// Cash payments pass with no evidence at all. For any other method all
/// three fields are required; the first missing one is reported.
///
/// # Errors
///
/// Returns the specific missing-field error.
pub fn validate_evidence(method: PaymentMethod, evidence: &Evidence) -> Result<(), EvidenceError> {
    if !method.requires_evidence() {
        return Ok(());
    }

    if !evidence
        .receipt_number
        .as_deref()
        .is_some_and(|n| !n.is_empty())
    {
        return Err(EvidenceError::MissingReceiptNumber { method });
    }
    if evidence.receipt_date.is_none() {
        return Err(EvidenceError::MissingReceiptDate { method });
    }
    if !evidence.receipt_url.as_deref().is_some_and(|u| !u.is_empty()) {
        return Err(EvidenceError::MissingReceiptUrl { method });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::str::FromStr;

    fn full_evidence() -> Evidence {
        Evidence {
            receipt_number: Some("R-00123".to_string()),
            receipt_date: NaiveDate::from_ymd_opt(2026, 3, 14),
            receipt_url: Some("/receipts/r-00123.pdf".to_string()),
        }
    }

    #[test]
    fn test_cash_needs_no_evidence() {
        assert!(validate_evidence(PaymentMethod::Cash, &Evidence::default()).is_ok());
    }

    #[rstest]
    #[case(PaymentMethod::Transfer)]
    #[case(PaymentMethod::Sinpe)]
    #[case(PaymentMethod::Card)]
    fn test_non_cash_requires_full_evidence(#[case] method: PaymentMethod) {
        assert_eq!(
            validate_evidence(method, &Evidence::default()),
            Err(EvidenceError::MissingReceiptNumber { method })
        );
        assert!(validate_evidence(method, &full_evidence()).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut evidence = full_evidence();
        evidence.receipt_number = None;
        assert!(matches!(
            validate_evidence(PaymentMethod::Sinpe, &evidence),
            Err(EvidenceError::MissingReceiptNumber { .. })
        ));

        let mut evidence = full_evidence();
        evidence.receipt_date = None;
        assert!(matches!(
            validate_evidence(PaymentMethod::Sinpe, &evidence),
            Err(EvidenceError::MissingReceiptDate { .. })
        ));

        let mut evidence = full_evidence();
        evidence.receipt_url = None;
        assert!(matches!(
            validate_evidence(PaymentMethod::Sinpe, &evidence),
            Err(EvidenceError::MissingReceiptUrl { .. })
        ));
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let mut evidence = full_evidence();
        evidence.receipt_number = Some(String::new());
        assert!(validate_evidence(PaymentMethod::Transfer, &evidence).is_err());
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            PaymentMethod::from_str("SINPE").unwrap(),
            PaymentMethod::Sinpe
        );
        assert!(PaymentMethod::from_str("cheque").is_err());
    }

    #[test]
    fn test_is_complete() {
        assert!(full_evidence().is_complete());
        assert!(!Evidence::default().is_complete());
    }
}
