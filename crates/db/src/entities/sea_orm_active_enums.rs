//! `SeaORM` active enums mapping the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner kind of a current account.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Account of a guardian (pays for sessions).
    #[sea_orm(string_value = "guardian")]
    Guardian,
    /// Account of a tutor (is paid for sessions).
    #[sea_orm(string_value = "tutor")]
    Tutor,
}

/// What an obligation represents.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "obligation_kind")]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// Charge to a guardian for a given session.
    #[sea_orm(string_value = "charge_session")]
    ChargeSession,
    /// Payout to a tutor for a given session.
    #[sea_orm(string_value = "payout_session")]
    PayoutSession,
}

/// Settlement state of an obligation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "obligation_state")]
#[serde(rename_all = "lowercase")]
pub enum ObligationState {
    /// Remaining balance above zero.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Remaining balance reached zero.
    #[sea_orm(string_value = "settled")]
    Settled,
}

/// Direction of a cash movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_direction")]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Cash collected from a guardian.
    #[sea_orm(string_value = "inflow")]
    Inflow,
    /// Cash paid out to a tutor.
    #[sea_orm(string_value = "outflow")]
    Outflow,
}

/// How a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// SINPE Movil.
    #[sea_orm(string_value = "sinpe")]
    Sinpe,
    /// Card payment.
    #[sea_orm(string_value = "card")]
    Card,
}

impl From<PaymentMethod> for aula_core::treasury::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Sinpe => Self::Sinpe,
            PaymentMethod::Card => Self::Card,
        }
    }
}

impl From<aula_core::treasury::PaymentMethod> for PaymentMethod {
    fn from(method: aula_core::treasury::PaymentMethod) -> Self {
        match method {
            aula_core::treasury::PaymentMethod::Cash => Self::Cash,
            aula_core::treasury::PaymentMethod::Transfer => Self::Transfer,
            aula_core::treasury::PaymentMethod::Sinpe => Self::Sinpe,
            aula_core::treasury::PaymentMethod::Card => Self::Card,
        }
    }
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_state")]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    /// Registered but not yet confirmed; excluded from the cash pool.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed; counted in the cash pool.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Confirmed and audited; counted in the cash pool.
    #[sea_orm(string_value = "verified")]
    Verified,
}

impl PaymentState {
    /// Returns true if the payment counts toward the cash pool.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Completed | Self::Verified)
    }
}

/// Terminal state of a tutoring session for one day.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_state")]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// The session was given.
    #[sea_orm(string_value = "given")]
    Given,
    /// The session was cancelled for the day.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<SessionState> for aula_core::sessions::SessionState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Given => Self::Given,
            SessionState::Cancelled => Self::Cancelled,
        }
    }
}

impl From<aula_core::sessions::SessionState> for SessionState {
    fn from(state: aula_core::sessions::SessionState) -> Self {
        match state {
            aula_core::sessions::SessionState::Given => Self::Given,
            aula_core::sessions::SessionState::Cancelled => Self::Cancelled,
        }
    }
}
