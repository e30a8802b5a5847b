//! Ledger error types for input validation and computation failures.
//!
//! This module defines all errors that can occur while building the debt
//! ledger, projecting it, or validating a settlement, including failures
//! reported by the persistence collaborator.

use rust_decimal::Decimal;
use splitledger_shared::types::UserId;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Authorization Errors ==========
    /// The acting or viewing user is not a member of the group.
    #[error("User {0} is not a member of this group")]
    NotAMember(UserId),

    // ========== Input Errors ==========
    /// Settlement amount must be strictly positive.
    #[error("Settlement amount must be positive")]
    NonPositiveAmount,

    /// The settlement counterparty is not a member of the group.
    #[error("User {0} is not a member of this group and cannot be settled with")]
    UnknownCounterparty(UserId),

    /// A member cannot settle with themself.
    #[error("Cannot settle with yourself")]
    SelfSettlement,

    /// The proposed amount is larger than what is outstanding between the pair.
    #[error("Settlement amount {amount} exceeds outstanding debt {outstanding}")]
    ExceedsOutstandingDebt {
        /// The proposed amount.
        amount: Decimal,
        /// The outstanding bilateral debt (absolute value).
        outstanding: Decimal,
    },

    // ========== Computation Errors ==========
    /// A stored record breaks a data-model rule (non-member reference, negative amount).
    #[error("Inconsistent ledger record: {0}")]
    InconsistentRecord(String),

    /// A debt matrix cell went negative.
    #[error("Negative debt of {amount} from {debtor} to {creditor}")]
    NegativeDebt {
        /// The debtor of the cell.
        debtor: UserId,
        /// The creditor of the cell.
        creditor: UserId,
        /// The offending amount.
        amount: Decimal,
    },

    /// A running total left the range `Decimal` can represent.
    #[error("Ledger amounts overflow while computing {0}")]
    AmountOverflow(&'static str),

    /// Net balances of the group do not sum to zero.
    #[error("Net balances do not sum to zero (imbalance: {imbalance})")]
    ConservationViolated {
        /// The sum of all net balances.
        imbalance: Decimal,
    },

    // ========== Configuration Errors ==========
    /// The materiality threshold is negative.
    #[error("Settlement epsilon must not be negative (got {0})")]
    InvalidEpsilon(Decimal),

    // ========== Collaborator Errors ==========
    /// The record store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAMember(_) => "NOT_A_MEMBER",
            Self::NonPositiveAmount => "INVALID_AMOUNT",
            Self::UnknownCounterparty(_) => "UNKNOWN_COUNTERPARTY",
            Self::SelfSettlement => "SELF_SETTLEMENT",
            Self::ExceedsOutstandingDebt { .. } => "EXCEEDS_OUTSTANDING_DEBT",
            Self::InconsistentRecord(_) => "INCONSISTENT_RECORD",
            Self::NegativeDebt { .. } => "NEGATIVE_DEBT",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::ConservationViolated { .. } => "CONSERVATION_VIOLATED",
            Self::InvalidEpsilon(_) => "INVALID_EPSILON",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid settlement input
            Self::NonPositiveAmount
            | Self::UnknownCounterparty(_)
            | Self::SelfSettlement
            | Self::ExceedsOutstandingDebt { .. } => 400,

            // 403 Forbidden - not a group member
            Self::NotAMember(_) => 403,

            // 500 Internal Server Error
            Self::InconsistentRecord(_)
            | Self::NegativeDebt { .. }
            | Self::AmountOverflow(_)
            | Self::ConservationViolated { .. }
            | Self::InvalidEpsilon(_)
            | Self::Store(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Computations are deterministic, so only store failures qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if the error signals a broken engine invariant rather than bad input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.http_status_code() == 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NonPositiveAmount.error_code(), "INVALID_AMOUNT");
        assert_eq!(
            LedgerError::ExceedsOutstandingDebt {
                amount: dec!(100),
                outstanding: dec!(30),
            }
            .error_code(),
            "EXCEEDS_OUTSTANDING_DEBT"
        );
        assert_eq!(
            LedgerError::NotAMember(UserId::new()).error_code(),
            "NOT_A_MEMBER"
        );
        assert_eq!(
            LedgerError::ConservationViolated {
                imbalance: dec!(0.01)
            }
            .error_code(),
            "CONSERVATION_VIOLATED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(LedgerError::SelfSettlement.http_status_code(), 400);
        assert_eq!(
            LedgerError::UnknownCounterparty(UserId::new()).http_status_code(),
            400
        );
        assert_eq!(LedgerError::NotAMember(UserId::new()).http_status_code(), 403);
        assert_eq!(
            LedgerError::InconsistentRecord("x".to_string()).http_status_code(),
            500
        );
        assert_eq!(LedgerError::Store("down".to_string()).http_status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::Store("timeout".to_string()).is_retryable());
        assert!(!LedgerError::NonPositiveAmount.is_retryable());
        assert!(
            !LedgerError::ConservationViolated {
                imbalance: dec!(1)
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_internal_errors() {
        assert!(LedgerError::InconsistentRecord("x".to_string()).is_internal());
        assert!(!LedgerError::SelfSettlement.is_internal());
        assert!(LedgerError::AmountOverflow("debt matrix").is_internal());
        assert!(!LedgerError::AmountOverflow("debt matrix").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ExceedsOutstandingDebt {
            amount: dec!(100.00),
            outstanding: dec!(30.00),
        };
        assert_eq!(
            err.to_string(),
            "Settlement amount 100.00 exceeds outstanding debt 30.00"
        );
    }
}
