//! Credit purchases and direct debits.

use promptpix_core::{Account, CreditChange, LedgerError, Result, UserId};

use super::{store_error, CreditLedger};

/// Largest amount a single purchase or debit may move.
pub const MAX_CREDIT_AMOUNT: i64 = 1_000_000;

/// Reject a missing, non-positive or oversized amount.
///
/// # Errors
///
/// Returns `InvalidAmount` describing the problem.
pub fn validate_amount(amount: Option<i64>) -> Result<i64> {
    match amount {
        None => Err(LedgerError::InvalidAmount("Amount is required".into())),
        Some(amount) if amount <= 0 => Err(LedgerError::InvalidAmount(
            "Amount must be a positive integer".into(),
        )),
        Some(amount) if amount > MAX_CREDIT_AMOUNT => Err(LedgerError::InvalidAmount(format!(
            "Amount must be at most {MAX_CREDIT_AMOUNT}"
        ))),
        Some(amount) => Ok(amount),
    }
}

impl CreditLedger {
    /// Add purchased credits and record a positive history entry.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` for a missing, non-positive or oversized amount, or
    ///   one that would overflow the balance.
    /// - `AccountNotFound` if the account does not exist.
    pub fn add_credits(
        &self,
        user_id: &UserId,
        amount: Option<i64>,
        description: Option<String>,
    ) -> Result<Account> {
        let amount = validate_amount(amount)?;
        let change = CreditChange::purchase(amount, description);

        let account = self
            .store
            .apply_credit_change(user_id, &change)
            .map_err(store_error(user_id))?;

        tracing::info!(
            user_id = %user_id,
            amount = amount,
            balance = account.credits,
            "Credits added"
        );

        Ok(account)
    }

    /// Debit credits outside the gate/settle pipeline.
    ///
    /// The balance is pre-checked for a clear error, then the debit goes
    /// through the same atomic apply-and-compensate path as settlement.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` for a missing, non-positive or oversized amount.
    /// - `AccountNotFound` if the account does not exist.
    /// - `InsufficientCredits` if the balance does not cover the amount.
    /// - `OperationCancelled` if a concurrent debit won the race.
    pub fn use_credits(
        &self,
        user_id: &UserId,
        amount: Option<i64>,
        description: Option<String>,
    ) -> Result<Account> {
        let amount = validate_amount(amount)?;
        let account = self.load(user_id)?;

        if !account.has_sufficient_credits(amount) {
            return Err(LedgerError::InsufficientCredits {
                required: amount,
                available: account.credits,
            });
        }

        let change = CreditChange::manual_use(amount, description);
        self.debit_checked(user_id, amount, &change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_support::ledger_with;
    use promptpix_core::{PURCHASE_OPERATION, USE_OPERATION};

    #[test]
    fn amount_validation() {
        assert!(matches!(
            validate_amount(None),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(Some(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(Some(-4)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(Some(MAX_CREDIT_AMOUNT + 1)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(validate_amount(Some(7)).unwrap(), 7);
        assert_eq!(
            validate_amount(Some(MAX_CREDIT_AMOUNT)).unwrap(),
            MAX_CREDIT_AMOUNT
        );
    }

    #[test]
    fn add_credits_appends_purchase() {
        let (ledger, user_id) = ledger_with(10);
        let account = ledger
            .add_credits(&user_id, Some(5), Some("Starter pack".into()))
            .unwrap();

        assert_eq!(account.credits, 15);
        let entry = account.credit_history.last().unwrap();
        assert_eq!(entry.operation, PURCHASE_OPERATION);
        assert_eq!(entry.amount, 5);
        assert_eq!(entry.description, "Starter pack");
    }

    #[test]
    fn add_credits_rejects_zero() {
        let (ledger, user_id) = ledger_with(10);
        assert!(matches!(
            ledger.add_credits(&user_id, Some(0), None),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(ledger.load(&user_id).unwrap().credits, 10);
    }

    #[test]
    fn add_credits_to_unknown_account() {
        let (ledger, _) = ledger_with(10);
        assert!(matches!(
            ledger.add_credits(&UserId::generate(), Some(5), None),
            Err(LedgerError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn use_credits_debits_with_history() {
        let (ledger, user_id) = ledger_with(10);
        let account = ledger.use_credits(&user_id, Some(4), None).unwrap();

        assert_eq!(account.credits, 6);
        let entry = account.credit_history.last().unwrap();
        assert_eq!(entry.operation, USE_OPERATION);
        assert_eq!(entry.amount, -4);
    }

    #[test]
    fn use_credits_rejects_overdraft() {
        let (ledger, user_id) = ledger_with(3);
        let err = ledger.use_credits(&user_id, Some(5), None).unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InsufficientCredits {
                required: 5,
                available: 3
            }
        ));
        assert_eq!(ledger.load(&user_id).unwrap().credits, 3);
    }

    #[test]
    fn use_credits_rejects_negative_amount() {
        let (ledger, user_id) = ledger_with(3);
        assert!(matches!(
            ledger.use_credits(&user_id, Some(-1), None),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn add_credits_rejects_maximum_i64() {
        let (ledger, user_id) = ledger_with(10);
        assert!(matches!(
            ledger.add_credits(&user_id, Some(i64::MAX), None),
            Err(LedgerError::InvalidAmount(_))
        ));

        let account = ledger.load(&user_id).unwrap();
        assert_eq!(account.credits, 10);
        assert!(account.credit_history.is_empty());
    }

    #[test]
    fn add_credits_that_would_overflow_the_balance_is_rejected() {
        let (ledger, user_id) = ledger_with(i64::MAX - 5);
        assert!(matches!(
            ledger.add_credits(&user_id, Some(10), None),
            Err(LedgerError::InvalidAmount(_))
        ));

        let account = ledger.load(&user_id).unwrap();
        assert_eq!(account.credits, i64::MAX - 5);
        assert!(account.credit_history.is_empty());
    }

    #[test]
    fn use_credits_rejects_maximum_i64() {
        let (ledger, user_id) = ledger_with(10);
        assert!(matches!(
            ledger.use_credits(&user_id, Some(i64::MAX), None),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(ledger.load(&user_id).unwrap().credits, 10);
    }

    #[test]
    fn use_credits_of_whole_balance_leaves_zero() {
        let (ledger, user_id) = ledger_with(MAX_CREDIT_AMOUNT);
        let account = ledger
            .use_credits(&user_id, Some(MAX_CREDIT_AMOUNT), None)
            .unwrap();
        assert_eq!(account.credits, 0);
    }
}
