//! Credit gate: the read-only pre-check run before a costly operation.

use promptpix_core::{CreditCost, LedgerError, Result, UserId};

use super::{CreditContext, CreditLedger};

impl CreditLedger {
    /// Check that the caller can afford `cost` before any external work runs.
    ///
    /// Returns `Ok(None)` for a free operation, which settlement then skips.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if no user is attached to the request.
    /// - `AccountNotFound` if the account does not exist.
    /// - `InsufficientCredits` with the required and available amounts.
    pub fn gate(
        &self,
        user_id: Option<&UserId>,
        cost: &CreditCost,
    ) -> Result<Option<CreditContext>> {
        let user_id = user_id.ok_or(LedgerError::Unauthenticated)?;
        let account = self.load(user_id)?;

        if cost.is_free() {
            return Ok(None);
        }

        if !account.has_sufficient_credits(cost.amount) {
            tracing::debug!(
                user_id = %user_id,
                operation = %cost.operation,
                required = cost.amount,
                available = account.credits,
                "Credit gate rejected request"
            );
            return Err(LedgerError::InsufficientCredits {
                required: cost.amount,
                available: account.credits,
            });
        }

        Ok(Some(CreditContext {
            account,
            cost: cost.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use promptpix_core::{ImageOperation, LedgerError, UserId};

    use crate::ledger::test_support::ledger_with;

    #[test]
    fn passes_with_enough_credits() {
        let (ledger, user_id) = ledger_with(10);
        let context = ledger
            .gate(Some(&user_id), &ImageOperation::TextToImage.cost(2))
            .unwrap()
            .unwrap();

        assert_eq!(context.required(), 2);
        assert_eq!(context.account.credits, 10);
        assert_eq!(context.cost.operation, "text-to-image");
    }

    #[test]
    fn reports_required_and_available_verbatim() {
        let (ledger, user_id) = ledger_with(3);
        let err = ledger
            .gate(Some(&user_id), &ImageOperation::Upscale.cost(5))
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InsufficientCredits {
                required: 5,
                available: 3
            }
        ));
    }

    #[test]
    fn exact_balance_passes() {
        let (ledger, user_id) = ledger_with(2);
        assert!(ledger
            .gate(Some(&user_id), &ImageOperation::Uncrop.cost(2))
            .unwrap()
            .is_some());
    }

    #[test]
    fn missing_identity_is_unauthenticated() {
        let (ledger, _) = ledger_with(10);
        let err = ledger
            .gate(None, &ImageOperation::Upscale.cost(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthenticated));
    }

    #[test]
    fn unknown_account_is_not_found() {
        let (ledger, _) = ledger_with(10);
        let err = ledger
            .gate(Some(&UserId::generate()), &ImageOperation::Upscale.cost(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound { .. }));
    }

    #[test]
    fn free_operation_has_no_context() {
        let (ledger, user_id) = ledger_with(0);
        assert!(ledger
            .gate(Some(&user_id), &ImageOperation::RemoveBackground.cost(0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn gate_does_not_mutate() {
        let (ledger, user_id) = ledger_with(10);
        ledger
            .gate(Some(&user_id), &ImageOperation::TextToImage.cost(4))
            .unwrap();

        let account = ledger.load(&user_id).unwrap();
        assert_eq!(account.credits, 10);
        assert!(account.credit_history.is_empty());
    }
}
