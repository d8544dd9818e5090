//! Credit settlement: the atomic debit applied after a gated operation
//! succeeded, with compensation on overdraft.

use promptpix_core::{Account, CreditChange, LedgerError, Result, UserId};

use super::{store_error, CreditContext, CreditLedger};

impl CreditLedger {
    /// Charge the operation described by `context`.
    ///
    /// `None` (a free operation) is a no-op. On success the post-mutation
    /// account is returned.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account vanished since the gate.
    /// - `OperationCancelled` if the debit overdrew the account; the debit and
    ///   its history entry have been reverted.
    pub fn settle(&self, context: Option<CreditContext>) -> Result<Option<Account>> {
        let Some(context) = context else {
            return Ok(None);
        };

        let change = CreditChange::debit(&context.cost);
        self.debit_checked(&context.user_id(), context.required(), &change)
            .map(Some)
    }

    /// Apply a debit atomically and compensate it if the balance went negative.
    pub(super) fn debit_checked(
        &self,
        user_id: &UserId,
        required: i64,
        change: &CreditChange,
    ) -> Result<Account> {
        let account = self
            .store
            .apply_credit_change(user_id, change)
            .map_err(store_error(user_id))?;

        if account.credits >= 0 {
            tracing::info!(
                user_id = %user_id,
                operation = %change.entry.operation,
                amount = change.delta(),
                balance = account.credits,
                "Credits settled"
            );
            return Ok(account);
        }

        tracing::warn!(
            user_id = %user_id,
            operation = %change.entry.operation,
            entry_id = %change.entry.id,
            balance = account.credits,
            "Settlement overdrew account, rolling back"
        );

        let restored = self
            .store
            .revert_credit_change(user_id, change)
            .map_err(store_error(user_id))?;

        Err(LedgerError::OperationCancelled {
            required,
            available: restored.credits,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use promptpix_core::{ImageOperation, LedgerError, UserId};

    use crate::ledger::test_support::ledger_with;
    use crate::ledger::CreditContext;

    #[test]
    fn settles_and_appends_history() {
        let (ledger, user_id) = ledger_with(10);
        let context = ledger
            .gate(Some(&user_id), &ImageOperation::TextToImage.cost(2))
            .unwrap();

        let account = ledger.settle(context).unwrap().unwrap();
        assert_eq!(account.credits, 8);
        assert_eq!(account.usage.images_generated, 1);
        assert_eq!(account.credit_history.len(), 1);
        assert_eq!(account.credit_history[0].amount, -2);
        assert_eq!(account.credit_history[0].operation, "text-to-image");
    }

    #[test]
    fn exact_balance_settles_to_zero() {
        let (ledger, user_id) = ledger_with(2);
        let context = ledger
            .gate(Some(&user_id), &ImageOperation::Upscale.cost(2))
            .unwrap();

        let account = ledger.settle(context).unwrap().unwrap();
        assert_eq!(account.credits, 0);
    }

    #[test]
    fn free_operation_is_a_no_op() {
        let (ledger, _) = ledger_with(5);
        assert!(ledger.settle(None).unwrap().is_none());
    }

    #[test]
    fn vanished_account_is_not_found() {
        let (ledger, user_id) = ledger_with(5);
        let context = ledger
            .gate(Some(&user_id), &ImageOperation::Upscale.cost(1))
            .unwrap();
        ledger.store().delete_account(&user_id).unwrap();

        let err = ledger.settle(context).unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound { .. }));
    }

    #[test]
    fn racing_settlements_roll_back_the_loser() {
        let (ledger, user_id) = ledger_with(2);
        let cost = ImageOperation::Upscale.cost(2);

        // Both gates read the same balance before either settles.
        let first = ledger.gate(Some(&user_id), &cost).unwrap();
        let second = ledger.gate(Some(&user_id), &cost).unwrap();

        let winner = ledger.settle(first).unwrap().unwrap();
        assert_eq!(winner.credits, 0);
        let winner_entry = winner.credit_history[0].id;

        let err = ledger.settle(second).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OperationCancelled {
                required: 2,
                available: 0
            }
        ));

        let account = ledger.load(&user_id).unwrap();
        assert_eq!(account.credits, 0);
        assert_eq!(account.usage.images_edited, 1);
        assert_eq!(account.credit_history.len(), 1);
        assert_eq!(account.credit_history[0].id, winner_entry);
    }

    #[test]
    fn concurrent_settlements_on_threads_keep_balance_non_negative() {
        let (ledger, user_id) = ledger_with(2);
        let cost = ImageOperation::TextToImage.cost(2);
        let contexts: Vec<Option<CreditContext>> = (0..2)
            .map(|_| ledger.gate(Some(&user_id), &cost).unwrap())
            .collect();

        let barrier = Barrier::new(contexts.len());
        let outcomes: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = contexts
                .into_iter()
                .map(|context| {
                    let ledger = &ledger;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        ledger.settle(context).is_ok()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let account = ledger.load(&user_id).unwrap();
        assert_eq!(account.credits, 0);
        assert_eq!(account.credit_history.len(), 1);
        assert_eq!(account.credit_history[0].amount, -2);
    }

    #[test]
    fn settlement_for_unknown_user_fails() {
        let (ledger, _) = ledger_with(5);
        let err = ledger
            .debit_checked(
                &UserId::generate(),
                1,
                &promptpix_core::CreditChange::manual_use(1, None),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound { .. }));
    }
}
