/*!
 * Depletable character budget for the run.
 *
 * The external service bills per input character against a finite quota.
 * The ledger holds what this run may still spend: the account limit minus
 * what is already used minus a safety margin. It is debited up front when a
 * call is reserved and reconciled against the billed amount afterwards; it
 * never goes negative and is never replenished mid-run.
 */

use log::debug;

/// Remaining spendable character quota for one run.
#[derive(Debug)]
pub struct BudgetLedger {
    remaining: u64,
    spent: u64,
}

impl BudgetLedger {
    /// Create a ledger with an explicit remaining amount.
    pub fn new(remaining: u64) -> Self {
        Self { remaining, spent: 0 }
    }

    /// Derive the ledger from service-reported usage and the safety margin.
    pub fn from_usage(character_limit: u64, character_count: u64, safety_margin: u64) -> Self {
        let remaining = character_limit
            .saturating_sub(character_count)
            .saturating_sub(safety_margin);
        Self::new(remaining)
    }

    /// Characters still spendable.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Characters debited so far this run.
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Reserve `estimate` characters for an upcoming call.
    ///
    /// Debits and returns true when affordable; returns false and debits
    /// nothing otherwise.
    pub fn reserve(&mut self, estimate: u64) -> bool {
        if estimate > self.remaining {
            return false;
        }
        self.remaining -= estimate;
        self.spent += estimate;
        true
    }

    /// Reconcile a reservation against the amount actually billed.
    pub fn settle(&mut self, estimate: u64, billed: u64) {
        if billed > estimate {
            let extra = billed - estimate;
            self.remaining = self.remaining.saturating_sub(extra);
            self.spent += extra;
        } else {
            let refund = estimate - billed;
            self.remaining += refund;
            self.spent -= refund;
        }
        debug!(
            "Budget settled: billed {} (estimated {}), ~{} chars left",
            billed, estimate, self.remaining
        );
    }

    /// Cancel a reservation whose call never succeeded.
    pub fn release(&mut self, estimate: u64) {
        self.remaining += estimate;
        self.spent -= estimate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fromUsage_shouldSubtractUsedAndMargin() {
        let ledger = BudgetLedger::from_usage(500_000, 100_000, 15_000);
        assert_eq!(ledger.remaining(), 385_000);
    }

    #[test]
    fn test_fromUsage_shouldSaturateAtZero() {
        let ledger = BudgetLedger::from_usage(10_000, 9_000, 15_000);
        assert_eq!(ledger.remaining(), 0);
    }

    #[test]
    fn test_reserve_shouldDebitWhenAffordable() {
        let mut ledger = BudgetLedger::new(100);
        assert!(ledger.reserve(60));
        assert_eq!(ledger.remaining(), 40);
        assert_eq!(ledger.spent(), 60);
    }

    #[test]
    fn test_reserve_shouldNotDebitWhenRefused() {
        let mut ledger = BudgetLedger::new(50);
        assert!(!ledger.reserve(60));
        assert_eq!(ledger.remaining(), 50);
        assert_eq!(ledger.spent(), 0);
    }

    #[test]
    fn test_reserve_shouldAllowExactRemainder() {
        let mut ledger = BudgetLedger::new(50);
        assert!(ledger.reserve(50));
        assert_eq!(ledger.remaining(), 0);
        assert!(!ledger.reserve(1));
    }

    #[test]
    fn test_settle_shouldRefundOverestimate() {
        let mut ledger = BudgetLedger::new(100);
        assert!(ledger.reserve(60));
        ledger.settle(60, 45);
        assert_eq!(ledger.remaining(), 55);
        assert_eq!(ledger.spent(), 45);
    }

    #[test]
    fn test_settle_shouldChargeUnderestimateWithoutGoingNegative() {
        let mut ledger = BudgetLedger::new(60);
        assert!(ledger.reserve(60));
        ledger.settle(60, 80);
        assert_eq!(ledger.remaining(), 0);
        assert_eq!(ledger.spent(), 80);
    }

    #[test]
    fn test_release_shouldUndoReservation() {
        let mut ledger = BudgetLedger::new(100);
        assert!(ledger.reserve(30));
        ledger.release(30);
        assert_eq!(ledger.remaining(), 100);
        assert_eq!(ledger.spent(), 0);
    }
}
