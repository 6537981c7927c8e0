//! Purchase order lifecycle and totals tests.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{PoPriority, PoStatus, PurchaseOrderLine};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const ALL_STATUSES: [PoStatus; 9] = [
    PoStatus::Draft,
    PoStatus::PendingApproval,
    PoStatus::Approved,
    PoStatus::Sent,
    PoStatus::InTransit,
    PoStatus::PartiallyReceived,
    PoStatus::Received,
    PoStatus::Cancelled,
    PoStatus::Rejected,
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_orders_start_in_draft() {
        assert_eq!(PoStatus::default(), PoStatus::Draft);
    }

    #[test]
    fn test_draft_has_single_forward_exit() {
        let exits: Vec<PoStatus> = ALL_STATUSES
            .iter()
            .copied()
            .filter(|next| PoStatus::Draft.can_transition_to(*next))
            .collect();
        assert_eq!(exits, vec![PoStatus::PendingApproval, PoStatus::Cancelled]);
    }

    #[test]
    fn test_approval_gate() {
        assert!(PoStatus::PendingApproval.can_transition_to(PoStatus::Approved));
        assert!(PoStatus::PendingApproval.can_transition_to(PoStatus::Rejected));
        // Approval cannot be skipped
        assert!(!PoStatus::Draft.can_transition_to(PoStatus::Sent));
    }

    #[test]
    fn test_partial_receipt_locks_out_cancellation() {
        assert!(!PoStatus::PartiallyReceived.can_transition_to(PoStatus::Cancelled));
        assert!(PoStatus::PartiallyReceived.can_transition_to(PoStatus::Received));
    }

    #[test]
    fn test_line_total_matches_quantity_times_cost() {
        assert_eq!(PurchaseOrderLine::compute_total(12, dec("3.50")), dec("42.00"));
        assert_eq!(PurchaseOrderLine::compute_total(0, dec("99.99")), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_is_sum_of_lines() {
        let lines = [(10i64, dec("2.00")), (4, dec("12.25")), (1, dec("0.99"))];
        let total: Decimal = lines
            .iter()
            .map(|(q, c)| PurchaseOrderLine::compute_total(*q, *c))
            .sum();
        assert_eq!(total, dec("69.99"));
    }

    #[test]
    fn test_priority_round_trip() {
        for p in [
            PoPriority::Low,
            PoPriority::Normal,
            PoPriority::High,
            PoPriority::Urgent,
        ] {
            assert_eq!(p.as_str().parse::<PoPriority>().unwrap(), p);
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in ALL_STATUSES {
            assert_eq!(s.as_str().parse::<PoStatus>().unwrap(), s);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn status_strategy() -> impl Strategy<Value = PoStatus> {
    prop::sample::select(ALL_STATUSES.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Terminal statuses admit no transitions at all
    #[test]
    fn prop_terminal_statuses_are_absorbing(next in status_strategy()) {
        for terminal in [PoStatus::Received, PoStatus::Cancelled, PoStatus::Rejected] {
            prop_assert!(!terminal.can_transition_to(next));
        }
    }

    /// No transition is a self-loop
    #[test]
    fn prop_no_self_transitions(status in status_strategy()) {
        prop_assert!(!status.can_transition_to(status));
    }

    /// Any walk through the state machine terminates: each allowed
    /// transition strictly increases a rank function.
    #[test]
    fn prop_transitions_strictly_progress(from in status_strategy(), to in status_strategy()) {
        let rank = |s: PoStatus| match s {
            PoStatus::Draft => 0,
            PoStatus::PendingApproval => 1,
            PoStatus::Approved => 2,
            PoStatus::Sent => 3,
            PoStatus::InTransit => 4,
            PoStatus::PartiallyReceived => 5,
            PoStatus::Received | PoStatus::Cancelled | PoStatus::Rejected => 6,
        };
        if from.can_transition_to(to) {
            prop_assert!(rank(to) > rank(from));
        }
    }

    /// Order totals are non-negative and scale linearly with quantity
    #[test]
    fn prop_line_total_linear(quantity in 0i64..1_000_000, cents in 0i64..1_000_000) {
        let unit_cost = Decimal::new(cents, 2);
        let total = PurchaseOrderLine::compute_total(quantity, unit_cost);

        prop_assert!(total >= Decimal::ZERO);
        prop_assert_eq!(
            PurchaseOrderLine::compute_total(quantity * 2, unit_cost),
            total * Decimal::from(2)
        );
    }
}
