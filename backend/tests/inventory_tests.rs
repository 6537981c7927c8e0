//! Inventory logic tests: stock classification, reservation arithmetic,
//! and transfer conservation.

use proptest::prelude::*;

use shared::models::{classify_stock, MovementType, StockStatus};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_status_boundaries_around_reorder_point() {
        // reorder point 20: 10 and below is critical, 11..=20 low, 21+ ok
        assert_eq!(classify_stock(10, 20), StockStatus::Critical);
        assert_eq!(classify_stock(11, 20), StockStatus::Low);
        assert_eq!(classify_stock(20, 20), StockStatus::Low);
        assert_eq!(classify_stock(21, 20), StockStatus::Ok);
    }

    #[test]
    fn test_zero_available_is_always_critical() {
        assert_eq!(classify_stock(0, 0), StockStatus::Critical);
        assert_eq!(classify_stock(0, 100), StockStatus::Critical);
    }

    #[test]
    fn test_no_reorder_point_positive_stock_is_ok() {
        assert_eq!(classify_stock(1, 0), StockStatus::Ok);
        assert_eq!(classify_stock(1_000_000, 0), StockStatus::Ok);
    }

    #[test]
    fn test_adjustment_cannot_drop_below_reserved() {
        let on_hand = 50i64;
        let reserved = 30i64;
        let change = -25i64;

        let new_on_hand = on_hand + change;
        assert!(new_on_hand < reserved, "this adjustment must be refused");
    }

    #[test]
    fn test_reserve_bounded_by_available() {
        let on_hand = 100i64;
        let reserved = 40i64;
        let available = on_hand - reserved;

        assert_eq!(available, 60);
        // A reservation of exactly the available quantity is allowed
        assert!(60 <= available);
        // One more is not
        assert!(61 > available);
    }

    #[test]
    fn test_release_bounded_by_reserved() {
        let reserved = 25i64;
        assert!(25 <= reserved);
        assert!(26 > reserved);
    }

    #[test]
    fn test_transfer_writes_paired_movements() {
        let qty = 15i64;
        let out_change = -qty;
        let in_change = qty;

        assert_eq!(out_change + in_change, 0);
        assert_eq!(MovementType::TransferOut.as_str(), "TRANSFER_OUT");
        assert_eq!(MovementType::TransferIn.as_str(), "TRANSFER_IN");
    }

    #[test]
    fn test_movement_type_round_trip() {
        for mt in [
            MovementType::Adjustment,
            MovementType::Reserve,
            MovementType::Release,
            MovementType::TransferIn,
            MovementType::TransferOut,
            MovementType::ReorderLevel,
        ] {
            assert_eq!(mt.as_str().parse::<MovementType>().unwrap(), mt);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    // The round-trip and transfer properties reject ~5/6 of generated inputs
    // via prop_assume!, which sits right at proptest's default global reject
    // limit (1024) for 200 cases; give the runner enough reject budget.
    #![proptest_config(ProptestConfig {
        cases: 200,
        max_global_rejects: 65536,
        ..ProptestConfig::default()
    })]

    /// Classification is total and consistent: exactly one status, and it
    /// degrades monotonically as availability shrinks.
    #[test]
    fn prop_classification_monotonic(
        reorder in 0i64..1000,
        available in -100i64..2000,
    ) {
        let status = classify_stock(available, reorder);
        let worse = classify_stock(available - 1, reorder);

        let rank = |s: StockStatus| match s {
            StockStatus::Ok => 0,
            StockStatus::Low => 1,
            StockStatus::Critical => 2,
        };
        prop_assert!(rank(worse) >= rank(status));
    }

    /// Availability above the reorder point is never flagged
    #[test]
    fn prop_above_reorder_point_is_ok(reorder in 0i64..1000, extra in 1i64..1000) {
        let status = classify_stock(reorder + extra, reorder);
        prop_assert_eq!(status, StockStatus::Ok);
    }

    /// A reserve followed by a matching release restores the position
    #[test]
    fn prop_reserve_release_round_trip(
        on_hand in 0i64..10_000,
        reserved in 0i64..10_000,
        qty in 1i64..10_000,
    ) {
        prop_assume!(reserved <= on_hand);
        let available = on_hand - reserved;
        prop_assume!(qty <= available);

        let after_reserve = reserved + qty;
        prop_assert!(after_reserve <= on_hand);

        let after_release = after_reserve - qty;
        prop_assert_eq!(after_release, reserved);
    }

    /// A transfer conserves total on-hand stock across both warehouses
    #[test]
    fn prop_transfer_conserves_stock(
        source in 0i64..10_000,
        source_reserved in 0i64..10_000,
        dest in 0i64..10_000,
        qty in 1i64..10_000,
    ) {
        prop_assume!(source_reserved <= source);
        prop_assume!(qty <= source - source_reserved);

        let source_after = source - qty;
        let dest_after = dest + qty;

        prop_assert_eq!(source_after + dest_after, source + dest);
        // The source never dips below its reservations
        prop_assert!(source_after >= source_reserved);
    }

    /// Every mutation's audit row links previous and new quantities
    #[test]
    fn prop_movement_deltas_consistent(previous in 0i64..10_000, change in -10_000i64..10_000) {
        let new = previous + change;
        prop_assert_eq!(new - previous, change);
    }
}
