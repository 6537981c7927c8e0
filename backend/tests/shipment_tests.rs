//! Shipment lifecycle and progress tests.

use proptest::prelude::*;

use shared::models::{clamp_progress, ShipmentMode, ShipmentStatus};

const ALL_STATUSES: [ShipmentStatus; 5] = [
    ShipmentStatus::Created,
    ShipmentStatus::InTransit,
    ShipmentStatus::Delayed,
    ShipmentStatus::Delivered,
    ShipmentStatus::Cancelled,
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_shipments_start_created() {
        assert_eq!(ShipmentStatus::default(), ShipmentStatus::Created);
    }

    #[test]
    fn test_delay_cycle_is_allowed() {
        assert!(ShipmentStatus::InTransit.can_transition_to(ShipmentStatus::Delayed));
        assert!(ShipmentStatus::Delayed.can_transition_to(ShipmentStatus::InTransit));
    }

    #[test]
    fn test_delayed_shipment_can_still_deliver() {
        assert!(ShipmentStatus::Delayed.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn test_delivery_requires_transit() {
        assert!(!ShipmentStatus::Created.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn test_delivered_shipment_cannot_be_cancelled() {
        assert!(!ShipmentStatus::Delivered.can_transition_to(ShipmentStatus::Cancelled));
    }

    #[test]
    fn test_progress_clamped_to_percent_range() {
        assert_eq!(clamp_progress(-1), 0);
        assert_eq!(clamp_progress(0), 0);
        assert_eq!(clamp_progress(100), 100);
        assert_eq!(clamp_progress(101), 100);
    }

    #[test]
    fn test_mode_round_trip() {
        for m in [ShipmentMode::Air, ShipmentMode::Sea, ShipmentMode::Ground] {
            assert_eq!(m.as_str().parse::<ShipmentMode>().unwrap(), m);
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in ALL_STATUSES {
            assert_eq!(s.as_str().parse::<ShipmentStatus>().unwrap(), s);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn status_strategy() -> impl Strategy<Value = ShipmentStatus> {
    prop::sample::select(ALL_STATUSES.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Terminal statuses admit no transitions
    #[test]
    fn prop_terminal_statuses_are_absorbing(next in status_strategy()) {
        for terminal in [ShipmentStatus::Delivered, ShipmentStatus::Cancelled] {
            prop_assert!(terminal.is_terminal());
            prop_assert!(!terminal.can_transition_to(next));
        }
    }

    /// Clamped progress always lands in 0..=100 and is idempotent
    #[test]
    fn prop_clamp_is_idempotent(percent in i32::MIN..i32::MAX) {
        let once = clamp_progress(percent);
        prop_assert!((0..=100).contains(&once));
        prop_assert_eq!(clamp_progress(once), once);
    }

    /// Values already in range pass through unchanged
    #[test]
    fn prop_clamp_preserves_valid_values(percent in 0i32..=100) {
        prop_assert_eq!(clamp_progress(percent), percent);
    }

    /// The only route out of CREATED goes through transit or cancellation
    #[test]
    fn prop_created_exits(next in status_strategy()) {
        if ShipmentStatus::Created.can_transition_to(next) {
            prop_assert!(matches!(
                next,
                ShipmentStatus::InTransit | ShipmentStatus::Cancelled
            ));
        }
    }
}
