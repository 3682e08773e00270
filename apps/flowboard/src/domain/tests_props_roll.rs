//! Property-based tests for roll resolution.

use proptest::prelude::*;

use crate::domain::roll::{resolve, MitigationState};
use crate::domain::{test_gens, test_prelude, Stage};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: a 1 always ships, whatever the stage or pool.
    #[test]
    fn prop_critical_success_always_ships(
        card in test_gens::card(),
        stage in test_gens::stage(),
        mitigation in test_gens::mitigation(),
    ) {
        let out = resolve(1, &card, stage, &mitigation).unwrap();
        prop_assert_eq!(out.destination, Stage::Production);
        prop_assert!(!out.reverted);
        prop_assert_eq!(out.effort_credited, card.effort.points());
    }

    /// Property: a 4 always returns to ProductBacklog with nothing credited.
    #[test]
    fn prop_scope_creep_is_unconditional(
        card in test_gens::card(),
        stage in test_gens::stage(),
        mitigation in test_gens::mitigation(),
    ) {
        let out = resolve(4, &card, stage, &mitigation).unwrap();
        prop_assert_eq!(out.destination, Stage::ProductBacklog);
        prop_assert!(out.reverted);
        prop_assert_eq!(out.effort_credited, 0);
    }

    /// Property: a 5 depends only on whether a token is available.
    #[test]
    fn prop_impediment_follows_token_availability(
        card in test_gens::card(),
        stage in test_gens::stage(),
        tokens in 0u8..=3,
        debt in any::<bool>(),
    ) {
        let mitigation = MitigationState { tokens_available: tokens, technical_debt_active: debt };
        let out = resolve(5, &card, stage, &mitigation).unwrap();
        if tokens == 0 {
            prop_assert_eq!(out.destination, Stage::Implementation);
            prop_assert!(!out.can_mitigate);
        } else {
            prop_assert_eq!(out.destination, stage.previous().unwrap_or(stage));
            prop_assert!(out.can_mitigate);
        }
    }

    /// Property: only a 5 is ever mitigable, and reverts never credit effort.
    #[test]
    fn prop_mitigation_and_credit_are_consistent(
        die in test_gens::die(),
        card in test_gens::card(),
        stage in test_gens::stage(),
        mitigation in test_gens::mitigation(),
    ) {
        let out = resolve(die, &card, stage, &mitigation).unwrap();
        if out.can_mitigate {
            prop_assert_eq!(die, 5);
        }
        if out.reverted {
            prop_assert_eq!(out.effort_credited, 0);
        } else {
            prop_assert_eq!(out.effort_credited, card.effort.points());
        }
    }

    /// Property: resolution is deterministic given the draw.
    #[test]
    fn prop_resolution_is_deterministic(
        die in test_gens::die(),
        card in test_gens::card(),
        stage in test_gens::stage(),
        mitigation in test_gens::mitigation(),
    ) {
        let a = resolve(die, &card, stage, &mitigation).unwrap();
        let b = resolve(die, &card, stage, &mitigation).unwrap();
        prop_assert_eq!(a, b);
    }
}
