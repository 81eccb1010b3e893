use std::sync::Arc;

use proptest::prelude::*;
use strum::IntoEnumIterator;

use aether_engine::core::catalog::ScentFamily;
use aether_engine::core::compliance::{ComplianceValidator, FragranceCategory};
use aether_engine::core::formula::{Formula, FormulaComponent};
use aether_engine::core::knowledge::KeywordRetriever;
use aether_engine::core::profile::{SkinType, UserProfile};
use aether_engine::observability::NoopObserver;
use aether_engine::{FormulationError, FormulationRequest};

use super::formulation_harness::{builtin, config_with_reps, formulator};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn skin_type() -> impl Strategy<Value = SkinType> {
    prop_oneof![
        Just(SkinType::Dry),
        Just(SkinType::Normal),
        Just(SkinType::Oily)
    ]
}

fn profile() -> impl Strategy<Value = UserProfile> {
    (3.5f64..8.0, skin_type(), 33.0f64..40.0)
        .prop_map(|(ph, skin, temperature)| UserProfile::new(ph, skin, temperature))
}

fn families() -> impl Strategy<Value = Vec<ScentFamily>> {
    let all: Vec<ScentFamily> = ScentFamily::iter().collect();
    proptest::sample::subsequence(all.clone(), 1..=all.len())
}

const COMPLIANCE_POOL: [&str; 8] = [
    "Bergamot Oil",
    "Lemon Oil",
    "Lavender Oil",
    "Rose Absolute",
    "Jasmine Absolute",
    "Hedione",
    "Oakmoss Absolute",
    "Sandalwood (Santalol)",
];

fn pool_formula(concentrations: &[f64]) -> Formula {
    let snapshot = builtin();
    let mut formula = Formula::new("Pool", "");
    for (name, concentration) in COMPLIANCE_POOL.iter().zip(concentrations) {
        let ingredient = Arc::clone(snapshot.catalog.get(name).unwrap());
        formula.add(FormulaComponent::new(ingredient, *concentration));
    }
    formula
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn formulations_sum_to_one_hundred_and_respect_limits(
        profile in profile(),
        families in families(),
        reps in 1usize..=3,
    ) {
        let formulator = formulator(&config_with_reps(reps), Arc::new(NoopObserver));
        let request = FormulationRequest::new(profile).with_families(families);

        match runtime().block_on(formulator.formulate(request)) {
            Ok(formulation) => {
                prop_assert!((formulation.formula.total() - 100.0).abs() <= 1e-6);
                prop_assert!(formulation.formula.components().all(|c| c.concentration > 0.0));
                let limits = builtin().limits_for(FragranceCategory::FineFragrance);
                for (allergen, limit) in limits {
                    let aggregate: f64 = formulation
                        .formula
                        .components()
                        .filter(|c| c.ingredient.carries_allergen(&allergen))
                        .map(|c| c.concentration)
                        .sum();
                    prop_assert!(aggregate <= limit + 1e-6, "{allergen} at {aggregate}");
                }
            }
            Err(FormulationError::NoResolvableIngredients { .. }
                | FormulationError::ComplianceUnsatisfiable { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn renormalize_is_idempotent(concentrations in proptest::collection::vec(0.01f64..80.0, 8)) {
        let mut once = pool_formula(&concentrations);
        once.renormalize();
        let mut twice = once.clone();
        twice.renormalize();

        prop_assert!((once.total() - 100.0).abs() <= 1e-6);
        for (a, b) in once.components().zip(twice.components()) {
            prop_assert_eq!(a.concentration.to_bits(), b.concentration.to_bits());
        }
    }

    #[test]
    fn validation_never_leaves_an_allergen_over_its_limit(
        concentrations in proptest::collection::vec(0.01f64..60.0, 8),
    ) {
        let snapshot = builtin();
        let limits = snapshot.limits_for(FragranceCategory::FineFragrance);
        let validator = ComplianceValidator::new(FragranceCategory::FineFragrance, limits.clone());

        match validator.validate(pool_formula(&concentrations)) {
            Ok((formula, report)) => {
                prop_assert!((formula.total() - 100.0).abs() <= 1e-6);
                for (allergen, limit) in &limits {
                    let aggregate: f64 = formula
                        .components()
                        .filter(|c| c.ingredient.carries_allergen(allergen))
                        .map(|c| c.concentration)
                        .sum();
                    prop_assert!(aggregate <= limit + 1e-6, "{allergen} at {aggregate}");
                }
                for audit in report.adjusted() {
                    prop_assert!(audit.after <= audit.before + 1e-9);
                }
            }
            Err(FormulationError::ComplianceUnsatisfiable { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn keyword_ranking_is_deterministic(profile in profile()) {
        let snapshot = builtin();
        let first: Vec<String> = KeywordRetriever::rank(&snapshot, &profile, 8)
            .into_iter()
            .map(|r| r.rule.id)
            .collect();
        let second: Vec<String> = KeywordRetriever::rank(&snapshot, &profile, 8)
            .into_iter()
            .map(|r| r.rule.id)
            .collect();
        prop_assert_eq!(first, second);
    }
}

#[tokio::test]
async fn repeated_formulations_apply_rules_in_the_same_order() {
    let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
    let profile = UserProfile::new(4.0, SkinType::Oily, 37.8);
    let families = [
        ScentFamily::Aldehyde,
        ScentFamily::Citrus,
        ScentFamily::Woody,
    ];

    let first = formulator
        .formulate(FormulationRequest::new(profile.clone()).with_families(families))
        .await
        .unwrap();
    let second = formulator
        .formulate(FormulationRequest::new(profile).with_families(families))
        .await
        .unwrap();

    let ids = |f: &aether_engine::Formulation| {
        f.corrections
            .iter()
            .map(|c| c.rule_id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_ne!(first.formula.id, second.formula.id);
    for (a, b) in first.formula.components().zip(second.formula.components()) {
        assert_eq!(a.name(), b.name());
        assert!((a.concentration - b.concentration).abs() < 1e-12);
    }
}
