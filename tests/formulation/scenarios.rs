use std::sync::Arc;

use aether_engine::FormulationError;
use aether_engine::FormulationRequest;
use aether_engine::core::catalog::{ScentFamily, Tier};
use aether_engine::core::compliance::{
    ComplianceLimit, ComplianceValidator, FormulaSubmission, FragranceCategory,
};
use aether_engine::core::correction::PhysioCorrector;
use aether_engine::core::formula::{AffectQuadrant, Formula, FormulaComponent};
use aether_engine::core::knowledge::{KnowledgeSnapshot, RetrievalChain, seed};
use aether_engine::core::profile::{SkinType, UserProfile};
use aether_engine::observability::NoopObserver;

use super::formulation_harness::{
    base_formula, builtin, config_with_reps, formulator, hybrid_chain,
};

const ALDEHYDE_C11: &str = "Aldehyde C-11 (Undecylenal)";

mod acidic_skin {
    use super::*;

    fn families() -> [ScentFamily; 4] {
        [
            ScentFamily::Aldehyde,
            ScentFamily::Citrus,
            ScentFamily::Floral,
            ScentFamily::Woody,
        ]
    }

    #[test]
    fn base_formula_follows_pyramid() {
        let snapshot = builtin();
        let base = base_formula(&snapshot, 1, &families());

        assert_eq!(base.len(), 4);
        assert!((base.get(ALDEHYDE_C11).unwrap().concentration - 10.0).abs() < 1e-9);
        assert!((base.tier_total(Tier::Heart) - 35.0).abs() < 1e-9);
        assert!((base.tier_total(Tier::Base) - 45.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn aldehydes_reduced_and_acetal_added() {
        let snapshot = builtin();
        let base = base_formula(&snapshot, 1, &families());
        let before = base.get(ALDEHYDE_C11).unwrap().concentration;

        let profile = UserProfile::new(4.2, SkinType::Normal, 36.5);
        let corrector = PhysioCorrector::new(&config_with_reps(1).formulation);
        let chain = hybrid_chain(&snapshot, 6).await;
        let outcome = corrector.correct(base, &profile, &snapshot, &chain).await;

        let ids: Vec<&str> = outcome.applied.iter().map(|a| a.rule_id.as_str()).collect();
        assert!(ids.contains(&"acidic-aldehyde-reduction"));
        assert!(ids.contains(&"acidic-acetal-stabilizer"));

        let after = outcome.formula.get(ALDEHYDE_C11).unwrap().concentration;
        assert!(after <= before * 0.85 + 1e-9, "aldehyde at {after}");
        assert!((after - 8.5 * 100.0 / 100.5).abs() < 1e-6);
        assert!(outcome.formula.get(seed::ACETAL_STABILIZER).is_some());
        assert!((outcome.formula.total() - 100.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn keyword_retrieval_gives_same_corrections() {
        let snapshot = builtin();
        let profile = UserProfile::new(4.2, SkinType::Normal, 36.5);
        let corrector = PhysioCorrector::new(&config_with_reps(1).formulation);

        let hybrid = corrector
            .correct(
                base_formula(&snapshot, 1, &families()),
                &profile,
                &snapshot,
                &hybrid_chain(&snapshot, 6).await,
            )
            .await;
        let keyword = corrector
            .correct(
                base_formula(&snapshot, 1, &families()),
                &profile,
                &snapshot,
                &RetrievalChain::keyword_only(6),
            )
            .await;

        assert_eq!(keyword.strategy, "keyword");
        for component in keyword.formula.components() {
            let other = hybrid.formula.get(component.name()).unwrap();
            assert!((other.concentration - component.concentration).abs() < 1e-9);
        }
    }
}

mod dry_skin {
    use super::*;

    #[tokio::test]
    async fn fixatives_gain_share() {
        let snapshot = builtin();
        let families = [ScentFamily::Citrus, ScentFamily::Floral, ScentFamily::Woody];
        let base = base_formula(&snapshot, 2, &families);
        let fixative = |c: &FormulaComponent| c.ingredient.logp > 3.0;
        let share_before = base.share_where(fixative);
        assert!((share_before - 0.45).abs() < 1e-9);

        let profile = UserProfile::new(5.5, SkinType::Dry, 36.5);
        let corrector = PhysioCorrector::new(&config_with_reps(2).formulation);
        let outcome = corrector
            .correct(base, &profile, &snapshot, &hybrid_chain(&snapshot, 6).await)
            .await;

        assert!(
            outcome
                .applied
                .iter()
                .any(|a| a.rule_id == "dry-fixative-boost")
        );
        let share_after = outcome.formula.share_where(fixative);
        assert!(share_after >= share_before * 1.25, "share {share_after}");
        assert!((share_after - 78.75 / 133.75).abs() < 1e-6);
    }
}

mod compliance_limits {
    use super::*;

    fn custom_snapshot() -> KnowledgeSnapshot {
        KnowledgeSnapshot::from_parts(
            1,
            seed::builtin_ingredients(),
            seed::builtin_rules(),
            vec![ComplianceLimit {
                allergen: "citral".into(),
                category: FragranceCategory::FineFragrance,
                max_concentration: 3.0,
            }],
        )
        .unwrap()
    }

    #[test]
    fn citral_brought_to_limit() {
        let snapshot = custom_snapshot();
        let lemon = Arc::clone(snapshot.catalog.get("Lemon Oil").unwrap());
        let hedione = Arc::clone(snapshot.catalog.get("Hedione").unwrap());
        let mut formula = Formula::new("Verbena", "");
        formula.add(FormulaComponent::new(lemon, 4.0));
        formula.add(FormulaComponent::new(hedione, 96.0));

        let validator = ComplianceValidator::new(
            FragranceCategory::FineFragrance,
            snapshot.limits_for(FragranceCategory::FineFragrance),
        );
        let (formula, report) = validator.validate(formula).unwrap();

        let citral = formula.get("Lemon Oil").unwrap().concentration;
        assert!(citral <= 3.0 + 1e-9);
        assert!((citral - 3.0).abs() < 1e-6);
        assert!((formula.total() - 100.0).abs() < 1e-6);
        assert!(report.passed);
        let audit = report.adjusted().next().unwrap();
        assert_eq!(audit.allergen, "citral");
        assert!((audit.before - 4.0).abs() < 1e-9);
    }

    #[test]
    fn allergen_in_every_component_is_unsatisfiable() {
        let snapshot = custom_snapshot();
        let lemon = Arc::clone(snapshot.catalog.get("Lemon Oil").unwrap());
        let mut formula = Formula::new("Solo", "");
        formula.add(FormulaComponent::new(lemon, 100.0));

        let validator = ComplianceValidator::new(
            FragranceCategory::FineFragrance,
            snapshot.limits_for(FragranceCategory::FineFragrance),
        );
        assert!(matches!(
            validator.validate(formula),
            Err(FormulationError::ComplianceUnsatisfiable { allergen, .. }) if allergen == "citral"
        ));
    }
}

mod submitted_formulas {
    use super::*;

    fn submission() -> FormulaSubmission {
        serde_json::from_str(
            r#"{"name": "Verbena", "ingredients": [
                {"name": "Lemon Oil", "concentration": 4.0},
                {"name": "Hedione", "concentration": 71.0},
                {"name": "Cedarwood Atlas", "concentration": 25.0}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn leave_on_limits_apply_to_submissions() {
        let mut config = config_with_reps(2);
        config.compliance.category = FragranceCategory::LeaveOn;
        let formulator = formulator(&config, Arc::new(NoopObserver));

        let (formula, report) = formulator.validate_formula(&submission()).unwrap();
        assert_eq!(report.category, FragranceCategory::LeaveOn);
        assert!(!report.passed);
        assert!(formula.get("Lemon Oil").unwrap().concentration <= 1.5 + 1e-9);
        assert!((formula.total() - 100.0).abs() < 1e-6);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
        assert!(json["removedComponents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unknown_submitted_ingredient_fails() {
        let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
        let submission: FormulaSubmission = serde_json::from_str(
            r#"{"ingredients": [{"name": "Ambergris", "concentration": 10.0}]}"#,
        )
        .unwrap();
        assert!(matches!(
            formulator.validate_formula(&submission),
            Err(FormulationError::InvalidFormula(_))
        ));
    }
}

mod unresolvable_families {
    use super::*;

    #[tokio::test]
    async fn families_without_ingredients_fail() {
        let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
        let request = FormulationRequest::new(UserProfile::default())
            .with_families([ScentFamily::Fresh, ScentFamily::Ozonic]);

        let err = formulator.formulate(request).await.unwrap_err();
        assert!(matches!(err, FormulationError::NoResolvableIngredients { .. }));
    }

    #[tokio::test]
    async fn unknown_family_is_skipped_when_others_resolve() {
        let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
        let request = FormulationRequest::new(UserProfile::default())
            .with_families([ScentFamily::Ozonic, ScentFamily::Woody]);

        let formulation = formulator.formulate(request).await.unwrap();
        assert!(
            formulation
                .formula
                .components()
                .all(|c| c.ingredient.family == ScentFamily::Woody)
        );
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn affect_only_request_uses_quadrant_families() {
        let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
        let profile = UserProfile::new(5.5, SkinType::Normal, 36.5).with_affect(-0.5, -0.2);

        let formulation = formulator
            .formulate(FormulationRequest::new(profile).with_name("Evening"))
            .await
            .unwrap();

        assert_eq!(formulation.formula.name, "Evening");
        assert_eq!(formulation.affect, Some(AffectQuadrant::Grounding));
        assert!(
            formulation
                .formula
                .components()
                .all(|c| AffectQuadrant::Grounding.families().contains(&c.ingredient.family))
        );
        assert!((formulation.formula.total() - 100.0).abs() < 1e-6);
        for audit in &formulation.compliance.allergens {
            assert!(audit.after <= audit.limit + 1e-6, "{} over limit", audit.allergen);
        }
    }

    #[tokio::test]
    async fn record_serializes_with_camel_case_keys() {
        let formulator = formulator(&config_with_reps(2), Arc::new(NoopObserver));
        let request = FormulationRequest::new(UserProfile::new(5.5, SkinType::Dry, 36.5))
            .with_families([ScentFamily::Citrus, ScentFamily::Woody]);

        let formulation = formulator.formulate(request).await.unwrap();
        let json = serde_json::to_value(formulation.record()).unwrap();

        assert!(json.get("formulaId").is_some());
        assert!(json.get("notePyramid").is_some());
        assert!(json["metrics"].get("ifraCompliance").is_some());
        assert_eq!(json["knowledgeVersion"], 1);
        let knowledge = builtin();
        let rationale = &knowledge.rule("dry-fixative-boost").unwrap().rationale;
        assert!(
            json["physioCorrections"]
                .as_array()
                .unwrap()
                .iter()
                .any(|c| c == rationale.as_str())
        );
    }
}
