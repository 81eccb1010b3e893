use std::path::Path;
use std::sync::Arc;

use aether_engine::core::catalog::ScentFamily;
use aether_engine::core::knowledge::{CorrectionRule, seed};
use aether_engine::core::profile::{SkinType, UserProfile};
use aether_engine::{AetherError, Config, FormulationRequest, Formulator};

fn write_rules(path: &Path, rules: &[CorrectionRule]) {
    let body = serde_json::json!({ "rules": rules });
    std::fs::write(path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
}

fn renamed_dry_rule() -> CorrectionRule {
    let mut rule = seed::builtin_rules()
        .into_iter()
        .find(|r| r.id == "dry-fixative-boost")
        .unwrap();
    rule.id = "dry-fixative-boost-v2".into();
    rule
}

fn config_for(rules_path: &Path) -> Config {
    let mut config = Config::default();
    config.knowledge.rules_path = Some(rules_path.to_path_buf());
    config.observability.backend = "none".into();
    config
}

fn dry_request() -> FormulationRequest {
    FormulationRequest::new(UserProfile::new(5.5, SkinType::Dry, 36.5))
        .with_families([ScentFamily::Floral, ScentFamily::Woody])
}

mod reload {
    use super::*;

    #[tokio::test]
    async fn new_requests_see_new_rules_and_in_flight_snapshot_survives() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.json");
        write_rules(&rules_path, &seed::builtin_rules());

        let formulator = Formulator::from_config(&config_for(&rules_path)).await.unwrap();
        let in_flight = formulator.knowledge().load_full();
        let before = formulator.formulate(dry_request()).await.unwrap();
        assert_eq!(before.knowledge_version, 1);
        assert_eq!(before.retrieval_strategy, "hybrid");

        write_rules(&rules_path, &[renamed_dry_rule()]);
        assert_eq!(formulator.reload_knowledge().await.unwrap(), 2);

        assert_eq!(in_flight.version, 1);
        assert_eq!(in_flight.rules.len(), seed::builtin_rules().len());

        let after = formulator.formulate(dry_request()).await.unwrap();
        assert_eq!(after.knowledge_version, 2);
        assert_eq!(after.retrieval_strategy, "hybrid");
        let ids: Vec<&str> = after.corrections.iter().map(|c| c.rule_id.as_str()).collect();
        assert_eq!(ids, ["dry-fixative-boost-v2"]);

        let retrieved = formulator
            .retrieve(&UserProfile::new(5.5, SkinType::Dry, 36.5))
            .await;
        assert!(
            retrieved
                .rules
                .iter()
                .all(|r| r.rule.id == "dry-fixative-boost-v2")
        );
    }

    #[tokio::test]
    async fn broken_file_keeps_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.json");
        write_rules(&rules_path, &seed::builtin_rules());
        let formulator = Formulator::from_config(&config_for(&rules_path)).await.unwrap();

        std::fs::write(&rules_path, "{ not json").unwrap();
        let err = formulator.reload_knowledge().await.unwrap_err();
        assert!(matches!(err, AetherError::Knowledge(_)));
        assert_eq!(formulator.knowledge().load().version, 1);

        let formulation = formulator.formulate(dry_request()).await.unwrap();
        assert_eq!(formulation.knowledge_version, 1);
    }

    #[tokio::test]
    async fn missing_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("absent.json"));
        assert!(Formulator::from_config(&config).await.is_err());
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_during_reload_all_complete() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.json");
        write_rules(&rules_path, &seed::builtin_rules());
        let formulator = Arc::new(Formulator::from_config(&config_for(&rules_path)).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let formulator = Arc::clone(&formulator);
            handles.push(tokio::spawn(async move {
                let ph = 4.0 + f64::from(i) * 0.2;
                let skin = match i % 3 {
                    0 => SkinType::Dry,
                    1 => SkinType::Normal,
                    _ => SkinType::Oily,
                };
                let request = FormulationRequest::new(UserProfile::new(ph, skin, 36.5))
                    .with_families([ScentFamily::Citrus, ScentFamily::Woody]);
                formulator.formulate(request).await
            }));
        }

        write_rules(&rules_path, &[renamed_dry_rule()]);
        let version = formulator.reload_knowledge().await.unwrap();
        assert_eq!(version, 2);

        for handle in handles {
            let formulation = handle.await.unwrap().unwrap();
            assert!(matches!(formulation.knowledge_version, 1 | 2));
            assert!((formulation.formula.total() - 100.0).abs() < 1e-6);
            if formulation.knowledge_version == 2 {
                assert!(
                    formulation
                        .corrections
                        .iter()
                        .all(|c| c.rule_id == "dry-fixative-boost-v2")
                );
            }
        }
    }
}
