use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use aether_engine::core::catalog::ScentFamily;
use aether_engine::core::knowledge::{
    HybridRetriever, KeywordRetriever, RetrievalChain, RuleRetriever,
};
use aether_engine::core::profile::{SkinType, UserProfile};
use aether_engine::{FormulationError, FormulationRequest};

use super::formulation_harness::{
    OfflineIndex, RecordingObserver, StalledIndex, builtin, config_with_reps, formulator,
    hybrid_chain,
};

fn profile_grid() -> Vec<UserProfile> {
    let mut profiles = Vec::new();
    for ph in [4.0, 4.5, 5.5, 6.0, 6.8] {
        for skin in [SkinType::Dry, SkinType::Normal, SkinType::Oily] {
            for temperature in [35.2, 36.0, 36.5, 37.2, 38.0] {
                profiles.push(UserProfile::new(ph, skin, temperature));
            }
        }
    }
    profiles
}

mod fallback_equivalence {
    use super::*;

    #[tokio::test]
    async fn hybrid_keeps_every_matching_rule() {
        let snapshot = builtin();
        let hybrid = hybrid_chain(&snapshot, 6).await;

        for profile in profile_grid() {
            let expected: BTreeSet<String> = KeywordRetriever::rank(&snapshot, &profile, 6)
                .into_iter()
                .map(|r| r.rule.id)
                .collect();
            let outcome = hybrid.retrieve(&snapshot, &profile).await;
            assert_eq!(outcome.strategy, "hybrid");

            let matched: BTreeSet<String> = outcome
                .rules
                .iter()
                .filter(|r| r.rule.condition.evaluate(&profile))
                .map(|r| r.rule.id.clone())
                .collect();
            assert_eq!(matched, expected, "profile {profile:?}");
        }
    }

    #[tokio::test]
    async fn exact_matches_rank_ahead_of_similarity_hits() {
        let snapshot = builtin();
        let profile = UserProfile::new(5.5, SkinType::Dry, 36.5);
        let outcome = hybrid_chain(&snapshot, 6).await.retrieve(&snapshot, &profile).await;

        assert_eq!(outcome.rules[0].rule.id, "dry-fixative-boost");
        assert!(
            outcome.rules[1..]
                .iter()
                .all(|r| r.relevance < outcome.rules[0].relevance)
        );
    }
}

mod degraded_backends {
    use super::*;

    #[tokio::test]
    async fn offline_index_falls_back_to_keyword() {
        let snapshot = builtin();
        let hybrid: Arc<dyn RuleRetriever> =
            Arc::new(HybridRetriever::new(Arc::new(OfflineIndex), 0.3, 0.7));
        let chain = RetrievalChain::new(vec![hybrid], Duration::from_millis(250), 6);
        let profile = UserProfile::new(4.2, SkinType::Normal, 36.5);

        let outcome = chain.retrieve(&snapshot, &profile).await;
        assert_eq!(outcome.strategy, "keyword");
        assert_eq!(outcome.degraded.len(), 1);
        assert!(outcome.degraded[0].contains("offline"));

        let ids: Vec<&str> = outcome.rules.iter().map(|r| r.rule.id.as_str()).collect();
        assert_eq!(ids, ["acidic-aldehyde-reduction", "acidic-acetal-stabilizer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_index_times_out_to_keyword() {
        let snapshot = builtin();
        let hybrid: Arc<dyn RuleRetriever> =
            Arc::new(HybridRetriever::new(Arc::new(StalledIndex), 0.3, 0.7));
        let chain = RetrievalChain::new(vec![hybrid], Duration::from_millis(250), 6);
        let profile = UserProfile::new(5.5, SkinType::Dry, 36.5);

        let outcome = chain.retrieve(&snapshot, &profile).await;
        assert_eq!(outcome.strategy, "keyword");
        assert!(outcome.degraded[0].contains("timed out"));
        assert_eq!(outcome.rules.len(), 1);
        assert_eq!(outcome.rules[0].rule.id, "dry-fixative-boost");
    }

    #[tokio::test(start_paused = true)]
    async fn degraded_retrieval_is_reported_and_formulation_succeeds() {
        let observer = Arc::new(RecordingObserver::default());
        let hybrid: Arc<dyn RuleRetriever> =
            Arc::new(HybridRetriever::new(Arc::new(StalledIndex), 0.3, 0.7));
        let formulator = formulator(&config_with_reps(1), observer.clone())
            .with_retrieval(RetrievalChain::new(vec![hybrid], Duration::from_millis(100), 6));

        let request = FormulationRequest::new(UserProfile::new(5.5, SkinType::Dry, 36.5))
            .with_families([ScentFamily::Floral, ScentFamily::Woody]);
        let formulation = formulator.formulate(request).await.unwrap();

        assert_eq!(formulation.retrieval_strategy, "keyword");
        let events = observer.events();
        assert!(events.iter().any(|e| e == "retrieval.degraded"));
        assert!(events.iter().any(|e| e == "rule.applied:dry-fixative-boost"));
        assert!(events.iter().any(|e| e == "formulation.end:true"));
    }

    #[tokio::test(start_paused = true)]
    async fn request_deadline_cancels_slow_formulation() {
        let observer = Arc::new(RecordingObserver::default());
        let mut config = config_with_reps(1);
        config.formulation.request_timeout_ms = 50;
        let hybrid: Arc<dyn RuleRetriever> =
            Arc::new(HybridRetriever::new(Arc::new(StalledIndex), 0.3, 0.7));
        let formulator = formulator(&config, observer.clone())
            .with_retrieval(RetrievalChain::new(vec![hybrid], Duration::from_secs(10), 6));

        let request = FormulationRequest::new(UserProfile::default())
            .with_families([ScentFamily::Woody]);
        let err = formulator.formulate(request).await.unwrap_err();

        assert!(matches!(err, FormulationError::Timeout { timeout_ms: 50 }));
        assert!(observer.events().iter().any(|e| e == "formulation.end:false"));
    }
}
