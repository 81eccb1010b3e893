#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use aether_engine::Config;
use aether_engine::core::catalog::ScentFamily;
use aether_engine::core::formula::{BaseFormulaGenerator, Formula};
use aether_engine::core::knowledge::{
    EmbeddingIndex, HashedEmbedding, HybridRetriever, KnowledgeHandle, KnowledgeSnapshot,
    RetrievalChain, RuleRetriever, SimilarityIndex, SimilarityMatch,
};
use aether_engine::core::pipeline::Formulator;
use aether_engine::core::profile::UserProfile;
use aether_engine::observability::{Observer, ObserverEvent, ObserverMetric};

pub const EMBEDDING_DIMS: usize = 128;

pub fn builtin() -> KnowledgeSnapshot {
    KnowledgeSnapshot::builtin().expect("built-in knowledge is valid")
}

pub fn config_with_reps(reps: usize) -> Config {
    let mut config = Config::default();
    config.formulation.representatives_per_family = reps;
    config
}

pub fn base_formula(
    snapshot: &KnowledgeSnapshot,
    reps: usize,
    families: &[ScentFamily],
) -> Formula {
    BaseFormulaGenerator::new(&config_with_reps(reps).formulation)
        .generate(&snapshot.catalog, families, &UserProfile::default())
        .expect("families resolve")
}

pub async fn hybrid_retriever(snapshot: &KnowledgeSnapshot) -> Arc<dyn RuleRetriever> {
    let index = EmbeddingIndex::build(Arc::new(HashedEmbedding::new(EMBEDDING_DIMS)), snapshot)
        .await
        .expect("index builds");
    Arc::new(HybridRetriever::new(Arc::new(index), 0.3, 0.7))
}

pub async fn hybrid_chain(snapshot: &KnowledgeSnapshot, top_k: usize) -> RetrievalChain {
    RetrievalChain::new(
        vec![hybrid_retriever(snapshot).await],
        Duration::from_secs(5),
        top_k,
    )
}

pub fn formulator(config: &Config, observer: Arc<dyn Observer>) -> Formulator {
    Formulator::new(config, KnowledgeHandle::new(builtin()), observer)
}

/// Similarity backend that never answers in time.
pub struct StalledIndex;

#[async_trait]
impl SimilarityIndex for StalledIndex {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn query(&self, _text: &str, _limit: usize) -> anyhow::Result<Vec<SimilarityMatch>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

/// Similarity backend that is down.
pub struct OfflineIndex;

#[async_trait]
impl SimilarityIndex for OfflineIndex {
    fn name(&self) -> &str {
        "offline"
    }

    async fn query(&self, _text: &str, _limit: usize) -> anyhow::Result<Vec<SimilarityMatch>> {
        anyhow::bail!("connection refused")
    }
}

/// Keeps every event it sees, as short labels.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, label: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(label);
        }
    }
}

impl Observer for RecordingObserver {
    fn record_event(&self, event: &ObserverEvent) {
        let label = match event {
            ObserverEvent::FormulationStart { .. } => "formulation.start".to_string(),
            ObserverEvent::FormulationEnd { success, .. } => format!("formulation.end:{success}"),
            ObserverEvent::RetrievalDegraded { .. } => "retrieval.degraded".to_string(),
            ObserverEvent::RuleApplied { rule_id } => format!("rule.applied:{rule_id}"),
            ObserverEvent::RuleSkipped { rule_id, .. } => format!("rule.skipped:{rule_id}"),
            ObserverEvent::ComplianceAdjusted { allergen, .. } => {
                format!("compliance.adjusted:{allergen}")
            }
            ObserverEvent::KnowledgeReloaded { version } => format!("knowledge.reloaded:{version}"),
            ObserverEvent::Error { component, .. } => format!("error:{component}"),
        };
        self.push(label);
    }

    fn record_metric(&self, _metric: &ObserverMetric) {}

    fn name(&self) -> &str {
        "recording"
    }
}
