pub mod record;

pub use record::{FormulationRecord, NoteRecord};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, RetrievalBackend, RetrievalConfig};
use crate::core::catalog::ScentFamily;
use crate::core::compliance::{ComplianceReport, ComplianceValidator, FormulaSubmission};
use crate::core::correction::{AppliedCorrection, PhysioCorrector, SkippedRule};
use crate::core::formula::{
    AffectChain, AffectMapping, AffectQuadrant, BaseFormulaGenerator, Formula,
};
use crate::core::knowledge::{
    EmbeddingIndex, HybridRetriever, KnowledgeHandle, KnowledgeSnapshot, RetrievalChain,
    RetrievalOutcome, RuleRetriever, SimilarityIndex, create_embedding_provider,
};
use crate::core::metrics::{FormulaMetrics, MetricsScorer};
use crate::core::profile::UserProfile;
use crate::error::{AetherError, FormulationError};
use crate::observability::{Observer, ObserverEvent, ObserverMetric, create_observer};

/// One formulation request: a profile and, optionally, the families to build
/// from. Without families the profile's affect decides.
#[derive(Debug, Clone, Default)]
pub struct FormulationRequest {
    pub profile: UserProfile,
    pub families: Vec<ScentFamily>,
    pub name: Option<String>,
}

impl FormulationRequest {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn with_families(mut self, families: impl IntoIterator<Item = ScentFamily>) -> Self {
        self.families = families.into_iter().collect();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A corrected, compliant, scored formula and how it came to be.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub formula: Formula,
    pub metrics: FormulaMetrics,
    pub compliance: ComplianceReport,
    pub corrections: Vec<AppliedCorrection>,
    pub skipped: Vec<SkippedRule>,
    pub affect: Option<AffectQuadrant>,
    pub knowledge_version: u64,
    pub retrieval_strategy: String,
    pub created_at: DateTime<Utc>,
}

impl Formulation {
    pub fn record(&self) -> FormulationRecord {
        FormulationRecord::from(self)
    }
}

/// Similarity index plus the retrieval chain built on top of it.
struct Retrieval {
    index: Option<Arc<EmbeddingIndex>>,
    chain: RetrievalChain,
}

async fn build_retrieval(config: &RetrievalConfig, snapshot: &KnowledgeSnapshot) -> Retrieval {
    let timeout = Duration::from_millis(config.timeout_ms);
    if config.backend == RetrievalBackend::Keyword {
        return Retrieval {
            index: None,
            chain: RetrievalChain::new(Vec::new(), timeout, config.top_k),
        };
    }

    let provider = Arc::from(create_embedding_provider(
        &config.embedding_provider,
        config.embedding_dimensions,
    ));
    match EmbeddingIndex::build(provider, snapshot).await {
        Ok(index) => {
            let index = Arc::new(index);
            let similarity: Arc<dyn SimilarityIndex> = Arc::clone(&index) as _;
            #[allow(clippy::cast_possible_truncation)]
            let hybrid: Arc<dyn RuleRetriever> = Arc::new(HybridRetriever::new(
                similarity,
                config.vector_weight as f32,
                config.keyword_weight as f32,
            ));
            Retrieval {
                index: Some(index),
                chain: RetrievalChain::new(vec![hybrid], timeout, config.top_k),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "similarity index unavailable, using keyword retrieval");
            Retrieval {
                index: None,
                chain: RetrievalChain::new(Vec::new(), timeout, config.top_k),
            }
        }
    }
}

/// Runs the whole pipeline: generate, correct, validate, score.
///
/// Holds no per-request state; share it behind an `Arc` and call
/// [`Formulator::formulate`] concurrently.
pub struct Formulator {
    config: Config,
    knowledge: KnowledgeHandle,
    index: Option<Arc<EmbeddingIndex>>,
    retrieval: RetrievalChain,
    affect: AffectChain,
    generator: BaseFormulaGenerator,
    corrector: PhysioCorrector,
    scorer: MetricsScorer,
    observer: Arc<dyn Observer>,
}

impl Formulator {
    /// Load knowledge and build every stage from config.
    pub async fn from_config(config: &Config) -> Result<Self, AetherError> {
        config.validate()?;
        let snapshot = KnowledgeSnapshot::load(&config.knowledge, 1)?;
        let retrieval = build_retrieval(&config.retrieval, &snapshot).await;
        let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));

        let mut formulator = Self::new(config, KnowledgeHandle::new(snapshot), observer);
        formulator.index = retrieval.index;
        formulator.retrieval = retrieval.chain;
        Ok(formulator)
    }

    /// Keyword retrieval and the local affect table; swap either out with the
    /// `with_*` builders.
    pub fn new(config: &Config, knowledge: KnowledgeHandle, observer: Arc<dyn Observer>) -> Self {
        Self {
            config: config.clone(),
            knowledge,
            index: None,
            retrieval: RetrievalChain::new(
                Vec::new(),
                Duration::from_millis(config.retrieval.timeout_ms),
                config.retrieval.top_k,
            ),
            affect: AffectChain::local(),
            generator: BaseFormulaGenerator::new(&config.formulation),
            corrector: PhysioCorrector::new(&config.formulation),
            scorer: MetricsScorer::new(&config.scoring),
            observer,
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalChain) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_affect_chain(mut self, affect: AffectChain) -> Self {
        self.affect = affect;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeHandle {
        &self.knowledge
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rank rules for a profile against the current snapshot.
    pub async fn retrieve(&self, profile: &UserProfile) -> RetrievalOutcome {
        let snapshot = self.knowledge.load_full();
        self.retrieval.retrieve(&snapshot, profile).await
    }

    /// Re-read the knowledge files, swap the snapshot in and re-embed the
    /// rules. Requests already running keep the snapshot they started with.
    pub async fn reload_knowledge(&self) -> Result<u64, AetherError> {
        let fresh = self.knowledge.reload(&self.config.knowledge)?;
        if let Some(index) = &self.index
            && let Err(e) = index.rebuild(&fresh).await
        {
            tracing::warn!(error = %e, "similarity index rebuild failed");
            self.observer.record_event(&ObserverEvent::Error {
                component: "retrieval".into(),
                message: e.to_string(),
            });
        }
        self.observer.record_event(&ObserverEvent::KnowledgeReloaded {
            version: fresh.version,
        });
        Ok(fresh.version)
    }

    /// Run one request under the configured request timeout.
    pub async fn formulate(
        &self,
        request: FormulationRequest,
    ) -> Result<Formulation, FormulationError> {
        let started = Instant::now();
        let snapshot = self.knowledge.load_full();
        let timeout_ms = self.config.formulation.request_timeout_ms;

        let result = match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.run(request, &snapshot),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FormulationError::Timeout { timeout_ms }),
        };

        let duration = started.elapsed();
        self.observer.record_event(&ObserverEvent::FormulationEnd {
            duration,
            success: result.is_ok(),
        });
        self.observer
            .record_metric(&ObserverMetric::RequestLatency(duration));
        if let Err(e) = &result {
            self.observer.record_event(&ObserverEvent::Error {
                component: "formulation".into(),
                message: e.to_string(),
            });
        }
        result
    }

    /// Check a submitted formula against the configured category's limits,
    /// bypassing generation and correction.
    pub fn validate_formula(
        &self,
        submission: &FormulaSubmission,
    ) -> Result<(Formula, ComplianceReport), FormulationError> {
        let snapshot = self.knowledge.load_full();
        let formula = submission.to_formula(&snapshot.catalog)?;
        let category = self.config.compliance.category;
        let validator = ComplianceValidator::new(category, snapshot.limits_for(category));
        let (formula, report) = validator.validate(formula)?;

        for audit in report.adjusted() {
            self.observer.record_event(&ObserverEvent::ComplianceAdjusted {
                allergen: audit.allergen.clone(),
                before: audit.before,
                after: audit.after,
            });
        }
        tracing::info!(
            category = %category,
            components = formula.len(),
            passed = report.passed,
            warnings = report.warnings.len(),
            "submitted formula validated"
        );
        Ok((formula, report))
    }

    async fn resolve_families(
        &self,
        request: &FormulationRequest,
    ) -> (Vec<ScentFamily>, Option<AffectMapping>) {
        let mapping = match request.profile.affect() {
            Some((valence, arousal)) => Some(self.affect.map(valence, arousal).await),
            None => None,
        };
        if !request.families.is_empty() {
            return (request.families.clone(), mapping);
        }
        let mapping =
            mapping.unwrap_or_else(|| AffectMapping::from_quadrant(AffectQuadrant::Neutral));
        (mapping.families.clone(), Some(mapping))
    }

    async fn run(
        &self,
        request: FormulationRequest,
        snapshot: &KnowledgeSnapshot,
    ) -> Result<Formulation, FormulationError> {
        let profile = &request.profile;
        profile.validate()?;

        let (families, mapping) = self.resolve_families(&request).await;
        self.observer.record_event(&ObserverEvent::FormulationStart {
            families: families.iter().map(ToString::to_string).collect(),
            knowledge_version: snapshot.version,
        });

        let mut base = self.generator.generate(&snapshot.catalog, &families, profile)?;
        if let Some(name) = &request.name {
            base.name.clone_from(name);
        }
        if let Some(mapping) = &mapping
            && profile.affect().is_some()
        {
            base.description.clone_from(&mapping.description);
        }

        let outcome = self
            .corrector
            .correct(base, profile, snapshot, &self.retrieval)
            .await;
        for reason in &outcome.degraded {
            self.observer.record_event(&ObserverEvent::RetrievalDegraded {
                reason: reason.clone(),
            });
        }
        self.observer.record_metric(&ObserverMetric::RulesRetrieved {
            strategy: outcome.strategy.clone(),
            count: u64::try_from(outcome.applied.len() + outcome.skipped.len())
                .unwrap_or(u64::MAX),
        });
        for applied in &outcome.applied {
            self.observer.record_event(&ObserverEvent::RuleApplied {
                rule_id: applied.rule_id.clone(),
            });
        }
        for skipped in &outcome.skipped {
            self.observer.record_event(&ObserverEvent::RuleSkipped {
                rule_id: skipped.rule_id.clone(),
                reason: skipped.reason.to_string(),
            });
        }
        self.observer.record_metric(&ObserverMetric::RulesApplied(
            u64::try_from(outcome.applied.len()).unwrap_or(u64::MAX),
        ));

        let category = self.config.compliance.category;
        let validator = ComplianceValidator::new(category, snapshot.limits_for(category));
        let (formula, compliance) = validator.validate(outcome.formula)?;
        for audit in compliance.adjusted() {
            self.observer.record_event(&ObserverEvent::ComplianceAdjusted {
                allergen: audit.allergen.clone(),
                before: audit.before,
                after: audit.after,
            });
        }
        if compliance.concentration_removed > 0.0 {
            self.observer
                .record_metric(&ObserverMetric::ConcentrationRemoved(
                    compliance.concentration_removed,
                ));
        }

        let metrics = self.scorer.score(&formula, profile, &compliance);
        tracing::info!(
            formula = %formula.id,
            components = formula.len(),
            corrections = outcome.applied.len(),
            compliance_passed = compliance.passed,
            strategy = %outcome.strategy,
            "formulation complete"
        );

        Ok(Formulation {
            formula,
            metrics,
            compliance,
            corrections: outcome.applied,
            skipped: outcome.skipped,
            affect: mapping.filter(|_| profile.affect().is_some()).map(|m| m.quadrant),
            knowledge_version: snapshot.version,
            retrieval_strategy: outcome.strategy,
            created_at: Utc::now(),
        })
    }
}
