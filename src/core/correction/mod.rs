pub mod actions;

pub use actions::{ActionContext, apply_action};

use serde::Serialize;

use crate::config::FormulationConfig;
use crate::core::formula::Formula;
use crate::core::knowledge::{KnowledgeSnapshot, RankedRule, RetrievalChain};
use crate::core::molecular::MolecularEstimator;
use crate::core::profile::UserProfile;
use crate::error::RuleError;

/// A rule that changed the formula, with the reason it exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCorrection {
    pub rule_id: String,
    pub rationale: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Retrieved, but the condition does not hold for this profile.
    ConditionFalse,
    Rejected(RuleError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConditionFalse => write!(f, "condition not met"),
            Self::Rejected(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRule {
    pub rule_id: String,
    pub reason: SkipReason,
}

/// Result of one correction pass.
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    pub formula: Formula,
    pub applied: Vec<AppliedCorrection>,
    pub skipped: Vec<SkippedRule>,
    /// Retrieval strategy that produced the ranked rules
    pub strategy: String,
    /// Failures absorbed by the retrieval chain before it answered
    pub degraded: Vec<String>,
}

/// Retrieves correction rules for a profile and applies them in ranked order.
#[derive(Debug, Clone)]
pub struct PhysioCorrector {
    estimator: MolecularEstimator,
    stabilizer_starter_pct: f64,
}

impl PhysioCorrector {
    pub fn new(config: &FormulationConfig) -> Self {
        Self {
            estimator: MolecularEstimator::new(),
            stabilizer_starter_pct: config.stabilizer_starter_pct,
        }
    }

    pub async fn correct(
        &self,
        formula: Formula,
        profile: &UserProfile,
        snapshot: &KnowledgeSnapshot,
        retrieval: &RetrievalChain,
    ) -> CorrectionOutcome {
        let retrieved = retrieval.retrieve(snapshot, profile).await;
        tracing::debug!(
            strategy = %retrieved.strategy,
            rules = retrieved.rules.len(),
            "rules retrieved"
        );

        let (formula, applied, skipped) =
            self.apply_ranked(formula, profile, snapshot, &retrieved.rules);
        CorrectionOutcome {
            formula,
            applied,
            skipped,
            strategy: retrieved.strategy,
            degraded: retrieved.degraded,
        }
    }

    /// Apply already-ranked rules, then renormalize once.
    ///
    /// Each condition is re-checked at apply time. A rule whose action is
    /// rejected is logged and skipped; the remaining rules still run.
    pub fn apply_ranked(
        &self,
        mut formula: Formula,
        profile: &UserProfile,
        snapshot: &KnowledgeSnapshot,
        ranked: &[RankedRule],
    ) -> (Formula, Vec<AppliedCorrection>, Vec<SkippedRule>) {
        let ctx = ActionContext {
            catalog: &snapshot.catalog,
            profile,
            estimator: &self.estimator,
            stabilizer_starter_pct: self.stabilizer_starter_pct,
        };

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        for RankedRule { rule, relevance } in ranked {
            if !rule.condition.evaluate(profile) {
                skipped.push(SkippedRule {
                    rule_id: rule.id.clone(),
                    reason: SkipReason::ConditionFalse,
                });
                continue;
            }

            match apply_action(&mut formula, rule, &ctx) {
                Ok(()) => {
                    tracing::debug!(rule = %rule.id, action = %rule.action, "correction applied");
                    applied.push(AppliedCorrection {
                        rule_id: rule.id.clone(),
                        rationale: rule.rationale.clone(),
                        relevance: *relevance,
                    });
                }
                Err(e) => {
                    tracing::warn!(rule = %rule.id, error = %e, "correction rule skipped");
                    skipped.push(SkippedRule {
                        rule_id: rule.id.clone(),
                        reason: SkipReason::Rejected(e),
                    });
                }
            }
        }

        formula.renormalize();
        (formula, applied, skipped)
    }
}
