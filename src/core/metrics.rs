// Performance scoring: four 0–100 scores computed from the final formula.

use serde::Serialize;

use super::catalog::Tier;
use super::compliance::ComplianceReport;
use super::formula::Formula;
use super::molecular::MolecularEstimator;
use super::profile::{SkinType, UserProfile};
use crate::config::ScoringConfig;

/// logP scale at which the base tier contributes meaningfully to longevity.
const LONGEVITY_LOGP_SCALE: f64 = 1.5;
/// Longevity lost per °C above the neutral skin temperature.
const WARM_SKIN_PENALTY_PER_C: f64 = 0.08;
const PROJECTION_SHARE_SCALE: f64 = 0.3;
const OILY_PROJECTION_FACTOR: f64 = 0.85;
const COMPLIANCE_REMOVAL_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaMetrics {
    pub longevity: f64,
    pub projection: f64,
    pub sustainability: f64,
    #[serde(rename = "ifraCompliance")]
    pub compliance: f64,
}

#[derive(Debug, Clone)]
pub struct MetricsScorer {
    estimator: MolecularEstimator,
    neutral_temperature_c: f64,
}

impl MetricsScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            estimator: MolecularEstimator::new(),
            neutral_temperature_c: config.neutral_temperature_c,
        }
    }

    pub fn score(
        &self,
        formula: &Formula,
        profile: &UserProfile,
        report: &ComplianceReport,
    ) -> FormulaMetrics {
        FormulaMetrics {
            longevity: self.longevity(formula, profile),
            projection: self.projection(formula, profile),
            sustainability: sustainability(formula),
            compliance: compliance(report),
        }
    }

    /// Base-tier share weighted by its mean logP, saturating; warm skin
    /// shortens wear.
    pub fn longevity(&self, formula: &Formula, profile: &UserProfile) -> f64 {
        let total = formula.total();
        let base_total = formula.tier_total(Tier::Base);
        if total <= 0.0 || base_total <= 0.0 {
            return 0.0;
        }
        let base_share = base_total / total;
        let base_logp = formula
            .tier(Tier::Base)
            .iter()
            .map(|c| self.estimator.lipophilicity(&c.ingredient) * c.concentration)
            .sum::<f64>()
            / base_total;

        let raw = 100.0 * (1.0 - (-base_share * base_logp.max(0.0) / LONGEVITY_LOGP_SCALE).exp());
        let excess = (profile.temperature - self.neutral_temperature_c).max(0.0);
        let penalty = (1.0 - WARM_SKIN_PENALTY_PER_C * excess).max(0.0);
        (raw * penalty).clamp(0.0, 100.0)
    }

    /// Volatile share of the top and heart tiers, saturating; oily skin holds
    /// volatiles back.
    pub fn projection(&self, formula: &Formula, profile: &UserProfile) -> f64 {
        let total = formula.total();
        if total <= 0.0 {
            return 0.0;
        }
        let volatile = formula
            .components()
            .filter(|c| c.tier != Tier::Base)
            .map(|c| self.estimator.volatility_weight(&c.ingredient) * c.concentration)
            .sum::<f64>()
            / total;

        let mut score = 100.0 * (1.0 - (-volatile / PROJECTION_SHARE_SCALE).exp());
        if profile.skin_type == SkinType::Oily {
            score *= OILY_PROJECTION_FACTOR;
        }
        score.clamp(0.0, 100.0)
    }
}

/// Percentage of the total coming from sustainably sourced ingredients.
pub fn sustainability(formula: &Formula) -> f64 {
    (formula.share_where(|c| c.ingredient.sustainable) * 100.0).clamp(0.0, 100.0)
}

/// 100 for an untouched pass; decays with the concentration compliance removed.
pub fn compliance(report: &ComplianceReport) -> f64 {
    if report.passed {
        return 100.0;
    }
    (100.0 * (-report.concentration_removed / COMPLIANCE_REMOVAL_SCALE).exp()).clamp(0.0, 100.0)
}
