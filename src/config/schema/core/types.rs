use super::super::{
    ComplianceConfig, FormulationConfig, KnowledgeConfig, ObservabilityConfig, RetrievalConfig,
    ScoringConfig,
};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub formulation: FormulationConfig,

    #[serde(default)]
    pub compliance: ComplianceConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let aether_dir = home.join(".aether");

        Self {
            config_path: aether_dir.join("config.toml"),
            knowledge: KnowledgeConfig::default(),
            retrieval: RetrievalConfig::default(),
            formulation: FormulationConfig::default(),
            compliance: ComplianceConfig::default(),
            scoring: ScoringConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pyramid = &self.formulation.pyramid;
        for (tier, share) in [
            ("top", pyramid.top),
            ("heart", pyramid.heart),
            ("base", pyramid.base),
        ] {
            if !share.is_finite() || share < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "formulation.pyramid.{tier} must be a non-negative number"
                )));
            }
        }
        if (pyramid.total() - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Validation(format!(
                "formulation.pyramid shares must sum to 1.0 (got {:.4})",
                pyramid.total()
            )));
        }
        if self.formulation.representatives_per_family == 0 {
            return Err(ConfigError::Validation(
                "formulation.representatives_per_family must be at least 1".into(),
            ));
        }
        let starter = self.formulation.stabilizer_starter_pct;
        if !starter.is_finite() || starter <= 0.0 || starter >= 100.0 {
            return Err(ConfigError::Validation(
                "formulation.stabilizer_starter_pct must be within (0, 100)".into(),
            ));
        }
        if self.formulation.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "formulation.request_timeout_ms must be positive".into(),
            ));
        }

        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 {
            return Err(ConfigError::Validation(
                "retrieval.top_k must be at least 1".into(),
            ));
        }
        if retrieval.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "retrieval.timeout_ms must be positive".into(),
            ));
        }
        for (name, weight) in [
            ("vector_weight", retrieval.vector_weight),
            ("keyword_weight", retrieval.keyword_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::Validation(format!(
                    "retrieval.{name} must be within 0.0-1.0"
                )));
            }
        }
        // An exact condition match must outrank any similarity-only hit.
        if retrieval.keyword_weight <= retrieval.vector_weight {
            return Err(ConfigError::Validation(
                "retrieval.keyword_weight must exceed retrieval.vector_weight".into(),
            ));
        }

        let neutral = self.scoring.neutral_temperature_c;
        if !neutral.is_finite() {
            return Err(ConfigError::Validation(
                "scoring.neutral_temperature_c must be a number".into(),
            ));
        }
        Ok(())
    }
}
