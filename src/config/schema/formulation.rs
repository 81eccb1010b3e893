use serde::{Deserialize, Serialize};

use crate::core::compliance::FragranceCategory;

/// Canonical share of each tier in a freshly generated formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PyramidConfig {
    pub top: f64,
    pub heart: f64,
    pub base: f64,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            top: 0.20,
            heart: 0.35,
            base: 0.45,
        }
    }
}

impl PyramidConfig {
    pub fn total(&self) -> f64 {
        self.top + self.heart + self.base
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulationConfig {
    /// Catalog ingredients drawn per requested family
    #[serde(default = "default_representatives_per_family")]
    pub representatives_per_family: usize,
    #[serde(default)]
    pub pyramid: PyramidConfig,
    /// Concentration used when a stabilizer rule gives no amount
    #[serde(default = "default_stabilizer_starter_pct")]
    pub stabilizer_starter_pct: f64,
    /// Whole-request budget
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_name")]
    pub default_name: String,
}

fn default_representatives_per_family() -> usize {
    2
}
fn default_stabilizer_starter_pct() -> f64 {
    2.0
}
fn default_request_timeout_ms() -> u64 {
    5_000
}
fn default_name() -> String {
    "Aether Signature".into()
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            representatives_per_family: default_representatives_per_family(),
            pyramid: PyramidConfig::default(),
            stabilizer_starter_pct: default_stabilizer_starter_pct(),
            request_timeout_ms: default_request_timeout_ms(),
            default_name: default_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Product category whose allergen ceilings apply
    #[serde(default)]
    pub category: FragranceCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Skin temperature at which longevity takes no penalty (°C)
    #[serde(default = "default_neutral_temperature_c")]
    pub neutral_temperature_c: f64,
}

fn default_neutral_temperature_c() -> f64 {
    36.5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            neutral_temperature_c: default_neutral_temperature_c(),
        }
    }
}
