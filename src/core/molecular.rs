// Molecular property estimation: lipophilicity and volatility proxies.

use super::catalog::{Ingredient, VolatilityClass};

/// Reference temperature of the vapour-pressure correlation, in kelvin.
const REFERENCE_TEMPERATURE_K: f64 = 298.15;

// log10(VP) = A - B * MW / 1000 - C * logP
const VP_INTERCEPT: f64 = 2.5;
const VP_MW_COEFF: f64 = 8.0;
const VP_LOGP_COEFF: f64 = 0.3;

/// Estimates the physical properties correction rules select on.
///
/// The lipophilicity proxy is the catalog `logp`. Volatility is the declared
/// class when the data carries one, otherwise it is bucketed from molecular
/// weight (< 150 high, < 250 medium, else low).
#[derive(Debug, Clone, Copy, Default)]
pub struct MolecularEstimator;

impl MolecularEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn lipophilicity(&self, ingredient: &Ingredient) -> f64 {
        ingredient.logp
    }

    /// Fixatives are ingredients whose lipophilicity proxy exceeds `threshold`.
    pub fn is_fixative(&self, ingredient: &Ingredient, threshold: f64) -> bool {
        self.lipophilicity(ingredient) > threshold
    }

    pub fn volatility_class(&self, ingredient: &Ingredient) -> VolatilityClass {
        ingredient
            .volatility
            .unwrap_or_else(|| classify_by_weight(ingredient.molecular_weight))
    }

    /// Empirical vapour-pressure estimate (mmHg) at `temperature_c`.
    ///
    /// Uses a molecular-weight / logP correlation with a quadratic temperature
    /// correction; good enough to rank ingredients, not to predict absolutes.
    pub fn vapor_pressure(&self, ingredient: &Ingredient, temperature_c: f64) -> f64 {
        let log_vp = VP_INTERCEPT
            - VP_MW_COEFF * (ingredient.molecular_weight / 1000.0)
            - VP_LOGP_COEFF * ingredient.logp;
        let temp_k = temperature_c + 273.15;
        let temp_factor = (temp_k / REFERENCE_TEMPERATURE_K).powi(2);
        10_f64.powf(log_vp) * temp_factor
    }

    /// Weight of an ingredient's contribution to the opening trail.
    pub fn volatility_weight(&self, ingredient: &Ingredient) -> f64 {
        match self.volatility_class(ingredient) {
            VolatilityClass::High => 1.0,
            VolatilityClass::Medium => 0.5,
            VolatilityClass::Low => 0.0,
        }
    }
}

fn classify_by_weight(molecular_weight: f64) -> VolatilityClass {
    if molecular_weight < 150.0 {
        VolatilityClass::High
    } else if molecular_weight < 250.0 {
        VolatilityClass::Medium
    } else {
        VolatilityClass::Low
    }
}
