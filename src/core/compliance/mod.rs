pub mod limits;
pub mod submission;

pub use limits::{ComplianceLimit, FragranceCategory};
pub use submission::{FormulaSubmission, SubmittedIngredient};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::formula::Formula;
use crate::error::FormulationError;

/// Aggregates within this distance above a limit count as compliant.
pub const LIMIT_TOLERANCE: f64 = 1e-9;
/// Components at or below this concentration are dropped.
pub const REMOVAL_THRESHOLD: f64 = 1e-9;
/// A single component above this share is flagged in the report.
pub const HIGH_CONCENTRATION_PCT: f64 = 20.0;
const MAX_PASSES: usize = 32;

/// Before/after view of one limited allergen present in the formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllergenAudit {
    pub allergen: String,
    pub limit: f64,
    pub before: f64,
    pub after: f64,
    pub adjusted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub category: FragranceCategory,
    /// True when the formula was compliant as submitted.
    pub passed: bool,
    pub allergens: Vec<AllergenAudit>,
    pub removed_components: Vec<String>,
    /// Percentage points taken out of allergen contributors, summed over every
    /// adjustment and measured before renormalization.
    pub concentration_removed: f64,
    /// Non-blocking notes on the formula as submitted.
    pub warnings: Vec<String>,
}

impl ComplianceReport {
    pub fn adjusted(&self) -> impl Iterator<Item = &AllergenAudit> {
        self.allergens.iter().filter(|audit| audit.adjusted)
    }
}

fn aggregate(formula: &Formula, allergen: &str) -> f64 {
    formula
        .components()
        .filter(|c| c.ingredient.carries_allergen(allergen))
        .map(|c| c.concentration)
        .sum()
}

/// Enforces per-allergen ceilings for one product category.
///
/// An allergen over its limit `L` with aggregate `A` in a formula totalling
/// `T` has every contributor scaled by the same ratio, to
/// `A' = L·(T − A) / (100 − L)`, which lands exactly on `L` once the formula
/// is renormalized. Larger contributors therefore give up more absolute
/// concentration. Allergens are visited in name order and the sweep repeats
/// until nothing changes, since one reduction raises every other share.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    category: FragranceCategory,
    limits: BTreeMap<String, f64>,
}

impl ComplianceValidator {
    pub fn new(category: FragranceCategory, limits: BTreeMap<String, f64>) -> Self {
        Self { category, limits }
    }

    pub fn category(&self) -> FragranceCategory {
        self.category
    }

    pub fn validate(
        &self,
        mut formula: Formula,
    ) -> Result<(Formula, ComplianceReport), FormulationError> {
        formula.renormalize();
        if formula.is_empty() {
            return Err(FormulationError::ComplianceUnsatisfiable {
                allergen: "(empty formula)".into(),
                aggregate: 0.0,
                limit: 0.0,
            });
        }

        let warnings: Vec<String> = formula
            .components()
            .filter(|c| c.concentration > HIGH_CONCENTRATION_PCT)
            .map(|c| format!("high concentration of {} ({:.2}%)", c.name(), c.concentration))
            .collect();

        let before: BTreeMap<&str, f64> = self
            .limits
            .keys()
            .map(|allergen| (allergen.as_str(), aggregate(&formula, allergen)))
            .collect();

        let mut adjusted: BTreeSet<&str> = BTreeSet::new();
        let mut removed_components = Vec::new();
        let mut concentration_removed = 0.0;
        let mut settled = false;

        for pass in 0..MAX_PASSES {
            let mut changed = false;
            for (allergen, &limit) in &self.limits {
                let current = aggregate(&formula, allergen);
                if current <= limit + LIMIT_TOLERANCE {
                    continue;
                }

                let total = formula.total();
                let rest = total - current;
                let target = if limit <= 0.0 {
                    0.0
                } else if rest <= REMOVAL_THRESHOLD {
                    // Every component carries it; scaling cannot move the share.
                    return Err(FormulationError::ComplianceUnsatisfiable {
                        allergen: allergen.clone(),
                        aggregate: current,
                        limit,
                    });
                } else {
                    limit * rest / (100.0 - limit)
                };
                let ratio = target / current;

                for component in formula.components_mut() {
                    if component.ingredient.carries_allergen(allergen) {
                        component.concentration *= ratio;
                    }
                }
                concentration_removed += current - target;
                adjusted.insert(allergen.as_str());
                changed = true;

                for dropped in formula.retain(|c| c.concentration > REMOVAL_THRESHOLD) {
                    tracing::info!(
                        component = %dropped.name(),
                        allergen = %allergen,
                        "component removed for compliance"
                    );
                    removed_components.push(dropped.ingredient.name.clone());
                }
                if formula.is_empty() {
                    return Err(FormulationError::ComplianceUnsatisfiable {
                        allergen: allergen.clone(),
                        aggregate: current,
                        limit,
                    });
                }
                formula.renormalize();
                tracing::debug!(
                    allergen = %allergen,
                    before = current,
                    after = aggregate(&formula, allergen),
                    limit,
                    pass,
                    "allergen reduced"
                );
            }
            if !changed {
                settled = true;
                break;
            }
        }

        if !settled
            && let Some((allergen, &limit)) = self
                .limits
                .iter()
                .find(|(allergen, limit)| aggregate(&formula, allergen) > **limit + LIMIT_TOLERANCE)
        {
            return Err(FormulationError::ComplianceUnsatisfiable {
                allergen: allergen.clone(),
                aggregate: aggregate(&formula, allergen),
                limit,
            });
        }

        let allergens = self
            .limits
            .iter()
            .filter(|(allergen, _)| {
                before.get(allergen.as_str()).copied().unwrap_or(0.0) > 0.0
                    || adjusted.contains(allergen.as_str())
            })
            .map(|(allergen, &limit)| AllergenAudit {
                allergen: allergen.clone(),
                limit,
                before: before.get(allergen.as_str()).copied().unwrap_or(0.0),
                after: aggregate(&formula, allergen),
                adjusted: adjusted.contains(allergen.as_str()),
            })
            .collect();

        let report = ComplianceReport {
            category: self.category,
            passed: adjusted.is_empty(),
            allergens,
            removed_components,
            concentration_removed,
            warnings,
        };
        Ok((formula, report))
    }
}
