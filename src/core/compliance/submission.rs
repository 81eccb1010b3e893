use serde::Deserialize;
use std::sync::Arc;

use crate::core::catalog::IngredientCatalog;
use crate::core::formula::{Formula, FormulaComponent};
use crate::error::FormulationError;

const DEFAULT_SUBMISSION_NAME: &str = "Submitted formula";

/// One line of an externally supplied formula.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmittedIngredient {
    pub name: String,
    pub concentration: f64,
}

/// Ingredient list checked against the compliance limits as-is, without the
/// correction pipeline.
///
/// ```json
/// {"name": "Verbena", "ingredients": [{"name": "Lemon Oil", "concentration": 4.0}]}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormulaSubmission {
    #[serde(default)]
    pub name: Option<String>,
    pub ingredients: Vec<SubmittedIngredient>,
}

impl FormulaSubmission {
    /// Resolve every line against the catalog. Repeated names are summed;
    /// each ingredient sits in its catalog tier.
    pub fn to_formula(&self, catalog: &IngredientCatalog) -> Result<Formula, FormulationError> {
        if self.ingredients.is_empty() {
            return Err(FormulationError::InvalidFormula("no ingredients".into()));
        }

        let name = self.name.as_deref().unwrap_or(DEFAULT_SUBMISSION_NAME);
        let mut formula = Formula::new(name, "");
        for line in &self.ingredients {
            if !line.concentration.is_finite() || line.concentration <= 0.0 {
                return Err(FormulationError::InvalidFormula(format!(
                    "{}: concentration {} must be positive",
                    line.name, line.concentration
                )));
            }
            let ingredient = catalog.get(&line.name).ok_or_else(|| {
                FormulationError::InvalidFormula(format!("unknown ingredient: {}", line.name))
            })?;
            formula.add(FormulaComponent::new(Arc::clone(ingredient), line.concentration));
        }
        Ok(formula)
    }
}
