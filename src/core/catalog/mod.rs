pub mod types;

pub use types::{Ingredient, ScentFamily, Tier, VolatilityClass};

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::KnowledgeError;

/// Read-only ingredient reference table.
///
/// Insertion order is preserved: every "first representative" lookup walks the
/// catalog in the order the data source declared it, which keeps generation and
/// rule targeting deterministic.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    entries: Vec<Arc<Ingredient>>,
    by_name: HashMap<String, usize>,
}

impl IngredientCatalog {
    pub fn new(ingredients: Vec<Ingredient>) -> Result<Self, KnowledgeError> {
        let mut entries = Vec::with_capacity(ingredients.len());
        let mut by_name = HashMap::with_capacity(ingredients.len());

        for ingredient in ingredients {
            validate_ingredient(&ingredient)?;
            let key = ingredient.name.to_lowercase();
            if by_name.contains_key(&key) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate ingredient name: {}",
                    ingredient.name
                )));
            }
            by_name.insert(key, entries.len());
            entries.push(Arc::new(ingredient));
        }

        Ok(Self { entries, by_name })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Ingredient>> {
        self.entries.iter()
    }

    /// Case-insensitive lookup by ingredient name.
    pub fn get(&self, name: &str) -> Option<&Arc<Ingredient>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.entries[index])
    }

    pub fn by_family(&self, family: ScentFamily) -> impl Iterator<Item = &Arc<Ingredient>> {
        self.entries
            .iter()
            .filter(move |ingredient| ingredient.family == family)
    }
}

fn validate_ingredient(ingredient: &Ingredient) -> Result<(), KnowledgeError> {
    if ingredient.name.trim().is_empty() {
        return Err(KnowledgeError::Invalid("ingredient with empty name".into()));
    }
    if !ingredient.logp.is_finite() {
        return Err(KnowledgeError::Invalid(format!(
            "{}: logp must be finite",
            ingredient.name
        )));
    }
    if !ingredient.molecular_weight.is_finite() || ingredient.molecular_weight <= 0.0 {
        return Err(KnowledgeError::Invalid(format!(
            "{}: molecular weight must be positive",
            ingredient.name
        )));
    }
    Ok(())
}
