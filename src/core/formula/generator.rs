use std::collections::BTreeMap;
use std::sync::Arc;

use super::affect::DEFAULT_DESCRIPTION;
use super::types::{Formula, FormulaComponent};
use crate::config::{FormulationConfig, PyramidConfig};
use crate::core::catalog::{Ingredient, IngredientCatalog, ScentFamily, Tier};
use crate::core::profile::UserProfile;
use crate::error::FormulationError;

/// Builds the uncorrected three-tier composition from requested families.
#[derive(Debug, Clone)]
pub struct BaseFormulaGenerator {
    representatives_per_family: usize,
    pyramid: PyramidConfig,
    name: String,
}

impl BaseFormulaGenerator {
    pub fn new(config: &FormulationConfig) -> Self {
        Self {
            representatives_per_family: config.representatives_per_family.max(1),
            pyramid: config.pyramid,
            name: config.default_name.clone(),
        }
    }

    /// Resolve each family to catalog ingredients (declaration order, user
    /// allergies excluded) and split the pyramid across them.
    ///
    /// Families with nothing to offer are skipped; if none resolve the request
    /// fails with `NoResolvableIngredients`.
    pub fn generate(
        &self,
        catalog: &IngredientCatalog,
        families: &[ScentFamily],
        profile: &UserProfile,
    ) -> Result<Formula, FormulationError> {
        let mut requested: Vec<ScentFamily> = Vec::with_capacity(families.len());
        for family in families {
            if !requested.contains(family) {
                requested.push(*family);
            }
        }

        let mut by_tier: BTreeMap<Tier, Vec<Arc<Ingredient>>> = BTreeMap::new();
        for family in &requested {
            let picked: Vec<&Arc<Ingredient>> = catalog
                .by_family(*family)
                .filter(|ingredient| {
                    !profile
                        .allergies
                        .iter()
                        .any(|allergen| ingredient.carries_allergen(allergen))
                })
                .take(self.representatives_per_family)
                .collect();

            if picked.is_empty() {
                tracing::debug!(family = %family, "family has no usable catalog ingredients");
                continue;
            }
            for ingredient in picked {
                by_tier
                    .entry(ingredient.tier)
                    .or_default()
                    .push(Arc::clone(ingredient));
            }
        }

        if by_tier.is_empty() {
            return Err(FormulationError::NoResolvableIngredients {
                requested: requested.iter().map(ToString::to_string).collect(),
            });
        }

        let shares = self.tier_shares(&by_tier);
        let mut formula = Formula::new(self.name.clone(), DEFAULT_DESCRIPTION);
        for (tier, ingredients) in by_tier {
            let share = shares.get(&tier).copied().unwrap_or(0.0);
            #[allow(clippy::cast_precision_loss)]
            let each = share / ingredients.len() as f64;
            for ingredient in ingredients {
                formula.add(FormulaComponent::in_tier(ingredient, each, tier));
            }
        }
        formula.renormalize();

        tracing::debug!(
            components = formula.len(),
            families = requested.len(),
            "base formula generated"
        );
        Ok(formula)
    }

    /// Percent of 100 each populated tier receives. Empty tiers hand their
    /// share to the others in proportion to the canonical pyramid.
    fn tier_shares<T>(&self, populated: &BTreeMap<Tier, T>) -> BTreeMap<Tier, f64> {
        let canonical = |tier: Tier| match tier {
            Tier::Top => self.pyramid.top,
            Tier::Heart => self.pyramid.heart,
            Tier::Base => self.pyramid.base,
        };
        let weight: f64 = populated.keys().map(|tier| canonical(*tier)).sum();

        populated
            .keys()
            .map(|tier| {
                let share = if weight > 0.0 {
                    canonical(*tier) / weight * 100.0
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let even = 100.0 / populated.len() as f64;
                    even
                };
                (*tier, share)
            })
            .collect()
    }
}
