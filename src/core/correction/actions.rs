// Action application: one exhaustive match over the closed action set.

use std::sync::Arc;

use crate::core::catalog::{Ingredient, IngredientCatalog, ScentFamily};
use crate::core::formula::{Formula, FormulaComponent};
use crate::core::knowledge::{CorrectionAction, CorrectionRule, Selector};
use crate::core::molecular::MolecularEstimator;
use crate::core::profile::UserProfile;
use crate::error::RuleError;

/// Everything an action needs besides the formula it mutates.
pub struct ActionContext<'a> {
    pub catalog: &'a IngredientCatalog,
    pub profile: &'a UserProfile,
    pub estimator: &'a MolecularEstimator,
    pub stabilizer_starter_pct: f64,
}

impl ActionContext<'_> {
    fn usable(&self, ingredient: &Ingredient) -> bool {
        !self
            .profile
            .allergies
            .iter()
            .any(|allergen| ingredient.carries_allergen(allergen))
    }

    /// Catalog ingredient that stands in for a selector when the formula has
    /// nothing matching it.
    fn representative(&self, selector: &Selector) -> Option<Arc<Ingredient>> {
        let mut candidates = self.catalog.iter().filter(|ing| self.usable(ing));
        let picked = match selector {
            Selector::Ingredient { name } => {
                self.catalog.get(name).filter(|ing| self.usable(ing))
            }
            Selector::LipophilicityAbove { .. } => candidates
                .filter(|ing| selector.matches(ing, self.estimator))
                // First of equal maxima wins.
                .fold(None, |best: Option<&Arc<Ingredient>>, ing| match best {
                    Some(b) if b.logp >= ing.logp => Some(b),
                    _ => Some(ing),
                }),
            Selector::Family { .. } | Selector::Tier { .. } | Selector::Volatility { .. } => {
                candidates.find(|ing| selector.matches(ing, self.estimator))
            }
        };
        picked.map(Arc::clone)
    }

    fn substitute_for(
        &self,
        family: ScentFamily,
        component: &FormulaComponent,
    ) -> Option<Arc<Ingredient>> {
        let mut options = self
            .catalog
            .by_family(family)
            .filter(|ing| self.usable(ing))
            .peekable();
        let first = options.peek().map(|ing| Arc::clone(*ing));
        options
            .find(|ing| ing.tier == component.tier)
            .map(Arc::clone)
            .or(first)
    }
}

fn unknown_target(rule: &CorrectionRule, target: impl ToString) -> RuleError {
    RuleError::UnknownRuleTarget {
        rule_id: rule.id.clone(),
        target: target.to_string(),
    }
}

fn invalid(rule: &CorrectionRule, message: impl Into<String>) -> RuleError {
    RuleError::InvalidParameter {
        rule_id: rule.id.clone(),
        message: message.into(),
    }
}

/// Family and ingredient selectors must name something the catalog knows.
fn check_selector(
    rule: &CorrectionRule,
    selector: &Selector,
    catalog: &IngredientCatalog,
) -> Result<(), RuleError> {
    match selector {
        Selector::Family { family } if catalog.by_family(*family).next().is_none() => {
            Err(unknown_target(rule, selector))
        }
        Selector::Ingredient { name } if catalog.get(name).is_none() => {
            Err(unknown_target(rule, selector))
        }
        _ => Ok(()),
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Apply one rule's action. Parameters and targets are validated before the
/// formula is touched, so a rejected rule leaves it unchanged.
///
/// Does not renormalize; the caller does that once after the whole batch.
pub fn apply_action(
    formula: &mut Formula,
    rule: &CorrectionRule,
    ctx: &ActionContext<'_>,
) -> Result<(), RuleError> {
    match &rule.action {
        CorrectionAction::ScaleFamily { target, factor } => {
            if !positive(*factor) {
                return Err(invalid(rule, format!("scale factor {factor} must be positive")));
            }
            check_selector(rule, target, ctx.catalog)?;
            for component in formula.components_mut() {
                if target.matches(&component.ingredient, ctx.estimator) {
                    component.concentration *= factor;
                }
            }
        }
        CorrectionAction::AddStabilizer { ingredient, amount } => {
            let amount = amount.unwrap_or(ctx.stabilizer_starter_pct);
            if !positive(amount) {
                return Err(invalid(rule, format!("stabilizer amount {amount} must be positive")));
            }
            let stabilizer = ctx
                .catalog
                .get(ingredient)
                .filter(|ing| ctx.usable(ing))
                .ok_or_else(|| unknown_target(rule, format!("ingredient {ingredient}")))?;
            formula.add(FormulaComponent::new(Arc::clone(stabilizer), amount));
        }
        CorrectionAction::BoostFamily { target, percent } => {
            if !positive(*percent) {
                return Err(invalid(rule, format!("boost percent {percent} must be positive")));
            }
            check_selector(rule, target, ctx.catalog)?;
            let added = percent / 100.0 * formula.total();
            let matched: f64 = formula
                .components()
                .filter(|c| target.matches(&c.ingredient, ctx.estimator))
                .map(|c| c.concentration)
                .sum();

            if matched > 0.0 {
                for component in formula.components_mut() {
                    if target.matches(&component.ingredient, ctx.estimator) {
                        component.concentration += added * component.concentration / matched;
                    }
                }
            } else {
                let ingredient = ctx
                    .representative(target)
                    .ok_or_else(|| unknown_target(rule, target))?;
                formula.add(FormulaComponent::new(ingredient, added));
            }
        }
        CorrectionAction::SubstituteFamily { from, to } => {
            if from == to {
                return Err(invalid(rule, format!("cannot substitute {from} with itself")));
            }
            if ctx.catalog.by_family(*to).next().is_none() {
                return Err(unknown_target(rule, format!("family {to}")));
            }

            let mut replacements = Vec::new();
            for component in formula.components().filter(|c| c.ingredient.family == *from) {
                let ingredient = ctx
                    .substitute_for(*to, component)
                    .ok_or_else(|| unknown_target(rule, format!("family {to}")))?;
                replacements.push(FormulaComponent::in_tier(
                    ingredient,
                    component.concentration,
                    component.tier,
                ));
            }
            formula.retain(|c| c.ingredient.family != *from);
            for replacement in replacements {
                formula.add(replacement);
            }
        }
    }
    Ok(())
}
