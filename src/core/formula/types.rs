use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::catalog::{Ingredient, Tier};

/// Totals within this distance of 100 count as normalized.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// One ingredient at a concentration, placed in a tier.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaComponent {
    pub ingredient: Arc<Ingredient>,
    pub concentration: f64,
    pub tier: Tier,
}

impl FormulaComponent {
    pub fn new(ingredient: Arc<Ingredient>, concentration: f64) -> Self {
        let tier = ingredient.tier;
        Self {
            ingredient,
            concentration,
            tier,
        }
    }

    pub fn in_tier(ingredient: Arc<Ingredient>, concentration: f64, tier: Tier) -> Self {
        Self {
            ingredient,
            concentration,
            tier,
        }
    }

    pub fn name(&self) -> &str {
        &self.ingredient.name
    }
}

/// Percentage of the total held by each tier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NotePyramid {
    pub top: f64,
    pub heart: f64,
    pub base: f64,
}

/// A three-tier composition. Components keep their insertion order per tier.
#[derive(Debug, Clone)]
pub struct Formula {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    top: Vec<FormulaComponent>,
    heart: Vec<FormulaComponent>,
    base: Vec<FormulaComponent>,
}

impl Formula {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            top: Vec::new(),
            heart: Vec::new(),
            base: Vec::new(),
        }
    }

    pub fn tier(&self, tier: Tier) -> &[FormulaComponent] {
        match tier {
            Tier::Top => &self.top,
            Tier::Heart => &self.heart,
            Tier::Base => &self.base,
        }
    }

    fn tier_vec_mut(&mut self, tier: Tier) -> &mut Vec<FormulaComponent> {
        match tier {
            Tier::Top => &mut self.top,
            Tier::Heart => &mut self.heart,
            Tier::Base => &mut self.base,
        }
    }

    /// Top, then heart, then base.
    pub fn components(&self) -> impl Iterator<Item = &FormulaComponent> {
        self.top.iter().chain(self.heart.iter()).chain(self.base.iter())
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut FormulaComponent> {
        self.top
            .iter_mut()
            .chain(self.heart.iter_mut())
            .chain(self.base.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.top.len() + self.heart.len() + self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total(&self) -> f64 {
        self.components().map(|c| c.concentration).sum()
    }

    pub fn tier_total(&self, tier: Tier) -> f64 {
        self.tier(tier).iter().map(|c| c.concentration).sum()
    }

    pub fn get(&self, name: &str) -> Option<&FormulaComponent> {
        self.components()
            .find(|c| c.ingredient.name.eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FormulaComponent> {
        self.components_mut()
            .find(|c| c.ingredient.name.eq_ignore_ascii_case(name))
    }

    /// Add a component to its tier, merging into an existing entry for the
    /// same ingredient in that tier. Entries in other tiers are left alone.
    pub fn add(&mut self, component: FormulaComponent) {
        let tier = self.tier_vec_mut(component.tier);
        if let Some(existing) = tier
            .iter_mut()
            .find(|c| c.ingredient.name.eq_ignore_ascii_case(&component.ingredient.name))
        {
            existing.concentration += component.concentration;
            return;
        }
        tier.push(component);
    }

    /// Remove every component failing `keep`; returns what was removed.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<FormulaComponent>
    where
        F: FnMut(&FormulaComponent) -> bool,
    {
        let mut removed = Vec::new();
        for tier in Tier::ALL {
            let components = std::mem::take(self.tier_vec_mut(tier));
            let (kept, dropped): (Vec<_>, Vec<_>) = components.into_iter().partition(|c| keep(c));
            *self.tier_vec_mut(tier) = kept;
            removed.extend(dropped);
        }
        removed
    }

    /// Fraction (0–1) of the total held by components matching `predicate`.
    pub fn share_where<F>(&self, predicate: F) -> f64
    where
        F: Fn(&FormulaComponent) -> bool,
    {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.components()
            .filter(|c| predicate(c))
            .map(|c| c.concentration)
            .sum::<f64>()
            / total
    }

    /// Scale every concentration so the grand total is exactly 100.
    ///
    /// A total already within tolerance of 100 is left untouched, so repeated
    /// calls never drift. Empty or zero-total formulas are left as they are.
    pub fn renormalize(&mut self) {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return;
        }
        if (total - 100.0).abs() <= NORMALIZATION_TOLERANCE {
            return;
        }
        let factor = 100.0 / total;
        for component in self.components_mut() {
            component.concentration *= factor;
        }
    }

    pub fn note_pyramid(&self) -> NotePyramid {
        let total = self.total();
        if total <= 0.0 {
            return NotePyramid::default();
        }
        NotePyramid {
            top: self.tier_total(Tier::Top) / total * 100.0,
            heart: self.tier_total(Tier::Heart) / total * 100.0,
            base: self.tier_total(Tier::Base) / total * 100.0,
        }
    }
}
