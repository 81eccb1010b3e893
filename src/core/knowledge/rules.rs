use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::catalog::{Ingredient, ScentFamily, Tier, VolatilityClass};
use crate::core::molecular::MolecularEstimator;
use crate::core::profile::{SkinType, UserProfile};

// Condition: predicate over the physiological profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    PhBelow { threshold: f64 },
    PhAbove { threshold: f64 },
    SkinType { skin_type: SkinType },
    TemperatureAbove { threshold: f64 },
    TemperatureBelow { threshold: f64 },
    All { conditions: Vec<Condition> },
}

impl Condition {
    pub fn evaluate(&self, profile: &UserProfile) -> bool {
        match self {
            Self::PhBelow { threshold } => profile.ph < *threshold,
            Self::PhAbove { threshold } => profile.ph > *threshold,
            Self::SkinType { skin_type } => profile.skin_type == *skin_type,
            Self::TemperatureAbove { threshold } => profile.temperature > *threshold,
            Self::TemperatureBelow { threshold } => profile.temperature < *threshold,
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(profile)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhBelow { threshold } => write!(f, "skin pH below {threshold}"),
            Self::PhAbove { threshold } => write!(f, "skin pH above {threshold}"),
            Self::SkinType { skin_type } => write!(f, "skin type {skin_type}"),
            Self::TemperatureAbove { threshold } => write!(f, "temperature above {threshold}"),
            Self::TemperatureBelow { threshold } => write!(f, "temperature below {threshold}"),
            Self::All { conditions } => {
                let parts: Vec<String> = conditions.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" and "))
            }
        }
    }
}

// Selector: which formula components an action targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Selector {
    Family { family: ScentFamily },
    Ingredient { name: String },
    Tier { tier: Tier },
    LipophilicityAbove { threshold: f64 },
    Volatility { class: VolatilityClass },
}

impl Selector {
    pub fn matches(&self, ingredient: &Ingredient, estimator: &MolecularEstimator) -> bool {
        match self {
            Self::Family { family } => ingredient.family == *family,
            Self::Ingredient { name } => ingredient.name.eq_ignore_ascii_case(name),
            Self::Tier { tier } => ingredient.tier == *tier,
            Self::LipophilicityAbove { threshold } => {
                estimator.is_fixative(ingredient, *threshold)
            }
            Self::Volatility { class } => estimator.volatility_class(ingredient) == *class,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family { family } => write!(f, "family {family}"),
            Self::Ingredient { name } => write!(f, "ingredient {name}"),
            Self::Tier { tier } => write!(f, "{tier} notes"),
            Self::LipophilicityAbove { threshold } => write!(f, "logP > {threshold}"),
            Self::Volatility { class } => write!(f, "{class}-volatility ingredients"),
        }
    }
}

// CorrectionAction: closed set of formula mutations, each with typed params
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CorrectionAction {
    ScaleFamily {
        target: Selector,
        factor: f64,
    },
    AddStabilizer {
        ingredient: String,
        #[serde(default)]
        amount: Option<f64>,
    },
    BoostFamily {
        target: Selector,
        percent: f64,
    },
    SubstituteFamily {
        from: ScentFamily,
        to: ScentFamily,
    },
}

impl fmt::Display for CorrectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScaleFamily { target, factor } => write!(f, "scale {target} by {factor}"),
            Self::AddStabilizer { ingredient, .. } => write!(f, "add stabilizer {ingredient}"),
            Self::BoostFamily { target, percent } => write!(f, "boost {target} by {percent}%"),
            Self::SubstituteFamily { from, to } => write!(f, "substitute {from} with {to}"),
        }
    }
}

/// A physiological correction rule from the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
    pub condition: Condition,
    #[serde(flatten)]
    pub action: CorrectionAction,
    #[serde(default)]
    pub rationale: String,
}

impl CorrectionRule {
    /// Searchable document the similarity index embeds for this rule.
    pub fn document(&self) -> String {
        format!(
            "{}. Action: {}. {}",
            self.condition, self.action, self.rationale
        )
    }
}

/// A rule paired with the relevance it was retrieved at.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRule {
    pub rule: CorrectionRule,
    pub relevance: f64,
}
