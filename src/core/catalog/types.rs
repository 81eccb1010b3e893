use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString};

// ScentFamily: olfactive family tag shared by the catalog, rules and mapper
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScentFamily {
    Citrus,
    Fresh,
    Fruity,
    Aromatic,
    Green,
    Aquatic,
    Ozonic,
    Aldehyde,
    Acetal,
    Spicy,
    Herbal,
    Floral,
    Powdery,
    Woody,
    Musky,
    Earthy,
    Resinous,
    Ambery,
    Leather,
    Gourmand,
}

// Tier: position in the note pyramid
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Tier {
    Top,
    #[serde(alias = "middle")]
    #[strum(to_string = "heart", serialize = "middle")]
    Heart,
    Base,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Top, Tier::Heart, Tier::Base];
}

// VolatilityClass: coarse evaporation speed bucket
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VolatilityClass {
    High,
    Medium,
    Low,
}

/// Immutable catalog entry.
///
/// `logp` is the lipophilicity proxy (octanol/water partition estimate); higher
/// values persist longer on skin and act as fixatives. `volatility` is optional
/// in source data; the molecular estimator derives it from molecular weight
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub family: ScentFamily,
    pub tier: Tier,
    pub logp: f64,
    pub molecular_weight: f64,
    #[serde(default)]
    pub volatility: Option<VolatilityClass>,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub sustainable: bool,
}

impl Ingredient {
    pub fn carries_allergen(&self, allergen: &str) -> bool {
        self.allergens.contains(allergen)
    }
}
