// Built-in knowledge: used when no data files are configured.

use std::collections::BTreeSet;

use super::rules::{Condition, CorrectionAction, CorrectionRule, Selector};
use crate::core::catalog::{Ingredient, ScentFamily, Tier, VolatilityClass};
use crate::core::compliance::{ComplianceLimit, FragranceCategory};
use crate::core::profile::SkinType;

/// Stabilizer inserted for acidic skin.
pub const ACETAL_STABILIZER: &str = "Citral Diethyl Acetal";

#[allow(clippy::too_many_arguments)]
fn entry(
    name: &str,
    family: ScentFamily,
    tier: Tier,
    logp: f64,
    molecular_weight: f64,
    volatility: VolatilityClass,
    allergens: &[&str],
    sustainable: bool,
) -> Ingredient {
    Ingredient {
        name: name.into(),
        family,
        tier,
        logp,
        molecular_weight,
        volatility: Some(volatility),
        allergens: allergens.iter().map(|a| (*a).to_string()).collect::<BTreeSet<_>>(),
        sustainable,
    }
}

pub fn builtin_ingredients() -> Vec<Ingredient> {
    use ScentFamily as F;
    use Tier::{Base, Heart, Top};
    use VolatilityClass::{High, Low, Medium};

    vec![
        // Top
        entry("Bergamot Oil", F::Citrus, Top, 2.8, 136.2, High, &["limonene", "linalool"], true),
        entry("Lemon Oil", F::Citrus, Top, 2.9, 136.2, High, &["limonene", "citral"], true),
        entry("Grapefruit Oil", F::Citrus, Top, 2.7, 136.2, High, &["limonene"], true),
        entry("Aldehyde C-11 (Undecylenal)", F::Aldehyde, Top, 4.2, 168.3, High, &[], false),
        entry("Aldehyde C-10 (Decanal)", F::Aldehyde, Top, 3.8, 156.3, High, &[], false),
        entry("Blackcurrant Bud", F::Fruity, Top, 2.4, 150.0, High, &[], true),
        entry("Lavender Oil", F::Aromatic, Top, 2.9, 154.2, High, &["linalool"], true),
        entry("Cis-3-Hexenol", F::Green, Top, 1.6, 100.2, High, &[], true),
        entry("Galbanum Oil", F::Green, Top, 2.5, 136.2, High, &[], true),
        entry("Calone", F::Aquatic, Top, 1.3, 178.2, Medium, &[], false),
        entry("Pink Pepper Oil", F::Spicy, Top, 2.6, 136.2, High, &["limonene"], true),
        // Heart
        entry("Rose Absolute", F::Floral, Heart, 2.4, 154.2, Medium, &["geraniol", "citronellol"], true),
        entry("Jasmine Absolute", F::Floral, Heart, 2.6, 150.2, Medium, &["benzyl_benzoate", "linalool"], true),
        entry("Linalool (Bio-based)", F::Floral, Heart, 2.97, 154.2, Medium, &["linalool"], true),
        entry("Hedione", F::Floral, Heart, 2.9, 226.3, Medium, &[], false),
        entry("Orris Butter", F::Powdery, Heart, 2.8, 206.3, Low, &[], true),
        entry("Clove Bud Oil", F::Spicy, Heart, 2.3, 164.2, Medium, &["eugenol"], true),
        entry("Clary Sage Oil", F::Herbal, Heart, 2.7, 154.2, Medium, &["linalool"], true),
        entry("Rosemary Oil", F::Herbal, Heart, 2.5, 154.2, Medium, &["limonene"], true),
        entry(ACETAL_STABILIZER, F::Acetal, Heart, 2.9, 226.4, Medium, &[], false),
        // Base
        entry("Sandalwood (Santalol)", F::Woody, Base, 3.9, 220.4, Low, &[], true),
        entry("Cedarwood Atlas", F::Woody, Base, 4.1, 222.4, Low, &[], true),
        entry("Iso E Super (Bio Musk)", F::Woody, Base, 4.2, 234.4, Low, &[], true),
        entry("Vetiver Oil", F::Earthy, Base, 3.8, 218.3, Low, &[], true),
        entry("Patchouli Oil", F::Earthy, Base, 3.9, 222.4, Low, &[], true),
        entry("Oakmoss Absolute", F::Earthy, Base, 3.2, 300.0, Low, &["atranol"], true),
        entry("Ambroxan", F::Ambery, Base, 4.5, 236.4, Low, &[], false),
        entry("Labdanum Resinoid", F::Ambery, Base, 3.3, 300.0, Low, &[], true),
        entry("Benzoin Resinoid", F::Resinous, Base, 3.1, 212.2, Low, &["benzyl_benzoate"], true),
        entry("Olibanum (Frankincense)", F::Resinous, Base, 3.4, 250.0, Low, &["limonene"], true),
        entry("Galaxolide (Musk)", F::Musky, Base, 5.3, 258.4, Low, &[], false),
        entry("Habanolide", F::Musky, Base, 4.9, 238.4, Low, &[], false),
        entry("Birch Tar", F::Leather, Base, 3.5, 250.0, Low, &[], true),
        entry("Vanillin (Lignin-derived)", F::Gourmand, Base, 1.37, 152.1, Low, &[], true),
        entry("Tonka Absolute", F::Gourmand, Base, 1.4, 146.1, Low, &["coumarin"], true),
    ]
}

fn rule(
    id: &str,
    priority: i32,
    condition: Condition,
    action: CorrectionAction,
    rationale: &str,
) -> CorrectionRule {
    CorrectionRule {
        id: id.into(),
        priority,
        condition,
        action,
        rationale: rationale.into(),
    }
}

pub fn builtin_rules() -> Vec<CorrectionRule> {
    vec![
        rule(
            "acidic-aldehyde-reduction",
            10,
            Condition::PhBelow { threshold: 4.5 },
            CorrectionAction::ScaleFamily {
                target: Selector::Family {
                    family: ScentFamily::Aldehyde,
                },
                factor: 0.85,
            },
            "Acidic skin (pH < 4.5) catalyses aldehyde degradation; aldehydes reduced by 15%",
        ),
        rule(
            "acidic-acetal-stabilizer",
            9,
            Condition::PhBelow { threshold: 4.5 },
            CorrectionAction::AddStabilizer {
                ingredient: ACETAL_STABILIZER.into(),
                amount: None,
            },
            "Acetal derivative added to carry the aldehydic facet on acidic skin",
        ),
        rule(
            "alkaline-floral-boost",
            8,
            Condition::PhAbove { threshold: 6.0 },
            CorrectionAction::ScaleFamily {
                target: Selector::Family {
                    family: ScentFamily::Floral,
                },
                factor: 1.2,
            },
            "Alkaline skin (pH > 6.0) flattens florals; floral core increased by 20%",
        ),
        rule(
            "dry-fixative-boost",
            8,
            Condition::SkinType {
                skin_type: SkinType::Dry,
            },
            CorrectionAction::ScaleFamily {
                target: Selector::LipophilicityAbove { threshold: 3.0 },
                factor: 1.75,
            },
            "Dry skin retains little oil; high-LogP fixatives boosted for longevity",
        ),
        rule(
            "oily-citrus-oxidation",
            7,
            Condition::SkinType {
                skin_type: SkinType::Oily,
            },
            CorrectionAction::ScaleFamily {
                target: Selector::Family {
                    family: ScentFamily::Citrus,
                },
                factor: 0.9,
            },
            "Squalene on oily skin oxidises citrus terpenes; citrus reduced by 10%",
        ),
        rule(
            "oily-top-projection",
            5,
            Condition::SkinType {
                skin_type: SkinType::Oily,
            },
            CorrectionAction::BoostFamily {
                target: Selector::Tier { tier: Tier::Top },
                percent: 5.0,
            },
            "Oily skin traps volatiles; top notes lifted for projection",
        ),
        rule(
            "warm-top-reduction",
            6,
            Condition::TemperatureAbove { threshold: 37.2 },
            CorrectionAction::ScaleFamily {
                target: Selector::Tier { tier: Tier::Top },
                factor: 0.85,
            },
            "Warm skin burns off the opening early; top note ratio reduced",
        ),
        rule(
            "warm-base-fixation",
            5,
            Condition::TemperatureAbove { threshold: 37.2 },
            CorrectionAction::BoostFamily {
                target: Selector::Tier { tier: Tier::Base },
                percent: 5.0,
            },
            "Warm skin needs a heavier fixative base",
        ),
        rule(
            "cool-volatile-lift",
            5,
            Condition::TemperatureBelow { threshold: 36.0 },
            CorrectionAction::BoostFamily {
                target: Selector::Volatility {
                    class: VolatilityClass::High,
                },
                percent: 5.0,
            },
            "Cool skin diffuses slowly; high-volatility materials lifted",
        ),
    ]
}

pub fn builtin_limits() -> Vec<ComplianceLimit> {
    let fine = [
        ("linalool", 8.0),
        ("limonene", 10.0),
        ("citral", 3.0),
        ("geraniol", 4.0),
        ("citronellol", 6.0),
        ("eugenol", 2.0),
        ("benzyl_benzoate", 10.0),
        ("coumarin", 5.0),
        ("atranol", 0.1),
    ];

    let mut limits = Vec::with_capacity(fine.len() * 3);
    for (allergen, max) in fine {
        limits.push(ComplianceLimit {
            allergen: allergen.into(),
            category: FragranceCategory::FineFragrance,
            max_concentration: max,
        });
        limits.push(ComplianceLimit {
            allergen: allergen.into(),
            category: FragranceCategory::LeaveOn,
            max_concentration: max / 2.0,
        });
        limits.push(ComplianceLimit {
            allergen: allergen.into(),
            category: FragranceCategory::RinseOff,
            max_concentration: (max * 2.0).min(100.0),
        });
    }
    limits
}
