use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// FragranceCategory: product class a limit applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FragranceCategory {
    #[default]
    FineFragrance,
    LeaveOn,
    RinseOff,
}

/// Ceiling on the aggregate concentration of one allergen, as a percentage of
/// the finished concentrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceLimit {
    pub allergen: String,
    #[serde(default)]
    pub category: FragranceCategory,
    pub max_concentration: f64,
}
