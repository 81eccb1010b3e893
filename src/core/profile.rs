use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};

use crate::error::FormulationError;

// SkinType: sebum level reported by the calibration flow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkinType {
    Dry,
    #[default]
    Normal,
    Oily,
}

/// Physiological and affective inputs for one formulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub ph: f64,
    #[serde(default)]
    pub skin_type: SkinType,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub arousal: Option<f64>,
    /// Allergen identifiers the wearer reacts to; ingredients carrying any of
    /// them are never selected for the base formula.
    #[serde(default)]
    pub allergies: BTreeSet<String>,
}

fn default_temperature() -> f64 {
    36.5
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            ph: 5.5,
            skin_type: SkinType::Normal,
            temperature: default_temperature(),
            valence: None,
            arousal: None,
            allergies: BTreeSet::new(),
        }
    }
}

impl UserProfile {
    pub fn new(ph: f64, skin_type: SkinType, temperature: f64) -> Self {
        Self {
            ph,
            skin_type,
            temperature,
            ..Self::default()
        }
    }

    pub fn with_affect(mut self, valence: f64, arousal: f64) -> Self {
        self.valence = Some(valence);
        self.arousal = Some(arousal);
        self
    }

    pub fn with_allergy(mut self, allergen: impl Into<String>) -> Self {
        self.allergies.insert(allergen.into().to_lowercase());
        self
    }

    /// Range checks for values coming from the outside world.
    pub fn validate(&self) -> Result<(), FormulationError> {
        if !self.ph.is_finite() || !(0.0..=14.0).contains(&self.ph) {
            return Err(FormulationError::InvalidProfile(format!(
                "pH {} outside 0-14",
                self.ph
            )));
        }
        if !self.temperature.is_finite() || !(30.0..=45.0).contains(&self.temperature) {
            return Err(FormulationError::InvalidProfile(format!(
                "temperature {}°C outside 30-45",
                self.temperature
            )));
        }
        for (label, value) in [("valence", self.valence), ("arousal", self.arousal)] {
            if let Some(v) = value
                && (!v.is_finite() || !(-1.0..=1.0).contains(&v))
            {
                return Err(FormulationError::InvalidProfile(format!(
                    "{label} {v} outside [-1, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Text form used to query the similarity index.
    pub fn query_text(&self) -> String {
        format!(
            "skin pH {:.1}, type {}, temperature {:.1}",
            self.ph, self.skin_type, self.temperature
        )
    }

    pub fn affect(&self) -> Option<(f64, f64)> {
        self.valence.zip(self.arousal)
    }
}
