// Affect mapping: (valence, arousal) to scent families and a description.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use strum::Display;

use crate::core::catalog::ScentFamily;

/// |valence| below this reads as neutral.
pub const VALENCE_THRESHOLD: f64 = 0.15;
/// Arousal above this reads as high; arousal spans [-1, 1].
pub const AROUSAL_THRESHOLD: f64 = 0.0;

pub const DEFAULT_DESCRIPTION: &str =
    "A personalized fragrance optimized for your unique skin chemistry";

// AffectQuadrant: region of the valence/arousal plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AffectQuadrant {
    /// High valence, high arousal
    Bright,
    /// High valence, low arousal
    Serene,
    /// Low valence, low arousal
    Grounding,
    /// Low valence, high arousal
    Balancing,
    Neutral,
}

impl AffectQuadrant {
    pub fn classify(valence: f64, arousal: f64) -> Self {
        if valence.abs() < VALENCE_THRESHOLD {
            return Self::Neutral;
        }
        match (valence > 0.0, arousal > AROUSAL_THRESHOLD) {
            (true, true) => Self::Bright,
            (true, false) => Self::Serene,
            (false, false) => Self::Grounding,
            (false, true) => Self::Balancing,
        }
    }

    pub fn families(self) -> Vec<ScentFamily> {
        use ScentFamily as F;
        match self {
            Self::Bright => vec![F::Citrus, F::Fresh, F::Fruity, F::Aromatic],
            Self::Serene => vec![F::Woody, F::Floral, F::Musky, F::Powdery],
            Self::Grounding => vec![F::Resinous, F::Ambery, F::Earthy, F::Leather],
            Self::Balancing => vec![F::Herbal, F::Green, F::Aquatic, F::Ozonic],
            Self::Neutral => vec![F::Woody, F::Aromatic, F::Floral],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Bright => "An energizing blend that uplifts and invigorates",
            Self::Serene => "A serene composition for peaceful moments",
            Self::Grounding => "A grounding and contemplative fragrance",
            Self::Balancing => "A crisp, clean blend that steadies and refreshes",
            Self::Neutral => "A balanced, versatile composition",
        }
    }
}

/// Families and wording derived from an affect reading.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectMapping {
    pub quadrant: AffectQuadrant,
    pub families: Vec<ScentFamily>,
    pub description: String,
}

impl AffectMapping {
    pub fn from_quadrant(quadrant: AffectQuadrant) -> Self {
        Self {
            quadrant,
            families: quadrant.families(),
            description: quadrant.description().to_string(),
        }
    }
}

/// Maps a (valence, arousal) pair to scent families.
#[async_trait]
pub trait AffectMapper: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool {
        true
    }

    async fn map(&self, valence: f64, arousal: f64) -> anyhow::Result<AffectMapping>;
}

/// Local quadrant table. Never fails.
pub struct QuadrantAffectMapper;

#[async_trait]
impl AffectMapper for QuadrantAffectMapper {
    fn name(&self) -> &str {
        "quadrant"
    }

    async fn map(&self, valence: f64, arousal: f64) -> anyhow::Result<AffectMapping> {
        Ok(AffectMapping::from_quadrant(AffectQuadrant::classify(
            valence, arousal,
        )))
    }
}

/// Ordered mapper list; the quadrant table answers when every mapper before
/// it is unavailable or fails.
pub struct AffectChain {
    mappers: Vec<Arc<dyn AffectMapper>>,
}

impl AffectChain {
    pub fn new(mappers: Vec<Arc<dyn AffectMapper>>) -> Self {
        Self { mappers }
    }

    pub fn local() -> Self {
        Self::new(Vec::new())
    }

    pub async fn map(&self, valence: f64, arousal: f64) -> AffectMapping {
        for mapper in self.mappers.iter().filter(|m| m.available()) {
            match mapper.map(valence, arousal).await {
                Ok(mapping) if !mapping.families.is_empty() => return mapping,
                Ok(_) => {
                    tracing::warn!(mapper = mapper.name(), "affect mapper returned no families");
                }
                Err(e) => {
                    tracing::warn!(mapper = mapper.name(), error = %e, "affect mapper failed");
                }
            }
        }
        AffectMapping::from_quadrant(AffectQuadrant::classify(valence, arousal))
    }
}

impl Default for AffectChain {
    fn default() -> Self {
        Self::local()
    }
}
