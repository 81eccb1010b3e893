use aether_engine::core::catalog::ScentFamily;
use aether_engine::core::compliance::FragranceCategory;
use aether_engine::core::profile::{SkinType, UserProfile};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `Aether` - skin-aware fragrance formulation engine.
#[derive(Parser, Debug)]
#[command(name = "aether")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Corrects fragrance formulas for skin chemistry and allergen limits.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Physiological inputs shared by every profile-driven command
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Skin surface pH
    #[arg(long, default_value = "5.5")]
    pub ph: f64,

    /// Skin type (dry, normal, oily)
    #[arg(long, default_value = "normal")]
    pub skin_type: SkinType,

    /// Skin temperature in °C
    #[arg(long, default_value = "36.5")]
    pub temperature: f64,

    /// Valence in [-1, 1]; needs --arousal
    #[arg(long, requires = "arousal", allow_hyphen_values = true)]
    pub valence: Option<f64>,

    /// Arousal in [-1, 1]; needs --valence
    #[arg(long, requires = "valence", allow_hyphen_values = true)]
    pub arousal: Option<f64>,

    /// Allergen the wearer reacts to (repeatable)
    #[arg(long = "allergy")]
    pub allergies: Vec<String>,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> UserProfile {
        let mut profile = UserProfile::new(self.ph, self.skin_type, self.temperature);
        if let (Some(valence), Some(arousal)) = (self.valence, self.arousal) {
            profile = profile.with_affect(valence, arousal);
        }
        for allergen in &self.allergies {
            profile = profile.with_allergy(allergen);
        }
        profile
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a corrected, compliant formula and print it as JSON
    Formulate {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Scent family to build from (repeatable; defaults to the affect mapping)
        #[arg(short, long = "family")]
        families: Vec<ScentFamily>,

        /// Formula name
        #[arg(long)]
        name: Option<String>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the correction rules retrieved for a profile
    Retrieve {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Check a submitted formula (JSON ingredient list) against allergen limits
    Validate {
        /// Path to `{"name": ..., "ingredients": [{"name", "concentration"}]}`
        path: PathBuf,

        /// Product category whose limits apply (defaults to the configured one)
        #[arg(long)]
        category: Option<FragranceCategory>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// List catalog ingredients
    Catalog {
        /// Only this scent family
        #[arg(short, long)]
        family: Option<ScentFamily>,

        /// Skin temperature for the vapour-pressure estimate (°C)
        #[arg(long, default_value = "36.5")]
        temperature: f64,
    },

    /// Print the effective configuration
    Config,
}
