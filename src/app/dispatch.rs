use aether_engine::Config;
use aether_engine::core::compliance::{FormulaSubmission, FragranceCategory};
use aether_engine::core::knowledge::KnowledgeSnapshot;
use aether_engine::core::molecular::MolecularEstimator;
use aether_engine::core::pipeline::{FormulationRequest, Formulator};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::cli::commands::{Cli, Commands, ProfileArgs};

async fn run_formulate(
    config: &Config,
    profile: &ProfileArgs,
    families: Vec<aether_engine::core::catalog::ScentFamily>,
    name: Option<String>,
    compact: bool,
) -> Result<()> {
    let formulator = Formulator::from_config(config).await?;
    let mut request = FormulationRequest::new(profile.to_profile()).with_families(families);
    if let Some(name) = name {
        request = request.with_name(name);
    }

    let formulation = formulator.formulate(request).await?;
    let record = formulation.record();
    let json = if compact {
        serde_json::to_string(&record)
    } else {
        serde_json::to_string_pretty(&record)
    }
    .context("Failed to serialize formulation")?;
    println!("{json}");
    Ok(())
}

async fn run_retrieve(config: &Config, profile: &ProfileArgs) -> Result<()> {
    let formulator = Formulator::from_config(config).await?;
    let profile = profile.to_profile();
    let outcome = formulator.retrieve(&profile).await;

    println!("query: {}", profile.query_text());
    println!("strategy: {}", outcome.strategy);
    for reason in &outcome.degraded {
        println!("  degraded: {reason}");
    }
    for ranked in &outcome.rules {
        let marker = if ranked.rule.condition.evaluate(&profile) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:.3}  {:<28} {}",
            ranked.relevance, ranked.rule.id, ranked.rule.action
        );
    }
    Ok(())
}

async fn run_validate(
    config: &Config,
    path: &Path,
    category: Option<FragranceCategory>,
    compact: bool,
) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read formula from {}", path.display()))?;
    let submission: FormulaSubmission = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse formula in {}", path.display()))?;

    let mut config = config.clone();
    if let Some(category) = category {
        config.compliance.category = category;
    }
    let formulator = Formulator::from_config(&config).await?;
    let (_, report) = formulator.validate_formula(&submission)?;

    let json = if compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize compliance report")?;
    println!("{json}");
    Ok(())
}

fn run_catalog(
    config: &Config,
    family: Option<aether_engine::core::catalog::ScentFamily>,
    temperature: f64,
) -> Result<()> {
    let snapshot = KnowledgeSnapshot::load(&config.knowledge, 1)?;
    let estimator = MolecularEstimator::new();

    println!(
        "{:<30} {:<10} {:<6} {:>5} {:>8} {:>10}  allergens",
        "name", "family", "tier", "logP", "MW", "VP(mmHg)"
    );
    for ingredient in snapshot
        .catalog
        .iter()
        .filter(|ing| family.is_none_or(|f| ing.family == f))
    {
        let allergens: Vec<&str> = ingredient.allergens.iter().map(String::as_str).collect();
        println!(
            "{:<30} {:<10} {:<6} {:>5.2} {:>8.1} {:>10.4}  {}",
            ingredient.name,
            ingredient.family.to_string(),
            ingredient.tier.to_string(),
            estimator.lipophilicity(ingredient),
            ingredient.molecular_weight,
            estimator.vapor_pressure(ingredient, temperature),
            allergens.join(", ")
        );
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Formulate {
            profile,
            families,
            name,
            compact,
        } => run_formulate(&config, &profile, families, name, compact).await,
        Commands::Retrieve { profile } => run_retrieve(&config, &profile).await,
        Commands::Validate {
            path,
            category,
            compact,
        } => run_validate(&config, &path, category, compact).await,
        Commands::Catalog {
            family,
            temperature,
        } => run_catalog(&config, family, temperature),
        Commands::Config => {
            info!(path = %config.config_path.display(), "effective config");
            let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{toml}");
            Ok(())
        }
    }
}
