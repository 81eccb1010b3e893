use arc_swap::ArcSwap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::rules::CorrectionRule;
use super::seed;
use crate::config::KnowledgeConfig;
use crate::core::catalog::{Ingredient, IngredientCatalog};
use crate::core::compliance::{ComplianceLimit, FragranceCategory};
use crate::error::KnowledgeError;

/// Immutable, versioned view of everything a request reads: catalog, rules and
/// compliance limits. A request loads one snapshot up front and never observes
/// a later reload.
#[derive(Debug, Clone)]
pub struct KnowledgeSnapshot {
    pub version: u64,
    pub catalog: IngredientCatalog,
    pub rules: Vec<CorrectionRule>,
    pub limits: Vec<ComplianceLimit>,
}

#[derive(Deserialize)]
struct IngredientFile {
    ingredients: Vec<Ingredient>,
}

#[derive(Deserialize)]
struct RuleFile {
    rules: Vec<CorrectionRule>,
}

#[derive(Deserialize)]
struct LimitFile {
    limits: Vec<ComplianceLimit>,
}

impl KnowledgeSnapshot {
    pub fn from_parts(
        version: u64,
        ingredients: Vec<Ingredient>,
        rules: Vec<CorrectionRule>,
        limits: Vec<ComplianceLimit>,
    ) -> Result<Self, KnowledgeError> {
        let catalog = IngredientCatalog::new(ingredients)?;
        validate_rules(&rules)?;
        validate_limits(&limits)?;
        Ok(Self {
            version,
            catalog,
            rules,
            limits,
        })
    }

    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_parts(
            1,
            seed::builtin_ingredients(),
            seed::builtin_rules(),
            seed::builtin_limits(),
        )
    }

    /// Load each table from its configured file, or the built-in seed when the
    /// path is unset.
    pub fn load(config: &KnowledgeConfig, version: u64) -> Result<Self, KnowledgeError> {
        let ingredients = match &config.catalog_path {
            Some(path) => read_json::<IngredientFile>(path)?.ingredients,
            None => seed::builtin_ingredients(),
        };
        let rules = match &config.rules_path {
            Some(path) => read_json::<RuleFile>(path)?.rules,
            None => seed::builtin_rules(),
        };
        let limits = match &config.limits_path {
            Some(path) => read_json::<LimitFile>(path)?.limits,
            None => seed::builtin_limits(),
        };

        let snapshot = Self::from_parts(version, ingredients, rules, limits)?;
        tracing::info!(
            version,
            ingredients = snapshot.catalog.len(),
            rules = snapshot.rules.len(),
            limits = snapshot.limits.len(),
            "knowledge snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn rule(&self, id: &str) -> Option<&CorrectionRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Limits for one product category keyed by allergen (sorted, so the
    /// validator walks them in a stable order).
    pub fn limits_for(&self, category: FragranceCategory) -> BTreeMap<String, f64> {
        self.limits
            .iter()
            .filter(|limit| limit.category == category)
            .map(|limit| (limit.allergen.clone(), limit.max_concentration))
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, KnowledgeError> {
    let contents = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| KnowledgeError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn validate_rules(rules: &[CorrectionRule]) -> Result<(), KnowledgeError> {
    let mut seen = HashSet::with_capacity(rules.len());
    for rule in rules {
        if rule.id.trim().is_empty() {
            return Err(KnowledgeError::Invalid("rule with empty id".into()));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(KnowledgeError::Invalid(format!(
                "duplicate rule id: {}",
                rule.id
            )));
        }
    }
    Ok(())
}

fn validate_limits(limits: &[ComplianceLimit]) -> Result<(), KnowledgeError> {
    let mut seen = HashSet::with_capacity(limits.len());
    for limit in limits {
        if !limit.max_concentration.is_finite()
            || !(0.0..=100.0).contains(&limit.max_concentration)
        {
            return Err(KnowledgeError::Invalid(format!(
                "limit for {} must be within 0-100",
                limit.allergen
            )));
        }
        if !seen.insert((limit.allergen.as_str(), limit.category)) {
            return Err(KnowledgeError::Invalid(format!(
                "duplicate limit for {} ({})",
                limit.allergen, limit.category
            )));
        }
    }
    Ok(())
}

/// Live-reloadable knowledge holder.
///
/// Wraps the snapshot in an `ArcSwap` so readers never block and a reload
/// atomically swaps the pointer. In-flight requests keep the `Arc` they loaded.
pub struct KnowledgeHandle {
    inner: Arc<ArcSwap<KnowledgeSnapshot>>,
}

impl KnowledgeHandle {
    pub fn new(snapshot: KnowledgeSnapshot) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(snapshot)),
        }
    }

    /// Load current snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<KnowledgeSnapshot>> {
        self.inner.load()
    }

    /// Return a clone of the current `Arc<KnowledgeSnapshot>`.
    pub fn load_full(&self) -> Arc<KnowledgeSnapshot> {
        self.inner.load_full()
    }

    /// Re-read the configured tables and swap them in under the next version.
    pub fn reload(&self, config: &KnowledgeConfig) -> Result<Arc<KnowledgeSnapshot>, KnowledgeError> {
        let next_version = self.inner.load().version + 1;
        let fresh = Arc::new(KnowledgeSnapshot::load(config, next_version)?);
        self.inner.store(Arc::clone(&fresh));
        tracing::info!(version = next_version, "knowledge hot-reloaded");
        Ok(fresh)
    }

    /// Manually swap in a new snapshot.
    pub fn store(&self, snapshot: KnowledgeSnapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

impl Clone for KnowledgeHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
