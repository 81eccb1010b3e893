use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the knowledge tables come from. Unset paths use the built-in seed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// JSON file shaped `{"ingredients": [...]}`
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// JSON file shaped `{"rules": [...]}`
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// JSON file shaped `{"limits": [...]}`
    #[serde(default)]
    pub limits_path: Option<PathBuf>,
}
