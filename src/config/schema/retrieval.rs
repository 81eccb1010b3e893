use serde::{Deserialize, Serialize};

// RetrievalBackend: first strategy tried; keyword matching always backs it up
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RetrievalBackend {
    #[default]
    Hybrid,
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub backend: RetrievalBackend,
    /// Rules returned per request
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Budget for the primary strategy before falling back
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// "hashed" | "none"
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Weight for similarity score in hybrid ranking (0.0–1.0)
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,
    /// Weight for exact condition match in hybrid ranking (0.0–1.0)
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
}

fn default_top_k() -> usize {
    6
}
fn default_timeout_ms() -> u64 {
    250
}
fn default_embedding_provider() -> String {
    "hashed".into()
}
fn default_embedding_dimensions() -> usize {
    256
}
fn default_vector_weight() -> f64 {
    0.3
}
fn default_keyword_weight() -> f64 {
    0.7
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: RetrievalBackend::default(),
            top_k: default_top_k(),
            timeout_ms: default_timeout_ms(),
            embedding_provider: default_embedding_provider(),
            embedding_dimensions: default_embedding_dimensions(),
            vector_weight: default_vector_weight(),
            keyword_weight: default_keyword_weight(),
        }
    }
}
