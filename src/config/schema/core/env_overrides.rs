use super::Config;
use crate::config::RetrievalBackend;
use crate::core::compliance::FragranceCategory;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("AETHER_RETRIEVAL_BACKEND")
            && let Ok(backend) = backend.parse::<RetrievalBackend>()
        {
            self.retrieval.backend = backend;
        }

        if let Ok(top_k) = std::env::var("AETHER_TOP_K")
            && let Ok(top_k) = top_k.parse::<usize>()
            && top_k > 0
        {
            self.retrieval.top_k = top_k;
        }

        if let Ok(timeout) = std::env::var("AETHER_RETRIEVAL_TIMEOUT_MS")
            && let Ok(timeout) = timeout.parse::<u64>()
            && timeout > 0
        {
            self.retrieval.timeout_ms = timeout;
        }

        if let Ok(timeout) = std::env::var("AETHER_REQUEST_TIMEOUT_MS")
            && let Ok(timeout) = timeout.parse::<u64>()
            && timeout > 0
        {
            self.formulation.request_timeout_ms = timeout;
        }

        if let Ok(category) = std::env::var("AETHER_COMPLIANCE_CATEGORY")
            && let Ok(category) = category.parse::<FragranceCategory>()
        {
            self.compliance.category = category;
        }

        if let Ok(path) = std::env::var("AETHER_CATALOG_PATH")
            && !path.is_empty()
        {
            self.knowledge.catalog_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("AETHER_RULES_PATH")
            && !path.is_empty()
        {
            self.knowledge.rules_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("AETHER_LIMITS_PATH")
            && !path.is_empty()
        {
            self.knowledge.limits_path = Some(PathBuf::from(path));
        }

        if let Ok(backend) = std::env::var("AETHER_OBSERVABILITY")
            && !backend.is_empty()
        {
            self.observability.backend = backend;
        }
    }
}
