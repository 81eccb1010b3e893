mod core;
mod formulation;
mod knowledge;
mod observability;
mod retrieval;

pub use self::core::Config;
pub use formulation::{ComplianceConfig, FormulationConfig, PyramidConfig, ScoringConfig};
pub use knowledge::KnowledgeConfig;
pub use observability::ObservabilityConfig;
pub use retrieval::{RetrievalBackend, RetrievalConfig};
