pub mod schema;

pub use schema::{
    ComplianceConfig, Config, FormulationConfig, KnowledgeConfig, ObservabilityConfig,
    PyramidConfig, RetrievalBackend, RetrievalConfig, ScoringConfig,
};
