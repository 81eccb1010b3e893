use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Aether.
///
/// Only formula construction, compliance and request-level failures ever reach
/// a caller. Retrieval and rule-target problems are absorbed inside the
/// pipeline and surface as fallbacks or skipped rules instead.
#[derive(Debug, Error)]
pub enum AetherError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Knowledge base ──────────────────────────────────────────────────
    #[error("knowledge: {0}")]
    Knowledge(#[from] KnowledgeError),

    // ── Formulation pipeline ────────────────────────────────────────────
    #[error("formulation: {0}")]
    Formulation(#[from] FormulationError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Knowledge errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid knowledge data: {0}")]
    Invalid(String),
}

// ─── Formulation errors (fatal to a request) ────────────────────────────────

#[derive(Debug, Error)]
pub enum FormulationError {
    #[error("no catalog ingredients resolve for families [{}]", requested.join(", "))]
    NoResolvableIngredients { requested: Vec<String> },

    #[error(
        "allergen {allergen} cannot be brought under its limit ({aggregate:.4}% > {limit:.4}%)"
    )]
    ComplianceUnsatisfiable {
        allergen: String,
        aggregate: f64,
        limit: f64,
    },

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid formula: {0}")]
    InvalidFormula(String),

    #[error("request exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

// ─── Retrieval errors (absorbed by the fallback chain) ──────────────────────

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("retrieval backend {backend} unavailable: {message}")]
    Unavailable { backend: String, message: String },

    #[error("retrieval backend {backend} timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },
}

// ─── Rule application errors (absorbed, rule skipped) ───────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("rule {rule_id} targets unknown {target}")]
    UnknownRuleTarget { rule_id: String, target: String },

    #[error("rule {rule_id} has invalid parameter: {message}")]
    InvalidParameter { rule_id: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AetherError>;
