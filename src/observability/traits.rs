use std::time::Duration;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    FormulationStart {
        families: Vec<String>,
        knowledge_version: u64,
    },
    FormulationEnd {
        duration: Duration,
        success: bool,
    },
    RetrievalDegraded {
        reason: String,
    },
    RuleApplied {
        rule_id: String,
    },
    RuleSkipped {
        rule_id: String,
        reason: String,
    },
    ComplianceAdjusted {
        allergen: String,
        before: f64,
        after: f64,
    },
    KnowledgeReloaded {
        version: u64,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    RequestLatency(Duration),
    RulesRetrieved { strategy: String, count: u64 },
    RulesApplied(u64),
    ConcentrationRemoved(f64),
}

/// Core observability trait: implement for any backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
