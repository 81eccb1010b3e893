use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{info, warn};

/// Log-based observer: uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::FormulationStart {
                families,
                knowledge_version,
            } => {
                info!(families = ?families, knowledge_version, "formulation.start");
            }
            ObserverEvent::FormulationEnd { duration, success } => {
                info!(duration_ms = millis(*duration), success, "formulation.end");
            }
            ObserverEvent::RetrievalDegraded { reason } => {
                warn!(reason = %reason, "retrieval.degraded");
            }
            ObserverEvent::RuleApplied { rule_id } => {
                info!(rule = %rule_id, "rule.applied");
            }
            ObserverEvent::RuleSkipped { rule_id, reason } => {
                info!(rule = %rule_id, reason = %reason, "rule.skipped");
            }
            ObserverEvent::ComplianceAdjusted {
                allergen,
                before,
                after,
            } => {
                info!(allergen = %allergen, before, after, "compliance.adjusted");
            }
            ObserverEvent::KnowledgeReloaded { version } => {
                info!(version, "knowledge.reloaded");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::RequestLatency(d) => {
                info!(latency_ms = millis(*d), "metric.request_latency");
            }
            ObserverMetric::RulesRetrieved { strategy, count } => {
                info!(strategy = %strategy, count, "metric.rules_retrieved");
            }
            ObserverMetric::RulesApplied(count) => {
                info!(count, "metric.rules_applied");
            }
            ObserverMetric::ConcentrationRemoved(amount) => {
                info!(amount, "metric.concentration_removed");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
