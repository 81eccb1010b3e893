use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Formulation;
use crate::core::catalog::Tier;
use crate::core::compliance::ComplianceReport;
use crate::core::formula::NotePyramid;
use crate::core::metrics::FormulaMetrics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteRecord {
    pub name: String,
    pub concentration: f64,
    pub sustainable: bool,
}

/// Flat, serializable view of a finished formulation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulationRecord {
    pub formula_id: String,
    pub name: String,
    pub description: String,
    pub top_notes: Vec<NoteRecord>,
    pub heart_notes: Vec<NoteRecord>,
    pub base_notes: Vec<NoteRecord>,
    pub note_pyramid: NotePyramid,
    pub metrics: FormulaMetrics,
    pub physio_corrections: Vec<String>,
    pub compliance: ComplianceReport,
    pub knowledge_version: u64,
    pub retrieval_strategy: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Formulation> for FormulationRecord {
    fn from(formulation: &Formulation) -> Self {
        let formula = &formulation.formula;
        let notes = |tier: Tier| -> Vec<NoteRecord> {
            formula
                .tier(tier)
                .iter()
                .map(|c| NoteRecord {
                    name: c.ingredient.name.clone(),
                    concentration: c.concentration,
                    sustainable: c.ingredient.sustainable,
                })
                .collect()
        };

        Self {
            formula_id: formula.id.to_string(),
            name: formula.name.clone(),
            description: formula.description.clone(),
            top_notes: notes(Tier::Top),
            heart_notes: notes(Tier::Heart),
            base_notes: notes(Tier::Base),
            note_pyramid: formula.note_pyramid(),
            metrics: formulation.metrics,
            physio_corrections: formulation
                .corrections
                .iter()
                .map(|c| {
                    if c.rationale.is_empty() {
                        c.rule_id.clone()
                    } else {
                        c.rationale.clone()
                    }
                })
                .collect(),
            compliance: formulation.compliance.clone(),
            knowledge_version: formulation.knowledge_version,
            retrieval_strategy: formulation.retrieval_strategy.clone(),
            created_at: formulation.created_at,
        }
    }
}
