use crate::domain::model::{Model, ModelId};
use indexmap::IndexMap;
use serde::Serialize;

/// Persisted decision table a decision service points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTableReference {
    pub id: ModelId,
    pub key: String,
    pub name: String,
}

impl From<&Model> for DecisionTableReference {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id.clone(),
            key: model.key.clone(),
            name: model.name.clone(),
        }
    }
}

/// State shared by the two decision-resolver passes of one import.
///
/// Both maps are keyed by the decision id declared in the uploaded document
/// and keep discovery order.
#[derive(Debug, Default)]
pub struct ConversionContext {
    decision_table_json: IndexMap<String, String>,
    decision_tables: IndexMap<String, DecisionTableReference>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decision_table_json(&mut self, local_id: impl Into<String>, json: String) {
        self.decision_table_json.insert(local_id.into(), json);
    }

    pub fn decision_table_json(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decision_table_json
            .iter()
            .map(|(id, json)| (id.as_str(), json.as_str()))
    }

    pub fn add_decision_table_model(&mut self, local_id: impl Into<String>, model: &Model) {
        self.decision_tables
            .insert(local_id.into(), DecisionTableReference::from(model));
    }

    pub fn decision_table(&self, local_id: &str) -> Option<&DecisionTableReference> {
        self.decision_tables.get(local_id)
    }

    pub fn decision_tables(&self) -> impl Iterator<Item = (&str, &DecisionTableReference)> {
        self.decision_tables.iter().map(|(id, r)| (id.as_str(), r))
    }
}
