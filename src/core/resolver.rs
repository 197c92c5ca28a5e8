//! Two-pass decision reference resolution for decision-service imports.
//!
//! Pass 1 turns every decision of the document into a standalone
//! decision-table document without touching the store. Pass 2 persists each
//! of them and records the stored identity under the decision's local id, so
//! the decision-service conversion can point at real models.

use crate::convert::dmn::decision_table_to_json;
use crate::convert::migration::migrate_decision_table;
use crate::convert::ConversionContext;
use crate::dialect::dmn::DmnDefinition;
use crate::domain::model::{ModelType, NewModel};
use crate::domain::ports::ModelStore;
use crate::utils::error::{ImportError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Fields read back from an extracted decision-table document.
#[derive(Debug, Deserialize)]
struct DecisionTableHeader {
    key: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

pub fn extract_decision_tables(definition: &DmnDefinition, context: &mut ConversionContext) {
    for decision in &definition.decisions {
        let seed = format!("definition_{}", decision.id);
        let json = decision_table_to_json(decision, &seed, decision.name.as_deref());
        context.add_decision_table_json(decision.id.clone(), json.to_string());
    }
    tracing::debug!("Extracted {} decision table(s)", definition.decisions.len());
}

pub async fn materialize_decision_tables<S: ModelStore + ?Sized>(
    store: &S,
    context: &mut ConversionContext,
    author: &str,
) -> Result<()> {
    let extracted: Vec<(String, String)> = context
        .decision_table_json()
        .map(|(local_id, json)| (local_id.to_string(), json.to_string()))
        .collect();

    for (local_id, json) in extracted {
        let payload: Value = serde_json::from_str(&json).map_err(|source| {
            tracing::error!("Error reading decision model json for {}: {}", local_id, source);
            ImportError::DecisionTableJson { source }
        })?;
        let header = read_header(&local_id, &payload)?;

        let model = store
            .create(NewModel {
                key: header.key,
                name: header.name,
                description: header.description,
                model_type: ModelType::DecisionTable,
                payload: migrate_decision_table(payload),
                author: author.to_string(),
            })
            .await?;
        tracing::debug!("Stored decision table {} as {}", local_id, model.id);
        context.add_decision_table_model(local_id, &model);
    }
    Ok(())
}

fn read_header(local_id: &str, payload: &Value) -> Result<DecisionTableHeader> {
    DecisionTableHeader::deserialize(payload).map_err(|source| {
        tracing::error!("Error reading decision model header for {}: {}", local_id, source);
        ImportError::DecisionTableJson { source }
    })
}
