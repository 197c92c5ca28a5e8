use crate::domain::model::{AppDefinition, Model, ModelRepresentation, ModelSummary, ModelType};
use crate::utils::error::{ImportError, Result};

/// Builds the read-side view of a stored model. App models carry their
/// definition; a payload that does not deserialize is an error, never a
/// default.
pub fn represent(model: &Model) -> Result<ModelRepresentation> {
    let summary = ModelSummary::from(model);
    match model.model_type {
        ModelType::App => {
            let app_definition: AppDefinition = serde_json::from_value(model.payload.clone())
                .map_err(|source| {
                    tracing::error!("Could not deserialize app definition for {}: {}", model.id, source);
                    ImportError::AppDefinition {
                        model_id: model.id.to_string(),
                        source,
                    }
                })?;
            Ok(ModelRepresentation::App {
                summary,
                app_definition,
            })
        }
        ModelType::Process
        | ModelType::Case
        | ModelType::DecisionTable
        | ModelType::DecisionService => Ok(ModelRepresentation::Model { summary }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ModelId, NewModel};
    use crate::utils::error::ErrorCategory;
    use chrono::Utc;
    use serde_json::{json, Value};

    fn model(model_type: ModelType, payload: Value) -> Model {
        NewModel {
            key: "k".to_string(),
            name: "K".to_string(),
            description: None,
            model_type,
            payload,
            author: "alice".to_string(),
        }
        .into_model(ModelId::new(), Utc::now())
    }

    #[test]
    fn test_app_payload_is_deserialized() {
        let app = model(
            ModelType::App,
            json!({"models": [{"id": "m1", "name": "Order"}], "theme": "theme-2"}),
        );
        match represent(&app).unwrap() {
            ModelRepresentation::App { app_definition, summary } => {
                assert_eq!(app_definition.models[0].id, "m1");
                assert_eq!(app_definition.theme.as_deref(), Some("theme-2"));
                assert_eq!(summary.model_type, ModelType::App);
            }
            other => panic!("unexpected representation {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_app_payload_is_internal() {
        let app = model(ModelType::App, json!({"models": "not a list"}));
        let err = represent(&app).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.user_friendly_message(), "Could not deserialize app definition");
    }

    #[test]
    fn test_other_types_project_fields() {
        let process = model(ModelType::Process, json!({"anything": true}));
        let representation = represent(&process).unwrap();
        assert!(matches!(representation, ModelRepresentation::Model { .. }));
        assert_eq!(representation.summary().key, "k");

        let serialized = serde_json::to_value(&representation).unwrap();
        assert_eq!(serialized["kind"], "model");
        assert_eq!(serialized["modelType"], "process");
    }
}
