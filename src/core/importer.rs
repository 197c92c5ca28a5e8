use crate::convert::{self, ConversionContext};
use crate::core::layout::FlowLayout;
use crate::core::representation::represent;
use crate::core::resolver;
use crate::dialect::{bpmn, cmmn, dmn, DocumentFormat, ParseError};
use crate::domain::model::{ModelHistory, ModelId, ModelRepresentation, ModelType, NewModel, NewVersion};
use crate::domain::ports::{LayoutEngine, ModelStore};
use crate::utils::error::{ErrorCategory, ImportError, Result};
use serde_json::Value;

pub const DEFAULT_VERSION_COMMENT: &str = "Version import via Modeler App";

/// Audit data stamped on every stored model.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub author: String,
    pub version_comment: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            author: "admin".to_string(),
            version_comment: DEFAULT_VERSION_COMMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Fail when a model with the same key already exists.
    #[default]
    Create,
    /// Append a version to the one existing model with the same key.
    NewVersion,
}

/// Converted document ready to be stored.
struct Converted {
    key: String,
    name: String,
    description: Option<String>,
    model_type: ModelType,
    payload: Value,
}

pub struct ModelImporter<S: ModelStore, L: LayoutEngine = FlowLayout> {
    store: S,
    layout: L,
    settings: ImportSettings,
}

impl<S: ModelStore> ModelImporter<S> {
    pub fn new(store: S) -> Self {
        Self::with_layout(store, FlowLayout::default(), ImportSettings::default())
    }
}

impl<S: ModelStore, L: LayoutEngine> ModelImporter<S, L> {
    pub fn with_layout(store: S, layout: L, settings: ImportSettings) -> Self {
        Self {
            store,
            layout,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Classifies `file_name` and imports the document in create mode.
    pub async fn import(&self, bytes: &[u8], file_name: &str) -> Result<ModelRepresentation> {
        match DocumentFormat::classify(file_name) {
            DocumentFormat::Process => self.import_process(bytes, file_name, ImportMode::Create).await,
            DocumentFormat::Case => self.import_case(bytes, file_name).await,
            DocumentFormat::DecisionService => self.import_decision_service(bytes, file_name).await,
            DocumentFormat::Unknown => Err(reject_file_name(file_name, DocumentFormat::Unknown)),
        }
    }

    pub async fn import_process(
        &self,
        bytes: &[u8],
        file_name: &str,
        mode: ImportMode,
    ) -> Result<ModelRepresentation> {
        ensure_format(file_name, DocumentFormat::Process)?;
        tracing::info!("Importing process definition {} ({:?})", file_name, mode);

        let mut model = bpmn::parse(bytes).map_err(|e| import_failed(file_name, e))?;
        let Some(process) = model.main_process().cloned() else {
            return Err(invalid(format!("No process found in definition {}", file_name)));
        };

        if model.location_map.is_empty() {
            tracing::debug!("No diagram information in {}, generating layout", file_name);
            model = self.layout.layout(model);
        }

        let converted = Converted {
            name: display_name(process.name.as_deref(), &process.id),
            key: process.id,
            description: process.documentation,
            model_type: ModelType::Process,
            payload: convert::bpmn::to_json(&model),
        };

        let result = match mode {
            ImportMode::Create => self.create(converted).await,
            ImportMode::NewVersion => self.append_version(converted).await,
        };
        result.inspect_err(log_internal)
    }

    pub async fn import_case(&self, bytes: &[u8], file_name: &str) -> Result<ModelRepresentation> {
        ensure_format(file_name, DocumentFormat::Case)?;
        tracing::info!("Importing case definition {}", file_name);

        let model = cmmn::parse(bytes).map_err(|e| import_failed(file_name, e))?;
        let Some(case) = model.primary_case() else {
            return Err(invalid(format!("No cases found in definition {}", file_name)));
        };
        if model.location_map.is_empty() {
            return Err(invalid(format!("No CMMN DI found in definition {}", file_name)));
        }

        let converted = Converted {
            key: case.id.clone(),
            name: display_name(case.name.as_deref(), &case.id),
            description: case.documentation.clone(),
            model_type: ModelType::Case,
            payload: convert::cmmn::to_json(&model),
        };
        self.create(converted).await.inspect_err(log_internal)
    }

    /// Stores every decision of the document as its own decision table, then
    /// the decision service pointing at them.
    pub async fn import_decision_service(
        &self,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<ModelRepresentation> {
        ensure_format(file_name, DocumentFormat::DecisionService)?;
        tracing::info!("Importing decision service definition {}", file_name);

        let definition = dmn::parse(bytes).map_err(|e| import_failed(file_name, e))?;
        let Some(service) = definition.primary_decision_service() else {
            return Err(invalid(format!(
                "No decision services found in definition {}",
                file_name
            )));
        };
        if definition.location_map.is_empty() {
            return Err(invalid(format!("No DMN DI found in definition {}", file_name)));
        }

        let key = service.id.clone();
        self.ensure_key_available(&key, ModelType::DecisionService).await?;
        // Each decision is stored under its own id; a clash must stop the
        // import before the first table is written.
        for decision in &definition.decisions {
            self.ensure_key_available(&decision.id, ModelType::DecisionTable)
                .await?;
        }

        let result = async {
            let mut context = ConversionContext::new();
            resolver::extract_decision_tables(&definition, &mut context);
            resolver::materialize_decision_tables(&self.store, &mut context, &self.settings.author)
                .await?;

            let converted = Converted {
                name: display_name(service.name.as_deref(), &key),
                key: key.clone(),
                description: service.description.clone(),
                model_type: ModelType::DecisionService,
                payload: convert::dmn::decision_service_to_json(&definition, &context)?,
            };
            self.create(converted).await
        }
        .await;
        result.inspect_err(log_internal)
    }

    pub async fn representation(&self, id: &ModelId) -> Result<ModelRepresentation> {
        let model = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImportError::ModelNotFound { id: id.to_string() })?;
        represent(&model)
    }

    /// Superseded versions of a model, oldest first.
    pub async fn history(&self, id: &ModelId) -> Result<Vec<ModelHistory>> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(ImportError::ModelNotFound { id: id.to_string() });
        }
        self.store.find_history(id).await
    }

    async fn ensure_key_available(&self, key: &str, model_type: ModelType) -> Result<()> {
        if self.store.find_by_key_and_type(key, model_type).await?.is_empty() {
            Ok(())
        } else {
            tracing::warn!("Rejected {} import, key {} already exists", model_type, key);
            Err(ImportError::KeyConflict {
                key: key.to_string(),
            })
        }
    }

    async fn create(&self, converted: Converted) -> Result<ModelRepresentation> {
        self.ensure_key_available(&converted.key, converted.model_type)
            .await?;

        let model = self
            .store
            .create(NewModel {
                key: converted.key,
                name: converted.name,
                description: converted.description,
                model_type: converted.model_type,
                payload: converted.payload,
                author: self.settings.author.clone(),
            })
            .await?;
        tracing::info!(
            "Created {} model {} (key {}, version {})",
            model.model_type,
            model.id,
            model.key,
            model.version
        );
        represent(&model)
    }

    async fn append_version(&self, converted: Converted) -> Result<ModelRepresentation> {
        let mut existing = self
            .store
            .find_by_key_and_type(&converted.key, converted.model_type)
            .await?;

        let target = match existing.len() {
            0 => {
                return Err(ImportError::VersionTargetMissing {
                    key: converted.key,
                })
            }
            1 => existing.remove(0),
            _ => return Err(ImportError::KeyNotUnique { key: converted.key }),
        };

        let model = self
            .store
            .append_version(
                &target.id,
                NewVersion {
                    payload: converted.payload,
                    comment: self.settings.version_comment.clone(),
                    author: self.settings.author.clone(),
                },
            )
            .await?;
        tracing::info!(
            "Stored version {} of {} model {} (key {})",
            model.version,
            model.model_type,
            model.id,
            model.key
        );
        represent(&model)
    }
}

fn ensure_format(file_name: &str, expected: DocumentFormat) -> Result<()> {
    if DocumentFormat::classify(file_name) == expected {
        Ok(())
    } else {
        Err(reject_file_name(file_name, expected))
    }
}

fn reject_file_name(file_name: &str, expected: DocumentFormat) -> ImportError {
    tracing::warn!("Rejected unsupported file name {}", file_name);
    ImportError::UnsupportedFileName {
        file_name: file_name.to_string(),
        supported: expected.supported_extensions(),
    }
}

fn import_failed(file_name: &str, err: ParseError) -> ImportError {
    tracing::warn!("Could not parse {}: {}", file_name, err);
    ImportError::ParseError {
        file_name: file_name.to_string(),
        message: err.to_string(),
    }
}

fn invalid(message: String) -> ImportError {
    tracing::warn!("{}", message);
    ImportError::InvalidDefinition { message }
}

fn log_internal(err: &ImportError) {
    if err.category() == ErrorCategory::Internal {
        tracing::error!("Import failed: {}", err);
    }
}

fn display_name(name: Option<&str>, key: &str) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryModelStore;

    const ORDER: &str = r#"<definitions targetNamespace="http://example.com">
  <process id="order" name="Order"><startEvent id="s"/></process>
</definitions>"#;

    #[test]
    fn test_display_name_falls_back_to_key() {
        assert_eq!(display_name(Some("Order"), "order"), "Order");
        assert_eq!(display_name(Some("  "), "order"), "order");
        assert_eq!(display_name(None, "order"), "order");
    }

    #[tokio::test]
    async fn test_wrong_dialect_is_rejected_before_parsing() {
        let importer = ModelImporter::new(InMemoryModelStore::new());
        let err = importer
            .import_case(b"not even xml", "order.bpmn")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file name, only .cmmn and .cmmn.xml files are supported not order.bpmn"
        );
    }

    #[tokio::test]
    async fn test_settings_are_stamped_on_models() {
        let settings = ImportSettings {
            author: "bob".to_string(),
            version_comment: "re-import".to_string(),
        };
        let importer = ModelImporter::with_layout(InMemoryModelStore::new(), FlowLayout::default(), settings);
        importer
            .import_process(ORDER.as_bytes(), "order.bpmn", ImportMode::Create)
            .await
            .unwrap();
        let updated = importer
            .import_process(ORDER.as_bytes(), "order.bpmn", ImportMode::NewVersion)
            .await
            .unwrap();

        let summary = updated.summary();
        assert_eq!(summary.version, 2);
        assert_eq!(summary.comment.as_deref(), Some("re-import"));
        assert_eq!(summary.last_updated_by, "bob");
    }

    #[tokio::test]
    async fn test_unknown_model_id() {
        let importer = ModelImporter::new(InMemoryModelStore::new());
        let err = importer.representation(&ModelId::new()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert!(importer.history(&ModelId::new()).await.is_err());
    }
}
