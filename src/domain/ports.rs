use crate::dialect::bpmn::BpmnModel;
use crate::domain::model::{Model, ModelHistory, ModelId, ModelType, NewModel, NewVersion};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key-indexed persistence for models.
///
/// `create` must check key uniqueness and insert atomically: the importer's
/// own lookup is only a fast path and can race with concurrent writers.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Stores a new model at version 1. Fails with `KeyConflict` when a model
    /// of the same type already uses the key.
    async fn create(&self, model: NewModel) -> Result<Model>;

    async fn find_by_id(&self, id: &ModelId) -> Result<Option<Model>>;

    /// Latest versions only; superseded versions live in the history.
    async fn find_by_key_and_type(&self, key: &str, model_type: ModelType) -> Result<Vec<Model>>;

    /// Moves the current version into history and stores `version` on top.
    async fn append_version(&self, id: &ModelId, version: NewVersion) -> Result<Model>;

    /// Superseded versions, oldest first.
    async fn find_history(&self, id: &ModelId) -> Result<Vec<ModelHistory>>;
}

/// Synthesizes diagram geometry for a process model that has none.
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, model: BpmnModel) -> BpmnModel;
}
