use crate::domain::model::{Model, ModelHistory, ModelId, ModelType, NewModel, NewVersion};
use crate::domain::ports::ModelStore;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct StoreState {
    models: IndexMap<ModelId, Model>,
    history: HashMap<ModelId, Vec<ModelHistory>>,
}

/// Process-local store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModelStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every latest-version model in creation order.
    pub async fn models(&self) -> Vec<Model> {
        self.state.lock().await.models.values().cloned().collect()
    }

    pub async fn models_of_type(&self, model_type: ModelType) -> Vec<Model> {
        self.state
            .lock()
            .await
            .models
            .values()
            .filter(|model| model.model_type == model_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn create(&self, model: NewModel) -> Result<Model> {
        let mut state = self.state.lock().await;
        let taken = state
            .models
            .values()
            .any(|existing| existing.key == model.key && existing.model_type == model.model_type);
        if taken {
            return Err(ImportError::KeyConflict { key: model.key });
        }

        let model = model.into_model(ModelId::new(), Utc::now());
        state.models.insert(model.id.clone(), model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: &ModelId) -> Result<Option<Model>> {
        Ok(self.state.lock().await.models.get(id).cloned())
    }

    async fn find_by_key_and_type(&self, key: &str, model_type: ModelType) -> Result<Vec<Model>> {
        Ok(self
            .state
            .lock()
            .await
            .models
            .values()
            .filter(|model| model.key == key && model.model_type == model_type)
            .cloned()
            .collect())
    }

    async fn append_version(&self, id: &ModelId, version: NewVersion) -> Result<Model> {
        let mut state = self.state.lock().await;
        let model = state
            .models
            .get_mut(id)
            .ok_or_else(|| ImportError::ModelNotFound { id: id.to_string() })?;

        let previous = model.push_version(version, Utc::now());
        let updated = model.clone();
        state.history.entry(id.clone()).or_default().push(previous);
        Ok(updated)
    }

    async fn find_history(&self, id: &ModelId) -> Result<Vec<ModelHistory>> {
        Ok(self
            .state
            .lock()
            .await
            .history
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}
