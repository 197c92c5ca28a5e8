use crate::domain::model::{Model, ModelHistory, ModelId, ModelType, NewModel, NewVersion};
use crate::domain::ports::ModelStore;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Stores each model as `models/<id>.json` and every superseded version as
/// `history/<id>/v<version>.json` under a root directory.
///
/// Writes go through one lock so the uniqueness check in `create` and the
/// insert happen as a unit for this process.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileModelStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn models_dir(&self) -> PathBuf {
        self.base_path.join("models")
    }

    fn model_path(&self, id: &ModelId) -> PathBuf {
        self.models_dir().join(format!("{}.json", id))
    }

    fn history_dir(&self, id: &ModelId) -> PathBuf {
        self.base_path.join("history").join(id.to_string())
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn read_model(path: &Path) -> Result<Model> {
        let data = tokio::fs::read(path).await?;
        serde_json::from_slice(&data).map_err(|e| {
            tracing::error!("Corrupt model file {}: {}", path.display(), e);
            ImportError::StorageError {
                message: format!("corrupt model file {}: {}", path.display(), e),
            }
        })
    }

    async fn load_all(&self) -> Result<Vec<Model>> {
        let dir = self.models_dir();
        let mut models = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(models),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                models.push(Self::read_model(&path).await?);
            }
        }
        models.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(models)
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn create(&self, model: NewModel) -> Result<Model> {
        let _guard = self.write_lock.lock().await;
        let taken = self
            .load_all()
            .await?
            .iter()
            .any(|existing| existing.key == model.key && existing.model_type == model.model_type);
        if taken {
            return Err(ImportError::KeyConflict { key: model.key });
        }

        let model = model.into_model(ModelId::new(), Utc::now());
        Self::write_json(&self.model_path(&model.id), &model).await?;
        tracing::debug!("Stored {} model {} ({})", model.model_type, model.key, model.id);
        Ok(model)
    }

    async fn find_by_id(&self, id: &ModelId) -> Result<Option<Model>> {
        let path = self.model_path(id);
        match tokio::fs::try_exists(&path).await? {
            true => Ok(Some(Self::read_model(&path).await?)),
            false => Ok(None),
        }
    }

    async fn find_by_key_and_type(&self, key: &str, model_type: ModelType) -> Result<Vec<Model>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|model| model.key == key && model.model_type == model_type)
            .collect())
    }

    async fn append_version(&self, id: &ModelId, version: NewVersion) -> Result<Model> {
        let _guard = self.write_lock.lock().await;
        let mut model = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImportError::ModelNotFound { id: id.to_string() })?;

        let previous = model.push_version(version, Utc::now());
        let history_path = self
            .history_dir(id)
            .join(format!("v{}.json", previous.version));
        Self::write_json(&history_path, &previous).await?;
        Self::write_json(&self.model_path(id), &model).await?;
        Ok(model)
    }

    async fn find_history(&self, id: &ModelId) -> Result<Vec<ModelHistory>> {
        let dir = self.history_dir(id);
        let mut history = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(history),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let data = tokio::fs::read(&path).await?;
            history.push(serde_json::from_slice::<ModelHistory>(&data)?);
        }
        history.sort_by_key(|entry| entry.version);
        Ok(history)
    }
}
