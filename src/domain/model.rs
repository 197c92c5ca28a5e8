use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Persisted identity of a model, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub Uuid);

impl ModelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for ModelId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelType {
    Process,
    Case,
    DecisionTable,
    DecisionService,
    App,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Process => "process",
            ModelType::Case => "case",
            ModelType::DecisionTable => "decisionTable",
            ModelType::DecisionService => "decisionService",
            ModelType::App => "app",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest version of a stored model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: ModelId,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub model_type: ModelType,
    pub payload: serde_json::Value,
    pub version: u32,
    pub comment: Option<String>,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub last_updated: DateTime<Utc>,
    pub last_updated_by: String,
}

/// A superseded version, kept verbatim when a new version is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHistory {
    pub model_id: ModelId,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub model_type: ModelType,
    pub payload: serde_json::Value,
    pub version: u32,
    pub comment: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub last_updated_by: String,
}

impl From<&Model> for ModelHistory {
    fn from(model: &Model) -> Self {
        Self {
            model_id: model.id.clone(),
            key: model.key.clone(),
            name: model.name.clone(),
            description: model.description.clone(),
            model_type: model.model_type,
            payload: model.payload.clone(),
            version: model.version,
            comment: model.comment.clone(),
            last_updated: model.last_updated,
            last_updated_by: model.last_updated_by.clone(),
        }
    }
}

/// Everything the store needs to create a model at version 1.
#[derive(Debug, Clone)]
pub struct NewModel {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub model_type: ModelType,
    pub payload: serde_json::Value,
    pub author: String,
}

impl NewModel {
    pub fn into_model(self, id: ModelId, now: DateTime<Utc>) -> Model {
        Model {
            id,
            key: self.key,
            name: self.name,
            description: self.description,
            model_type: self.model_type,
            payload: self.payload,
            version: 1,
            comment: None,
            created: now,
            created_by: self.author.clone(),
            last_updated: now,
            last_updated_by: self.author,
        }
    }
}

/// Payload and audit data for a new-version append.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub payload: serde_json::Value,
    pub comment: String,
    pub author: String,
}

impl Model {
    /// Applies a new version in place, returning the snapshot it supersedes.
    pub fn push_version(&mut self, version: NewVersion, now: DateTime<Utc>) -> ModelHistory {
        let previous = ModelHistory::from(&*self);
        self.payload = version.payload;
        self.version += 1;
        self.comment = Some(version.comment);
        self.last_updated = now;
        self.last_updated_by = version.author;
        previous
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDefinition {
    pub models: Vec<AppModelDefinition>,
    pub cmmn_models: Vec<AppModelDefinition>,
    pub theme: Option<String>,
    pub icon: Option<String>,
    pub users_access: Option<String>,
    pub groups_access: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppModelDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub model_type: Option<ModelType>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Read-side projection shared by every model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: ModelId,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub model_type: ModelType,
    pub version: u32,
    pub comment: Option<String>,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub last_updated: DateTime<Utc>,
    pub last_updated_by: String,
}

impl From<&Model> for ModelSummary {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id.clone(),
            key: model.key.clone(),
            name: model.name.clone(),
            description: model.description.clone(),
            model_type: model.model_type,
            version: model.version,
            comment: model.comment.clone(),
            created: model.created,
            created_by: model.created_by.clone(),
            last_updated: model.last_updated,
            last_updated_by: model.last_updated_by.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModelRepresentation {
    Model {
        #[serde(flatten)]
        summary: ModelSummary,
    },
    App {
        #[serde(flatten)]
        summary: ModelSummary,
        #[serde(rename = "appDefinition")]
        app_definition: AppDefinition,
    },
}

impl ModelRepresentation {
    pub fn summary(&self) -> &ModelSummary {
        match self {
            ModelRepresentation::Model { summary } | ModelRepresentation::App { summary, .. } => {
                summary
            }
        }
    }
}
