use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid file name, only {supported} files are supported not {file_name}")]
    UnsupportedFileName {
        file_name: String,
        supported: &'static str,
    },

    #[error("Import failed for {file_name}, error message {message}")]
    ParseError { file_name: String, message: String },

    #[error("{message}")]
    InvalidDefinition { message: String },

    #[error("Model not found: {id}")]
    ModelNotFound { id: String },

    #[error("Provided model key already exists: {key}")]
    KeyConflict { key: String },

    #[error("Provided model for version import not available: {key}")]
    VersionTargetMissing { key: String },

    #[error("Provided model key is not unique: {key}")]
    KeyNotUnique { key: String },

    #[error("Error reading decision model json: {source}")]
    DecisionTableJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Decision table {local_id} referenced by the decision service was never extracted")]
    UnresolvedDecisionTable { local_id: String },

    #[error("Could not deserialize app definition for model {model_id}: {source}")]
    AppDefinition {
        model_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// How a failure is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The uploaded input (or configuration) is at fault.
    BadRequest,
    /// The input collides with what is already stored.
    Conflict,
    /// A defect or corrupted stored data.
    Internal,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::UnsupportedFileName { .. }
            | ImportError::ParseError { .. }
            | ImportError::InvalidDefinition { .. }
            | ImportError::ModelNotFound { .. }
            | ImportError::ConfigError { .. }
            | ImportError::InvalidConfigValueError { .. } => ErrorCategory::BadRequest,

            ImportError::KeyConflict { .. }
            | ImportError::VersionTargetMissing { .. }
            | ImportError::KeyNotUnique { .. } => ErrorCategory::Conflict,

            ImportError::DecisionTableJson { .. }
            | ImportError::UnresolvedDecisionTable { .. }
            | ImportError::AppDefinition { .. }
            | ImportError::StorageError { .. }
            | ImportError::IoError(_)
            | ImportError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    /// Message shown to the caller. Internal faults stay opaque.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Internal => match self {
                ImportError::AppDefinition { .. } => {
                    "Could not deserialize app definition".to_string()
                }
                ImportError::DecisionTableJson { .. } => {
                    "Error reading decision model json".to_string()
                }
                _ => "An internal error occurred while importing the model".to_string(),
            },
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::UnsupportedFileName { .. } => {
                "Rename the file with one of the supported extensions"
            }
            ImportError::ParseError { .. } => "Check that the document is well-formed XML",
            ImportError::InvalidDefinition { .. } => {
                "Add the missing element or diagram information and upload again"
            }
            ImportError::ModelNotFound { .. } => "Check the model id",
            ImportError::KeyConflict { .. } => {
                "Change the definition id or import it as a new version"
            }
            ImportError::VersionTargetMissing { .. } => {
                "Import the definition without the new-version flag first"
            }
            ImportError::KeyNotUnique { .. } => {
                "Several models share this key; resolve the duplicates in the store"
            }
            ImportError::ConfigError { .. } | ImportError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            _ => "Check the logs for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
