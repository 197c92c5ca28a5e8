use crate::core::importer::{ImportSettings, DEFAULT_VERSION_COMMENT};
use crate::core::layout::LayoutSettings;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_dimension, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const STORE_KINDS: [&str; 2] = ["file", "memory"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub layout: LayoutSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: String,
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: "file".to_string(),
            path: "./models".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub author: String,
    pub version_comment: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            author: "admin".to_string(),
            version_comment: DEFAULT_VERSION_COMMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ImporterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ImportError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_STORE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            author: self.import.author.clone(),
            version_comment: self.import.version_comment.clone(),
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.store.kind == "memory"
    }
}

impl Validate for ImporterConfig {
    fn validate(&self) -> Result<()> {
        validate_one_of("store.kind", &self.store.kind, &STORE_KINDS)?;
        if !self.uses_memory_store() {
            validate_path("store.path", &self.store.path)?;
        }

        validate_non_empty_string("import.author", &self.import.author)?;
        validate_non_empty_string("import.version_comment", &self.import.version_comment)?;

        let layout = &self.layout;
        validate_positive_dimension("layout.task_width", layout.task_width)?;
        validate_positive_dimension("layout.task_height", layout.task_height)?;
        validate_positive_dimension("layout.event_size", layout.event_size)?;
        validate_positive_dimension("layout.gateway_size", layout.gateway_size)?;
        validate_positive_dimension("layout.horizontal_gap", layout.horizontal_gap)?;
        validate_positive_dimension("layout.vertical_gap", layout.vertical_gap)?;

        validate_one_of("logging.level", &self.logging.level, &LOG_LEVELS)
    }
}
