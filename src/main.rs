use anyhow::Context;
use clap::Parser;
use modeler_import::config::{Cli, Command, ImporterConfig};
use modeler_import::utils::{logger, monitor::ImportMonitor, validation::Validate};
use modeler_import::{
    ErrorCategory, FileModelStore, FlowLayout, ImportError, ImportMode, InMemoryModelStore,
    ModelId, ModelImporter, ModelStore,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 載入配置，命令列參數優先
    let mut config = match &cli.config {
        Some(path) => ImporterConfig::from_file(path).unwrap_or_else(|e| fail(&e)),
        None => ImporterConfig::default(),
    };
    if let Some(dir) = &cli.store_dir {
        config.store.kind = "file".to_string();
        config.store.path = dir.display().to_string();
    }
    if let Some(user) = &cli.user {
        config.import.author = user.clone();
    }
    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 初始化日誌
    let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    logger::init_logger(level, config.logging.json);
    tracing::info!("Starting modeler-import CLI");
    tracing::debug!("Config: {:?}", config);

    let monitor = ImportMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let layout = FlowLayout::new(config.layout.clone());
    let settings = config.import_settings();
    let result = if config.uses_memory_store() {
        let importer = ModelImporter::with_layout(InMemoryModelStore::new(), layout, settings);
        execute(&importer, &cli.command, &monitor).await?
    } else {
        let importer =
            ModelImporter::with_layout(FileModelStore::new(&config.store.path), layout, settings);
        execute(&importer, &cli.command, &monitor).await?
    };
    monitor.log_final_stats();

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

/// Outer error: the command could not start (unreadable input file). Inner
/// error: the import itself was rejected.
async fn execute<S: ModelStore>(
    importer: &ModelImporter<S>,
    command: &Command,
    monitor: &ImportMonitor,
) -> anyhow::Result<Result<serde_json::Value, ImportError>> {
    let outcome = match command {
        Command::Process { file, new_version } => {
            let mode = if *new_version {
                ImportMode::NewVersion
            } else {
                ImportMode::Create
            };
            let (bytes, name) = read_input(file).await?;
            importer.import_process(&bytes, &name, mode).await.and_then(to_json)
        }
        Command::Case { file } => {
            let (bytes, name) = read_input(file).await?;
            importer.import_case(&bytes, &name).await.and_then(to_json)
        }
        Command::DecisionService { file } => {
            let (bytes, name) = read_input(file).await?;
            importer.import_decision_service(&bytes, &name).await.and_then(to_json)
        }
        Command::Import { file } => {
            let (bytes, name) = read_input(file).await?;
            importer.import(&bytes, &name).await.and_then(to_json)
        }
        Command::Show { id } => match parse_id(id) {
            Ok(id) => importer.representation(&id).await.and_then(to_json),
            Err(e) => Err(e),
        },
        Command::History { id } => match parse_id(id) {
            Ok(id) => importer.history(&id).await.and_then(to_json),
            Err(e) => Err(e),
        },
    };
    monitor.log_stats("Command finished");
    Ok(outcome)
}

async fn read_input(path: &Path) -> anyhow::Result<(Vec<u8>, String)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((bytes, name))
}

fn parse_id(id: &str) -> Result<ModelId, ImportError> {
    id.parse().map_err(|_| ImportError::ModelNotFound { id: id.to_string() })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<serde_json::Value, ImportError> {
    serde_json::to_value(value).map_err(ImportError::from)
}

fn fail(e: &ImportError) -> ! {
    tracing::error!("❌ Import failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 依錯誤類別決定退出碼
    let exit_code = match e.category() {
        ErrorCategory::BadRequest => 1,
        ErrorCategory::Conflict => 2,
        ErrorCategory::Internal => 3,
    };
    std::process::exit(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_unserializable_output_is_an_internal_error() {
        let value = BTreeMap::from([(vec![1u8], "non-string key")]);
        let err = to_json(value).unwrap_err();
        assert!(matches!(err, ImportError::SerializationError(_)));
        assert_eq!(err.category(), ErrorCategory::Internal);

        assert_eq!(to_json(vec![1, 2]).unwrap(), serde_json::json!([1, 2]));
    }
}
