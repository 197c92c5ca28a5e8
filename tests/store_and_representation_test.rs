use anyhow::Result;
use modeler_import::domain::model::NewModel;
use modeler_import::{
    ErrorCategory, FileModelStore, ImportMode, InMemoryModelStore, ModelImporter,
    ModelRepresentation, ModelStore, ModelType,
};
use serde_json::json;
use tempfile::TempDir;

const ORDER: &str = r#"<definitions>
  <process id="order" name="Order">
    <startEvent id="start"/>
    <endEvent id="end"/>
    <sequenceFlow id="flow" sourceRef="start" targetRef="end"/>
  </process>
</definitions>"#;

/// 測試依副檔名自動分派，未知副檔名不解析內容
#[tokio::test]
async fn test_generic_import_dispatches_by_extension() -> Result<()> {
    let importer = ModelImporter::new(InMemoryModelStore::new());

    let representation = importer.import(ORDER.as_bytes(), "order.bpmn20.xml").await?;
    assert_eq!(representation.summary().model_type, ModelType::Process);

    // Not XML at all: only the file name is looked at.
    let err = importer.import(b"\x00\x01", "order.txt").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::BadRequest);
    assert_eq!(
        err.to_string(),
        "Invalid file name, only .bpmn, .bpmn20.xml, .cmmn, .cmmn.xml, .dmn and .dmn.xml files are supported not order.txt"
    );

    // A case document handed to the process entrypoint is rejected by name.
    let err = importer
        .import_process(b"\x00\x01", "claim.cmmn", ImportMode::Create)
        .await
        .unwrap_err();
    assert!(err.to_string().ends_with("not claim.cmmn"));
    assert_eq!(importer.store().models().await.len(), 1);
    Ok(())
}

/// 測試應用程式模型的表示方式
#[tokio::test]
async fn test_app_representation() -> Result<()> {
    let store = InMemoryModelStore::new();
    let app = store
        .create(NewModel {
            key: "sales".to_string(),
            name: "Sales app".to_string(),
            description: None,
            model_type: ModelType::App,
            payload: json!({
                "models": [{"id": "m1", "name": "Order", "version": 2}],
                "theme": "theme-4",
                "icon": "glyphicon-asterisk"
            }),
            author: "admin".to_string(),
        })
        .await?;
    let broken = store
        .create(NewModel {
            key: "broken".to_string(),
            name: "Broken app".to_string(),
            description: None,
            model_type: ModelType::App,
            payload: json!({"models": 42}),
            author: "admin".to_string(),
        })
        .await?;

    let importer = ModelImporter::new(store);
    match importer.representation(&app.id).await? {
        ModelRepresentation::App {
            summary,
            app_definition,
        } => {
            assert_eq!(summary.key, "sales");
            assert_eq!(app_definition.models.len(), 1);
            assert_eq!(app_definition.models[0].version, Some(2));
            assert_eq!(app_definition.icon.as_deref(), Some("glyphicon-asterisk"));
        }
        other => panic!("expected app representation, got {:?}", other),
    }

    let err = importer.representation(&broken.id).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Internal);
    assert_eq!(err.user_friendly_message(), "Could not deserialize app definition");
    Ok(())
}

/// 測試檔案儲存庫：匯入後可由新的實例讀回
#[tokio::test]
async fn test_file_store_backed_import() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let id = {
        let importer = ModelImporter::new(FileModelStore::new(temp_dir.path()));
        let created = importer
            .import_process(ORDER.as_bytes(), "order.bpmn", ImportMode::Create)
            .await?;
        importer
            .import_process(ORDER.as_bytes(), "order.bpmn", ImportMode::NewVersion)
            .await?;
        created.summary().id.clone()
    };

    let reopened = ModelImporter::new(FileModelStore::new(temp_dir.path()));
    let representation = reopened.representation(&id).await?;
    assert_eq!(representation.summary().version, 2);
    assert_eq!(representation.summary().key, "order");

    let history = reopened.history(&id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, 1);

    let err = reopened
        .import_process(ORDER.as_bytes(), "order.bpmn", ImportMode::Create)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    Ok(())
}
