use anyhow::Result;
use modeler_import::{ErrorCategory, ImportError, InMemoryModelStore, ModelImporter, ModelStore, ModelType};
use serde_json::Value;

const ORDER: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
             xmlns:dmndi="https://www.omg.org/spec/DMN/20191111/DMNDI/"
             xmlns:dc="http://www.omg.org/spec/DMN/20180521/DC/"
             id="order_defs" name="Order decisions" namespace="http://example.com/order">
  <decision id="d1" name="Discount">
    <decisionTable id="t1" hitPolicy="FIRST">
      <input id="in1" label="Segment">
        <inputExpression typeRef="string"><text>segment</text></inputExpression>
      </input>
      <output id="out1" label="Discount" name="discount" typeRef="number"/>
      <rule>
        <inputEntry><text>== "gold"</text></inputEntry>
        <outputEntry><text>0.1</text></outputEntry>
      </rule>
      <rule>
        <inputEntry><text>-</text></inputEntry>
        <outputEntry><text>0</text></outputEntry>
      </rule>
    </decisionTable>
  </decision>
  <decision id="d2" name="Shipping">
    <decisionTable id="t2">
      <input id="in2" label="Weight">
        <inputExpression typeRef="number"><text>weight</text></inputExpression>
      </input>
      <output id="out2" name="cost" typeRef="number"/>
      <rule>
        <inputEntry><text>&lt; 10</text></inputEntry>
        <outputEntry><text>5</text></outputEntry>
      </rule>
    </decisionTable>
  </decision>
  <decisionService id="order_service" name="Order pricing">
    <description>Prices an order</description>
    <outputDecision href="#d1"/>
    <encapsulatedDecision href="#d2"/>
  </decisionService>
  <dmndi:DMNDI>
    <dmndi:DMNDiagram id="drd">
      <dmndi:DMNShape dmnElementRef="order_service"><dc:Bounds x="0" y="0" width="400" height="300"/></dmndi:DMNShape>
      <dmndi:DMNShape dmnElementRef="d1"><dc:Bounds x="40" y="40" width="120" height="80"/></dmndi:DMNShape>
      <dmndi:DMNShape dmnElementRef="d2"><dc:Bounds x="40" y="180" width="120" height="80"/></dmndi:DMNShape>
    </dmndi:DMNDiagram>
  </dmndi:DMNDI>
</definitions>"##;

fn decision_shapes(payload: &Value) -> Vec<Value> {
    payload["childShapes"][0]["childShapes"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// 測試決策服務匯入：每個決策都儲存為決策表，並由服務引用
#[tokio::test]
async fn test_decision_service_references_stored_tables() -> Result<()> {
    let importer = ModelImporter::new(InMemoryModelStore::new());
    let representation = importer
        .import_decision_service(ORDER.as_bytes(), "order.dmn")
        .await?;

    let summary = representation.summary();
    assert_eq!(summary.key, "order_service");
    assert_eq!(summary.name, "Order pricing");
    assert_eq!(summary.description.as_deref(), Some("Prices an order"));
    assert_eq!(summary.model_type, ModelType::DecisionService);

    let store = importer.store();
    let tables = store.models_of_type(ModelType::DecisionTable).await;
    let keys: Vec<_> = tables.iter().map(|table| table.key.as_str()).collect();
    assert_eq!(keys, vec!["d1", "d2"]);
    assert_eq!(tables[0].name, "Discount");
    assert_eq!(tables[0].payload["modelVersion"], "3");
    assert_eq!(tables[0].payload["rules"][0]["in1_operator"], "==");
    assert_eq!(tables[0].payload["rules"][0]["in1_expression"], "\"gold\"");
    assert_eq!(tables[1].payload["rules"][0]["in2_operator"], "<");

    let service = store.find_by_id(&summary.id).await?.expect("service stored");
    let decisions = decision_shapes(&service.payload);
    assert_eq!(decisions.len(), 2);
    for (shape, table) in decisions.iter().zip(&tables) {
        let reference = &shape["properties"]["decisiontablereference"];
        assert_eq!(reference["id"], table.id.to_string());
        assert_eq!(reference["key"], table.key.as_str());
        assert_eq!(reference["name"], table.name.as_str());
    }
    assert_eq!(decisions[0]["properties"]["section"], "output");
    assert_eq!(decisions[1]["properties"]["section"], "encapsulated");
    Ok(())
}

/// 測試相同輸入在不同儲存庫中產生相同結構
#[tokio::test]
async fn test_resolution_is_deterministic() -> Result<()> {
    let first = ModelImporter::new(InMemoryModelStore::new());
    let second = ModelImporter::new(InMemoryModelStore::new());
    first.import_decision_service(ORDER.as_bytes(), "order.dmn").await?;
    second.import_decision_service(ORDER.as_bytes(), "order.dmn").await?;

    let first_tables = first.store().models_of_type(ModelType::DecisionTable).await;
    let second_tables = second.store().models_of_type(ModelType::DecisionTable).await;
    assert_eq!(first_tables.len(), second_tables.len());
    for (a, b) in first_tables.iter().zip(&second_tables) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.name, b.name);
        assert_eq!(a.payload, b.payload);
    }

    let references = |tables: &[modeler_import::Model], payload: &Value| -> Vec<String> {
        decision_shapes(payload)
            .iter()
            .map(|shape| {
                let id = shape["properties"]["decisiontablereference"]["id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                tables
                    .iter()
                    .find(|table| table.id.to_string() == id)
                    .map(|table| table.key.clone())
                    .unwrap_or_default()
            })
            .collect()
    };
    let first_service = first.store().models_of_type(ModelType::DecisionService).await[0].clone();
    let second_service = second.store().models_of_type(ModelType::DecisionService).await[0].clone();
    assert_eq!(
        references(&first_tables, &first_service.payload),
        vec!["d1".to_string(), "d2".to_string()]
    );
    assert_eq!(
        references(&first_tables, &first_service.payload),
        references(&second_tables, &second_service.payload)
    );
    Ok(())
}

/// 測試重複匯入時在儲存決策表之前就回報衝突
#[tokio::test]
async fn test_duplicate_service_stores_nothing_new() -> Result<()> {
    let importer = ModelImporter::new(InMemoryModelStore::new());
    importer.import_decision_service(ORDER.as_bytes(), "order.dmn").await?;
    let before = importer.store().models().await.len();

    let err = importer
        .import_decision_service(ORDER.as_bytes(), "order.dmn.xml")
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(err.to_string(), "Provided model key already exists: order_service");
    assert_eq!(importer.store().models().await.len(), before);
    Ok(())
}

/// 測試決策服務文件的驗證
#[tokio::test]
async fn test_decision_service_validation() -> Result<()> {
    let importer = ModelImporter::new(InMemoryModelStore::new());

    let err = importer
        .import_decision_service(b"<definitions><decision id=\"d1\"/></definitions>", "none.dmn")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No decision services found in definition none.dmn");

    let without_di = r##"<definitions>
  <decision id="d1"/>
  <decisionService id="ds"><outputDecision href="#d1"/></decisionService>
</definitions>"##;
    let err = importer
        .import_decision_service(without_di.as_bytes(), "plain.dmn")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No DMN DI found in definition plain.dmn");
    assert!(importer.store().models().await.is_empty());
    Ok(())
}

/// 測試引用不存在的決策時中止匯入，已儲存的決策表保留
#[tokio::test]
async fn test_dangling_decision_reference_aborts() -> Result<()> {
    let dangling = r##"<definitions id="defs">
  <decision id="d1" name="Discount"/>
  <decisionService id="ds">
    <outputDecision href="#d1"/>
    <outputDecision href="#missing"/>
  </decisionService>
  <DMNDI><DMNDiagram>
    <DMNShape dmnElementRef="ds"><Bounds x="0" y="0" width="100" height="100"/></DMNShape>
  </DMNDiagram></DMNDI>
</definitions>"##;

    let importer = ModelImporter::new(InMemoryModelStore::new());
    let err = importer
        .import_decision_service(dangling.as_bytes(), "dangling.dmn")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UnresolvedDecisionTable { .. }));
    assert_eq!(err.category(), ErrorCategory::Internal);

    assert!(importer
        .store()
        .models_of_type(ModelType::DecisionService)
        .await
        .is_empty());
    assert_eq!(
        importer
            .store()
            .models_of_type(ModelType::DecisionTable)
            .await
            .len(),
        1
    );
    Ok(())
}

/// 測試決策表鍵值已存在時，在儲存任何決策表之前回報衝突
#[tokio::test]
async fn test_existing_decision_key_stores_nothing() -> Result<()> {
    let first = r##"<definitions id="first">
  <decision id="d1" name="Discount"/>
  <decisionService id="sa"><outputDecision href="#d1"/></decisionService>
  <DMNDI><DMNDiagram>
    <DMNShape dmnElementRef="sa"><Bounds x="0" y="0" width="100" height="100"/></DMNShape>
  </DMNDiagram></DMNDI>
</definitions>"##;
    let second = r##"<definitions id="second">
  <decision id="d0" name="Surcharge"/>
  <decision id="d1" name="Discount again"/>
  <decisionService id="sb">
    <outputDecision href="#d0"/>
    <outputDecision href="#d1"/>
  </decisionService>
  <DMNDI><DMNDiagram>
    <DMNShape dmnElementRef="sb"><Bounds x="0" y="0" width="100" height="100"/></DMNShape>
  </DMNDiagram></DMNDI>
</definitions>"##;

    let importer = ModelImporter::new(InMemoryModelStore::new());
    importer
        .import_decision_service(first.as_bytes(), "first.dmn")
        .await?;

    let err = importer
        .import_decision_service(second.as_bytes(), "second.dmn")
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(err.to_string(), "Provided model key already exists: d1");

    let tables = importer.store().models_of_type(ModelType::DecisionTable).await;
    let keys: Vec<_> = tables.iter().map(|table| table.key.as_str()).collect();
    assert_eq!(keys, vec!["d1"]);
    assert_eq!(tables[0].name, "Discount");
    assert_eq!(
        importer
            .store()
            .models_of_type(ModelType::DecisionService)
            .await
            .len(),
        1
    );
    Ok(())
}
