//! Allure results produced from the workspace.

use std::io::{Cursor, Read};

use serde_json::{Value, json};
use test_case_studio_lib::config::{Config, ExportSettings};
use test_case_studio_lib::services::Workspace;
use zip::ZipArchive;

use super::test_helpers::*;

async fn allure_documents(workspace: &Workspace) -> Vec<(String, Value)> {
    let archive = workspace.export_allure().await.unwrap().unwrap();
    let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();

    let mut documents = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        documents.push((file.name().to_string(), serde_json::from_str(&content).unwrap()));
    }
    documents
}

fn by_name<'a>(documents: &'a [(String, Value)], name: &str) -> &'a (String, Value) {
    documents
        .iter()
        .find(|(_, doc)| doc["name"] == name)
        .unwrap()
}

#[tokio::test]
async fn test_one_document_per_record_named_by_uuid() {
    let (workspace, _, _) = seeded_workspace();
    let documents = allure_documents(&workspace).await;

    assert_eq!(documents.len(), 2);
    for (file_name, doc) in &documents {
        assert_eq!(
            file_name,
            &format!("{}-result.json", doc["uuid"].as_str().unwrap())
        );
    }
}

#[tokio::test]
async fn test_login_document() {
    let (workspace, login, _) = seeded_workspace();
    let documents = allure_documents(&workspace).await;
    let (_, doc) = by_name(&documents, "Login test");

    assert_eq!(doc["fullName"], "TestClass.Logintest");
    assert_eq!(doc["status"], "failed");
    assert_ne!(doc["uuid"], login.as_str());
    assert_eq!(doc["parameters"], json!([]));
    assert!(doc["stop"].as_i64().unwrap() >= doc["start"].as_i64().unwrap());

    assert_eq!(
        doc["labels"],
        json!([
            {"name": "epic", "value": "Auth"},
            {"name": "feature", "value": "Sign in"},
            {"name": "severity", "value": "critical"},
            {"name": "priority", "value": "medium"},
            {"name": "owner", "value": "qa-team"},
            {"name": "tag", "value": "smoke"},
            {"name": "tag", "value": "regression"},
        ])
    );
    assert_eq!(
        doc["links"],
        json!([
            {"name": "Issue", "url": "https://issues.example.com/AUTH-1", "type": "issue"},
            {"name": "Test Case", "url": "https://tms.example.com/TC-7", "type": "tms"},
        ])
    );

    let steps = doc["steps"].as_array().unwrap();
    assert_eq!(
        steps[0]["attachments"],
        json!([{"name": "open.png", "source": "https://cdn.example.com/shots/open.png"}])
    );
    assert_eq!(
        steps[1]["statusDetails"],
        json!({"message": "Bug link: https://issues.example.com/AUTH-2"})
    );
    assert_eq!(
        steps[2]["statusDetails"],
        json!({"trace": "Skip reason: No second factor configured"})
    );
}

#[tokio::test]
async fn test_namespace_comes_from_config() {
    let config = Config::from_lookup(|key| match key {
        "TCS_ALLURE_NAMESPACE" => Some("Checkout".to_string()),
        _ => None,
    })
    .unwrap();
    let mut workspace = Workspace::from_config(&config);
    workspace.create(login_fields(), Vec::new()).unwrap();

    let documents = allure_documents(&workspace).await;

    assert_eq!(documents[0].1["fullName"], "Checkout.Logintest");
}

#[tokio::test]
async fn test_zero_durations() {
    let mut workspace = Workspace::new(ExportSettings {
        max_step_duration_ms: 0,
        max_test_duration_ms: 0,
        ..ExportSettings::default()
    });
    workspace.create(login_fields(), login_steps()).unwrap();

    let documents = allure_documents(&workspace).await;
    let doc = &documents[0].1;

    assert_eq!(doc["start"], doc["stop"]);
    for step in doc["steps"].as_array().unwrap() {
        assert_eq!(step["start"], doc["start"]);
        assert_eq!(step["stop"], doc["start"]);
    }
}
