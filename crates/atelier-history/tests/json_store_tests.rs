//! Version store over the JSON file backend.

use atelier_history::{Config, HistoryConfig, TracingErrorPolicy, VersionStore};
use atelier_storage::json::project_storage;
use atelier_test_utils::assertions::assert_newest_first;
use atelier_test_utils::fixtures::{shirt_front, sketched_skirt};
use atelier_test_utils::TestProject;
use std::sync::Arc;

fn open_store(root: &std::path::Path, config: &HistoryConfig) -> VersionStore {
    VersionStore::from_config(
        Arc::new(project_storage(root)),
        Arc::new(TracingErrorPolicy),
        config,
    )
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let project = TestProject::new().build();
    let config = HistoryConfig::default();

    let saved = {
        let store = open_store(project.path(), &config);
        store.save_version("dsn_shirt", shirt_front()).await.unwrap();
        store.save_version("dsn_shirt", sketched_skirt()).await.unwrap()
    };

    let store = open_store(project.path(), &config);
    let versions = store.get_versions("dsn_shirt").await;
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0], saved);
    assert_newest_first(&versions);
}

#[tokio::test]
async fn test_reads_existing_history() {
    let project = TestProject::new()
        .with_versions("dsn_skirt", vec![shirt_front(), sketched_skirt()])
        .build();
    let store = open_store(project.path(), &HistoryConfig::default());

    let latest = store.latest_version("dsn_skirt").await.unwrap();
    assert_eq!(latest.data(), &sketched_skirt());
    assert_eq!(store.list_designs().await.unwrap(), vec!["dsn_skirt"]);
}

#[tokio::test]
async fn test_on_disk_layout() {
    let project = TestProject::new().build();
    let store = open_store(project.path(), &HistoryConfig::default());
    let version = store.save_version("dsn_1", shirt_front()).await.unwrap();

    let path = project.history_dir().join("versions").join("dsn_1.json");
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    let entry = &raw[0];
    assert_eq!(entry["id"], version.id().as_str());
    assert_eq!(entry["designId"], "dsn_1");
    assert_eq!(entry["size"], version.size());
    assert!(entry["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(entry["data"]["fabricId"], "fab_oxford");
}

#[tokio::test]
async fn test_project_config_sets_retention() {
    let project = TestProject::new()
        .with_config(
            r#"{
                // keep the last two saves only
                "history": { "maxVersions": 2 }
            }"#,
        )
        .build();

    let (config, sources) = Config::load_from(None, None, Some(project.path()))
        .await
        .unwrap();
    assert_eq!(sources, vec![project.path().join("atelier.json")]);

    let store = open_store(project.path(), &config.history_config().unwrap());
    for _ in 0..4 {
        store.save_version("dsn_1", shirt_front()).await.unwrap();
    }
    assert_eq!(project.read_versions("dsn_1").len(), 2);
}
