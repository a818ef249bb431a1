//! Infrastructure manager tests

use std::collections::BTreeMap;

use dresktop::errors::EngineError;
use dresktop::filesys::file::File;
use dresktop::infra::TopologyDocument;
use dresktop::Message;

use crate::support::{cloud, desktop, engine_at, project};

fn enabled(services: &[&str]) -> BTreeMap<String, bool> {
    services.iter().map(|s| (s.to_string(), true)).collect()
}

#[tokio::test]
async fn test_create_namespaces_the_document() {
    let home = tempfile::tempdir().unwrap();
    let root = home.path().join("shop");
    let (engine, executor) = engine_at(home.path(), None).await;

    let mut services = enabled(&["mail"]);
    services.insert("adminer".to_string(), false);
    let path = engine
        .create_infrastructure(&project(), &desktop("local", &root), &services)
        .await
        .unwrap();

    assert_eq!(path, engine.layout().infrastructure_file("local.shop").path());
    assert!(executor.calls().is_empty());

    let document = TopologyDocument::load(&File::new(&path)).await.unwrap();
    assert_eq!(document.service_names(), vec!["drupal", "database", "mail"]);
    assert_eq!(document.container_name("drupal"), Some("local.shop.drt"));
    assert_eq!(document.public_hostname("drupal"), Some("local.shop.drt.localhost"));
    assert_eq!(document.container_name("database"), Some("db.local.shop.drt"));
    assert_eq!(document.container_name("mail"), Some("mail.local.shop.drt"));
    assert_eq!(document.public_hostname("mail"), Some("mail.local.shop.drt.localhost"));
    assert_eq!(
        document.primary_volume("drupal"),
        Some(format!("{}:/opt/drupal", root.display()).as_str())
    );
}

#[tokio::test]
async fn test_cloud_environments_have_no_infrastructure() {
    let home = tempfile::tempdir().unwrap();
    let (engine, _) = engine_at(home.path(), None).await;

    let result = engine
        .create_infrastructure(&project(), &cloud("prod", "example.org"), &BTreeMap::new())
        .await;
    assert!(matches!(result, Err(EngineError::ConfigError(_))));
}

#[tokio::test]
async fn test_create_without_base_template_fails() {
    let home = tempfile::tempdir().unwrap();
    let (engine, _) = engine_at(home.path(), None).await;
    engine.layout().base_template().delete().await.unwrap();

    let result = engine
        .create_infrastructure(&project(), &desktop("local", home.path()), &BTreeMap::new())
        .await;
    assert!(matches!(result, Err(EngineError::DocumentError(_))));
}

#[tokio::test]
async fn test_build_brings_the_document_up() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;

    let (path, message) = engine
        .build_infrastructure(&project(), &desktop("local", home.path()), &BTreeMap::new(), None)
        .await
        .unwrap();

    assert!(message.is_success());
    assert_eq!(
        executor.commands(),
        vec![format!("docker compose -f {} up -d --remove-orphans", path.display())]
    );
}

#[tokio::test]
async fn test_activate_is_idempotent() {
    let home = tempfile::tempdir().unwrap();
    let (engine, _) = engine_at(home.path(), None).await;
    let project = project();
    let environment = desktop("local", home.path());
    let path = engine
        .create_infrastructure(&project, &environment, &BTreeMap::new())
        .await
        .unwrap();

    assert!(engine.activate(&project, &environment, "adminer", true, &path).await.unwrap());
    assert!(!engine.activate(&project, &environment, "adminer", true, &path).await.unwrap());

    let document = TopologyDocument::load(&File::new(&path)).await.unwrap();
    assert_eq!(document.container_name("adminer"), Some("adminer.local.shop.drt"));
    assert_eq!(document.public_hostname("adminer"), Some("adminer.local.shop.drt.localhost"));

    assert!(engine.activate(&project, &environment, "adminer", false, &path).await.unwrap());
    assert!(!engine.activate(&project, &environment, "adminer", false, &path).await.unwrap());
    let document = TopologyDocument::load(&File::new(&path)).await.unwrap();
    assert!(!document.has_service("adminer"));
}

#[tokio::test]
async fn test_activate_rejects_core_and_unknown_services() {
    let home = tempfile::tempdir().unwrap();
    let (engine, _) = engine_at(home.path(), None).await;
    let project = project();
    let environment = desktop("local", home.path());
    let path = engine
        .create_infrastructure(&project, &environment, &BTreeMap::new())
        .await
        .unwrap();

    let core = engine.activate(&project, &environment, "database", false, &path).await;
    assert!(matches!(core, Err(EngineError::ConfigError(_))));

    let unknown = engine.activate(&project, &environment, "redis", true, &path).await;
    assert!(matches!(unknown, Err(EngineError::DocumentError(_))));
}

#[tokio::test]
async fn test_status_parses_runtime_output() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    executor.respond(
        "ps --all --format json",
        Message::success(concat!(
            "{\"Name\":\"local.shop.drt\",\"Service\":\"drupal\",\"State\":\"running\"}\n",
            "\n",
            "{\"Name\":\"db.local.shop.drt\",\"Service\":\"database\",\"State\":\"exited\"}\n",
            "time=\"2024-07-21\" level=warning msg=\"version is obsolete\"",
        )),
    );

    let path = engine.layout().infrastructure_file("local.shop").path().to_path_buf();
    let status = engine.status(&path).await;

    assert!(status.success);
    assert_eq!(status.entries.len(), 3);
    assert_eq!(status.running(), 1);
    assert_eq!(status.entries[1].name(), Some("db.local.shop.drt"));
    assert!(!status.entries[2].is_container());
}

#[tokio::test]
async fn test_destroy_removes_the_document_directory() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    let path = engine
        .create_infrastructure(&project(), &desktop("local", home.path()), &BTreeMap::new())
        .await
        .unwrap();

    let message = engine.destroy_infrastructure(&path, None).await.unwrap();

    assert!(message.is_success());
    assert!(executor.commands()[0].ends_with(" down"));
    assert!(!path.exists());
    assert!(!engine.layout().infrastructure_dir("local.shop").path().exists());
}
