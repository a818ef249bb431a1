//! Host bootstrap tests

use dresktop::Message;

use crate::support::engine_at;

const PROXY: &str = include_str!("../../resources/infrastructure/dresktop/caddy.yml");

#[tokio::test]
async fn test_existing_network_is_not_recreated() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    engine.layout().proxy_file().write_string(PROXY).await.unwrap();
    executor.respond("network ls", Message::success("dresktop_network_external\n"));

    let checks = engine.bootstrap(None).await;

    assert!(checks.iter().all(|c| c.result.is_success()));
    let commands = executor.commands();
    assert_eq!(commands.len(), 3);
    assert!(!commands.iter().any(|c| c.contains("network create")));
    assert_eq!(commands[1], "docker pull jdeg/dresktop-rsync");
    assert!(commands[2].contains("caddy.yml"));
}

#[tokio::test]
async fn test_missing_network_is_created() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    engine.layout().proxy_file().write_string(PROXY).await.unwrap();

    let checks = engine.bootstrap(None).await;

    assert_eq!(checks[0].name, "network");
    assert_eq!(checks[0].result.message(), "Network dresktop_network_external created");
    assert_eq!(
        executor.commands()[1],
        "docker network create dresktop_network_external"
    );
}

#[tokio::test]
async fn test_every_check_runs_after_a_failure() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    executor.respond("network ls", Message::failure("Cannot connect to the Docker daemon"));

    let checks = engine.bootstrap(None).await;

    let names: Vec<_> = checks.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["network", "sync-image", "proxy"]);
    assert!(!checks[0].result.is_success());
    assert!(checks[1].result.is_success());
    // No proxy topology was installed
    assert!(!checks[2].result.is_success());
    assert_eq!(executor.commands().len(), 2);
}
