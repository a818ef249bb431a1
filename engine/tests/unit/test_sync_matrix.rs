//! Synchronization matrix tests

use std::path::PathBuf;
use std::sync::Arc;

use dresktop::exec::{LogStream, ProcessExecutor};
use dresktop::filesys::dir::Dir;
use dresktop::models::environment::Environment;
use dresktop::storage::settings::Settings;
use dresktop::sync::SyncMatrix;
use dresktop::Message;

use crate::support::{cloud, desktop, engine_at, project, Call};

#[tokio::test]
async fn test_desktop_export_pipes_into_host_file() {
    let home = tempfile::tempdir().unwrap();
    let exports = home.path().join("exports");
    let (engine, executor) = engine_at(home.path(), None).await;

    let message = engine
        .export_database(&project(), &desktop("local", home.path()), &exports, None)
        .await;

    assert!(message.is_success());
    let dump = PathBuf::from(message.data().unwrap());
    assert_eq!(dump.parent(), Some(exports.as_path()));
    let name = dump.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("shop.local."));
    assert!(name.ends_with(".sql.gz"));
    assert_eq!(message.message(), format!("Database dump exported at {}", dump.display()));

    let commands = executor.commands();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains("--databases drupal"));
    assert!(commands[0].starts_with("bash -o pipefail -c 'docker exec db.local.shop.drt "));
    assert!(commands[0].contains("s/utf8mb4_uca1400_ai_ci/utf8mb4_unicode_ci/g"));
    assert!(commands[0].ends_with(&format!("| gzip' > {}", dump.display())));
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_desktop_dump_is_not_masked_by_gzip() {
    let home = tempfile::tempdir().unwrap();
    let exports = home.path().join("exports");

    let mut settings = Settings::default();
    settings.runtime.container_program = "false".to_string();
    let executor = ProcessExecutor::new(&settings.runtime, &settings.ssh);
    let matrix = SyncMatrix::new(Arc::new(executor), settings, Dir::new(home.path().join("tmp")));

    let message = matrix
        .export_database(&project(), &desktop("local", home.path()), &exports, &LogStream::silent())
        .await;

    assert!(!message.is_success());
    assert_eq!(message.data(), None);
    // The redirect created the file before the dump failed
    assert_eq!(std::fs::read_dir(&exports).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cloud_export_fetches_and_cleans_up() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;

    let message = engine
        .export_database(&project(), &cloud("prod", "example.org"), home.path(), None)
        .await;
    assert!(message.is_success(), "{}", message.message());
    let dump = PathBuf::from(message.data().unwrap());
    assert!(dump.is_file());

    let name = dump.file_name().unwrap().to_string_lossy().into_owned();
    let remote = format!("/tmp/{}", name);
    assert_eq!(
        executor.calls(),
        vec![
            Call::Remote {
                command: format!(
                    "export PATH=$PATH:/var/www/shop/vendor/bin && drush sql:dump --gzip > {}",
                    remote
                ),
                host: "example.org".to_string(),
            },
            Call::Fetch {
                remote: remote.clone(),
                local: dump.clone(),
            },
            Call::Remote {
                command: format!("rm -f {}", remote),
                host: "example.org".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_failed_cloud_dump_is_not_fetched() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    executor.respond("sql:dump", Message::failure("Access denied"));

    let message = engine
        .export_database(&project(), &cloud("prod", "example.org"), home.path(), None)
        .await;

    assert!(!message.is_success());
    assert_eq!(message.message(), "Access denied");
    assert!(message.data().is_none());
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_import_of_missing_dump_runs_nothing() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;

    let missing = home.path().join("nope.sql.gz");
    let message = engine
        .import_database(&project(), &desktop("local", home.path()), &missing, None)
        .await;

    assert!(!message.is_success());
    assert!(message.message().ends_with("does not exist"));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_desktop_import_copies_loads_and_removes() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    let dump = home.path().join("shop.stage.1.sql.gz");
    std::fs::write(&dump, b"dump").unwrap();

    let message = engine
        .import_database(&project(), &desktop("local", home.path()), &dump, None)
        .await;
    assert!(message.is_success(), "{}", message.message());
    assert_eq!(
        message.message(),
        format!("Database dump {} imported into local", dump.display())
    );

    let commands = executor.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(
        commands[0],
        format!("docker cp {} db.local.shop.drt:/tmp/shop.stage.1.sql.gz", dump.display())
    );
    assert!(commands[1].starts_with("docker exec -i db.local.shop.drt bash -c"));
    assert!(commands[1].contains("gzip -dc /tmp/shop.stage.1.sql.gz"));
    assert_eq!(commands[2], "docker exec db.local.shop.drt rm /tmp/shop.stage.1.sql.gz");
}

#[tokio::test]
async fn test_cloud_import_removes_upload_after_failure() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    executor.respond("sql:cli", Message::failure("ERROR 1064"));
    let dump = home.path().join("shop.local.1.sql");
    std::fs::write(&dump, b"dump").unwrap();

    let message = engine
        .import_database(&project(), &cloud("prod", "example.org"), &dump, None)
        .await;

    assert!(!message.is_success());
    let calls = executor.calls();
    assert_eq!(
        calls[0],
        Call::Push {
            local: dump.clone(),
            remote: "/tmp/shop.local.1.sql".to_string(),
        }
    );
    assert!(calls[1]
        .command()
        .unwrap()
        .ends_with("drush sql:cli < /tmp/shop.local.1.sql"));
    assert_eq!(calls[2].command(), Some("rm -f /tmp/shop.local.1.sql"));
}

#[tokio::test]
async fn test_database_sync_stages_and_deletes_dump() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;

    let source = cloud("prod", "example.org");
    let destination = desktop("local", home.path());
    let message = engine
        .sync_database(&project(), &destination, &source, None)
        .await;

    assert!(message.is_success(), "{}", message.message());
    assert_eq!(message.message(), "Database synchronized from prod to local");

    let staged = executor
        .calls()
        .iter()
        .find_map(|call| match call {
            Call::Fetch { local, .. } => Some(local.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(staged.parent(), Some(engine.layout().tmp_dir().path()));
    assert!(!staged.exists());
    // dump, fetch, remote cleanup, copy, import, container cleanup
    assert_eq!(executor.calls().len(), 6);
}

#[tokio::test]
async fn test_database_sync_stops_when_export_fails() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    executor.respond("mariadb-dump", Message::failure("container not running"));

    let message = engine
        .sync_database(
            &project(),
            &cloud("prod", "example.org"),
            &desktop("local", home.path()),
            None,
        )
        .await;

    assert!(!message.is_success());
    assert_eq!(message.message(), "container not running");
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_files_matrix_runs_one_local_command_per_route() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;

    let local = desktop("local", &home.path().join("local"));
    let other = desktop("review", &home.path().join("review"));
    let stage = cloud("stage", "stage.example.org");
    let prod = cloud("prod", "example.org");

    let routes: [(&Environment, &Environment); 4] =
        [(&local, &other), (&prod, &local), (&local, &prod), (&stage, &prod)];
    for (source, destination) in routes {
        assert!(engine.sync_files(destination, source, None).await.is_success());
    }

    let calls = executor.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls
        .iter()
        .all(|call| matches!(call, Call::Local { working_dir: None, .. })));

    let commands = executor.commands();
    assert!(commands[0].starts_with("docker run --rm -v"));
    assert!(!commands[0].contains("/keys/id_rsa"));
    assert!(commands[1].contains("/home/dev/.ssh/id_rsa:/keys/id_rsa"));
    assert!(commands[1].contains("deploy@example.org:/var/www/shop/web/sites/default/files/"));
    assert!(commands[2].ends_with("deploy@example.org:/var/www/shop/web/sites/default/files/"));
    assert!(commands[3].starts_with("ssh -A -i /home/dev/.ssh/id_rsa"));
    assert!(commands[3].contains("-R localhost:50000:example.org:22"));
    assert!(commands[3].contains("deploy@stage.example.org"));
}
