//! Deployment pipeline tests

use std::path::Path;

use chrono::NaiveDate;

use dresktop::deploy::pipeline::step_header;
use dresktop::deploy::plan::{CLEAR_CACHE, MAINTENANCE_ON};
use dresktop::deploy::{build_plan, deploy, DeployRunner, FailurePolicy, ReleaseTag};
use dresktop::exec::{Dispatcher, LogStream};
use dresktop::filesys::dir::Dir;
use dresktop::models::deployment::{keys, ActionSet, DeployRequest, DeploymentAction, Phase, VendorChoice, VendorTool};
use dresktop::storage::settings::Settings;
use dresktop::sync::SyncMatrix;
use dresktop::Message;

use crate::support::{cloud, desktop, engine_at, project, Call, RecordingExecutor};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn remote(command: &str, host: &str) -> Call {
    Call::Remote {
        command: command.to_string(),
        host: host.to_string(),
    }
}

#[tokio::test]
async fn test_release_tag_flow_between_cloud_hosts() {
    let executor = RecordingExecutor::new();
    executor.respond("git tag -a", Message::success(""));
    executor.respond("git tag", Message::success("v1.0\n2024-07-21\n2024-07-21.0\n"));

    let dispatcher = Dispatcher::new(executor.clone(), "docker");
    let sync = SyncMatrix::new(executor.clone(), Settings::default(), Dir::new("/tmp/dresktop-test"));
    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = cloud("prod", "example.org");
    let runner = DeployRunner::new(
        &dispatcher,
        &sync,
        &project,
        &source,
        &destination,
        "Release notes",
        day("2024-07-21"),
    );

    let steps = build_plan(&ActionSet::default(), Path::new("/backups"));
    let report = deploy(&runner, steps, FailurePolicy::Continue, &LogStream::silent()).await;

    assert!(report.succeeded());
    assert_eq!(
        runner.release_tag().await,
        Some(ReleaseTag::new(day("2024-07-21"), Some(1)))
    );
    assert_eq!(
        executor.calls(),
        vec![
            remote("git fetch --tags", "stage.example.org"),
            remote("git tag", "stage.example.org"),
            remote("git tag -a 2024-07-21.1 -m 'Release notes'", "stage.example.org"),
            remote("git push origin 2024-07-21.1", "stage.example.org"),
            remote("git fetch --tags", "example.org"),
            remote("git checkout 2024-07-21.1", "example.org"),
        ]
    );
}

#[tokio::test]
async fn test_conditional_steps_wrap_the_release() {
    let home = tempfile::tempdir().unwrap();
    let executor = RecordingExecutor::new();
    let dispatcher = Dispatcher::new(executor.clone(), "docker");
    let sync = SyncMatrix::new(executor.clone(), Settings::default(), Dir::new(home.path()));
    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = desktop("local", home.path());
    let runner = DeployRunner::new(&dispatcher, &sync, &project, &source, &destination, "r", day("2024-07-21"));

    let mut vendor = DeploymentAction::new(keys::VENDOR, true, Phase::Deployment);
    vendor.vendor = Some(VendorChoice {
        selected: VendorTool::Composer,
    });
    let actions = ActionSet::new([
        DeploymentAction::new(keys::MAINTENANCE_ON, true, Phase::PreDeployment),
        DeploymentAction::new(keys::CLEAR_CACHE, true, Phase::PostDeployment),
        DeploymentAction::new(keys::SANITIZE_DATABASE, false, Phase::PostDeployment),
        vendor,
    ]);

    let steps = build_plan(&actions, Path::new("/backups"));
    let report = deploy(&runner, steps, FailurePolicy::Continue, &LogStream::silent()).await;

    let titles: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Turn on Drupal maintenance mode",
            "Pull new tags in the source environment",
            "Gets the new tag name from the source",
            "Creates the new tag in the source environment",
            "Push new tag",
            "Pulls new tags in destination environment",
            "Checkout new tag",
            "Runs composer install",
            "Clear all Drupal caches",
        ]
    );
    for title in &titles {
        assert!(report.log.contains(&step_header(title)));
    }

    let commands = executor.commands();
    assert!(commands[0].starts_with("docker exec -i local.shop.drt bash <<'EOF'"));
    assert!(commands[0].contains(MAINTENANCE_ON));
    assert!(commands[7].contains("composer install"));
    assert!(commands[7].starts_with("docker exec -i local.shop.drt bash"));
    assert!(commands[8].contains(CLEAR_CACHE));

    // Tagging hits the source host, checkout the desktop working directory
    let checkout = executor.calls()[6].clone();
    assert_eq!(
        checkout,
        Call::Local {
            command: "git checkout 2024-07-21".to_string(),
            working_dir: Some(home.path().to_path_buf()),
        }
    );
}

#[tokio::test]
async fn test_continue_policy_runs_every_step() {
    let executor = RecordingExecutor::new();
    executor.respond("git push", Message::failure("rejected"));

    let dispatcher = Dispatcher::new(executor.clone(), "docker");
    let sync = SyncMatrix::new(executor.clone(), Settings::default(), Dir::new("/tmp/dresktop-test"));
    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = cloud("prod", "example.org");
    let runner = DeployRunner::new(&dispatcher, &sync, &project, &source, &destination, "r", day("2024-07-21"));

    let steps = build_plan(&ActionSet::default(), Path::new("/backups"));
    let report = deploy(&runner, steps, FailurePolicy::Continue, &LogStream::silent()).await;

    assert_eq!(report.outcomes.len(), 6);
    assert!(report.skipped.is_empty());

    let message = Message::from(report);
    assert!(!message.is_success());
    assert!(message.message().contains("rejected"));
    assert!(message.message().ends_with("\nFailed steps: Push new tag"));
}

#[tokio::test]
async fn test_halt_policy_skips_remaining_steps() {
    let executor = RecordingExecutor::new();
    executor.respond("git push", Message::failure("rejected"));

    let dispatcher = Dispatcher::new(executor.clone(), "docker");
    let sync = SyncMatrix::new(executor.clone(), Settings::default(), Dir::new("/tmp/dresktop-test"));
    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = cloud("prod", "example.org");
    let runner = DeployRunner::new(&dispatcher, &sync, &project, &source, &destination, "r", day("2024-07-21"));

    let steps = build_plan(&ActionSet::default(), Path::new("/backups"));
    let report = deploy(&runner, steps, FailurePolicy::Halt, &LogStream::silent()).await;

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(
        report.skipped,
        vec!["Pulls new tags in destination environment", "Checkout new tag"]
    );
    assert!(!executor.commands().iter().any(|c| c.starts_with("git checkout")));

    let message = Message::from(report);
    assert!(message
        .message()
        .ends_with("\nSkipped steps: Pulls new tags in destination environment, Checkout new tag"));
}

#[tokio::test]
async fn test_failed_tag_listing_still_allocates_today() {
    let executor = RecordingExecutor::new();
    executor.respond("git tag -a", Message::success(""));
    executor.respond("git tag", Message::failure("fatal: not a git repository"));

    let dispatcher = Dispatcher::new(executor.clone(), "docker");
    let sync = SyncMatrix::new(executor.clone(), Settings::default(), Dir::new("/tmp/dresktop-test"));
    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = cloud("prod", "example.org");
    let runner = DeployRunner::new(&dispatcher, &sync, &project, &source, &destination, "r", day("2024-07-21"));

    let steps = build_plan(&ActionSet::default(), Path::new("/backups"));
    let report = deploy(&runner, steps, FailurePolicy::Continue, &LogStream::silent()).await;

    assert_eq!(report.failed().count(), 1);
    assert_eq!(runner.release_tag().await.map(|t| t.to_string()).as_deref(), Some("2024-07-21"));
    assert!(executor.commands().contains(&"git checkout 2024-07-21".to_string()));
}

#[tokio::test]
async fn test_engine_deploy_backs_up_destination_first() {
    let home = tempfile::tempdir().unwrap();
    let backups = home.path().join("before-release");
    let (engine, executor) = engine_at(home.path(), None).await;

    let mut backup = DeploymentAction::new(keys::BACKUP_DATABASE, true, Phase::PreDeployment);
    backup.path = Some(backups.clone());
    let request = DeployRequest {
        actions: vec![backup],
        commit_message: "Weekly release".to_string(),
    };

    let project = project();
    let source = cloud("stage", "stage.example.org");
    let destination = desktop("local", home.path());
    let message = engine
        .deploy(&project, &destination, &request, &source, None)
        .await;

    assert!(message.is_success(), "{}", message.message());
    assert!(message.message().starts_with(&step_header("Database backup")));

    let commands = executor.commands();
    assert!(commands[0].starts_with("bash -o pipefail -c 'docker exec db.local.shop.drt"));
    assert!(commands[0].contains(&format!("> {}/shop.local.", backups.display())));
    assert!(backups.is_dir());
    assert_eq!(commands.len(), 7);
}
