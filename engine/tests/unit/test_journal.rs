//! Journaling and output streaming tests

use std::sync::Arc;

use dresktop::exec::{ChannelSink, LogSink};
use dresktop::storage::journal::{FileJournal, Journal};
use dresktop::Message;

use crate::support::{desktop, engine_at, project};

#[tokio::test]
async fn test_identified_operation_is_streamed_and_journaled() {
    let home = tempfile::tempdir().unwrap();
    let (sink, mut events) = ChannelSink::channel();
    let sink: Arc<dyn LogSink> = Arc::new(sink);
    let (engine, executor) = engine_at(home.path(), Some(sink)).await;
    let journal = Arc::new(FileJournal::new(engine.layout().journal_file()));
    let engine = engine.with_journal(journal.clone());
    executor.respond("drush status", Message::success("Drupal version : 10.3"));

    let environment = desktop("local", home.path());
    let message = engine
        .run_command("drush status", &project(), &environment, Some("op-1"))
        .await;
    assert!(message.is_success());

    let event = events.try_recv().unwrap();
    assert_eq!(event.identifier, "op-1");
    assert_eq!(event.data, "Drupal version : 10.3");

    let entries = journal.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].identifier, "op-1");
    assert_eq!(entries[0].environment.as_deref(), Some("local"));
    assert_eq!(entries[0].command, "drush status");
    assert_eq!(entries[0].result.as_ref(), Some(&message));
}

#[tokio::test]
async fn test_anonymous_operation_leaves_no_trace() {
    let home = tempfile::tempdir().unwrap();
    let (sink, mut events) = ChannelSink::channel();
    let sink: Arc<dyn LogSink> = Arc::new(sink);
    let (engine, executor) = engine_at(home.path(), Some(sink)).await;
    let journal = Arc::new(FileJournal::new(engine.layout().journal_file()));
    let engine = engine.with_journal(journal.clone());
    executor.respond("uptime", Message::success("up 3 days"));

    let message = engine.run_os("uptime", None, None).await;

    assert_eq!(message.message(), "up 3 days");
    assert!(events.try_recv().is_err());
    assert!(journal.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_operation_is_journaled_with_its_result() {
    let home = tempfile::tempdir().unwrap();
    let (engine, executor) = engine_at(home.path(), None).await;
    let journal = Arc::new(FileJournal::new(engine.layout().journal_file()));
    let engine = engine.with_journal(journal.clone());
    executor.respond("git", Message::failure("fatal: not a git repository"));

    let environment = desktop("local", home.path());
    let message = engine.run_os("git status", Some(&environment), Some("op-2")).await;

    let entries = journal.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].is_pending());
    assert_eq!(entries[0].result.as_ref(), Some(&message));
    assert!(!message.is_success());
}
