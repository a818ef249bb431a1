//! Command dispatch

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::debug;

use crate::app::cli::{Cli, Commands, DbCommands, FilesCommands, InfraCommands, Target, Transfer};
use crate::command::naming::namespace;
use crate::engine::Engine;
use crate::exec::{ConsoleSink, LogSink, NullSink};
use crate::filesys::file::File;
use crate::infra::{InfrastructureStatus, StatusEntry};
use crate::models::deployment::{DeployRequest, DeploymentAction};
use crate::models::infrastructure::Infrastructure;
use crate::models::message::Message;
use crate::storage::layout::StorageLayout;
use crate::storage::records::{Records, ResolvedEnvironment};
use crate::storage::settings::Settings;
use crate::utils::{generate_identifier, version_info};

/// Execute `cli`; returns whether the operation succeeded
pub async fn run(cli: Cli, layout: StorageLayout, settings: Settings) -> Result<bool> {
    let json = cli.json;
    let sink: Arc<dyn LogSink> = if json {
        Arc::new(NullSink)
    } else {
        Arc::new(ConsoleSink)
    };
    let engine = Engine::with_processes(settings, layout.clone(), sink);
    let records_file = layout.records_file();
    let mut records = Records::load(&records_file)
        .await
        .with_context(|| format!("Unable to read {}", records_file.path().display()))?;

    let identifier = generate_identifier();
    let id = Some(identifier.as_str());
    debug!("Operation {}", identifier);

    let message = match cli.command {
        Commands::Version => {
            println!("{}", serde_json::to_string_pretty(&version_info())?);
            return Ok(true);
        }

        Commands::Infra { command } => {
            return infra(&engine, &mut records, &records_file, command, id, json).await;
        }

        Commands::Run { target, os, command } => {
            let resolved = records.resolve(&target.project, &target.environment)?;
            let command = command.join(" ");
            if os {
                engine.run_os(&command, Some(&resolved.environment), id).await
            } else {
                engine
                    .run_command(&command, &resolved.project, &resolved.environment, id)
                    .await
            }
        }

        Commands::Db { command } => match command {
            DbCommands::Export { target, dir } => {
                let resolved = records.resolve(&target.project, &target.environment)?;
                engine
                    .export_database(&resolved.project, &resolved.environment, &dir, id)
                    .await
            }
            DbCommands::Import { target, file } => {
                let resolved = records.resolve(&target.project, &target.environment)?;
                engine
                    .import_database(&resolved.project, &resolved.environment, &file, id)
                    .await
            }
            DbCommands::Sync(transfer) => {
                let (source, destination) = resolve_pair(&records, &transfer)?;
                engine
                    .sync_database(&destination.project, &destination.environment, &source.environment, id)
                    .await
            }
        },

        Commands::Files {
            command: FilesCommands::Sync(transfer),
        } => {
            let (source, destination) = resolve_pair(&records, &transfer)?;
            engine
                .sync_files(&destination.environment, &source.environment, id)
                .await
        }

        Commands::Deploy {
            transfer,
            message,
            actions,
        } => {
            let (source, destination) = resolve_pair(&records, &transfer)?;
            let actions: Vec<DeploymentAction> = match actions {
                Some(path) => File::new(&path)
                    .read_json()
                    .await
                    .with_context(|| format!("Unable to read actions from {}", path.display()))?,
                None => Vec::new(),
            };
            let request = DeployRequest {
                actions,
                commit_message: message,
            };
            engine
                .deploy(
                    &destination.project,
                    &destination.environment,
                    &request,
                    &source.environment,
                    id,
                )
                .await
        }

        Commands::Check => {
            let checks = engine.bootstrap(id).await;
            let success = checks.iter().all(|c| c.result.is_success());
            if json {
                let results: BTreeMap<&str, &Message> =
                    checks.iter().map(|c| (c.name, &c.result)).collect();
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for check in &checks {
                    println!("{} {}", badge(check.result.is_success()), check.name.bold());
                }
            }
            return Ok(success);
        }
    };

    print_message(&message, json)?;
    Ok(message.is_success())
}

async fn infra(
    engine: &Engine,
    records: &mut Records,
    records_file: &File,
    command: InfraCommands,
    id: Option<&str>,
    json: bool,
) -> Result<bool> {
    let message = match command {
        InfraCommands::Create {
            target,
            services,
            build,
        } => {
            let resolved = records.resolve(&target.project, &target.environment)?;
            // Without explicit services the recorded selection is kept
            let services: BTreeMap<String, bool> = if services.is_empty() {
                resolved
                    .infrastructure
                    .as_ref()
                    .map(|i| i.services.clone())
                    .unwrap_or_default()
            } else {
                services.into_iter().map(|service| (service, true)).collect()
            };

            let (path, message) = if build {
                let (path, message) = engine
                    .build_infrastructure(&resolved.project, &resolved.environment, &services, id)
                    .await?;
                (path, Some(message))
            } else {
                let path = engine
                    .create_infrastructure(&resolved.project, &resolved.environment, &services)
                    .await?;
                (path, None)
            };

            let infrastructure = Infrastructure {
                file_path: Some(path.clone()),
                services,
            };
            let enabled: Vec<&str> = infrastructure.enabled_services().collect();
            let summary = format!(
                "Infrastructure written to {} (optional services: {})",
                path.display(),
                if enabled.is_empty() { "none".to_string() } else { enabled.join(", ") }
            );
            records.set_infrastructure(&target.project, &target.environment, Some(infrastructure))?;
            records.save(records_file).await?;

            match message {
                Some(message) => message,
                None => Message::success(summary).with_data(path.to_string_lossy()),
            }
        }

        InfraCommands::Up(target) => {
            let path = document_path(engine, records, &target)?;
            engine.up(&path, id).await
        }
        InfraCommands::Start(target) => {
            let path = document_path(engine, records, &target)?;
            engine.start(&path, id).await
        }
        InfraCommands::Stop(target) => {
            let path = document_path(engine, records, &target)?;
            engine.stop(&path, id).await
        }
        InfraCommands::Down(target) => {
            let path = document_path(engine, records, &target)?;
            engine.down(&path, id).await
        }

        InfraCommands::Status(target) => {
            let path = document_path(engine, records, &target)?;
            let status = engine.status(&path).await;
            print_status(&status, json)?;
            return Ok(status.success);
        }

        InfraCommands::Activate {
            target,
            service,
            disable,
        } => {
            let resolved = records.resolve(&target.project, &target.environment)?;
            let path = document_path(engine, records, &target)?;
            let enable = !disable;
            let changed = engine
                .activate(&resolved.project, &resolved.environment, &service, enable, &path)
                .await?;

            let mut infrastructure = resolved.infrastructure.unwrap_or_default();
            infrastructure.file_path = Some(path);
            infrastructure.services.insert(service.clone(), enable);
            records.set_infrastructure(&target.project, &target.environment, Some(infrastructure))?;
            records.save(records_file).await?;

            let state = if enable { "enabled" } else { "disabled" };
            if changed {
                Message::success(format!("Service {} {}", service, state))
            } else {
                Message::success(format!("Service {} already {}", service, state))
            }
        }

        InfraCommands::Destroy(target) => {
            let path = document_path(engine, records, &target)?;
            let message = engine.destroy_infrastructure(&path, id).await?;
            records.set_infrastructure(&target.project, &target.environment, None)?;
            records.save(records_file).await?;
            message
        }
    };

    print_message(&message, json)?;
    Ok(message.is_success())
}

fn resolve_pair(records: &Records, transfer: &Transfer) -> Result<(ResolvedEnvironment, ResolvedEnvironment)> {
    if transfer.from == transfer.to {
        bail!("Source and destination are both '{}'", transfer.from);
    }
    Ok((
        records.resolve(&transfer.project, &transfer.from)?,
        records.resolve(&transfer.project, &transfer.to)?,
    ))
}

/// Recorded document path, else where `create` writes it
fn document_path(engine: &Engine, records: &Records, target: &Target) -> Result<PathBuf> {
    let resolved = records.resolve(&target.project, &target.environment)?;
    if let Some(path) = resolved.infrastructure.and_then(|i| i.file_path) {
        return Ok(path);
    }
    let ns = namespace(&resolved.project, &resolved.environment);
    Ok(engine.layout().infrastructure_file(&ns).path().to_path_buf())
}

fn badge(success: bool) -> colored::ColoredString {
    if success {
        "ok".green().bold()
    } else {
        "failed".red().bold()
    }
}

fn print_message(message: &Message, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(message)?);
        return Ok(());
    }

    // Streamed output already reached the console; repeat only the summary
    let summary = message
        .message()
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    println!();
    println!("{} {}", badge(message.is_success()), summary);
    if let Some(data) = message.data() {
        println!("{}", data.dimmed());
    }
    Ok(())
}

fn print_status(status: &InfrastructureStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    for entry in &status.entries {
        match entry {
            StatusEntry::Container(_) => {
                let state = entry.state().unwrap_or("unknown");
                let state = if entry.is_running() {
                    state.green()
                } else {
                    state.yellow()
                };
                println!(
                    "{:<40} {:<12} {}",
                    entry.name().unwrap_or("-"),
                    entry.service().unwrap_or("-"),
                    state
                );
            }
            StatusEntry::Log { log } => println!("{}", log.dimmed()),
        }
    }
    println!("{} {} running", badge(status.success), status.running());
    Ok(())
}
