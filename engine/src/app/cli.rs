//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Dresktop - operate desktop and cloud application environments
#[derive(Parser, Debug)]
#[command(name = "dresktop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory (defaults to $DRESKTOP_HOME or ~/Dresktop)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Print results as JSON instead of streaming output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A project and one of its environments
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Project machine name
    #[arg(short, long)]
    pub project: String,

    /// Environment machine name
    #[arg(short, long)]
    pub environment: String,
}

/// A project and two of its environments
#[derive(Args, Debug, Clone)]
pub struct Transfer {
    /// Project machine name
    #[arg(short, long)]
    pub project: String,

    /// Source environment machine name
    #[arg(long)]
    pub from: String,

    /// Destination environment machine name
    #[arg(long)]
    pub to: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the containers of a desktop environment
    Infra {
        #[command(subcommand)]
        command: InfraCommands,
    },

    /// Run a command in an environment
    Run {
        #[command(flatten)]
        target: Target,

        /// Run as a raw OS command instead of through the application runtime
        #[arg(long)]
        os: bool,

        /// Command to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Export, import and synchronize databases
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Synchronize public files
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },

    /// Release the source checkout as a new tag and deploy it
    Deploy {
        #[command(flatten)]
        transfer: Transfer,

        /// Annotation of the release tag
        #[arg(short, long)]
        message: String,

        /// JSON file holding the list of deployment actions
        #[arg(long)]
        actions: Option<PathBuf>,
    },

    /// Prepare the host: shared network, sync image and proxy
    Check,

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum InfraCommands {
    /// Write the topology document of an environment
    Create {
        #[command(flatten)]
        target: Target,

        /// Optional service to enable (repeatable)
        #[arg(short, long = "service")]
        services: Vec<String>,

        /// Bring the containers up afterwards
        #[arg(long)]
        build: bool,
    },
    Up(Target),
    Start(Target),
    Stop(Target),
    Down(Target),
    Status(Target),
    /// Enable or disable an optional service
    Activate {
        #[command(flatten)]
        target: Target,

        #[arg(short, long)]
        service: String,

        #[arg(long)]
        disable: bool,
    },
    /// Remove the containers and the topology document
    Destroy(Target),
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    Export {
        #[command(flatten)]
        target: Target,

        /// Directory receiving the dump
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    Import {
        #[command(flatten)]
        target: Target,

        /// Dump to load, plain or gzip-compressed
        #[arg(long)]
        file: PathBuf,
    },
    Sync(Transfer),
}

#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    Sync(Transfer),
}
