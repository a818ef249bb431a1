//! The deployment plan built from caller actions

use std::path::{Path, PathBuf};

use crate::deploy::pipeline::Step;
use crate::models::deployment::{keys, ActionSet, Phase, VendorTool};

pub const MAINTENANCE_ON: &str = "drush state:set system.maintenance_mode 1 --input-format=integer";
pub const MAINTENANCE_OFF: &str = "drush state:set system.maintenance_mode 0 --input-format=integer";
pub const CLEAR_CACHE: &str = "drush cr";
pub const DATABASE_UPDATES: &str = "drush updatedb";
pub const IMPORT_CONFIGURATION: &str = "drush config:import";
pub const SANITIZE_DATABASE: &str = "drush sql:sanitize";
pub const COMPOSER_INSTALL: &str = "COMPOSER_ALLOW_SUPERUSER=1 composer install --no-dev --optimize-autoloader";

/// Which side of the deployment a step acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployAction {
    /// Export the destination database into a directory
    BackupDatabase { export_dir: PathBuf },
    /// Application command on the destination
    Task(&'static str),
    FetchTags(Side),
    /// List source tags and allocate the next release tag
    AllocateTag,
    CreateTag,
    PushTag,
    CheckoutTag,
    /// `composer install` on the destination
    ComposerInstall,
}

/// Ordered steps for `actions`
///
/// Pre- and post-deployment steps only appear when enabled for their phase;
/// the release steps always do.
pub fn build_plan(actions: &ActionSet, default_backup_dir: &Path) -> Vec<Step<DeployAction>> {
    let mut steps = Vec::new();

    let pre = Phase::PreDeployment;
    if let Some(action) = actions.enabled_in(keys::BACKUP_DATABASE, pre) {
        let export_dir = action
            .path
            .clone()
            .unwrap_or_else(|| default_backup_dir.to_path_buf());
        steps.push(Step::new("Database backup", pre, DeployAction::BackupDatabase { export_dir }));
    }
    if actions.enabled_in(keys::MAINTENANCE_ON, pre).is_some() {
        steps.push(Step::new(
            "Turn on Drupal maintenance mode",
            pre,
            DeployAction::Task(MAINTENANCE_ON),
        ));
    }
    if actions.enabled_in(keys::CLEAR_CACHE, pre).is_some() {
        steps.push(Step::new("Clear all Drupal caches", pre, DeployAction::Task(CLEAR_CACHE)));
    }

    let deploy = Phase::Deployment;
    steps.extend([
        Step::new(
            "Pull new tags in the source environment",
            deploy,
            DeployAction::FetchTags(Side::Source),
        ),
        Step::new("Gets the new tag name from the source", deploy, DeployAction::AllocateTag),
        Step::new("Creates the new tag in the source environment", deploy, DeployAction::CreateTag),
        Step::new("Push new tag", deploy, DeployAction::PushTag),
        Step::new(
            "Pulls new tags in destination environment",
            deploy,
            DeployAction::FetchTags(Side::Destination),
        ),
        Step::new("Checkout new tag", deploy, DeployAction::CheckoutTag),
    ]);

    if let Some(action) = actions.enabled_in(keys::VENDOR, deploy) {
        // Only composer has an installation step
        if let Some(VendorTool::Composer) = action.vendor.as_ref().map(|v| v.selected) {
            steps.push(Step::new(
                "Runs composer install",
                deploy,
                DeployAction::ComposerInstall,
            ));
        }
    }

    let post = Phase::PostDeployment;
    let post_steps = [
        (keys::DATABASE_UPDATES, "Run database updates", DATABASE_UPDATES),
        (keys::IMPORT_CONFIGURATION, "Import configuration", IMPORT_CONFIGURATION),
        (keys::SANITIZE_DATABASE, "Sanitize database", SANITIZE_DATABASE),
        (keys::CLEAR_CACHE, "Clear all Drupal caches", CLEAR_CACHE),
        (keys::MAINTENANCE_OFF, "Turn off Drupal maintenance mode", MAINTENANCE_OFF),
    ];
    for (key, title, command) in post_steps {
        if actions.enabled_in(key, post).is_some() {
            steps.push(Step::new(title, post, DeployAction::Task(command)));
        }
    }

    steps
}
