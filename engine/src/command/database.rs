//! Database export/import commands

use std::path::Path;

use crate::command::naming::database_container;
use crate::command::shell::{quote, ShellCommand};
use crate::storage::settings::DatabaseSettings;

/// Drops the sandbox-mode comment newer MariaDB dumps start with
const SANDBOX_COMMENT_FILTER: &str = r"sed '/^\/\*!999999\\- enable the sandbox mode \*\//d'";

/// Newer MariaDB defaults to a collation older servers reject
const COLLATION_FILTER: &str = "sed 's/utf8mb4_uca1400_ai_ci/utf8mb4_unicode_ci/g'";

/// Whether a dump is gzip-compressed, judged by its extension
pub fn is_gzip(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Dump the desktop database into a gzip file on the host
///
/// The pipe runs under `pipefail`: a failure in any stage fails the command.
pub fn export_desktop(
    container_program: &str,
    database: &DatabaseSettings,
    namespace: &str,
    dump_path: &Path,
) -> String {
    let pipeline = ShellCommand::new(container_program)
        .arg("exec")
        .value(database_container(namespace))
        .value(&database.dump)
        .option("--user=", &database.user)
        .option("--password=", &database.password)
        .arg("--lock-tables")
        .arg("--databases")
        .value(&database.name)
        .pipe(ShellCommand::new(SANDBOX_COMMENT_FILTER))
        .pipe(ShellCommand::new(COLLATION_FILTER))
        .pipe(ShellCommand::new("gzip"));

    ShellCommand::new("bash")
        .args(["-o", "pipefail", "-c"])
        .value(pipeline.render())
        .redirect_to(dump_path.to_string_lossy())
        .render()
}

/// Dump the cloud database into `remote_path` through the task runner
pub fn export_cloud(remote_path: &str) -> String {
    ShellCommand::new("drush sql:dump --gzip")
        .redirect_to(remote_path)
        .render()
}

/// Load a dump already copied into the desktop database container
///
/// `source` is only used to decide whether the dump is compressed.
pub fn import_desktop(
    container_program: &str,
    database: &DatabaseSettings,
    namespace: &str,
    source: &Path,
    container_path: &str,
) -> String {
    let client = ShellCommand::new(&quote(&database.client))
        .option("-u", &database.user)
        .option("-p", &database.password)
        .value(&database.name);

    let inner = if is_gzip(source) {
        ShellCommand::new("gzip")
            .arg("-dc")
            .value(container_path)
            .pipe(client)
    } else {
        client.read_from(container_path)
    };

    ShellCommand::new(container_program)
        .arg("exec")
        .arg("-i")
        .value(database_container(namespace))
        .arg("bash")
        .arg("-c")
        .value(inner.render())
        .render()
}

/// Load a dump already copied to the cloud host
pub fn import_cloud(source: &Path, remote_path: &str) -> String {
    if is_gzip(source) {
        ShellCommand::new("gunzip")
            .arg("-c")
            .value(remote_path)
            .pipe(ShellCommand::new("drush sql:cli"))
            .render()
    } else {
        ShellCommand::new("drush sql:cli")
            .read_from(remote_path)
            .render()
    }
}
